//! Per-category feature assembly.
//!
//! Flattens the run's `ParserState` into the payload shapes the writer
//! persists: tabular features for flat facts, element lists for nested
//! entities. Shapes are stable across runs; the downstream risk-analysis
//! engine consumes them as-is.

use crate::context::ParserState;
use crate::model::feature::FeatureTable;
use serde_json::{Value, json};

fn header(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

/// `classes` feature: one row per class declaration.
pub fn classes_table(state: &ParserState) -> FeatureTable {
    let mut table = FeatureTable::new(header(&[
        "entity_id",
        "file",
        "name",
        "extends",
        "implements",
        "methods",
        "properties",
        "decorators",
    ]));
    for module in state.modules() {
        for class in &module.classes {
            table.push_row(vec![
                json!(class.entity_id),
                json!(module.file),
                json!(class.name),
                json!(class.extends),
                json!(class.implements),
                json!(class.methods),
                json!(class.properties.iter().map(|p| &p.name).collect::<Vec<_>>()),
                json!(class.decorators),
            ]);
        }
    }
    table
}

/// `decorators` feature: one row per usage site.
pub fn decorators_table(state: &ParserState) -> FeatureTable {
    let mut table = FeatureTable::new(header(&[
        "entity_id",
        "file",
        "name",
        "target",
        "target_kind",
        "arguments",
    ]));
    for module in state.modules() {
        for d in &module.decorators {
            table.push_row(vec![
                json!(d.entity_id),
                json!(module.file),
                json!(d.name),
                json!(d.target),
                json!(d.target_kind),
                json!(d.arguments),
            ]);
        }
    }
    table
}

/// `routes` feature: one row per route declaration.
pub fn routes_table(state: &ParserState) -> FeatureTable {
    let mut table = FeatureTable::new(header(&[
        "entity_id", "file", "method", "path", "handler",
    ]));
    for module in state.modules() {
        for r in &module.routes {
            table.push_row(vec![
                json!(r.entity_id),
                json!(module.file),
                json!(r.method),
                json!(r.path),
                json!(r.handler),
            ]);
        }
    }
    table
}

/// `imports` feature: one row per import edge.
pub fn imports_table(state: &ParserState) -> FeatureTable {
    let mut table = FeatureTable::new(header(&[
        "file",
        "source",
        "names",
        "resolved_target",
    ]));
    for module in state.modules() {
        for i in &module.imports {
            table.push_row(vec![
                json!(module.file),
                json!(i.source),
                json!(i.names),
                json!(i.resolved_target),
            ]);
        }
    }
    table
}

/// `symbols` feature: the cross-file symbol registry, one row per
/// exported name.
pub fn symbols_table(state: &ParserState) -> FeatureTable {
    let mut table = FeatureTable::new(header(&["name", "file"]));
    for (name, file) in &state.symbols {
        table.push_row(vec![json!(name), json!(file)]);
    }
    table
}

/// `orm_models` feature: element list, attributes kept nested.
pub fn orm_model_elements(state: &ParserState) -> Vec<Value> {
    let mut out = Vec::new();
    for module in state.modules() {
        for m in &module.orm_models {
            out.push(json!({
                "entity_id": m.entity_id,
                "file": module.file,
                "name": m.name,
                "attributes": m.attributes,
                "span": m.span,
            }));
        }
    }
    out
}

/// `modules` feature: element list of per-file summaries.
pub fn module_elements(state: &ParserState) -> Vec<Value> {
    state
        .modules()
        .map(|m| {
            json!({
                "file": m.file,
                "language": m.language,
                "classes": m.classes.len(),
                "decorators": m.decorators.len(),
                "orm_models": m.orm_models.len(),
                "routes": m.routes.len(),
                "imports": m.imports.len(),
            })
        })
        .collect()
}
