//! Visitor capability interface and the default registry.
//!
//! Visitors are independent, composable feature probes. Modeling them as a
//! predicate plus before/after hooks (rather than one switch over node
//! kinds) lets new detectors be added without touching the traversal
//! engine, and lets many visitors cheaply observe the same node.
//!
//! A registry is an ordered list of boxed visitors, built fresh per run and
//! bound to that run's type-resolution facility — never shared across runs.

pub mod class_hierarchy;
pub mod decorators;
pub mod imports;
pub mod orm_schema;
pub mod routes;

use crate::context::ParserState;
use crate::errors::Result;
use crate::frontend::{SourceFile, TypeFacility};
use crate::model::entity::ModuleEntity;
use std::sync::Arc;
use tree_sitter::Node;

/// One feature probe over the AST.
///
/// Contract enforced by the dispatcher: for every node, `should_visit` is
/// consulted first; iff it returns `true`, `visit_before_children` runs
/// before any descendant is visited and `visit_after_children` runs after
/// all descendants are fully visited — exactly once each, in registration
/// order. `entity_key` is stable for the node and identical in both calls.
pub trait Visitor: Send {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Pure predicate, no side effects.
    fn should_visit(&self, node: &Node) -> bool;

    /// Pre-order hook, called before descending into children.
    fn visit_before_children(
        &mut self,
        file: &SourceFile,
        node: &Node,
        entity_key: &str,
        module: &mut ModuleEntity,
    ) -> Result<()>;

    /// Post-order hook, called once all descendants are fully visited.
    /// Use this for aggregation that needs resolved child results.
    fn visit_after_children(
        &mut self,
        _file: &SourceFile,
        _node: &Node,
        _entity_key: &str,
        _module: &mut ModuleEntity,
    ) -> Result<()> {
        Ok(())
    }

    /// Enrichment pass, invoked once after every root file is traversed.
    fn reconcile(&mut self, _state: &mut ParserState) -> Result<()> {
        Ok(())
    }
}

/// Build the default visitor registry for one run, bound to the run's
/// type-resolution facility. Order is fixed: it is the hook invocation
/// order at every matched node.
pub fn default_registry(facility: Arc<dyn TypeFacility>) -> Vec<Box<dyn Visitor>> {
    vec![
        Box::new(imports::ImportGraphVisitor::new()),
        Box::new(class_hierarchy::ClassHierarchyVisitor::new(
            facility.clone(),
        )),
        Box::new(decorators::DecoratorVisitor::new()),
        Box::new(orm_schema::OrmSchemaVisitor::new(facility)),
        Box::new(routes::RouteVisitor::new()),
    ]
}

// --- shared node helpers ---

/// Unquoted text of a string/template literal node, `None` otherwise.
pub(crate) fn string_literal_text(file: &SourceFile, node: &Node) -> Option<String> {
    match node.kind() {
        "string" | "template_string" => {
            let t = file.node_text(node);
            Some(
                t.trim_matches(|c| c == '"' || c == '\'' || c == '`')
                    .to_string(),
            )
        }
        _ => None,
    }
}

/// Named argument nodes of a call expression, in source order.
pub(crate) fn call_arguments<'t>(node: &Node<'t>) -> Vec<Node<'t>> {
    let mut out = Vec::new();
    if let Some(args) = node.child_by_field_name("arguments") {
        let mut cursor = args.walk();
        for a in args.named_children(&mut cursor) {
            out.push(a);
        }
    }
    out
}

/// Text of a node's `name` field, when present.
pub(crate) fn name_field_text(file: &SourceFile, node: &Node) -> Option<String> {
    node.child_by_field_name("name")
        .map(|n| file.node_text(&n).to_string())
}
