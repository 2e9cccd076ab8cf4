//! Import-graph scanner.
//!
//! Records `import` statements and `require(...)` calls as edges out of the
//! module, and judges module provenance: vendored third-party code that
//! slipped past the scan filters (a `node_modules/` or `vendor/` path
//! segment) is flagged out of scope on the file's root node, which makes
//! the dispatcher abandon that one file.
//!
//! The reconcile pass resolves relative import specifiers against the
//! run's module map.

use crate::context::ParserState;
use crate::errors::{ExtractError, Result};
use crate::frontend::SourceFile;
use crate::model::entity::{ImportEntity, ModuleEntity};
use crate::visitors::{Visitor, call_arguments, name_field_text, string_literal_text};
use tree_sitter::Node;

const VENDORED_SEGMENTS: &[&str] = &["node_modules", "vendor"];

#[derive(Default)]
pub struct ImportGraphVisitor;

impl ImportGraphVisitor {
    pub fn new() -> Self {
        Self
    }
}

impl Visitor for ImportGraphVisitor {
    fn name(&self) -> &'static str {
        "import_graph"
    }

    fn should_visit(&self, node: &Node) -> bool {
        matches!(
            node.kind(),
            "program" | "import_statement" | "call_expression"
        )
    }

    fn visit_before_children(
        &mut self,
        file: &SourceFile,
        node: &Node,
        _entity_key: &str,
        module: &mut ModuleEntity,
    ) -> Result<()> {
        match node.kind() {
            "program" => {
                if is_vendored(&file.rel_path) {
                    return Err(ExtractError::OutOfScopeModule {
                        file: file.rel_path.clone(),
                    });
                }
            }
            "import_statement" => {
                if let Some(source) = node
                    .child_by_field_name("source")
                    .and_then(|s| string_literal_text(file, &s))
                {
                    module.imports.push(ImportEntity {
                        source,
                        names: imported_names(file, node),
                        resolved_target: None,
                    });
                }
            }
            "call_expression" => {
                let callee = node
                    .child_by_field_name("function")
                    .map(|f| file.node_text(&f).to_string());
                if callee.as_deref() == Some("require") {
                    if let Some(source) = call_arguments(node)
                        .first()
                        .and_then(|a| string_literal_text(file, a))
                    {
                        module.imports.push(ImportEntity {
                            source,
                            names: Vec::new(),
                            resolved_target: None,
                        });
                    }
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn reconcile(&mut self, state: &mut ParserState) -> Result<()> {
        let known: Vec<String> = state.modules().map(|m| m.file.clone()).collect();
        for module in state.modules_mut() {
            let from = module.file.clone();
            for import in module.imports.iter_mut() {
                if !(import.source.starts_with("./") || import.source.starts_with("../")) {
                    continue;
                }
                let base = resolve_relative(&from, &import.source);
                import.resolved_target = candidate_paths(&base)
                    .into_iter()
                    .find(|c| known.iter().any(|k| k == c));
            }
        }
        Ok(())
    }
}

fn is_vendored(rel_path: &str) -> bool {
    rel_path
        .split('/')
        .any(|seg| VENDORED_SEGMENTS.contains(&seg))
}

/// Names bound by an import statement (default, named, and namespace forms).
fn imported_names(file: &SourceFile, node: &Node) -> Vec<String> {
    let mut out = Vec::new();
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        if child.kind() != "import_clause" {
            continue;
        }
        let mut inner = child.walk();
        for part in child.named_children(&mut inner) {
            match part.kind() {
                "identifier" => out.push(file.node_text(&part).to_string()),
                "named_imports" => {
                    let mut specs = part.walk();
                    for spec in part.named_children(&mut specs) {
                        if spec.kind() == "import_specifier" {
                            if let Some(n) = name_field_text(file, &spec) {
                                out.push(n);
                            }
                        }
                    }
                }
                "namespace_import" => out.push(file.node_text(&part).to_string()),
                _ => {}
            }
        }
    }
    out
}

/// Resolve a relative specifier against the importing file's directory,
/// collapsing `.` and `..` segments. Returns a repo-relative key.
fn resolve_relative(from_file: &str, spec: &str) -> String {
    let mut parts: Vec<&str> = from_file.split('/').collect();
    parts.pop(); // drop the file name
    for seg in spec.split('/') {
        match seg {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            s => parts.push(s),
        }
    }
    parts.join("/")
}

fn candidate_paths(base: &str) -> Vec<String> {
    vec![
        base.to_string(),
        format!("{base}.ts"),
        format!("{base}.tsx"),
        format!("{base}.js"),
        format!("{base}/index.ts"),
        format!("{base}/index.js"),
    ]
}
