//! Class-hierarchy scanner.
//!
//! Records every class declaration with its heritage (extends/implements),
//! attached decorators, and member inventory. Members are aggregated in the
//! after-hook, once all member nodes are fully visited. The reconcile pass
//! publishes class names into the run's symbol registry.

use crate::context::ParserState;
use crate::core::ids::entity_id;
use crate::errors::{ExtractError, Result};
use crate::frontend::{SourceFile, TypeFacility};
use crate::model::entity::{ClassEntity, ModuleEntity, PropertyEntity};
use crate::model::span::Span;
use crate::visitors::{Visitor, name_field_text};
use std::collections::BTreeMap;
use std::sync::Arc;
use tree_sitter::Node;

const CLASS_KINDS: &[&str] = &["class_declaration", "abstract_class_declaration", "class"];

pub struct ClassHierarchyVisitor {
    facility: Arc<dyn TypeFacility>,
    /// Classes opened by the before-hook, keyed by entity key.
    open: BTreeMap<String, String>,
}

impl ClassHierarchyVisitor {
    pub fn new(facility: Arc<dyn TypeFacility>) -> Self {
        Self {
            facility,
            open: BTreeMap::new(),
        }
    }
}

impl Visitor for ClassHierarchyVisitor {
    fn name(&self) -> &'static str {
        "class_hierarchy"
    }

    fn should_visit(&self, node: &Node) -> bool {
        CLASS_KINDS.contains(&node.kind())
    }

    fn visit_before_children(
        &mut self,
        file: &SourceFile,
        node: &Node,
        entity_key: &str,
        _module: &mut ModuleEntity,
    ) -> Result<()> {
        let name =
            name_field_text(file, node).unwrap_or_else(|| "<anonymous>".to_string());
        self.open.insert(entity_key.to_string(), name);
        Ok(())
    }

    fn visit_after_children(
        &mut self,
        file: &SourceFile,
        node: &Node,
        entity_key: &str,
        module: &mut ModuleEntity,
    ) -> Result<()> {
        let name = self
            .open
            .remove(entity_key)
            .ok_or(ExtractError::InvalidState("after-hook without before-hook"))?;

        let (extends, implements) = class_heritage(file, node);

        let mut methods = Vec::new();
        let mut properties = Vec::new();
        if let Some(body) = node.child_by_field_name("body") {
            let mut cursor = body.walk();
            for member in body.named_children(&mut cursor) {
                match member.kind() {
                    "method_definition" | "method_signature" | "abstract_method_signature" => {
                        if let Some(m) = name_field_text(file, &member) {
                            methods.push(m);
                        }
                    }
                    "public_field_definition" | "field_definition" | "property_signature" => {
                        if let Some(p) = name_field_text(file, &member) {
                            properties.push(PropertyEntity {
                                name: p,
                                type_text: self.facility.type_of(file, &member),
                            });
                        }
                    }
                    _ => {}
                }
            }
        }

        let decorators = own_decorators(file, node);

        module.classes.push(ClassEntity {
            entity_id: entity_id(entity_key),
            name,
            extends,
            implements,
            methods,
            properties,
            decorators,
            span: Span::from_node(node),
        });
        Ok(())
    }

    fn reconcile(&mut self, state: &mut ParserState) -> Result<()> {
        let pairs: Vec<(String, String)> = state
            .modules()
            .flat_map(|m| {
                m.classes
                    .iter()
                    .map(|c| (c.name.clone(), m.file.clone()))
                    .collect::<Vec<_>>()
            })
            .collect();
        for (name, file) in pairs {
            state.symbols.insert(name, file);
        }
        Ok(())
    }
}

/// Resolve a class node's heritage, tolerating both the TypeScript grammar
/// (`class_heritage` wrapping extends/implements clauses) and the
/// JavaScript grammar (`class_heritage` wrapping a bare expression).
pub(crate) fn class_heritage(file: &SourceFile, node: &Node) -> (Option<String>, Vec<String>) {
    let mut extends = None;
    let mut implements = Vec::new();

    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        if child.kind() != "class_heritage" {
            continue;
        }
        let mut inner = child.walk();
        for clause in child.named_children(&mut inner) {
            match clause.kind() {
                "extends_clause" => {
                    let mut c = clause.walk();
                    if let Some(base) = clause.named_children(&mut c).next() {
                        extends = Some(file.node_text(&base).to_string());
                    }
                }
                "implements_clause" => {
                    let mut c = clause.walk();
                    for ty in clause.named_children(&mut c) {
                        implements.push(file.node_text(&ty).to_string());
                    }
                }
                // JavaScript grammar: the expression sits directly inside.
                _ => extends = Some(file.node_text(&clause).to_string()),
            }
        }
    }
    (extends, implements)
}

/// Decorator names attached directly to this node (not to its members).
fn own_decorators(file: &SourceFile, node: &Node) -> Vec<String> {
    let mut out = Vec::new();
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        if child.kind() == "decorator" {
            if let Some(expr) = child.named_child(0) {
                let name = match expr.kind() {
                    "call_expression" => expr
                        .child_by_field_name("function")
                        .map(|f| file.node_text(&f).to_string()),
                    _ => Some(file.node_text(&expr).to_string()),
                };
                if let Some(n) = name {
                    out.push(n);
                }
            }
        }
    }
    out
}
