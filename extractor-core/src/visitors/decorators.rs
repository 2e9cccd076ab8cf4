//! Decorator scanner.
//!
//! Records every decorator usage with its name, raw arguments, and the
//! declaration it is attached to (read from the parent node).

use crate::core::ids::entity_id;
use crate::errors::Result;
use crate::frontend::SourceFile;
use crate::model::entity::{DecoratorUsage, ModuleEntity};
use crate::model::span::Span;
use crate::visitors::{Visitor, name_field_text};
use tree_sitter::Node;

#[derive(Default)]
pub struct DecoratorVisitor;

impl DecoratorVisitor {
    pub fn new() -> Self {
        Self
    }
}

impl Visitor for DecoratorVisitor {
    fn name(&self) -> &'static str {
        "decorators"
    }

    fn should_visit(&self, node: &Node) -> bool {
        node.kind() == "decorator"
    }

    fn visit_before_children(
        &mut self,
        file: &SourceFile,
        node: &Node,
        entity_key: &str,
        module: &mut ModuleEntity,
    ) -> Result<()> {
        let Some(expr) = node.named_child(0) else {
            return Ok(());
        };

        let (name, arguments) = match expr.kind() {
            "call_expression" => {
                let name = expr
                    .child_by_field_name("function")
                    .map(|f| file.node_text(&f).to_string())
                    .unwrap_or_default();
                let args = expr.child_by_field_name("arguments").map(|a| {
                    file.node_text(&a)
                        .trim_start_matches('(')
                        .trim_end_matches(')')
                        .trim()
                        .to_string()
                });
                (name, args.filter(|a| !a.is_empty()))
            }
            _ => (file.node_text(&expr).to_string(), None),
        };

        let (target_kind, target) = match node.parent() {
            Some(parent) => {
                let kind = match parent.kind() {
                    "class_declaration" | "abstract_class_declaration" | "class" => "class",
                    "method_definition" | "method_signature" => "method",
                    "public_field_definition" | "field_definition" => "property",
                    "required_parameter" | "optional_parameter" => "parameter",
                    other => other,
                };
                (kind.to_string(), name_field_text(file, &parent))
            }
            None => ("unknown".to_string(), None),
        };

        module.decorators.push(DecoratorUsage {
            entity_id: entity_id(entity_key),
            name,
            target,
            target_kind,
            arguments,
            span: Span::from_node(node),
        });
        Ok(())
    }
}
