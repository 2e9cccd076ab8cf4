//! REST route scanner.
//!
//! Recognizes Express-style member calls (`app.get("/path", handler)`,
//! `router.post(...)`) and routing-controller method decorators
//! (`@Get("/path")`).

use crate::core::ids::entity_id;
use crate::errors::Result;
use crate::frontend::SourceFile;
use crate::model::entity::{ModuleEntity, RouteEntity};
use crate::model::span::Span;
use crate::visitors::{Visitor, call_arguments, name_field_text, string_literal_text};
use tree_sitter::Node;

const EXPRESS_RECEIVERS: &[&str] = &["app", "router"];
const EXPRESS_VERBS: &[&str] = &["get", "post", "put", "delete", "patch", "all"];
const DECORATOR_VERBS: &[&str] = &["Get", "Post", "Put", "Delete", "Patch", "All"];

#[derive(Default)]
pub struct RouteVisitor;

impl RouteVisitor {
    pub fn new() -> Self {
        Self
    }
}

impl Visitor for RouteVisitor {
    fn name(&self) -> &'static str {
        "routes"
    }

    fn should_visit(&self, node: &Node) -> bool {
        matches!(node.kind(), "call_expression" | "decorator")
    }

    fn visit_before_children(
        &mut self,
        file: &SourceFile,
        node: &Node,
        entity_key: &str,
        module: &mut ModuleEntity,
    ) -> Result<()> {
        let route = match node.kind() {
            "call_expression" => express_route(file, node, entity_key),
            "decorator" => decorator_route(file, node, entity_key),
            _ => None,
        };
        if let Some(route) = route {
            module.routes.push(route);
        }
        Ok(())
    }
}

/// `app.get("/path", handler)` and friends.
fn express_route(file: &SourceFile, node: &Node, entity_key: &str) -> Option<RouteEntity> {
    let function = node.child_by_field_name("function")?;
    if function.kind() != "member_expression" {
        return None;
    }
    let object = function.child_by_field_name("object")?;
    let property = function.child_by_field_name("property")?;

    let receiver = file.node_text(&object);
    let verb = file.node_text(&property);
    if !EXPRESS_RECEIVERS.contains(&receiver) || !EXPRESS_VERBS.contains(&verb) {
        return None;
    }

    let args = call_arguments(node);
    let path = args.first().and_then(|a| string_literal_text(file, a))?;
    let handler = args.get(1).and_then(|h| match h.kind() {
        "identifier" => Some(file.node_text(h).to_string()),
        "member_expression" => Some(file.node_text(h).to_string()),
        _ => None,
    });

    Some(RouteEntity {
        entity_id: entity_id(entity_key),
        method: verb.to_string(),
        path,
        handler,
        span: Span::from_node(node),
    })
}

/// `@Get("/path")` on a controller method.
fn decorator_route(file: &SourceFile, node: &Node, entity_key: &str) -> Option<RouteEntity> {
    let expr = node.named_child(0)?;
    if expr.kind() != "call_expression" {
        return None;
    }
    let function = expr.child_by_field_name("function")?;
    let verb = file.node_text(&function);
    if !DECORATOR_VERBS.contains(&verb) {
        return None;
    }

    let path = call_arguments(&expr)
        .first()
        .and_then(|a| string_literal_text(file, a))
        .unwrap_or_else(|| "/".to_string());
    let handler = node.parent().and_then(|p| name_field_text(file, &p));

    Some(RouteEntity {
        entity_id: entity_id(entity_key),
        method: verb.to_ascii_lowercase(),
        path,
        handler,
        span: Span::from_node(node),
    })
}
