//! ORM schema scanner (Sequelize-style).
//!
//! Two declaration shapes are recognized:
//! - `sequelize.define("User", { ... })` calls — attributes read from the
//!   second argument's object literal;
//! - model classes (`class User extends Model`) — attributes read from the
//!   class fields in the after-hook, with types from the run's type
//!   facility.

use crate::core::ids::entity_id;
use crate::errors::Result;
use crate::frontend::{SourceFile, TypeFacility};
use crate::model::entity::{ModuleEntity, OrmAttribute, OrmModelEntity};
use crate::model::span::Span;
use crate::visitors::class_hierarchy::class_heritage;
use crate::visitors::{Visitor, call_arguments, name_field_text, string_literal_text};
use std::sync::Arc;
use tree_sitter::Node;

pub struct OrmSchemaVisitor {
    facility: Arc<dyn TypeFacility>,
}

impl OrmSchemaVisitor {
    pub fn new(facility: Arc<dyn TypeFacility>) -> Self {
        Self { facility }
    }
}

impl Visitor for OrmSchemaVisitor {
    fn name(&self) -> &'static str {
        "orm_schema"
    }

    fn should_visit(&self, node: &Node) -> bool {
        matches!(
            node.kind(),
            "call_expression" | "class_declaration" | "abstract_class_declaration"
        )
    }

    fn visit_before_children(
        &mut self,
        file: &SourceFile,
        node: &Node,
        entity_key: &str,
        module: &mut ModuleEntity,
    ) -> Result<()> {
        if node.kind() != "call_expression" {
            return Ok(());
        }
        if !is_define_call(file, node) {
            return Ok(());
        }

        let args = call_arguments(node);
        let Some(name) = args.first().and_then(|a| string_literal_text(file, a)) else {
            return Ok(());
        };
        let attributes = args
            .get(1)
            .map(|obj| object_attributes(file, obj))
            .unwrap_or_default();

        module.orm_models.push(OrmModelEntity {
            entity_id: entity_id(entity_key),
            name,
            attributes,
            span: Span::from_node(node),
        });
        Ok(())
    }

    fn visit_after_children(
        &mut self,
        file: &SourceFile,
        node: &Node,
        entity_key: &str,
        module: &mut ModuleEntity,
    ) -> Result<()> {
        if node.kind() == "call_expression" {
            return Ok(());
        }

        let (extends, _) = class_heritage(file, node);
        let is_model = extends
            .as_deref()
            .map(|e| e == "Model" || e.ends_with(".Model"))
            .unwrap_or(false);
        if !is_model {
            return Ok(());
        }
        let Some(name) = name_field_text(file, node) else {
            return Ok(());
        };

        let mut attributes = Vec::new();
        if let Some(body) = node.child_by_field_name("body") {
            let mut cursor = body.walk();
            for member in body.named_children(&mut cursor) {
                if matches!(member.kind(), "public_field_definition" | "field_definition") {
                    if let Some(attr) = name_field_text(file, &member) {
                        attributes.push(OrmAttribute {
                            name: attr,
                            type_text: self.facility.type_of(file, &member),
                        });
                    }
                }
            }
        }

        module.orm_models.push(OrmModelEntity {
            entity_id: entity_id(entity_key),
            name,
            attributes,
            span: Span::from_node(node),
        });
        Ok(())
    }
}

/// True for `<receiver>.define(...)` member calls.
fn is_define_call(file: &SourceFile, node: &Node) -> bool {
    let Some(function) = node.child_by_field_name("function") else {
        return false;
    };
    if function.kind() != "member_expression" {
        return false;
    }
    function
        .child_by_field_name("property")
        .map(|p| file.node_text(&p) == "define")
        .unwrap_or(false)
}

/// Attribute records from an object literal: key plus raw value text.
fn object_attributes(file: &SourceFile, obj: &Node) -> Vec<OrmAttribute> {
    let mut out = Vec::new();
    if obj.kind() != "object" {
        return out;
    }
    let mut cursor = obj.walk();
    for pair in obj.named_children(&mut cursor) {
        if pair.kind() != "pair" {
            continue;
        }
        let Some(key) = pair.child_by_field_name("key") else {
            continue;
        };
        let name = string_literal_text(file, &key)
            .unwrap_or_else(|| file.node_text(&key).to_string());
        let type_text = pair
            .child_by_field_name("value")
            .map(|v| file.node_text(&v).to_string());
        out.push(OrmAttribute { name, type_text });
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::ts::TsTypeFacility;
    use crate::testutil::{ctx_for, fixture};
    use crate::traverse::walk_project;

    fn registry() -> Vec<Box<dyn Visitor>> {
        vec![Box::new(OrmSchemaVisitor::new(Arc::new(TsTypeFacility)))]
    }

    #[test]
    fn extracts_define_call_schema() {
        let (dir, files) = fixture(&[(
            "models.js",
            r#"
const User = sequelize.define("User", {
  username: DataTypes.STRING,
  age: DataTypes.INTEGER,
});
"#,
        )]);
        let mut ctx = ctx_for(&dir);
        let mut visitors = registry();
        walk_project(&mut ctx, &files, &mut visitors).unwrap();

        let module = ctx.state.module("models.js").unwrap();
        assert_eq!(module.orm_models.len(), 1);
        let model = &module.orm_models[0];
        assert_eq!(model.name, "User");
        assert_eq!(model.attributes.len(), 2);
        assert_eq!(model.attributes[0].name, "username");
        assert_eq!(
            model.attributes[0].type_text.as_deref(),
            Some("DataTypes.STRING")
        );
    }

    #[test]
    fn extracts_model_class_schema() {
        let (dir, files) = fixture(&[(
            "account.ts",
            r#"
class Account extends Model {
  id: number;
  email: string;
  touch() {}
}
"#,
        )]);
        let mut ctx = ctx_for(&dir);
        let mut visitors = registry();
        walk_project(&mut ctx, &files, &mut visitors).unwrap();

        let module = ctx.state.module("account.ts").unwrap();
        assert_eq!(module.orm_models.len(), 1);
        let model = &module.orm_models[0];
        assert_eq!(model.name, "Account");
        let attrs: Vec<_> = model.attributes.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(attrs, vec!["id", "email"]);
        assert_eq!(model.attributes[1].type_text.as_deref(), Some("string"));
    }

    #[test]
    fn plain_classes_are_not_models() {
        let (dir, files) = fixture(&[("plain.ts", "class Plain extends Base {}\n")]);
        let mut ctx = ctx_for(&dir);
        let mut visitors = registry();
        walk_project(&mut ctx, &files, &mut visitors).unwrap();
        assert!(ctx.state.module("plain.ts").unwrap().orm_models.is_empty());
    }
}
