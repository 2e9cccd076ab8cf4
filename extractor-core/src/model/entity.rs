//! Extracted entities accumulated per source module.
//!
//! `ModuleEntity` is the per-file container: created lazily on first visit
//! of a file and owned exclusively by `ParserState` for the run's lifetime.
//! The nested entity types are intentionally language-agnostic records;
//! visitor-specific heuristics stay in the visitor modules.

use crate::model::{language::LanguageKind, span::Span};
use serde::{Deserialize, Serialize};

/// Container of entities extracted from one source file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleEntity {
    /// Normalized path relative to project root (unique key per run).
    pub file: String,
    /// Language of the file.
    pub language: LanguageKind,
    #[serde(default)]
    pub classes: Vec<ClassEntity>,
    #[serde(default)]
    pub decorators: Vec<DecoratorUsage>,
    #[serde(default)]
    pub orm_models: Vec<OrmModelEntity>,
    #[serde(default)]
    pub routes: Vec<RouteEntity>,
    #[serde(default)]
    pub imports: Vec<ImportEntity>,
}

impl ModuleEntity {
    pub fn new(file: String, language: LanguageKind) -> Self {
        Self {
            file,
            language,
            classes: Vec::new(),
            decorators: Vec::new(),
            orm_models: Vec::new(),
            routes: Vec::new(),
            imports: Vec::new(),
        }
    }

    /// Total number of extracted entities in this module.
    pub fn entity_count(&self) -> usize {
        self.classes.len()
            + self.decorators.len()
            + self.orm_models.len()
            + self.routes.len()
            + self.imports.len()
    }
}

/// A class declaration with its heritage and member inventory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassEntity {
    /// Deterministic unique id for the entity (UUIDv5 of the entity key).
    pub entity_id: String,
    pub name: String,
    #[serde(default)]
    pub extends: Option<String>,
    #[serde(default)]
    pub implements: Vec<String>,
    /// Method names, in declaration order.
    #[serde(default)]
    pub methods: Vec<String>,
    #[serde(default)]
    pub properties: Vec<PropertyEntity>,
    /// Decorator names attached to the class itself.
    #[serde(default)]
    pub decorators: Vec<String>,
    pub span: Span,
}

/// A class property with its best-effort resolved type text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyEntity {
    pub name: String,
    #[serde(default)]
    pub type_text: Option<String>,
}

/// One decorator usage site.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecoratorUsage {
    pub entity_id: String,
    /// Decorator name without the `@` and without arguments.
    pub name: String,
    /// Name of the decorated declaration, when resolvable.
    #[serde(default)]
    pub target: Option<String>,
    /// Kind of the decorated declaration (class/method/property/parameter).
    pub target_kind: String,
    /// Raw argument list text, `None` for bare decorators.
    #[serde(default)]
    pub arguments: Option<String>,
    pub span: Span,
}

/// An ORM model declaration (e.g., a Sequelize `define` call or model class).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrmModelEntity {
    pub entity_id: String,
    pub name: String,
    #[serde(default)]
    pub attributes: Vec<OrmAttribute>,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrmAttribute {
    pub name: String,
    #[serde(default)]
    pub type_text: Option<String>,
}

/// A REST route declaration (`app.get(...)` or a routing decorator).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteEntity {
    pub entity_id: String,
    /// HTTP verb, lowercased.
    pub method: String,
    /// Route path as written in the source.
    pub path: String,
    /// Handler name, when resolvable.
    #[serde(default)]
    pub handler: Option<String>,
    pub span: Span,
}

/// An import/require edge out of this module.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportEntity {
    /// Import specifier as written (`./user`, `express`, ...).
    pub source: String,
    /// Imported names, empty for bare/namespace imports.
    #[serde(default)]
    pub names: Vec<String>,
    /// Repo-relative path of the target module, when it resolves locally.
    #[serde(default)]
    pub resolved_target: Option<String>,
}
