//! Tree-sitter front-end for TypeScript/JavaScript sources.

use crate::core::fs_scan::ScannedFile;
use crate::core::normalize::normalize_repo_rel_str;
use crate::errors::{ExtractError, Result};
use crate::frontend::{Frontend, SourceFile, TypeFacility};
use crate::model::language::LanguageKind;
use std::fs;
use std::path::Path;
use tracing::{debug, info};
use tree_sitter::{Language, Node, Parser};

/// Front-end tag carried into artifact filenames.
pub const FRONTEND_TAG: &str = "ts";

/// Tree-sitter based front-end. Grammars are selected per file extension.
#[derive(Debug, Default)]
pub struct TsFrontend;

impl TsFrontend {
    pub fn new() -> Self {
        Self
    }

    fn grammar_for(path: &Path, language: LanguageKind) -> Language {
        match language {
            LanguageKind::JavaScript => tree_sitter_javascript::LANGUAGE.into(),
            LanguageKind::TypeScript => {
                let tsx = path
                    .extension()
                    .and_then(|e| e.to_str())
                    .map(|e| e.eq_ignore_ascii_case("tsx"))
                    .unwrap_or(false);
                if tsx {
                    tree_sitter_typescript::LANGUAGE_TSX.into()
                } else {
                    tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into()
                }
            }
        }
    }
}

impl Frontend for TsFrontend {
    fn tag(&self) -> &'static str {
        FRONTEND_TAG
    }

    fn parse_project(&self, root: &Path, files: &[ScannedFile]) -> Result<Vec<SourceFile>> {
        let mut out = Vec::with_capacity(files.len());

        for file in files {
            let text = fs::read_to_string(&file.path)?;
            let rel_path = normalize_repo_rel_str(root, &file.path);

            let mut parser = Parser::new();
            parser.set_language(&Self::grammar_for(&file.path, file.language))?;

            let tree = parser
                .parse(&text, None)
                .ok_or_else(|| ExtractError::Parse {
                    file: rel_path.clone(),
                })?;

            debug!("frontend: parsed {} ({})", rel_path, file.language);
            out.push(SourceFile {
                rel_path,
                language: file.language,
                text,
                tree,
            });
        }

        info!("frontend: parsed {} root files", out.len());
        Ok(out)
    }
}

/// Syntax-directed type facility: reads explicit annotations and obvious
/// literal shapes. No checker behind it; `None` means "unknown".
#[derive(Debug, Default)]
pub struct TsTypeFacility;

impl TypeFacility for TsTypeFacility {
    fn type_of(&self, file: &SourceFile, node: &Node) -> Option<String> {
        // Explicit annotation wins: `name: Type`.
        if let Some(ann) = node.child_by_field_name("type") {
            let text = file.node_text(&ann);
            return Some(text.trim_start_matches(':').trim().to_string());
        }

        match node.kind() {
            "string" | "template_string" => Some("string".to_string()),
            "number" => Some("number".to_string()),
            "true" | "false" => Some("boolean".to_string()),
            "array" => Some("array".to_string()),
            "new_expression" => {
                let ctor = node.child_by_field_name("constructor")?;
                Some(file.node_text(&ctor).to_string())
            }
            _ => None,
        }
    }
}
