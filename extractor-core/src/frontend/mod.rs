//! Front-end boundary: turning scanned files into parsed root sources plus
//! a type-resolution facility visitors can query.
//!
//! The traversal engine is agnostic to how sources are parsed; it only
//! needs root files with ASTs and a [`TypeFacility`]. The concrete
//! tree-sitter implementation lives in [`ts`].

pub mod ts;

use crate::core::fs_scan::ScannedFile;
use crate::errors::Result;
use crate::model::language::LanguageKind;
use std::path::Path;
use tree_sitter::{Node, Tree};

/// One parsed root file. Owns both the source text and the tree so nodes
/// can be sliced back to text at any point of the walk.
pub struct SourceFile {
    /// Normalized path relative to the project root.
    pub rel_path: String,
    pub language: LanguageKind,
    pub text: String,
    pub tree: Tree,
}

impl SourceFile {
    /// Text of a node within this file.
    pub fn node_text(&self, node: &Node) -> &str {
        node.utf8_text(self.text.as_bytes()).unwrap_or_default()
    }
}

/// A compiled-program front-end: yields root source files for a scanned
/// project and tags the artifacts it produced.
pub trait Frontend {
    /// Tag interpolated into artifact filenames (e.g. `"ts"`).
    fn tag(&self) -> &'static str;

    /// Parse every scanned file into a [`SourceFile`].
    fn parse_project(&self, root: &Path, files: &[ScannedFile]) -> Result<Vec<SourceFile>>;
}

/// Best-effort type resolution for expressions and declarations.
///
/// Visitors query this instead of reaching into grammar internals; richer
/// front-ends may substitute real checker-backed inference.
pub trait TypeFacility: Send + Sync {
    /// Inferred (or annotated) type text for `node`, if any.
    fn type_of(&self, file: &SourceFile, node: &Node) -> Option<String>;
}
