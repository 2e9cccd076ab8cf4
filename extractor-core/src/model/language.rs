//! Language taxonomy and helpers.
//!
//! The extractor targets Node projects, so the set is intentionally tight:
//! TypeScript and JavaScript. Language→grammar mapping lives in the
//! front-end modules to avoid heavy compile-time coupling here.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Supported source languages for this library.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LanguageKind {
    JavaScript,
    TypeScript,
}

impl Display for LanguageKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            LanguageKind::JavaScript => "javascript",
            LanguageKind::TypeScript => "typescript",
        })
    }
}

impl LanguageKind {
    /// Best-effort detection by file extension.
    ///
    /// Returns `None` for unsupported extensions; callers skip such files.
    pub fn from_extension(ext: &str) -> Option<Self> {
        let e = ext.to_ascii_lowercase();
        match e.as_str() {
            "js" | "mjs" | "cjs" | "jsx" => Some(Self::JavaScript),
            "ts" | "tsx" | "mts" | "cts" => Some(Self::TypeScript),
            _ => None,
        }
    }
}
