//! Configuration data structures for the extraction pipeline.
//!
//! Groups:
//! - [`ExtractorConfig`] — top-level container
//! - [`Filters`]         — which files to include/exclude
//! - [`Limits`]          — size limits applied during scanning
//!
//! All structs are `serde`-friendly so they can be loaded from JSON/YAML.

use serde::{Deserialize, Serialize};

/// Top-level configuration for the pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractorConfig {
    /// Which files to include/exclude.
    pub filters: Filters,
    /// Size limits applied while scanning.
    pub limits: Limits,
}

/// File filtering rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Filters {
    /// Glob patterns for files to ignore.
    pub ignore_globs: Vec<String>,
}

impl Default for Filters {
    fn default() -> Self {
        Self {
            ignore_globs: vec![
                "**/.git/**".into(),
                "**/node_modules/**".into(),
                "**/build/**".into(),
                "**/dist/**".into(),
            ],
        }
    }
}

/// Limits for scanning and parsing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Limits {
    /// Maximum file size to parse (bytes).
    pub max_file_bytes: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_file_bytes: 2 * 1024 * 1024, // 2 MB
        }
    }
}
