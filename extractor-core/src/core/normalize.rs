//! Path normalization and glob helpers.

use crate::model::language::LanguageKind;
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::Path;
use tracing::warn;

/// Build a [`GlobSet`] from patterns; invalid patterns are skipped with a
/// warning. Returns `None` when the list is empty.
pub fn build_globset(patterns: &[String]) -> Option<GlobSet> {
    if patterns.is_empty() {
        return None;
    }
    let mut builder = GlobSetBuilder::new();
    for p in patterns {
        match Glob::new(p) {
            Ok(g) => {
                builder.add(g);
            }
            Err(err) => warn!("normalize: bad glob pattern {p:?}: {err}"),
        }
    }
    builder.build().ok()
}

pub fn is_ignored_by(path: &Path, globs: Option<&GlobSet>) -> bool {
    globs.map(|g| g.is_match(path)).unwrap_or(false)
}

/// Detect the language of a file by extension.
pub fn detect_language(path: &Path) -> Option<LanguageKind> {
    let ext = path.extension()?.to_str()?;
    LanguageKind::from_extension(ext)
}

/// Normalize a path into a repo-relative, forward-slash string key.
pub fn normalize_repo_rel_str(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.to_string_lossy().replace('\\', "/")
}
