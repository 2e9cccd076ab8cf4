//! Filesystem scanning with diagnostics.
//!
//! Walks the project directory, applies ignore globs and the size cap from
//! [`ExtractorConfig`], and detects languages by extension. Only files the
//! front-end can parse are returned.

use crate::config::model::ExtractorConfig;
use crate::core::normalize::{build_globset, detect_language, is_ignored_by};
use crate::errors::{ExtractError, Result};
use crate::model::language::LanguageKind;
use globset::GlobSet;
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, info, warn};
use walkdir::{DirEntry, WalkDir};

#[derive(Debug, Clone)]
pub struct ScannedFile {
    pub path: PathBuf,
    pub language: LanguageKind,
    pub size: u64,
}

#[derive(Debug, Clone)]
pub struct ScanResult {
    pub root: PathBuf,
    pub files: Vec<ScannedFile>,
}

pub fn scan_project(root: &Path, cfg: &ExtractorConfig) -> Result<ScanResult> {
    if !root.exists() {
        return Err(ExtractError::InvalidState("project root does not exist"));
    }
    let root = dunce::canonicalize(root)?;

    info!("fs_scan: start -> {}", root.display());

    let ignore_globs: Option<GlobSet> = build_globset(&cfg.filters.ignore_globs);

    // counters for diagnostics
    let mut skipped_ignored = 0usize;
    let mut skipped_too_big = 0usize;

    let mut files = Vec::<ScannedFile>::new();

    let walker = WalkDir::new(&root)
        .follow_links(true)
        .into_iter()
        .filter_entry(keep_entry);

    for entry in walker.filter_map(std::result::Result::ok) {
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();

        if is_ignored_by(path, ignore_globs.as_ref()) {
            skipped_ignored += 1;
            debug!("fs_scan: ignore (glob) {}", path.display());
            continue;
        }

        let Some(language) = detect_language(path) else {
            continue;
        };

        let meta = match fs::metadata(path) {
            Ok(m) => m,
            Err(err) => {
                warn!("fs_scan: metadata failed for {}: {}", path.display(), err);
                continue;
            }
        };
        let size = meta.len();
        if size as usize > cfg.limits.max_file_bytes {
            skipped_too_big += 1;
            debug!(
                "fs_scan: skip (size {} > max {}) {}",
                size,
                cfg.limits.max_file_bytes,
                path.display()
            );
            continue;
        }

        files.push(ScannedFile {
            path: path.to_path_buf(),
            language,
            size,
        });
    }

    // Deterministic traversal order for stable entity keys across runs.
    files.sort_by(|a, b| a.path.cmp(&b.path));

    info!(
        "fs_scan: done, total={} (ignored={}, too_big={})",
        files.len(),
        skipped_ignored,
        skipped_too_big
    );

    Ok(ScanResult { root, files })
}

/// Coarse directory filter to avoid descending into heavy/vendor folders early.
fn keep_entry(entry: &DirEntry) -> bool {
    if entry.file_type().is_dir() {
        if let Some(name) = entry.file_name().to_str() {
            return !matches!(name, ".git" | "build" | "dist" | ".idea" | ".vscode");
        }
    }
    true
}
