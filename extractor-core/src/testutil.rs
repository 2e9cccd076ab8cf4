//! Shared fixtures for unit tests: write sources to a temp dir, scan, and
//! parse them through the tree-sitter front-end.

use crate::config::model::ExtractorConfig;
use crate::context::{CancelFlag, ParseContext};
use crate::core::fs_scan::scan_project;
use crate::frontend::{Frontend, SourceFile, ts::TsFrontend};
use std::fs;
use std::path::PathBuf;

pub(crate) fn fixture(sources: &[(&str, &str)]) -> (tempfile::TempDir, Vec<SourceFile>) {
    let dir = tempfile::tempdir().unwrap();
    for (name, text) in sources {
        let path = dir.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, text).unwrap();
    }
    let scan = scan_project(dir.path(), &ExtractorConfig::default()).unwrap();
    let files = TsFrontend::new()
        .parse_project(&scan.root, &scan.files)
        .unwrap();
    (dir, files)
}

pub(crate) fn ctx_for(out: &tempfile::TempDir) -> ParseContext {
    ParseContext::new(
        "test-run".into(),
        PathBuf::from("."),
        out.path().to_path_buf(),
        false,
        CancelFlag::new(),
    )
}
