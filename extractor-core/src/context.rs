//! Per-run parse context and mutable state.
//!
//! A [`ParseContext`] is constructed once per parse request and threaded
//! explicitly through the run — never a process-wide singleton, because
//! multiple requests may execute concurrently in different workers.
//!
//! Cancellation is cooperative: the harness sets the shared [`CancelFlag`]
//! when the cancel signal lands, and the traversal polls
//! [`ParseContext::ensure_active`] before visiting each node and once per
//! root file, so abort latency is bounded by single-node processing time.

use crate::errors::{ExtractError, Result};
use crate::model::{entity::ModuleEntity, language::LanguageKind};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared cooperative-cancellation flag, polled at traversal safe points.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Idempotent; the walk observes it at the next
    /// safe point.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    /// Fail with [`ExtractError::Cancelled`] once the flag is set.
    pub fn ensure_active(&self) -> Result<()> {
        if self.is_cancelled() {
            return Err(ExtractError::Cancelled);
        }
        Ok(())
    }
}

/// Aggregate mutable state populated by visitors during one run.
#[derive(Debug, Default)]
pub struct ParserState {
    /// Per-file entities, keyed by path relative to the project root.
    modules: BTreeMap<String, ModuleEntity>,
    /// Cross-file symbol registry: exported symbol name -> defining module.
    pub symbols: BTreeMap<String, String>,
    /// Root files fully traversed (out-of-scope files are not counted).
    pub files_visited: usize,
}

impl ParserState {
    /// Get-or-create the [`ModuleEntity`] for `rel_path`. Keys are unique
    /// per run; the entity is created lazily on first visit.
    pub fn module_mut(&mut self, rel_path: &str, language: LanguageKind) -> &mut ModuleEntity {
        self.modules
            .entry(rel_path.to_string())
            .or_insert_with(|| ModuleEntity::new(rel_path.to_string(), language))
    }

    pub fn module(&self, rel_path: &str) -> Option<&ModuleEntity> {
        self.modules.get(rel_path)
    }

    /// Discard a module's partially populated entities (out-of-scope file).
    pub fn remove_module(&mut self, rel_path: &str) -> Option<ModuleEntity> {
        self.modules.remove(rel_path)
    }

    pub fn modules(&self) -> impl Iterator<Item = &ModuleEntity> {
        self.modules.values()
    }

    pub fn modules_mut(&mut self) -> impl Iterator<Item = &mut ModuleEntity> {
        self.modules.values_mut()
    }

    pub fn module_count(&self) -> usize {
        self.modules.len()
    }

    pub fn entity_count(&self) -> usize {
        self.modules.values().map(|m| m.entity_count()).sum()
    }
}

/// All per-run inputs and mutable state, created once per parse request and
/// discarded at the end.
#[derive(Debug)]
pub struct ParseContext {
    /// Opaque id threading this request through logs and artifacts.
    pub correlation_id: String,
    /// Working directory containing the project to parse.
    pub directory_path: PathBuf,
    /// Directory feature artifacts are written into.
    pub output_directory_path: PathBuf,
    /// Whether artifacts are gzip-compressed.
    pub compress_output: bool,
    /// Tag of the front-end that produced the ASTs, interpolated into
    /// artifact filenames. Set by the pipeline before any write happens.
    pub frontend_tag: &'static str,
    /// Shared cooperative-cancellation flag.
    pub cancel: CancelFlag,
    /// Aggregate state populated by visitors.
    pub state: ParserState,
}

impl ParseContext {
    pub fn new(
        correlation_id: String,
        directory_path: PathBuf,
        output_directory_path: PathBuf,
        compress_output: bool,
        cancel: CancelFlag,
    ) -> Self {
        Self {
            correlation_id,
            directory_path,
            output_directory_path,
            compress_output,
            frontend_tag: "ts",
            cancel,
            state: ParserState::default(),
        }
    }

    /// Fail with [`ExtractError::Cancelled`] once the run's cancel flag is
    /// set. Checked before visiting each node and once per root file.
    pub fn ensure_active(&self) -> Result<()> {
        self.cancel.ensure_active()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn module_map_get_or_create() {
        let mut state = ParserState::default();
        state
            .module_mut("src/a.ts", LanguageKind::TypeScript)
            .classes
            .truncate(0);
        assert_eq!(state.module_count(), 1);

        // Same key resolves to the same entity, not a fresh one.
        state
            .module_mut("src/a.ts", LanguageKind::TypeScript)
            .imports
            .truncate(0);
        assert_eq!(state.module_count(), 1);

        state.module_mut("src/b.ts", LanguageKind::TypeScript);
        assert_eq!(state.module_count(), 2);
    }

    #[test]
    fn cancel_flag_trips_ensure_active() {
        let cancel = CancelFlag::new();
        assert!(cancel.ensure_active().is_ok());

        cancel.cancel();
        assert!(matches!(
            cancel.ensure_active(),
            Err(ExtractError::Cancelled)
        ));
        // Clones observe the same flag.
        let clone = cancel.clone();
        assert!(clone.is_cancelled());
    }
}
