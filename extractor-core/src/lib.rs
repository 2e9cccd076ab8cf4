//! Feature-extraction pipeline for Node/TypeScript projects.
//!
//! The crate parses a project through a tree-sitter front-end, runs a
//! registry of independent visitors over every syntax node, accumulates
//! per-module entities, and serializes the result as uniquely named
//! (optionally gzip-compressed) artifact files.
//!
//! Layers:
//! - `config`   — pipeline configuration (filters, limits)
//! - `context`  — per-run mutable state and the cooperative cancel flag
//! - `model`    — spans, languages, extracted entities, feature payloads
//! - `core`     — filesystem scanning, normalization, stable ids
//! - `frontend` — tree-sitter parsing + best-effort type facility
//! - `traverse` — pre-order visitor dispatch engine
//! - `visitors` — the visitor catalogue
//! - `export`   — the feature writer
//! - `run`      — pipeline orchestration

pub mod config;
pub mod context;
pub mod core;
pub mod errors;
pub mod export;
pub mod frontend;
pub mod model;
pub mod run;
pub mod traverse;
pub mod visitors;

#[cfg(test)]
mod testutil;
