//! Stable identifiers for extracted entities.
//!
//! - Entity keys correlate a node's before/after hooks: relative file path
//!   plus the node's byte range, stable across runs for unchanged sources.
//! - UUID v5 (namespace/name-based) turns a key into a deterministic id
//!   suitable as a primary key for downstream consumers.

use tree_sitter::Node;
use uuid::Uuid;

/// Stable key for a node: `{rel_path}|{start_byte}-{end_byte}`.
pub fn entity_key(rel_path: &str, node: &Node) -> String {
    format!("{}|{}-{}", rel_path, node.start_byte(), node.end_byte())
}

/// Compute a deterministic UUID v5 from a logical key.
#[inline]
pub fn entity_id(key: &str) -> String {
    Uuid::new_v5(&Uuid::nil(), key.as_bytes()).to_string()
}
