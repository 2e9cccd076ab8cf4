//! Source location model.
//!
//! `Span` stores *both* line and byte ranges to support robust slicing and
//! diagnostics. Lines are 1-based (as commonly reported to users), while
//! bytes are 0-based offsets into the original text.

use serde::{Deserialize, Serialize};
use tree_sitter::Node;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    /// Inclusive start line (1-based).
    pub start_line: usize,
    /// Inclusive end line (1-based).
    pub end_line: usize,
    /// Inclusive start byte (0-based).
    pub start_byte: usize,
    /// Exclusive end byte (0-based).
    pub end_byte: usize,
}

impl Span {
    /// Build a span from a tree-sitter node (rows are 0-based in tree-sitter).
    pub fn from_node(node: &Node) -> Self {
        Self {
            start_line: node.start_position().row + 1,
            end_line: node.end_position().row + 1,
            start_byte: node.start_byte(),
            end_byte: node.end_byte(),
        }
    }

    /// Extract a snippet from `text` by byte offsets. Offsets are clamped
    /// to the text length and snapped back to char boundaries, so a span
    /// computed against different text never panics.
    pub fn slice_text<'a>(&self, text: &'a str) -> &'a str {
        let mut start = self.start_byte.min(text.len());
        while !text.is_char_boundary(start) {
            start -= 1;
        }
        let mut end = self.end_byte.min(text.len()).max(start);
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        &text[start..end.max(start)]
    }
}
