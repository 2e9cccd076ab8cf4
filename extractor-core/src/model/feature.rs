//! Feature payload shapes persisted by the writer.
//!
//! A feature category serializes either as a tabular `{header, rows}`
//! object or as a bare array of entities. Keep the shapes stable across
//! runs; the downstream risk-analysis engine consumes them as-is.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Tabular feature payload: a header plus value rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureTable {
    pub header: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl FeatureTable {
    pub fn new(header: Vec<String>) -> Self {
        Self {
            header,
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: Vec<Value>) {
        self.rows.push(row);
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
