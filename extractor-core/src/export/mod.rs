//! Artifact serialization: the feature writer and the per-category
//! assembly of feature payloads from parser state.

pub mod features;
pub mod writer;
