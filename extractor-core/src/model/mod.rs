//! Data model: source locations, languages, extracted entities, and the
//! feature payload shapes consumed by the writer.

pub mod entity;
pub mod feature;
pub mod language;
pub mod span;
