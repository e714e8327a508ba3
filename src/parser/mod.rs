//! Parser module: comment block extraction and tag grammar.

pub mod extract;
pub mod tags;
pub mod tokens;

pub use extract::Extractor;
