//! Structured test data loading
//!
//! Object files hold zero or more YAML documents, one per test case. Params files hold a single
//! document; anything after the first document is ignored. Every document must be a mapping and
//! is converted into a CEL map once at load time, so evaluation never pays for the conversion.

mod document;
mod loader;

pub use document::Document;
pub use loader::{LoadError, load_multi_document, load_single_document, read_multi_document, read_single_document};
