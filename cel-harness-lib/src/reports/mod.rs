//! Report generation for evaluation and benchmark results
//!
//! Two generators are provided, each with one entry point per operating mode:
//! - **Console**: plain text blocks, optionally coloured, written to the terminal
//! - **JSON**: machine-readable structured data, written to a file
//!
//! Generators write into any `core::fmt::Write`, so callers decide where the text ends up.
//! Values are rendered deterministically, with map entries sorted by key.

mod common;
mod console;
mod json;

pub use console::generate_benchmark as generate_console_benchmark;
pub use console::generate_matrix as generate_console_matrix;
pub use json::generate_benchmark as generate_json_benchmark;
pub use json::generate_matrix as generate_json_matrix;
