#![doc(hidden)]
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Core library for cel-harness
//!
//! This library holds all functionality of the cel-harness tool, which evaluates CEL expressions
//! against YAML test objects and benchmarks how quickly they evaluate.
//!
//! # Module Organization
//!
//! - [`commands`]: Command-line interface and orchestration
//! - [`documents`]: Loading YAML object and params documents
//! - [`expr`]: Expression files, the expression environment and compilation
//! - [`matrix`]: Evaluating every expression against every object
//! - [`bench`]: Timing compiled expressions
//! - [`reports`]: Console and JSON report generation

pub type Result<T, E = ohno::AppError> = core::result::Result<T, E>;

#[cfg(any(debug_assertions, test))]
pub mod bench;
#[cfg(not(any(debug_assertions, test)))]
mod bench;

#[cfg(any(debug_assertions, test))]
pub mod commands;
#[cfg(not(any(debug_assertions, test)))]
mod commands;

#[cfg(any(debug_assertions, test))]
pub mod documents;
#[cfg(not(any(debug_assertions, test)))]
mod documents;

#[cfg(any(debug_assertions, test))]
pub mod expr;
#[cfg(not(any(debug_assertions, test)))]
mod expr;

#[cfg(any(debug_assertions, test))]
pub mod matrix;
#[cfg(not(any(debug_assertions, test)))]
mod matrix;

#[cfg(any(debug_assertions, test))]
pub mod reports;
#[cfg(not(any(debug_assertions, test)))]
mod reports;

pub use crate::commands::{Host, run};
pub use crate::expr::silence_parser_panics;
