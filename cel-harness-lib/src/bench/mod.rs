//! Timing compiled expressions
//!
//! A benchmark warms up every (object, expression) pair, then times each expression in turn over
//! a fixed number of passes through all objects. Runs are strictly sequential so that measurements
//! do not interfere with one another.

mod harness;
mod progress;
mod stats;

pub use harness::{BenchmarkError, BenchmarkSettings, run_benchmark};
pub use progress::{NoProgress, Phase, Progress};
pub use stats::{BenchmarkReport, ExpressionReport, ExpressionStats, Summary};
