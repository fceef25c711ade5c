//! Command-line interface and orchestration for cel-harness
//!
//! This module implements the command line and coordinates the other modules to load inputs,
//! run the selected mode, and print its report.
//!
//! # Execution Flow
//!
//! The `run` function parses command-line arguments using clap and then:
//!
//! 1. Initializes logging and loads the configuration, applying command-line overrides
//! 2. Loads the object file, the expression file and the params file
//! 3. Runs exactly one mode:
//!    - **evaluation** (default): every expression against every object, failures reported per cell
//!    - **benchmark** (`--benchmark`): compile everything, warm up, then time each expression
//! 4. Writes the console report to the host's output, and optionally a JSON report to a file
//!
//! Any failure while starting up, and any failure in benchmark mode, is fatal: it is written to
//! the host's error stream, the host is asked to exit with status 1, and `run` returns the error.
//!
//! Configuration is managed through an optional TOML file whose defaults are embedded from
//! `default_config.toml`.

mod benchmark;
mod common;
mod config;
mod evaluate;
mod host;
mod progress_reporter;
mod run;

#[cfg(debug_assertions)]
pub use config::HarnessConfig;

pub use benchmark::benchmark_all;
pub use evaluate::evaluate_all;
pub use host::Host;
pub use progress_reporter::ProgressReporter;
pub use run::run;
