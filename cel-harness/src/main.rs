//! Evaluate or benchmark CEL expressions against YAML test data.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

use cel_harness_lib::{Host, run, silence_parser_panics};
use std::io::{IsTerminal, Write, stderr, stdout};

/// Default host that talks to the real process streams.
#[derive(Debug, Clone, Default)]
pub struct RealHost;

#[cfg_attr(coverage_nightly, coverage(off))]
impl Host for RealHost {
    fn output(&mut self) -> impl Write {
        stdout()
    }

    fn error(&mut self) -> impl Write {
        stderr()
    }

    fn exit(&mut self, code: i32) {
        std::process::exit(code);
    }

    fn output_is_terminal(&self) -> bool {
        stdout().is_terminal()
    }
}

#[cfg_attr(coverage_nightly, coverage(off))]
fn main() -> Result<(), ohno::AppError> {
    silence_parser_panics();
    run(&mut RealHost, std::env::args())
}
