//! Command dispatch logic for cel-harness

use super::common::{HarnessArgs, init_logging, load_config, load_inputs};
use super::{benchmark_all, evaluate_all};
use crate::{Host, Result};
use clap::Parser;
use clap::error::ErrorKind;
use ohno::app_err;
use std::io::Write;

const LOG_TARGET: &str = "       run";

/// The two ways the harness can consume its inputs. Exactly one is chosen per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
enum Mode {
    #[strum(to_string = "evaluation")]
    Evaluate,

    #[strum(to_string = "benchmark")]
    Benchmark,
}

/// Dispatch command-line arguments to the selected mode
///
/// This function parses the command-line arguments, loads the configuration and input files,
/// and runs either the evaluation matrix or the benchmark. It's designed to be called from
/// main.rs with the program arguments.
///
/// # Arguments
///
/// * `args` - An iterator of command-line arguments (typically from `std::env::args()`)
///
/// # Errors
///
/// Returns an error if the arguments are invalid or if the selected mode fails. The error has
/// already been reported through `host` by the time it is returned.
pub fn run<I, T, H>(host: &mut H, args: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
    H: Host,
{
    let args = match HarnessArgs::try_parse_from(args) {
        Ok(args) => args,
        Err(e) => {
            let _ = write!(host.output(), "{}", e.render());
            return match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => Ok(()),
                _ => {
                    host.exit(1);
                    Err(app_err!("invalid command line"))
                }
            };
        }
    };

    init_logging(args.log_level);

    let mode = if args.benchmark { Mode::Benchmark } else { Mode::Evaluate };
    log::info!(target: LOG_TARGET, "Running in {mode} mode");

    let config = load_config(host, &args)?;
    let inputs = load_inputs(host, &args, &config)?;

    match mode {
        Mode::Evaluate => evaluate_all(host, &args, &config, &inputs),
        Mode::Benchmark => benchmark_all(host, &args, &config, &inputs),
    }
}
