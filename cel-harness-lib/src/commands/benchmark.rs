use super::common::{HarnessArgs, Inputs, fail, write_report_file};
use super::config::HarnessConfig;
use super::{Host, ProgressReporter};
use crate::Result;
use crate::bench::run_benchmark;
use crate::expr::{CelEnvironment, compile_all};
use crate::reports::{generate_console_benchmark, generate_json_benchmark};
use std::io::Write;

const LOG_TARGET: &str = " benchmark";

/// Compile every expression, then time each one against all objects.
///
/// A compilation failure stops the run before anything is measured, and an evaluation failure
/// while timing stops it without a report.
pub fn benchmark_all<H: Host>(host: &mut H, args: &HarnessArgs, config: &HarnessConfig, inputs: &Inputs) -> Result<()> {
    let env = CelEnvironment::for_harness(config.string_extensions);

    let compiled = compile_all(&env, &inputs.expressions)
        .map_err(|e| fail(host, format_args!("Failed to compile expressions for benchmark: {e}")))?;

    log::info!(
        target: LOG_TARGET,
        "Benchmarking {} expression(s) against {} object(s), {} iteration(s) each",
        compiled.len(),
        inputs.objects.len(),
        config.iterations
    );

    let use_colors = args.color.enabled(host.output_is_terminal());
    let _ = writeln!(host.output(), "\n======= BENCHMARK =======");

    let outcome = {
        let mut reporter = ProgressReporter::new(host, args.progress, use_colors);
        run_benchmark(
            &env,
            &compiled,
            &inputs.objects,
            &inputs.params,
            config.benchmark_settings(),
            &mut reporter,
        )
    };

    let report = outcome.map_err(|e| fail(host, format_args!("Error during benchmark: {e}")))?;

    let mut console_output = String::new();
    generate_console_benchmark(&report, config.preview_chars, use_colors, &mut console_output)?;
    let _ = write!(host.output(), "{console_output}");

    if let Some(path) = &args.json {
        let mut json_output = String::new();
        generate_json_benchmark(&report, &mut json_output)?;
        write_report_file(host, path, &json_output)?;
    }

    Ok(())
}
