use super::Host;
use super::common::{HarnessArgs, Inputs, write_report_file};
use super::config::HarnessConfig;
use crate::Result;
use crate::expr::CelEnvironment;
use crate::matrix::run_matrix;
use crate::reports::{generate_console_matrix, generate_json_matrix};
use std::io::Write;

const LOG_TARGET: &str = "  evaluate";

/// Evaluate every expression against every object and print each result.
///
/// Failing cells are part of the output, not errors.
pub fn evaluate_all<H: Host>(host: &mut H, args: &HarnessArgs, config: &HarnessConfig, inputs: &Inputs) -> Result<()> {
    let env = CelEnvironment::for_harness(config.string_extensions);
    let matrix = run_matrix(&env, &inputs.objects, &inputs.params, &inputs.expressions);

    log::info!(
        target: LOG_TARGET,
        "Produced {} cell(s), {} of them failed",
        matrix.cells.len(),
        matrix.failure_count()
    );

    let use_colors = args.color.enabled(host.output_is_terminal());
    let mut console_output = String::new();
    generate_console_matrix(&matrix, use_colors, &mut console_output)?;
    let _ = write!(host.output(), "{console_output}");

    if let Some(path) = &args.json {
        let mut json_output = String::new();
        generate_json_matrix(&matrix, &mut json_output)?;
        write_report_file(host, path, &json_output)?;
    }

    Ok(())
}
