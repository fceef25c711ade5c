use super::common::{Emphasis, emphasize, format_duration, format_rate};
use crate::Result;
use crate::bench::BenchmarkReport;
use crate::expr::{format_value, type_name};
use crate::matrix::EvaluationMatrix;
use core::fmt::Write;

/// Render every cell of an evaluation matrix, grouped by object.
pub fn generate_matrix<W: Write>(matrix: &EvaluationMatrix<'_>, use_colors: bool, writer: &mut W) -> Result<()> {
    for object in 1..=matrix.object_count {
        writeln!(writer)?;
        writeln!(
            writer,
            "{}",
            emphasize(&format!("======= Object {object} ======="), Emphasis::Heading, use_colors)
        )?;

        for cell in matrix.row(object) {
            writeln!(writer)?;
            writeln!(
                writer,
                "{}",
                emphasize(
                    &format!("--- Expression {} ---", cell.expression.ordinal()),
                    Emphasis::Heading,
                    use_colors
                )
            )?;
            writeln!(writer, "{}", cell.expression.source())?;

            let line = match &cell.outcome {
                Ok(value) => emphasize(
                    &format!("Result: {} (type: {})", format_value(value), type_name(value)),
                    Emphasis::Success,
                    use_colors,
                ),
                Err(failure) => emphasize(&failure.to_string(), Emphasis::Failure, use_colors),
            };
            writeln!(writer, "{line}")?;
        }
    }

    Ok(())
}

/// Render per-expression benchmark figures followed by the run summary.
///
/// Expressions are numbered by their position among the compiled expressions.
pub fn generate_benchmark<W: Write>(report: &BenchmarkReport, preview_chars: usize, use_colors: bool, writer: &mut W) -> Result<()> {
    for entry in &report.expressions {
        let stats = &entry.stats;

        writeln!(writer)?;
        writeln!(
            writer,
            "{}",
            emphasize(&format!("--- Expression {} ---", entry.position), Emphasis::Heading, use_colors)
        )?;
        writeln!(writer, "Content: {}", entry.expression.preview(preview_chars))?;
        writeln!(writer, "Evaluations: {}", stats.evaluations())?;
        writeln!(writer, "Total time: {}", format_duration(stats.duration()))?;

        if stats.evaluations() > 0 {
            writeln!(writer, "Average time per evaluation: {}", format_duration(stats.average()))?;
            writeln!(
                writer,
                "Evaluations per second: {}",
                format_rate(stats.rate_against(report.total_duration))
            )?;
            writeln!(writer, "Evaluations per second (isolated): {}", format_rate(stats.isolated_rate()))?;
        }
    }

    writeln!(writer)?;
    writeln!(writer, "{}", emphasize("======= SUMMARY =======", Emphasis::Heading, use_colors))?;
    writeln!(writer, "Total duration: {}", format_duration(report.total_duration))?;
    writeln!(writer, "Total evaluations: {}", report.total_evaluations())?;
    writeln!(writer, "Overall evaluations per second: {}", format_rate(report.overall_rate()))?;

    Ok(())
}
