use crate::Result;
use crate::bench::BenchmarkReport;
use crate::expr::{format_key, format_value, type_name};
use crate::matrix::{CellFailure, EvaluationMatrix};
use cel_interpreter::Value;
use core::fmt::Write;
use core::time::Duration;
use serde_json::json;

/// Write the evaluation matrix as `{ "objects": K, "expressions": M, "cells": [...] }`.
pub fn generate_matrix<W: Write>(matrix: &EvaluationMatrix<'_>, writer: &mut W) -> Result<()> {
    let cells: Vec<_> = matrix
        .cells
        .iter()
        .map(|cell| {
            let outcome = match &cell.outcome {
                Ok(value) => json!({
                    "result": value_to_json(value),
                    "type": type_name(value),
                }),
                Err(CellFailure::Compilation(message)) => json!({
                    "error": { "kind": "compilation", "message": message },
                }),
                Err(CellFailure::Evaluation(message)) => json!({
                    "error": { "kind": "evaluation", "message": message },
                }),
            };

            let mut entry = json!({
                "object": cell.object,
                "expression": cell.expression.ordinal(),
                "source": cell.expression.source(),
            });

            if let (Some(entry), serde_json::Value::Object(outcome)) = (entry.as_object_mut(), outcome) {
                entry.extend(outcome);
            }

            entry
        })
        .collect();

    let output = json!({
        "objects": matrix.object_count,
        "expressions": matrix.expression_count,
        "cells": cells,
    });

    write!(writer, "{}", serde_json::to_string_pretty(&output)?)?;
    Ok(())
}

/// Write the benchmark report as `{ "expressions": [...], "summary": {...} }`.
pub fn generate_benchmark<W: Write>(report: &BenchmarkReport, writer: &mut W) -> Result<()> {
    let expressions: Vec<_> = report
        .expressions
        .iter()
        .map(|entry| {
            json!({
                "position": entry.position,
                "ordinal": entry.expression.ordinal(),
                "source": entry.expression.source(),
                "evaluations": entry.stats.evaluations(),
                "total_duration_ns": nanos(entry.stats.duration()),
                "average_duration_ns": nanos(entry.stats.average()),
                "evaluations_per_second": entry.stats.rate_against(report.total_duration),
                "isolated_evaluations_per_second": entry.stats.isolated_rate(),
            })
        })
        .collect();

    let output = json!({
        "objects": report.object_count,
        "iterations": report.iterations,
        "expressions": expressions,
        "summary": report.summary(),
    });

    write!(writer, "{}", serde_json::to_string_pretty(&output)?)?;
    Ok(())
}

fn nanos(duration: Duration) -> u64 {
    u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX)
}

/// Convert a CEL value to JSON. Values JSON cannot represent natively are rendered as strings.
fn value_to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Bool(b) => json!(b),
        Value::Int(i) => json!(i),
        Value::UInt(u) => json!(u),
        Value::Float(f) => json!(f),
        Value::String(s) => json!(s.as_str()),
        Value::Null => serde_json::Value::Null,
        Value::List(items) => serde_json::Value::Array(items.iter().map(value_to_json).collect()),
        Value::Map(map) => serde_json::Value::Object(
            map.map
                .iter()
                .map(|(key, value)| (format_key(key), value_to_json(value)))
                .collect(),
        ),
        other => json!(format_value(other)),
    }
}
