//! Argument definitions and start-up logic shared by both operating modes.

use super::Host;
use super::config::{ConfigOverrides, HarnessConfig};
use crate::documents::{Document, LoadError, read_multi_document, read_single_document};
use crate::expr::ExpressionSet;
use camino::{Utf8Path, Utf8PathBuf};
use clap::{Parser, ValueEnum};
use core::fmt::Display;
use ohno::app_err;
use std::fs;
use std::io::Write;

const LOG_TARGET: &str = "   startup";

/// Color mode configuration for output
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Always use colors
    Always,

    /// Never use colors
    Never,

    /// Use colors if the output is a terminal, otherwise don't use colors
    Auto,
}

impl ColorMode {
    /// Whether to colour output, given whether the destination is a terminal.
    #[must_use]
    pub const fn enabled(self, is_terminal: bool) -> bool {
        match self {
            Self::Always => true,
            Self::Never => false,
            Self::Auto => is_terminal,
        }
    }
}

/// Log level for diagnostic output
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    /// No logging output
    None,

    /// Only error messages
    Error,

    /// Warning and error messages
    Warn,

    /// Info, warning, and error messages
    Info,

    /// Debug, info, warning, and error messages
    Debug,

    /// Trace, debug, info, warning, and error messages
    Trace,
}

impl LogLevel {
    const fn filter(self) -> log::LevelFilter {
        match self {
            Self::None => log::LevelFilter::Off,
            Self::Error => log::LevelFilter::Error,
            Self::Warn => log::LevelFilter::Warn,
            Self::Info => log::LevelFilter::Info,
            Self::Debug => log::LevelFilter::Debug,
            Self::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Evaluate CEL expressions against YAML test objects, or benchmark them
#[derive(Parser, Debug)]
#[command(name = "cel-harness", version, long_about = None)]
pub struct HarnessArgs {
    /// YAML file holding zero or more test objects, one per document
    #[arg(value_name = "OBJECT_FILE")]
    pub object_file: Utf8PathBuf,

    /// Text file holding the expressions, separated by the delimiter
    #[arg(value_name = "EXPRESSION_FILE")]
    pub expression_file: Utf8PathBuf,

    /// YAML file whose first document is bound as `params`
    #[arg(value_name = "PARAMS_FILE")]
    pub params_file: Utf8PathBuf,

    /// Time every expression instead of printing per-object results
    #[arg(long)]
    pub benchmark: bool,

    /// Path to a TOML configuration file
    #[arg(long, short = 'c', value_name = "PATH")]
    pub config: Option<Utf8PathBuf>,

    /// Number of untimed passes before measuring
    #[arg(long, value_name = "N", help_heading = "Benchmark")]
    pub warmup: Option<u32>,

    /// Number of timed passes over all objects, per expression
    #[arg(long, value_name = "N", help_heading = "Benchmark")]
    pub iterations: Option<u64>,

    /// Show a progress bar on stderr between timed runs
    #[arg(long, help_heading = "Benchmark")]
    pub progress: bool,

    /// Text separating expressions in the expression file
    #[arg(long, value_name = "TEXT")]
    pub delimiter: Option<String>,

    /// Control when to use colored output
    #[arg(long, value_name = "WHEN", default_value = "auto")]
    pub color: ColorMode,

    /// Set the logging level for diagnostic output
    #[arg(long, value_name = "LEVEL", default_value = "none")]
    pub log_level: LogLevel,

    /// Also write the results to a JSON file
    #[arg(long, value_name = "PATH", help_heading = "Report Output")]
    pub json: Option<Utf8PathBuf>,
}

impl HarnessArgs {
    /// The configuration values given on the command line.
    #[must_use]
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            warmup_iterations: self.warmup,
            iterations: self.iterations,
            delimiter: self.delimiter.clone(),
        }
    }
}

/// Everything loaded from disk before either mode starts.
#[derive(Debug)]
pub struct Inputs {
    pub objects: Vec<Document>,
    pub expressions: ExpressionSet,
    pub params: Document,
}

/// Initialize the logger. Repeated calls leave the first logger in place.
pub fn init_logging(log_level: LogLevel) {
    if log_level == LogLevel::None {
        return;
    }

    let _ = env_logger::Builder::new()
        .filter_level(log_level.filter())
        .format_timestamp(None)
        .format_module_path(false)
        .format_target(matches!(log_level, LogLevel::Debug | LogLevel::Trace))
        .try_init();
}

/// Report a fatal error to the operator and ask the host to exit with status 1.
///
/// The returned error is what `run` hands back to its caller.
pub fn fail<H: Host>(host: &mut H, message: impl Display) -> ohno::AppError {
    let message = message.to_string();
    log::error!(target: LOG_TARGET, "{message}");
    let _ = writeln!(host.error(), "{message}");
    host.exit(1);
    app_err!("{message}")
}

/// Load the configuration and apply command-line overrides.
pub fn load_config<H: Host>(host: &mut H, args: &HarnessArgs) -> crate::Result<HarnessConfig> {
    HarnessConfig::load(args.config.as_deref())
        .and_then(|config| config.with_overrides(args.overrides()))
        .map_err(|e| fail(host, format_args!("Failed to load configuration: {e:#}")))
}

/// Read the object, expression and params files, in that order. The first failure is fatal.
pub fn load_inputs<H: Host>(host: &mut H, args: &HarnessArgs, config: &HarnessConfig) -> crate::Result<Inputs> {
    let objects = read_multi_document(&args.object_file).map_err(|e| fail(host, describe_load_failure("object", &args.object_file, &e)))?;

    let expressions = ExpressionSet::read(&args.expression_file, &config.delimiter)
        .map_err(|e| fail(host, format_args!("Failed to read expression file '{}': {e:#}", args.expression_file)))?;

    let params = read_single_document(&args.params_file).map_err(|e| fail(host, describe_load_failure("params", &args.params_file, &e)))?;

    log::info!(
        target: LOG_TARGET,
        "Loaded {} object(s) and {} expression(s), {} of them non-empty",
        objects.len(),
        expressions.len(),
        expressions.non_empty_count()
    );

    Ok(Inputs {
        objects,
        expressions,
        params,
    })
}

fn describe_load_failure(role: &str, path: &Utf8Path, error: &LoadError) -> String {
    match error {
        LoadError::Io(_) => format!("Failed to read {role} file '{path}': {error}"),
        LoadError::Parse(_) | LoadError::Shape(_) => format!("Failed to parse {role} file '{path}': {error}"),
    }
}

/// Write a report to a file, treating failure as fatal.
pub fn write_report_file<H: Host>(host: &mut H, path: &Utf8Path, contents: &str) -> crate::Result<()> {
    fs::write(path, contents).map_err(|e| fail(host, format_args!("Failed to write report file '{path}': {e}")))?;
    log::info!(target: LOG_TARGET, "Wrote report to '{path}'");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_mode() {
        assert!(ColorMode::Always.enabled(false));
        assert!(!ColorMode::Never.enabled(true));
        assert!(ColorMode::Auto.enabled(true));
        assert!(!ColorMode::Auto.enabled(false));
    }

    #[test]
    fn test_log_level_filters() {
        assert_eq!(LogLevel::None.filter(), log::LevelFilter::Off);
        assert_eq!(LogLevel::Warn.filter(), log::LevelFilter::Warn);
        assert_eq!(LogLevel::Trace.filter(), log::LevelFilter::Trace);
    }

    #[test]
    fn test_args_positionals_and_flags() {
        let args = HarnessArgs::try_parse_from(["cel-harness", "objects.yaml", "--benchmark", "exprs.txt", "params.yaml"]).unwrap();
        assert!(args.benchmark);
        assert_eq!(args.object_file, "objects.yaml");
        assert_eq!(args.expression_file, "exprs.txt");
        assert_eq!(args.params_file, "params.yaml");
        assert_eq!(args.color, ColorMode::Auto);
        assert_eq!(args.log_level, LogLevel::None);
        assert!(args.json.is_none());
    }

    #[test]
    fn test_args_overrides() {
        let args = HarnessArgs::try_parse_from([
            "cel-harness",
            "--iterations",
            "5",
            "--warmup=0",
            "--delimiter",
            "%%",
            "o.yaml",
            "e.txt",
            "p.yaml",
        ])
        .unwrap();

        let overrides = args.overrides();
        assert_eq!(overrides.iterations, Some(5));
        assert_eq!(overrides.warmup_iterations, Some(0));
        assert_eq!(overrides.delimiter.as_deref(), Some("%%"));
    }

    #[test]
    fn test_args_require_three_positionals() {
        let _ = HarnessArgs::try_parse_from(["cel-harness", "o.yaml", "e.txt"]).unwrap_err();
        let _ = HarnessArgs::try_parse_from(["cel-harness", "o.yaml", "e.txt", "p.yaml", "extra"]).unwrap_err();
    }

    #[test]
    fn test_describe_load_failure() {
        let path = Utf8Path::new("objects.yaml");
        let shape = LoadError::Shape("document 2 is not a mapping".to_string());
        let message = describe_load_failure("object", path, &shape);
        assert!(message.starts_with("Failed to parse object file 'objects.yaml': "));

        let io = LoadError::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        let message = describe_load_failure("params", path, &io);
        assert!(message.starts_with("Failed to read params file 'objects.yaml': "));
    }
}
