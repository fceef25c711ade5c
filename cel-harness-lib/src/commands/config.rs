use crate::Result;
use crate::bench::BenchmarkSettings;
use crate::expr::DEFAULT_DELIMITER;
use camino::Utf8Path;
use ohno::{IntoAppError, app_err};
use serde::{Deserialize, Serialize};
use std::fs;

/// The default configuration TOML content, embedded from `default_config.toml`
pub const DEFAULT_CONFIG_TOML: &str = include_str!("../../default_config.toml");

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields, default)]
pub struct HarnessConfig {
    /// Untimed passes over every (object, expression) pair before a benchmark measures anything
    pub warmup_iterations: u32,

    /// Timed passes over all objects, per expression
    pub iterations: u64,

    /// Text separating expressions in the expression file
    pub delimiter: String,

    /// Whether `lowerAscii`, `upperAscii`, `trim`, `replace` and `indexOf` are available to expressions
    pub string_extensions: bool,

    /// How many characters of each expression the benchmark report shows
    pub preview_chars: usize,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            warmup_iterations: BenchmarkSettings::DEFAULT_WARMUP_ITERATIONS,
            iterations: BenchmarkSettings::DEFAULT_ITERATIONS,
            delimiter: DEFAULT_DELIMITER.to_string(),
            string_extensions: true,
            preview_chars: 50,
        }
    }
}

/// Values given on the command line, which take precedence over the configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub warmup_iterations: Option<u32>,
    pub iterations: Option<u64>,
    pub delimiter: Option<String>,
}

impl HarnessConfig {
    /// Load configuration from a file, or the embedded defaults when no file is given
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or holds invalid values
    pub fn load(config_path: Option<&Utf8Path>) -> Result<Self> {
        let Some(path) = config_path else {
            return Self::parse(DEFAULT_CONFIG_TOML, "built-in defaults");
        };

        let text = fs::read_to_string(path).into_app_err_with(|| format!("reading configuration file '{path}'"))?;
        Self::parse(&text, path.as_str())
    }

    fn parse(text: &str, origin: &str) -> Result<Self> {
        let config: Self = toml::from_str(text).into_app_err_with(|| format!("parsing configuration from {origin}"))?;
        config.validate()?;
        Ok(config)
    }

    /// Apply command-line overrides and check the result again
    ///
    /// # Errors
    ///
    /// Returns an error if an override makes the configuration invalid
    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Result<Self> {
        if let Some(warmup_iterations) = overrides.warmup_iterations {
            self.warmup_iterations = warmup_iterations;
        }

        if let Some(iterations) = overrides.iterations {
            self.iterations = iterations;
        }

        if let Some(delimiter) = overrides.delimiter {
            self.delimiter = delimiter;
        }

        self.validate()?;
        Ok(self)
    }

    /// The benchmark sizing this configuration describes.
    #[must_use]
    pub const fn benchmark_settings(&self) -> BenchmarkSettings {
        BenchmarkSettings {
            warmup_iterations: self.warmup_iterations,
            iterations: self.iterations,
        }
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns an error if a value is out of range
    fn validate(&self) -> Result<()> {
        if self.iterations == 0 {
            return Err(app_err!("iterations must be at least 1"));
        }

        if self.delimiter.trim().is_empty() {
            return Err(app_err!("delimiter must contain at least one non-whitespace character"));
        }

        if self.preview_chars == 0 {
            return Err(app_err!("preview_chars must be at least 1"));
        }

        Ok(())
    }
}
