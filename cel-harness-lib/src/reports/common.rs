//! Formatting shared by the report generators

use core::time::Duration;
use owo_colors::OwoColorize;

/// How a line of console output should stand out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Emphasis {
    Heading,
    Success,
    Failure,
}

/// Apply an emphasis when colours are enabled, otherwise return the text unchanged.
pub fn emphasize(text: &str, emphasis: Emphasis, use_colors: bool) -> String {
    if !use_colors {
        return text.to_string();
    }

    match emphasis {
        Emphasis::Heading => text.bold().cyan().to_string(),
        Emphasis::Success => text.green().to_string(),
        Emphasis::Failure => text.red().to_string(),
    }
}

/// Durations are shown the way `Debug` prints them, e.g. `1.5ms` or `312ns`.
pub fn format_duration(duration: Duration) -> String {
    format!("{duration:?}")
}

/// Rates are shown as whole evaluations per second.
pub fn format_rate(rate: f64) -> String {
    format!("{rate:.0}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_untouched() {
        assert_eq!(emphasize("Object 1", Emphasis::Heading, false), "Object 1");
        assert_eq!(emphasize("boom", Emphasis::Failure, false), "boom");
    }

    #[test]
    fn test_colors_add_escape_codes() {
        let colored = emphasize("ok", Emphasis::Success, true);
        assert!(colored.contains("\u{1b}["));
        assert!(colored.contains("ok"));
    }

    #[test]
    fn test_durations() {
        assert_eq!(format_duration(Duration::from_millis(1500)), "1.5s");
        assert_eq!(format_duration(Duration::from_nanos(312)), "312ns");
        assert_eq!(format_duration(Duration::ZERO), "0ns");
    }

    #[test]
    fn test_rates() {
        assert_eq!(format_rate(1234.4), "1234");
        assert_eq!(format_rate(0.0), "0");
    }
}
