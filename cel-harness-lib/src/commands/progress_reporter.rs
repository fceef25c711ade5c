use super::Host;
use crate::bench::{Phase, Progress};
use crate::expr::Expression;
use core::fmt::{Debug, Formatter};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::io::Write;

const TEMPLATE: &str = "{prefix:>12.bold.cyan} [{bar:25}] {pos}/{len} {msg}";
const TEMPLATE_NO_COLOR: &str = "{prefix:>12} [{bar:25}] {pos}/{len} {msg}";

/// Characters of an expression shown next to the bar.
const MESSAGE_CHARS: usize = 40;

/// Announces benchmark phases on the host's output and, when enabled, drives a progress bar on stderr.
///
/// The bar only moves between timed runs, so drawing it never lands inside a measurement.
pub struct ProgressReporter<'h, H: Host> {
    host: &'h mut H,
    bar: Option<ProgressBar>,
}

impl<'h, H: Host> ProgressReporter<'h, H> {
    /// Create a new progress reporter.
    ///
    /// When `show_bar` is false only the phase announcements are written.
    /// When `use_colors` is false, progress bar chrome is rendered without ANSI styling.
    #[must_use]
    pub fn new(host: &'h mut H, show_bar: bool, use_colors: bool) -> Self {
        let bar = show_bar.then(|| {
            let bar = ProgressBar::with_draw_target(Some(0), ProgressDrawTarget::stderr());
            let template = if use_colors { TEMPLATE } else { TEMPLATE_NO_COLOR };
            let style = ProgressStyle::default_bar()
                .template(template)
                .map_or_else(|_| ProgressStyle::default_bar(), |style| style.progress_chars("=> "));
            bar.set_style(style);
            bar
        });

        Self { host, bar }
    }

    fn announce(&mut self, line: &str) {
        let host = &mut *self.host;
        let mut write = || {
            let _ = writeln!(host.output(), "{line}");
        };

        match &self.bar {
            Some(bar) => bar.suspend(write),
            None => write(),
        }
    }
}

impl<H: Host> Progress for ProgressReporter<'_, H> {
    fn enter_phase(&mut self, phase: Phase) {
        if let Some(bar) = &self.bar {
            bar.set_prefix(phase.to_string());
        }

        match phase {
            Phase::WarmUp => self.announce("Warming up..."),
            Phase::Measure => self.announce("Running benchmark..."),
            Phase::Report => {}
        }
    }

    fn start_expression(&mut self, position: usize, total: usize, expression: &Expression) {
        if let Some(bar) = &self.bar {
            bar.set_length(u64::try_from(total).unwrap_or(u64::MAX));
            bar.set_position(u64::try_from(position.saturating_sub(1)).unwrap_or(u64::MAX));
            bar.set_message(expression.preview(MESSAGE_CHARS));
        }
    }

    /// Finish and clear the progress indicator.
    fn finish(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }
}

impl<H: Host> Debug for ProgressReporter<'_, H> {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ProgressReporter")
            .field("host", &"<host>")
            .field("bar", &self.bar)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::host::TestHost;

    #[test]
    fn test_phases_are_announced() {
        let mut host = TestHost::new();
        {
            let mut reporter = ProgressReporter::new(&mut host, false, false);
            reporter.enter_phase(Phase::WarmUp);
            reporter.start_expression(1, 2, &Expression::new(1, "true".to_string()));
            reporter.enter_phase(Phase::Measure);
            reporter.enter_phase(Phase::Report);
            reporter.finish();
        }

        assert_eq!(host.stdout(), "Warming up...\nRunning benchmark...\n");
    }

    #[test]
    fn test_bar_is_cleared_on_finish() {
        let mut host = TestHost::new();
        let mut reporter = ProgressReporter::new(&mut host, true, false);
        reporter.enter_phase(Phase::Measure);
        reporter.start_expression(2, 3, &Expression::new(4, "object.a > 1".to_string()));
        reporter.finish();
        assert!(reporter.bar.is_none());
    }
}
