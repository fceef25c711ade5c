use crate::expr::Expression;
use core::time::Duration;
use serde::Serialize;

/// Evaluation count and cumulative time for one compiled expression.
///
/// A zero count always comes with a zero duration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExpressionStats {
    evaluations: u64,
    duration: Duration,
}

impl ExpressionStats {
    /// Add a batch of evaluations and the time they took. An empty batch records nothing.
    pub fn record(&mut self, evaluations: u64, elapsed: Duration) {
        if evaluations == 0 {
            return;
        }

        self.evaluations = self.evaluations.saturating_add(evaluations);
        self.duration = self.duration.saturating_add(elapsed);
    }

    #[must_use]
    pub const fn evaluations(&self) -> u64 {
        self.evaluations
    }

    #[must_use]
    pub const fn duration(&self) -> Duration {
        self.duration
    }

    /// Mean time per evaluation, or zero when nothing was evaluated.
    #[must_use]
    pub fn average(&self) -> Duration {
        if self.evaluations == 0 {
            return Duration::ZERO;
        }

        let nanos = self.duration.as_nanos() / u128::from(self.evaluations);
        Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX))
    }

    /// Evaluations per second measured against `clock` rather than this expression's own time.
    ///
    /// The benchmark report normalises every expression against the whole run, so these rates
    /// only compare expressions with each other.
    #[must_use]
    pub fn rate_against(&self, clock: Duration) -> f64 {
        rate(self.evaluations, clock)
    }

    /// Evaluations per second measured against this expression's own time.
    #[must_use]
    pub fn isolated_rate(&self) -> f64 {
        rate(self.evaluations, self.duration)
    }
}

#[expect(clippy::cast_precision_loss, reason = "rates are reported rounded to whole evaluations")]
fn rate(evaluations: u64, clock: Duration) -> f64 {
    let seconds = clock.as_secs_f64();
    if evaluations == 0 || seconds <= 0.0 {
        return 0.0;
    }

    evaluations as f64 / seconds
}

/// Timing results for one compiled expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpressionReport {
    /// Position among the compiled expressions, starting at 1.
    pub position: usize,

    pub expression: Expression,
    pub stats: ExpressionStats,
}

/// Results of a full benchmark run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BenchmarkReport {
    pub object_count: usize,
    pub iterations: u64,
    pub expressions: Vec<ExpressionReport>,

    /// Wall-clock time of the whole timed phase, across all expressions.
    pub total_duration: Duration,
}

impl BenchmarkReport {
    #[must_use]
    pub fn total_evaluations(&self) -> u64 {
        self.expressions
            .iter()
            .fold(0_u64, |total, report| total.saturating_add(report.stats.evaluations()))
    }

    #[must_use]
    pub fn overall_rate(&self) -> f64 {
        rate(self.total_evaluations(), self.total_duration)
    }

    /// The aggregate figures as a serializable summary.
    #[must_use]
    pub fn summary(&self) -> Summary {
        Summary {
            total_duration_ns: u64::try_from(self.total_duration.as_nanos()).unwrap_or(u64::MAX),
            total_evaluations: self.total_evaluations(),
            evaluations_per_second: self.overall_rate(),
        }
    }
}

/// Aggregate benchmark figures.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Summary {
    pub total_duration_ns: u64,
    pub total_evaluations: u64,
    pub evaluations_per_second: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_stats_are_zero() {
        let stats = ExpressionStats::default();
        assert_eq!(stats.evaluations(), 0);
        assert_eq!(stats.duration(), Duration::ZERO);
        assert_eq!(stats.average(), Duration::ZERO);
        assert!(stats.isolated_rate().abs() < f64::EPSILON);
        assert!(stats.rate_against(Duration::from_secs(1)).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_batch_keeps_duration_zero() {
        let mut stats = ExpressionStats::default();
        stats.record(0, Duration::from_millis(5));
        assert_eq!(stats, ExpressionStats::default());
    }

    #[test]
    fn test_average_and_rates() {
        let mut stats = ExpressionStats::default();
        stats.record(1000, Duration::from_millis(1));
        stats.record(1000, Duration::from_millis(1));

        assert_eq!(stats.evaluations(), 2000);
        assert_eq!(stats.duration(), Duration::from_millis(2));
        assert_eq!(stats.average(), Duration::from_nanos(1000));
        assert!((stats.isolated_rate() - 1_000_000.0).abs() < 1e-6);
        assert!((stats.rate_against(Duration::from_secs(4)) - 500.0).abs() < 1e-9);
    }

    #[test]
    fn test_rate_against_zero_clock() {
        let mut stats = ExpressionStats::default();
        stats.record(10, Duration::from_millis(1));
        assert!(stats.rate_against(Duration::ZERO).abs() < f64::EPSILON);
    }

    fn report(position: usize, evaluations: u64, millis: u64) -> ExpressionReport {
        let mut stats = ExpressionStats::default();
        stats.record(evaluations, Duration::from_millis(millis));
        ExpressionReport {
            position,
            expression: Expression::new(position, format!("e{position}")),
            stats,
        }
    }

    #[test]
    fn test_report_aggregates() {
        let report = BenchmarkReport {
            object_count: 2,
            iterations: 100,
            expressions: vec![report(1, 200, 300), report(2, 200, 700)],
            total_duration: Duration::from_secs(1),
        };

        assert_eq!(report.total_evaluations(), 400);
        assert!((report.overall_rate() - 400.0).abs() < 1e-9);

        let summary = report.summary();
        assert_eq!(summary.total_evaluations, 400);
        assert_eq!(summary.total_duration_ns, 1_000_000_000);
    }

    #[test]
    fn test_empty_report() {
        let report = BenchmarkReport {
            object_count: 0,
            iterations: 10,
            expressions: Vec::new(),
            total_duration: Duration::ZERO,
        };
        assert_eq!(report.total_evaluations(), 0);
        assert!(report.overall_rate().abs() < f64::EPSILON);
    }
}
