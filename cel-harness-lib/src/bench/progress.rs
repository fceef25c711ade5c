use crate::expr::Expression;
use strum::Display;

/// The stages of a benchmark run, in the order they happen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Phase {
    #[strum(to_string = "Warming up")]
    WarmUp,

    #[strum(to_string = "Measuring")]
    Measure,

    #[strum(to_string = "Reporting")]
    Report,
}

/// Receives notifications as a benchmark advances.
///
/// Notifications are only sent between timed runs, never from inside one.
pub trait Progress {
    fn enter_phase(&mut self, phase: Phase);

    /// Called before the timed run of the expression at `position` (1-based) out of `total`.
    fn start_expression(&mut self, position: usize, total: usize, expression: &Expression);

    fn finish(&mut self);
}

/// A [`Progress`] that ignores every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl Progress for NoProgress {
    fn enter_phase(&mut self, _phase: Phase) {}

    fn start_expression(&mut self, _position: usize, _total: usize, _expression: &Expression) {}

    fn finish(&mut self) {}
}
