use super::{BenchmarkReport, ExpressionReport, ExpressionStats, Phase, Progress};
use crate::documents::Document;
use crate::expr::{Activation, CompiledExpression, Environment};
use core::fmt::{Display, Formatter};
use core::hint::black_box;
use std::time::Instant;

const LOG_TARGET: &str = " benchmark";

/// How much work a benchmark run does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BenchmarkSettings {
    /// Untimed passes over every (object, expression) pair before measuring.
    pub warmup_iterations: u32,

    /// Timed passes over every object, per expression.
    pub iterations: u64,
}

impl BenchmarkSettings {
    pub const DEFAULT_WARMUP_ITERATIONS: u32 = 10;
    pub const DEFAULT_ITERATIONS: u64 = 1 << 20;
}

impl Default for BenchmarkSettings {
    fn default() -> Self {
        Self {
            warmup_iterations: Self::DEFAULT_WARMUP_ITERATIONS,
            iterations: Self::DEFAULT_ITERATIONS,
        }
    }
}

/// A failure that ends a benchmark run without a report.
#[derive(Debug)]
pub enum BenchmarkError {
    /// An evaluation failed during the timed phase.
    Evaluation {
        /// Position among the compiled expressions, starting at 1.
        position: usize,

        /// Position in the raw expression file, starting at 1.
        ordinal: usize,

        /// Object position, starting at 1.
        object: usize,

        /// Timed iteration, starting at 1.
        iteration: u64,

        source: ohno::AppError,
    },
}

impl Display for BenchmarkError {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Evaluation {
                ordinal,
                object,
                iteration,
                source,
                ..
            } => write!(
                f,
                "expression {ordinal} failed on object {object} during iteration {iteration}: {}",
                source.message()
            ),
        }
    }
}

/// Measure how long each compiled expression takes to evaluate.
///
/// Every (object, expression) pair is first evaluated `warmup_iterations` times with errors ignored.
/// Each expression is then timed on its own over `iterations` passes through all objects, one
/// expression after the other. The first evaluation error in the timed phase ends the run.
///
/// # Errors
///
/// Returns [`BenchmarkError::Evaluation`] for the first evaluation that fails while timing.
pub fn run_benchmark<E: Environment>(
    env: &E,
    compiled: &[CompiledExpression<'_, E::Program>],
    objects: &[Document],
    params: &Document,
    settings: BenchmarkSettings,
    progress: &mut impl Progress,
) -> Result<BenchmarkReport, BenchmarkError> {
    let activations: Vec<_> = objects.iter().map(|object| Activation::new(object, params)).collect();

    progress.enter_phase(Phase::WarmUp);
    log::info!(
        target: LOG_TARGET,
        "Warming up with {} pass(es) over {} object(s) and {} expression(s)",
        settings.warmup_iterations,
        activations.len(),
        compiled.len()
    );
    warm_up(env, compiled, &activations, settings.warmup_iterations);

    progress.enter_phase(Phase::Measure);
    let per_pass = u64::try_from(activations.len()).unwrap_or(u64::MAX);
    let evaluations = settings.iterations.saturating_mul(per_pass);

    let mut expressions = Vec::with_capacity(compiled.len());
    let start = Instant::now();

    for (index, entry) in compiled.iter().enumerate() {
        let position = index + 1;
        progress.start_expression(position, compiled.len(), entry.expression());

        let elapsed = {
            let expression_start = Instant::now();
            for iteration in 0..settings.iterations {
                for (object_index, activation) in activations.iter().enumerate() {
                    match env.evaluate(entry.program(), activation) {
                        Ok(value) => {
                            let _ = black_box(value);
                        }
                        Err(source) => {
                            progress.finish();
                            return Err(BenchmarkError::Evaluation {
                                position,
                                ordinal: entry.expression().ordinal(),
                                object: object_index + 1,
                                iteration: iteration + 1,
                                source,
                            });
                        }
                    }
                }
            }
            expression_start.elapsed()
        };

        let mut stats = ExpressionStats::default();
        stats.record(evaluations, elapsed);

        log::debug!(
            target: LOG_TARGET,
            "Expression {position} ran {} evaluation(s) in {elapsed:?}",
            stats.evaluations()
        );

        expressions.push(ExpressionReport {
            position,
            expression: entry.expression().clone(),
            stats,
        });
    }

    let total_duration = start.elapsed();
    progress.enter_phase(Phase::Report);
    progress.finish();

    Ok(BenchmarkReport {
        object_count: activations.len(),
        iterations: settings.iterations,
        expressions,
        total_duration,
    })
}

fn warm_up<E: Environment>(env: &E, compiled: &[CompiledExpression<'_, E::Program>], activations: &[Activation<'_>], passes: u32) {
    for _ in 0..passes {
        for activation in activations {
            for entry in compiled {
                let _ = black_box(env.evaluate(entry.program(), activation));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Result;
    use crate::bench::NoProgress;
    use crate::documents::load_multi_document;
    use crate::expr::{CelEnvironment, DEFAULT_DELIMITER, ExpressionSet, VariableKind, compile_all};
    use cel_interpreter::Value;
    use core::cell::Cell;
    use ohno::app_err;

    /// Programs are their own source text. `fail@N` fails on every object whose `id` is N,
    /// anything else succeeds. The first `failures` evaluations fail regardless.
    #[derive(Debug, Default)]
    struct ScriptedEnv {
        failures: Cell<u64>,
        calls: Cell<u64>,
    }

    impl Environment for ScriptedEnv {
        type Program = String;

        fn declare(&mut self, _name: &str, _kind: VariableKind) {}

        fn compile(&self, source: &str) -> Result<String> {
            Ok(source.to_string())
        }

        fn evaluate(&self, program: &String, activation: &Activation<'_>) -> Result<Value> {
            self.calls.set(self.calls.get() + 1);

            if self.failures.get() > 0 {
                self.failures.set(self.failures.get() - 1);
                return Err(app_err!("not warm yet"));
            }

            if let Some(id) = program.strip_prefix("fail@")
                && activation.object.get("id") == Some(&Value::Int(id.parse().unwrap()))
            {
                return Err(app_err!("boom"));
            }

            Ok(Value::Bool(true))
        }
    }

    fn objects(count: usize) -> Vec<Document> {
        let text: Vec<_> = (1..=count).map(|id| format!("id: {id}")).collect();
        load_multi_document(text.join("\n---\n").as_bytes()).unwrap()
    }

    fn settings(warmup_iterations: u32, iterations: u64) -> BenchmarkSettings {
        BenchmarkSettings {
            warmup_iterations,
            iterations,
        }
    }

    #[test]
    fn test_default_settings() {
        let settings = BenchmarkSettings::default();
        assert_eq!(settings.warmup_iterations, 10);
        assert_eq!(settings.iterations, 1_048_576);
    }

    #[test]
    fn test_counts_iterations_times_objects() {
        let env = ScriptedEnv::default();
        let set = ExpressionSet::parse("first\n---\n\n---\nsecond", DEFAULT_DELIMITER);
        let compiled = compile_all(&env, &set).unwrap();
        let objects = objects(3);

        let report = run_benchmark(&env, &compiled, &objects, &Document::empty(), settings(2, 5), &mut NoProgress).unwrap();

        assert_eq!(report.object_count, 3);
        assert_eq!(report.iterations, 5);
        assert_eq!(report.expressions.len(), 2);
        assert_eq!(report.expressions[0].position, 1);
        assert_eq!(report.expressions[1].position, 2);
        assert_eq!(report.expressions[1].expression.ordinal(), 3);
        assert_eq!(report.expressions[1].expression.source(), "second");
        assert!(report.expressions.iter().all(|e| e.stats.evaluations() == 15));
        assert_eq!(report.total_evaluations(), 30);

        // warm-up: 2 passes × 3 objects × 2 expressions, then 2 × 15 timed
        assert_eq!(env.calls.get(), 12 + 30);
    }

    #[test]
    fn test_warmup_errors_are_ignored() {
        let env = ScriptedEnv {
            failures: Cell::new(6),
            ..ScriptedEnv::default()
        };
        let set = ExpressionSet::parse("ok", DEFAULT_DELIMITER);
        let compiled = compile_all(&env, &set).unwrap();
        let objects = objects(3);

        let report = run_benchmark(&env, &compiled, &objects, &Document::empty(), settings(2, 4), &mut NoProgress).unwrap();
        assert_eq!(report.expressions[0].stats.evaluations(), 12);
    }

    #[test]
    fn test_timed_error_aborts_the_run() {
        let env = ScriptedEnv::default();
        let set = ExpressionSet::parse("fine\n---\nfail@2\n---\nnever", DEFAULT_DELIMITER);
        let compiled = compile_all(&env, &set).unwrap();
        let objects = objects(3);

        let err = run_benchmark(&env, &compiled, &objects, &Document::empty(), settings(1, 3), &mut NoProgress).unwrap_err();
        let BenchmarkError::Evaluation {
            position,
            ordinal,
            object,
            iteration,
            ..
        } = &err;
        assert_eq!((*position, *ordinal, *object, *iteration), (2, 2, 2, 1));
        assert!(err.to_string().starts_with("expression 2 failed on object 2 during iteration 1"));

        // warm-up: 1 × 3 × 3, first expression: 3 × 3, second: objects 1 and 2
        assert_eq!(env.calls.get(), 9 + 9 + 2);
    }

    #[test]
    fn test_zero_objects_records_nothing() {
        let env = ScriptedEnv::default();
        let set = ExpressionSet::parse("a\n---\nb", DEFAULT_DELIMITER);
        let compiled = compile_all(&env, &set).unwrap();

        let report = run_benchmark(&env, &compiled, &[], &Document::empty(), settings(10, 100), &mut NoProgress).unwrap();
        assert_eq!(report.total_evaluations(), 0);
        assert!(report.expressions.iter().all(|e| e.stats.duration().is_zero()));
        assert_eq!(env.calls.get(), 0);
    }

    #[test]
    fn test_zero_iterations_records_nothing() {
        let env = ScriptedEnv::default();
        let set = ExpressionSet::parse("a", DEFAULT_DELIMITER);
        let compiled = compile_all(&env, &set).unwrap();

        let report = run_benchmark(&env, &compiled, &objects(2), &Document::empty(), settings(0, 0), &mut NoProgress).unwrap();
        assert_eq!(report.total_evaluations(), 0);
        assert!(report.overall_rate().abs() < f64::EPSILON);
    }

    #[test]
    #[cfg_attr(miri, ignore = "Miri is slow")]
    fn test_with_cel_environment() {
        let env = CelEnvironment::for_harness(false);
        let set = ExpressionSet::parse("object.a > 1\n---\nobject.a + params.b", DEFAULT_DELIMITER);
        let compiled = compile_all(&env, &set).unwrap();
        let objects = load_multi_document(b"a: 1\n---\na: 2\n").unwrap();
        let params = crate::documents::load_single_document(b"b: 3\n").unwrap();

        let report = run_benchmark(&env, &compiled, &objects, &params, settings(1, 10), &mut NoProgress).unwrap();
        assert_eq!(report.total_evaluations(), 40);
    }

    #[test]
    #[cfg_attr(miri, ignore = "Miri is slow")]
    fn test_cel_missing_key_aborts() {
        let env = CelEnvironment::for_harness(false);
        let set = ExpressionSet::parse("object.a == 1", DEFAULT_DELIMITER);
        let compiled = compile_all(&env, &set).unwrap();
        let objects = load_multi_document(b"a: 1\n---\nb: 2\n").unwrap();

        let err = run_benchmark(&env, &compiled, &objects, &Document::empty(), settings(1, 10), &mut NoProgress).unwrap_err();
        let BenchmarkError::Evaluation { object, iteration, .. } = err;
        assert_eq!((object, iteration), (2, 1));
    }
}
