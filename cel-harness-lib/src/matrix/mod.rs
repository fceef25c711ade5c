//! Evaluation of every expression against every object
//!
//! The runner walks objects in load order and, for each object, every non-empty expression in
//! file order. Each cell compiles its expression on its own and is evaluated on its own: a
//! compilation or evaluation failure is recorded in that cell and the walk moves on.

use crate::documents::Document;
use crate::expr::{Activation, Environment, Expression, ExpressionSet, compile_each, type_name};
use cel_interpreter::Value;
use core::fmt::{Display, Formatter};

const LOG_TARGET: &str = "    matrix";

/// Why a cell produced no value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellFailure {
    Compilation(String),
    Evaluation(String),
}

impl Display for CellFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Compilation(msg) => write!(f, "Compilation failed: {msg}"),
            Self::Evaluation(msg) => write!(f, "Evaluation failed: {msg}"),
        }
    }
}

/// The outcome of one expression against one object.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell<'a> {
    /// Position of the object in the object file, starting at 1.
    pub object: usize,

    pub expression: &'a Expression,

    pub outcome: Result<Value, CellFailure>,
}

impl Cell<'_> {
    /// The CEL type name of the result, if there is one.
    #[must_use]
    pub fn type_name(&self) -> Option<&'static str> {
        self.outcome.as_ref().ok().map(type_name)
    }
}

/// Every cell of an evaluation run, ordered by object and then by expression.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationMatrix<'a> {
    pub object_count: usize,
    pub expression_count: usize,
    pub cells: Vec<Cell<'a>>,
}

impl<'a> EvaluationMatrix<'a> {
    /// The cells belonging to one object, in expression order.
    ///
    /// Every object owns `expression_count` consecutive cells, so this is a plain slice. Objects
    /// outside `1..=object_count` have no cells.
    #[must_use]
    pub fn row(&self, object: usize) -> &[Cell<'a>] {
        let Some(index) = object.checked_sub(1) else {
            return &[];
        };

        let start = index.saturating_mul(self.expression_count);
        let end = start.saturating_add(self.expression_count);
        self.cells.get(start..end).unwrap_or_default()
    }

    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.outcome.is_err()).count()
    }
}

/// Evaluate every non-empty expression against every object.
///
/// The result always holds exactly `objects × non-empty expressions` cells.
pub fn run_matrix<'a, E: Environment>(env: &E, objects: &[Document], params: &Document, set: &'a ExpressionSet) -> EvaluationMatrix<'a> {
    let expression_count = set.non_empty_count();
    log::info!(
        target: LOG_TARGET,
        "Evaluating {expression_count} expression(s) against {} object(s)",
        objects.len()
    );

    let mut cells = Vec::with_capacity(objects.len() * expression_count);

    for (index, object) in objects.iter().enumerate() {
        let activation = Activation::new(object, params);

        for (expression, program) in compile_each(env, set) {
            let outcome = match program {
                Ok(program) => env
                    .evaluate(&program, &activation)
                    .map_err(|e| CellFailure::Evaluation(e.message())),
                Err(e) => Err(CellFailure::Compilation(e.message())),
            };

            if let Err(failure) = &outcome {
                log::debug!(target: LOG_TARGET, "Object {} / expression {}: {failure}", index + 1, expression.ordinal());
            }

            cells.push(Cell {
                object: index + 1,
                expression,
                outcome,
            });
        }
    }

    EvaluationMatrix {
        object_count: objects.len(),
        expression_count,
        cells,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::documents::{load_multi_document, load_single_document};
    use crate::expr::{CelEnvironment, DEFAULT_DELIMITER};
    use std::sync::Arc;

    fn objects(text: &str) -> Vec<Document> {
        load_multi_document(text.as_bytes()).unwrap()
    }

    #[test]
    fn test_two_objects_one_expression() {
        let env = CelEnvironment::for_harness(false);
        let objects = objects("a: 1\n---\na: 2\n");
        let params = load_single_document(b"{}").unwrap();
        let set = ExpressionSet::parse("object.a > 1", DEFAULT_DELIMITER);

        let matrix = run_matrix(&env, &objects, &params, &set);
        assert_eq!(matrix.cells.len(), 2);
        assert_eq!(matrix.cells[0].object, 1);
        assert_eq!(matrix.cells[0].outcome, Ok(Value::Bool(false)));
        assert_eq!(matrix.cells[1].object, 2);
        assert_eq!(matrix.cells[1].outcome, Ok(Value::Bool(true)));
        assert_eq!(matrix.cells[1].type_name(), Some("bool"));
    }

    #[test]
    fn test_cell_count_is_objects_times_expressions() {
        let env = CelEnvironment::for_harness(false);
        let objects = objects("a: 1\n---\na: 2\n---\na: 3\n");
        let set = ExpressionSet::parse("object.a\n---\n\n---\nobject.a * 2\n---\nobject.a == 3", DEFAULT_DELIMITER);

        let matrix = run_matrix(&env, &objects, &Document::empty(), &set);
        assert_eq!(matrix.object_count, 3);
        assert_eq!(matrix.expression_count, 3);
        assert_eq!(matrix.cells.len(), 9);

        let order: Vec<_> = matrix.cells.iter().map(|cell| (cell.object, cell.expression.ordinal())).collect();
        assert_eq!(
            order,
            vec![(1, 1), (1, 3), (1, 4), (2, 1), (2, 3), (2, 4), (3, 1), (3, 3), (3, 4)]
        );
    }

    #[test]
    fn test_failures_are_isolated_per_cell() {
        let env = CelEnvironment::for_harness(false);
        let objects = objects("a: 1\n---\nb: 2\n");
        let set = ExpressionSet::parse("(object.a\n---\nobject.a == 1\n---\nsize(object) == 1", DEFAULT_DELIMITER);

        let matrix = run_matrix(&env, &objects, &Document::empty(), &set);
        assert_eq!(matrix.cells.len(), 6);

        let first = matrix.row(1);
        assert!(matches!(first[0].outcome, Err(CellFailure::Compilation(_))));
        assert_eq!(first[1].outcome, Ok(Value::Bool(true)));
        assert_eq!(first[2].outcome, Ok(Value::Bool(true)));

        let second = matrix.row(2);
        assert!(matches!(second[0].outcome, Err(CellFailure::Compilation(_))));
        assert!(matches!(second[1].outcome, Err(CellFailure::Evaluation(_))));
        assert_eq!(second[2].outcome, Ok(Value::Bool(true)));

        assert_eq!(matrix.failure_count(), 3);
        assert_eq!(first[1].type_name(), Some("bool"));
        assert_eq!(second[1].type_name(), None);
    }

    #[test]
    fn test_malformed_expressions_fail_only_their_cells() {
        let env = CelEnvironment::for_harness(false);
        let objects = objects("a: 1\n---\na: 2\n");
        let set = ExpressionSet::parse("object.a >\n---\n(\n---\nobject.a + 1", DEFAULT_DELIMITER);

        let matrix = run_matrix(&env, &objects, &Document::empty(), &set);
        assert_eq!(matrix.cells.len(), 6);
        assert_eq!(matrix.failure_count(), 4);

        for object in 1..=2 {
            let row = matrix.row(object);
            assert!(matches!(row[0].outcome, Err(CellFailure::Compilation(_))), "{:?}", row[0].outcome);
            assert!(matches!(row[1].outcome, Err(CellFailure::Compilation(_))), "{:?}", row[1].outcome);
        }

        assert_eq!(matrix.row(1)[2].outcome, Ok(Value::Int(2)));
        assert_eq!(matrix.row(2)[2].outcome, Ok(Value::Int(3)));
    }

    #[test]
    fn test_failure_messages_are_bare() {
        let env = CelEnvironment::for_harness(false);
        let objects = objects("a: 1\n");
        let set = ExpressionSet::parse("(object.a\n---\nobject.missing", DEFAULT_DELIMITER);

        let matrix = run_matrix(&env, &objects, &Document::empty(), &set);
        let expected_compile = env.compile("(object.a").unwrap_err().message();

        let Err(CellFailure::Compilation(compile_message)) = &matrix.cells[0].outcome else {
            panic!("expected a compilation failure, got {:?}", matrix.cells[0].outcome);
        };
        assert_eq!(compile_message, &expected_compile);

        let Err(CellFailure::Evaluation(eval_message)) = &matrix.cells[1].outcome else {
            panic!("expected an evaluation failure, got {:?}", matrix.cells[1].outcome);
        };
        for message in [compile_message, eval_message] {
            assert!(!message.contains('\n'), "message spans lines: {message}");
            assert!(!message.contains("Backtrace"), "message carries a backtrace: {message}");
        }
    }

    /// The environment only needs to outlive the call; cells borrow from the expression set alone.
    fn evaluate_with_scoped_environment<'a>(objects: &[Document], set: &'a ExpressionSet) -> EvaluationMatrix<'a> {
        let env = CelEnvironment::for_harness(true);
        run_matrix(&env, objects, &Document::empty(), set)
    }

    #[test]
    fn test_matrix_outlives_environment() {
        let objects = objects("name: tokio\n");
        let set = ExpressionSet::parse("object.name.upperAscii()", DEFAULT_DELIMITER);

        let matrix = evaluate_with_scoped_environment(&objects, &set);
        assert_eq!(matrix.cells[0].expression.source(), "object.name.upperAscii()");
        assert_eq!(matrix.cells[0].outcome, Ok(Value::String(Arc::new("TOKIO".to_string()))));
    }

    #[test]
    fn test_rows_are_consecutive_slices() {
        let env = CelEnvironment::for_harness(false);
        let objects = objects("a: 1\n---\na: 2\n---\na: 3\n");
        let set = ExpressionSet::parse("object.a\n---\nobject.a * 10", DEFAULT_DELIMITER);

        let matrix = run_matrix(&env, &objects, &Document::empty(), &set);
        for object in 1..=3 {
            let row = matrix.row(object);
            assert_eq!(row.len(), 2);
            assert!(row.iter().all(|cell| cell.object == object));
        }

        let values: Vec<_> = matrix.row(3).iter().map(|cell| cell.outcome.clone()).collect();
        assert_eq!(values, vec![Ok(Value::Int(3)), Ok(Value::Int(30))]);

        assert!(matrix.row(0).is_empty());
        assert!(matrix.row(4).is_empty());
    }

    #[test]
    fn test_no_objects_means_no_cells() {
        let env = CelEnvironment::for_harness(false);
        let set = ExpressionSet::parse("true", DEFAULT_DELIMITER);
        let matrix = run_matrix(&env, &[], &Document::empty(), &set);
        assert!(matrix.cells.is_empty());
        assert_eq!(matrix.expression_count, 1);
    }

    #[test]
    fn test_params_are_visible() {
        let env = CelEnvironment::for_harness(false);
        let objects = objects("a: 5\n");
        let params = load_single_document(b"limit: 4\n").unwrap();
        let set = ExpressionSet::parse("object.a > params.limit", DEFAULT_DELIMITER);

        let matrix = run_matrix(&env, &objects, &params, &set);
        assert_eq!(matrix.cells[0].outcome, Ok(Value::Bool(true)));
    }

    #[test]
    fn test_failure_display() {
        assert_eq!(CellFailure::Compilation("bad".to_string()).to_string(), "Compilation failed: bad");
        assert_eq!(CellFailure::Evaluation("boom".to_string()).to_string(), "Evaluation failed: boom");
    }
}
