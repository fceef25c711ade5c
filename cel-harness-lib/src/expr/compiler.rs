//! Turning an expression set into programs

use super::{Environment, Expression, ExpressionSet};
use crate::Result;
use core::fmt::{Debug, Display, Formatter};

const LOG_TARGET: &str = "  compiler";

/// A compiled expression together with the source it came from.
pub struct CompiledExpression<'a, P> {
    expression: &'a Expression,
    program: P,
}

impl<'a, P> CompiledExpression<'a, P> {
    #[must_use]
    pub const fn expression(&self) -> &'a Expression {
        self.expression
    }

    #[must_use]
    pub const fn program(&self) -> &P {
        &self.program
    }
}

impl<P> Debug for CompiledExpression<'_, P> {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CompiledExpression")
            .field("expression", &self.expression)
            .field("program", &"<program>")
            .finish()
    }
}

/// The first expression of a batch that failed to compile.
#[derive(Debug)]
pub struct CompilationError {
    /// Position among the non-empty expressions, starting at 1.
    pub position: usize,

    /// Position in the raw expression file, starting at 1.
    pub ordinal: usize,

    pub source: ohno::AppError,
}

impl Display for CompilationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "expression {} could not be compiled: {}", self.ordinal, self.source.message())
    }
}

/// Compile every non-empty expression, stopping at the first failure.
///
/// Either every program is returned, in set order, or none is.
///
/// # Errors
///
/// Returns a [`CompilationError`] naming the first expression that failed to compile.
pub fn compile_all<'a, E: Environment>(env: &E, set: &'a ExpressionSet) -> Result<Vec<CompiledExpression<'a, E::Program>>, CompilationError> {
    let mut compiled = Vec::with_capacity(set.non_empty_count());

    for (index, expression) in set.non_empty().enumerate() {
        let program = env.compile(expression.source()).map_err(|source| CompilationError {
            position: index + 1,
            ordinal: expression.ordinal(),
            source,
        })?;

        compiled.push(CompiledExpression { expression, program });
    }

    log::debug!(target: LOG_TARGET, "Compiled {} expression(s)", compiled.len());
    Ok(compiled)
}

/// Compile every non-empty expression independently.
///
/// A failure only affects its own expression; the outcome for each expression is yielded in set order.
pub fn compile_each<'a, 'e, E: Environment>(
    env: &'e E,
    set: &'a ExpressionSet,
) -> impl Iterator<Item = (&'a Expression, Result<E::Program>)> + use<'a, 'e, E> {
    set.non_empty().map(move |expression| {
        let program = env.compile(expression.source());
        if let Err(e) = &program {
            log::debug!(target: LOG_TARGET, "Expression {} failed to compile: {}", expression.ordinal(), e.message());
        }
        (expression, program)
    })
}
