//! Expression handling on top of CEL
//!
//! This module owns everything between the raw expression file and an executable program:
//!
//! - [`ExpressionSet`] splits the expression file into ordered, trimmed [`Expression`]s. Empty
//!   entries are kept so ordinals stay stable, and are skipped by every consumer.
//! - [`Environment`] is the capability the rest of the crate compiles and evaluates through.
//!   [`CelEnvironment`] implements it with `cel-interpreter`, declaring the `object` and `params`
//!   variables that every evaluation binds through an [`Activation`], and optionally carries the
//!   string extension library.
//! - [`compile_all`] compiles a whole set and stops at the first failure, while [`compile_each`]
//!   compiles every expression independently and hands back each outcome.
//!
//! The harness never inspects programs; it only hands them back to the environment that built them.

mod cel_env;
mod compiler;
mod environment;
mod expression;
mod strings;
mod value;

pub use cel_env::{CelEnvironment, silence_parser_panics};
pub use compiler::{CompilationError, CompiledExpression, compile_all, compile_each};
pub use environment::{Activation, Environment, OBJECT_VARIABLE, PARAMS_VARIABLE, VariableKind};
pub use expression::{DEFAULT_DELIMITER, Expression, ExpressionSet, split_expressions};
pub use value::{format_value, type_name};
pub(crate) use value::format_key;
