//! The expression environment capability

use crate::Result;
use crate::documents::Document;
use cel_interpreter::Value;

/// Name under which the current test object is bound.
pub const OBJECT_VARIABLE: &str = "object";

/// Name under which the params document is bound.
pub const PARAMS_VARIABLE: &str = "params";

/// The type a variable is declared with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum VariableKind {
    /// A map from string keys to dynamically typed values.
    #[strum(to_string = "map(string, dyn)")]
    DynMap,
}

/// The documents bound to the declared variables for one evaluation.
#[derive(Debug, Clone, Copy)]
pub struct Activation<'a> {
    pub object: &'a Document,
    pub params: &'a Document,
}

impl<'a> Activation<'a> {
    #[must_use]
    pub const fn new(object: &'a Document, params: &'a Document) -> Self {
        Self { object, params }
    }

    /// The document bound to a variable name, if any.
    #[must_use]
    pub fn binding(&self, name: &str) -> Option<&'a Document> {
        match name {
            OBJECT_VARIABLE => Some(self.object),
            PARAMS_VARIABLE => Some(self.params),
            _ => None,
        }
    }
}

/// Compiles expression sources into programs and evaluates them.
///
/// Programs are opaque to the harness: they are only ever handed back to the environment that
/// produced them, and are never mutated after compilation.
pub trait Environment {
    type Program;

    /// Register a variable that every evaluation must bind.
    fn declare(&mut self, name: &str, kind: VariableKind);

    /// Compile one expression source.
    ///
    /// # Errors
    ///
    /// Returns an error describing the compilation issues.
    fn compile(&self, source: &str) -> Result<Self::Program>;

    /// Evaluate a program with the given bindings.
    ///
    /// # Errors
    ///
    /// Returns an error if a declared variable is unbound or the program fails at runtime.
    fn evaluate(&self, program: &Self::Program, activation: &Activation<'_>) -> Result<Value>;
}
