use super::{Activation, Environment, OBJECT_VARIABLE, PARAMS_VARIABLE, VariableKind, strings};
use crate::Result;
use cel_interpreter::{Context, Program, Value};
use core::any::Any;
use core::fmt::{Debug, Formatter};
use ohno::app_err;
use std::panic::{self, PanicHookInfo};

/// An [`Environment`] backed by `cel-interpreter`.
///
/// Functions live in a root context shared by every evaluation. Each evaluation binds the declared
/// variables in a fresh inner scope, so nothing carries over from one evaluation to the next.
pub struct CelEnvironment {
    declarations: Vec<(String, VariableKind)>,
    root: Context<'static>,
}

impl CelEnvironment {
    /// An environment with the standard CEL functions and no declared variables.
    #[must_use]
    pub fn new() -> Self {
        Self {
            declarations: Vec::new(),
            root: Context::default(),
        }
    }

    /// The environment the harness evaluates in: `object` and `params` declared as dynamic maps,
    /// optionally with the string extension functions.
    #[must_use]
    pub fn for_harness(string_extensions: bool) -> Self {
        let mut env = Self::new();
        env.declare(OBJECT_VARIABLE, VariableKind::DynMap);
        env.declare(PARAMS_VARIABLE, VariableKind::DynMap);

        if string_extensions {
            env.add_string_extensions();
        }

        env
    }

    /// Register the string extension library: `charAt`, `indexOf`, `lastIndexOf`, `lowerAscii`,
    /// `upperAscii`, `replace`, `split`, `substring`, `trim`, `join`, `reverse` and `strings.quote`.
    pub fn add_string_extensions(&mut self) {
        strings::register(&mut self.root);
    }

    /// The declared variables, in declaration order.
    pub fn declarations(&self) -> impl Iterator<Item = (&str, VariableKind)> {
        self.declarations.iter().map(|(name, kind)| (name.as_str(), *kind))
    }
}

impl Default for CelEnvironment {
    fn default() -> Self {
        Self::new()
    }
}

impl Debug for CelEnvironment {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CelEnvironment")
            .field("declarations", &self.declarations)
            .field("root", &"<Context>")
            .finish()
    }
}

impl Environment for CelEnvironment {
    type Program = Program;

    fn declare(&mut self, name: &str, kind: VariableKind) {
        if let Some(existing) = self.declarations.iter_mut().find(|(declared, _)| declared == name) {
            existing.1 = kind;
        } else {
            self.declarations.push((name.to_string(), kind));
        }
    }

    fn compile(&self, source: &str) -> Result<Program> {
        // the parser panics instead of failing on some malformed input
        match panic::catch_unwind(|| Program::compile(source)) {
            Ok(Ok(program)) => Ok(program),
            Ok(Err(e)) => Err(app_err!("{e}")),
            Err(payload) => Err(app_err!("could not parse expression: {}", panic_message(payload.as_ref()))),
        }
    }

    fn evaluate(&self, program: &Program, activation: &Activation<'_>) -> Result<Value> {
        let mut scope = self.root.new_inner_scope();

        for (name, _) in &self.declarations {
            let document = activation
                .binding(name)
                .ok_or_else(|| app_err!("no value bound to declared variable '{name}'"))?;
            scope.add_variable_from_value(name.as_str(), document.to_value());
        }

        program.execute(&scope).map_err(|e| app_err!("{e}"))
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unrecognized syntax")
}

/// Keep the expression parser's internal panics off stderr.
///
/// [`CelEnvironment::compile`] already turns them into compilation errors. Panics raised anywhere
/// else still reach the previously installed hook.
pub fn silence_parser_panics() {
    let previous = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        if !raised_by_parser(info) {
            previous(info);
        }
    }));
}

fn raised_by_parser(info: &PanicHookInfo<'_>) -> bool {
    info.location()
        .is_some_and(|location| ["antlr4rust", "cel-parser"].iter().any(|name| location.file().contains(name)))
}
