//! Runtime and evaluator for the Pygmy language

mod context;
mod eval;
mod ops;
mod value;

pub use context::{Context, DummyContext, StandardContext};
pub use eval::{call_method, eval_expr, eval_stmt, write_value, Unwind};
pub use ops::{compare, equal, greater, greater_or_equal, less, less_or_equal, not_equal};
pub use value::{
    is_true, Class, Closure, Instance, Method, Value, ValueRef, ADD_METHOD, EQ_METHOD,
    INIT_METHOD, LT_METHOD, SELF, STR_METHOD,
};

use std::io::Write;

use crate::ast::Stmt;
use crate::diagnostics::RuntimeError;

/// Top-level program driver holding the global scope.
///
/// Class definitions land in the global scope, so running several programs
/// through one interpreter lets later ones see earlier bindings.
pub struct Interpreter {
    globals: Closure,
}

impl Interpreter {
    pub fn new() -> Interpreter {
        Interpreter {
            globals: Closure::default(),
        }
    }

    /// Execute a program, writing its output to `output`.
    pub fn run(&mut self, program: &Stmt, output: &mut dyn Write) -> Result<ValueRef, RuntimeError> {
        let mut ctx = StandardContext::new(output);
        match eval_stmt(program, &mut self.globals, &mut ctx) {
            Ok(value) => Ok(value),
            Err(Unwind::Return(_)) => Err(RuntimeError::ReturnOutsideMethod),
            Err(Unwind::Error(error)) => Err(error),
        }
    }

    /// The global scope, as left behind by the last `run`.
    pub fn globals(&self) -> &Closure {
        &self.globals
    }
}

impl Default for Interpreter {
    fn default() -> Interpreter {
        Interpreter::new()
    }
}
