//! Pygmy — a small, dynamically-typed, indentation-structured scripting
//! language resembling a reduced Python.
//!
//! # Architecture
//!
//! ```text
//! Source → Lexer → Parser → AST → Interpreter
//! ```
//!
//! The lexer turns bytes into a token stream with synthetic
//! `Indent`/`Dedent` markers; the parser builds the AST and resolves class
//! declarations; the interpreter walks the tree against a scope and an
//! output context. Values are reference-counted and dynamically typed, with
//! single inheritance and `__init__`/`__str__`/`__eq__`/`__lt__`/`__add__`
//! operator hooks.
//!
//! # Example
//!
//! ```
//! let source = "\
//! class Greeter:
//!   def __str__(self):
//!     return \"hello\"
//! g = Greeter()
//! print g
//! ";
//! let output = pygmy::interpret_to_string(source).unwrap();
//! assert_eq!(output, "hello\n");
//! ```

pub mod ast;
pub mod diagnostics;
pub mod interp;
pub mod lexer;
pub mod parser;

// Re-export diagnostics for convenience
pub use diagnostics::{Error, LexerError, ParseError, RuntimeError};

// Re-exports for convenience
pub use ast::{Expr, Stmt};
pub use interp::{Interpreter, Value, ValueRef};
pub use lexer::{Lexer, Token};

/// Interpreter version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Tokenize source bytes completely, including the trailing `Eof`.
pub fn tokenize(source: impl AsRef<[u8]>) -> Result<Vec<Token>, LexerError> {
    lexer::tokenize(source)
}

/// Parse source bytes to an AST
pub fn parse(source: impl AsRef<[u8]>) -> Result<Stmt, ParseError> {
    parser::parse(source)
}

/// Interpret source bytes, writing program output to `output`.
pub fn interpret(
    source: impl AsRef<[u8]>,
    output: &mut dyn std::io::Write,
) -> Result<(), Error> {
    let program = parser::parse(source)?;
    let mut interpreter = Interpreter::new();
    interpreter.run(&program, output)?;
    Ok(())
}

/// Interpret source bytes and capture the output as a string, lossily if
/// the program printed bytes that are not valid UTF-8.
pub fn interpret_to_string(source: impl AsRef<[u8]>) -> Result<String, Error> {
    let mut output = Vec::new();
    interpret(source, &mut output)?;
    Ok(String::from_utf8_lossy(&output).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
