//! Error taxonomies for the interpreter pipeline
//!
//! Three stages, three error enums: [`LexerError`] for tokenization,
//! [`ParseError`] for syntax, [`RuntimeError`] for evaluation. [`Error`]
//! aggregates them for callers that drive the whole pipeline.

use miette::Diagnostic;
use thiserror::Error;

/// Tokenization failure. Fatal to the current token request.
#[derive(Error, Debug, Diagnostic, Clone, PartialEq, Eq)]
pub enum LexerError {
    #[error("String parsing error")]
    #[diagnostic(code(lex::unterminated_string))]
    UnterminatedString,

    #[error("Unrecognized escape sequence \\{0}")]
    #[diagnostic(code(lex::unknown_escape))]
    UnknownEscape(char),

    #[error("Unexpected end of line")]
    #[diagnostic(code(lex::newline_in_string))]
    NewlineInString,

    #[error("Number literal `{0}` is out of range")]
    #[diagnostic(code(lex::number_too_large))]
    NumberTooLarge(String),

    #[error("Expected {expected}, found {found}")]
    #[diagnostic(code(lex::unexpected_token))]
    UnexpectedToken { expected: String, found: String },
}

/// Syntax error raised while building the AST.
#[derive(Error, Debug, Diagnostic)]
pub enum ParseError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Lexer(#[from] LexerError),

    #[error("Unknown class `{0}`")]
    #[diagnostic(
        code(parse::unknown_class),
        help("classes must be declared before they are used")
    )]
    UnknownClass(String),

    #[error("Invalid assignment target")]
    #[diagnostic(code(parse::invalid_assignment_target))]
    InvalidAssignmentTarget,

    #[error("The first parameter of method `{0}` must be `self`")]
    #[diagnostic(code(parse::missing_self))]
    MissingSelf(String),

    #[error("`str` takes exactly one argument")]
    #[diagnostic(code(parse::str_arity))]
    StrArity,

    #[error("Field access is only valid on a variable")]
    #[diagnostic(code(parse::invalid_field_access))]
    InvalidFieldAccess,

    #[error("Unexpected token {0} in expression")]
    #[diagnostic(code(parse::unexpected_expr_token))]
    UnexpectedExprToken(String),
}

/// Evaluation failure. Surfaced to the top-level caller; the source
/// language has no exception handling of its own.
#[derive(Error, Debug, Diagnostic)]
pub enum RuntimeError {
    #[error("Unknown variable name `{0}`")]
    #[diagnostic(code(runtime::unknown_variable))]
    UnknownVariable(String),

    #[error("Unknown field name `{0}`")]
    #[diagnostic(code(runtime::unknown_field))]
    UnknownField(String),

    #[error("Value is not an object")]
    #[diagnostic(code(runtime::not_an_object))]
    NotAnObject,

    #[error("Method `{0}` not implemented")]
    #[diagnostic(code(runtime::method_not_implemented))]
    MethodNotImplemented(String),

    #[error("Error comparing values")]
    #[diagnostic(code(runtime::comparison))]
    Comparison,

    #[error("Division by zero")]
    #[diagnostic(code(runtime::divide_by_zero))]
    DivideByZero,

    #[error("Invalid arguments to `{op}` operation")]
    #[diagnostic(code(runtime::invalid_arguments))]
    InvalidArguments { op: &'static str },

    #[error("`return` outside of a method")]
    #[diagnostic(code(runtime::return_outside_method))]
    ReturnOutsideMethod,

    #[error("Output error: {0}")]
    #[diagnostic(code(runtime::output))]
    Output(#[from] std::io::Error),
}

/// Any failure from the full source-to-result pipeline.
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Lexer(#[from] LexerError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Runtime(#[from] RuntimeError),
}
