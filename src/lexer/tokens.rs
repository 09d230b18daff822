//! Token definitions for the Pygmy lexer

use serde::{Deserialize, Serialize};
use std::fmt;

/// Tokens produced by the lexer.
///
/// Four kinds carry a payload (`Number`, `Id`, `String`, `Char`); the rest
/// are bare markers. Two tokens compare equal iff they are the same kind
/// and, for the valued kinds, carry equal payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Token {
    // Valued
    /// Decimal integer literal
    Number(i64),
    /// Identifier
    Id(String),
    /// String literal bytes, kept raw (escapes already resolved)
    String(Vec<u8>),
    /// Single punctuation or operator byte: `. , ( ) : + - * / = < > !`
    Char(u8),

    // Keywords
    Class,
    Return,
    If,
    Else,
    Def,
    Print,
    And,
    Or,
    Not,
    None,
    True,
    False,

    // Structural
    /// End of a non-blank line
    Newline,
    /// Indentation grew by one step (two spaces)
    Indent,
    /// Indentation shrank by one step
    Dedent,
    /// End of input
    Eof,

    // Compound operators
    /// `==`
    Eq,
    /// `!=`
    NotEq,
    /// `<=`
    LessOrEq,
    /// `>=`
    GreaterOrEq,
}

impl Token {
    /// Map a bare word to its keyword token, if it is one.
    pub fn keyword(word: &str) -> Option<Token> {
        let token = match word {
            "class" => Token::Class,
            "return" => Token::Return,
            "if" => Token::If,
            "else" => Token::Else,
            "def" => Token::Def,
            "print" => Token::Print,
            "and" => Token::And,
            "or" => Token::Or,
            "not" => Token::Not,
            "None" => Token::None,
            "True" => Token::True,
            "False" => Token::False,
            _ => return Option::None,
        };
        Some(token)
    }

    /// Check if this token is a keyword marker
    pub fn is_keyword(&self) -> bool {
        matches!(
            self,
            Token::Class
                | Token::Return
                | Token::If
                | Token::Else
                | Token::Def
                | Token::Print
                | Token::And
                | Token::Or
                | Token::Not
                | Token::None
                | Token::True
                | Token::False
        )
    }

    /// Get the bare name of the token kind
    pub fn kind_name(&self) -> &'static str {
        match self {
            Token::Number(_) => "Number",
            Token::Id(_) => "Id",
            Token::String(_) => "String",
            Token::Char(_) => "Char",
            Token::Class => "Class",
            Token::Return => "Return",
            Token::If => "If",
            Token::Else => "Else",
            Token::Def => "Def",
            Token::Print => "Print",
            Token::And => "And",
            Token::Or => "Or",
            Token::Not => "Not",
            Token::None => "None",
            Token::True => "True",
            Token::False => "False",
            Token::Newline => "Newline",
            Token::Indent => "Indent",
            Token::Dedent => "Dedent",
            Token::Eof => "Eof",
            Token::Eq => "Eq",
            Token::NotEq => "NotEq",
            Token::LessOrEq => "LessOrEq",
            Token::GreaterOrEq => "GreaterOrEq",
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Number(value) => write!(f, "Number{{{}}}", value),
            Token::Id(value) => write!(f, "Id{{{}}}", value),
            Token::String(value) => {
                write!(f, "String{{{}}}", String::from_utf8_lossy(value))
            }
            Token::Char(value) => write!(f, "Char{{{}}}", *value as char),
            other => f.write_str(other.kind_name()),
        }
    }
}
