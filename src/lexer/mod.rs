//! Lexer for the Pygmy language
//!
//! A pull lexer over a raw byte buffer: `current()` returns the token under
//! the cursor and `next_token()` advances. The input is never decoded;
//! bytes outside the token set are silently consumed, and string literals
//! keep their payload bytes exactly as written. Indentation is significant and fixed
//! at two spaces per level; the lexer emits synthetic [`Token::Indent`] and
//! [`Token::Dedent`] markers as the leading whitespace of a line grows or
//! shrinks. Blank lines and comment-only lines produce no tokens. Every
//! program that produced any content is terminated by a final
//! [`Token::Newline`], any outstanding [`Token::Dedent`]s, and
//! [`Token::Eof`].

mod tokens;

pub use tokens::Token;

use crate::diagnostics::LexerError;

/// Columns per indentation level.
const INDENT_STEP: usize = 2;

/// Streaming tokenizer with one token of lookahead.
pub struct Lexer {
    input: Vec<u8>,
    pos: usize,
    /// True between a line terminator and the first content byte of the
    /// next non-blank line.
    at_line_start: bool,
    /// Indentation level already reported to the caller, in columns.
    indent_columns: usize,
    /// Leading spaces measured on the current non-blank line, in columns.
    pending_indent: usize,
    current: Token,
}

impl Lexer {
    /// Create a lexer over `source` and read the first token.
    pub fn new(source: impl AsRef<[u8]>) -> Result<Self, LexerError> {
        let mut lexer = Lexer {
            input: source.as_ref().to_vec(),
            pos: 0,
            at_line_start: true,
            indent_columns: 0,
            pending_indent: 0,
            current: Token::Eof,
        };
        lexer.next_token()?;
        Ok(lexer)
    }

    /// The token under the cursor. Never changes without a `next_token` call.
    pub fn current(&self) -> &Token {
        &self.current
    }

    /// Advance to the next token and return it.
    pub fn next_token(&mut self) -> Result<&Token, LexerError> {
        self.current = self.read_token()?;
        Ok(&self.current)
    }

    /// Fail unless the current token equals `expected`.
    pub fn expect(&self, expected: &Token) -> Result<(), LexerError> {
        if self.current == *expected {
            Ok(())
        } else {
            Err(LexerError::UnexpectedToken {
                expected: expected.to_string(),
                found: self.current.to_string(),
            })
        }
    }

    /// Advance, then fail unless the new current token equals `expected`.
    pub fn expect_next(&mut self, expected: &Token) -> Result<(), LexerError> {
        self.next_token()?;
        self.expect(expected)
    }

    /// Return the payload of the current token if it is an identifier.
    pub fn expect_id(&self) -> Result<&str, LexerError> {
        match &self.current {
            Token::Id(name) => Ok(name),
            other => Err(LexerError::UnexpectedToken {
                expected: "Id".to_string(),
                found: other.to_string(),
            }),
        }
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<u8> {
        let byte = self.peek()?;
        self.pos += 1;
        Some(byte)
    }

    /// Produce one token. At most one `Indent`/`Dedent` per call; a deeper
    /// indentation change drains over subsequent calls.
    fn read_token(&mut self) -> Result<Token, LexerError> {
        loop {
            // Settle any outstanding indentation difference first.
            if self.pending_indent > self.indent_columns {
                self.indent_columns += INDENT_STEP;
                return Ok(Token::Indent);
            }
            if self.pending_indent < self.indent_columns {
                self.indent_columns -= INDENT_STEP;
                return Ok(Token::Dedent);
            }

            let Some(byte) = self.peek() else {
                if !self.at_line_start {
                    self.at_line_start = true;
                    return Ok(Token::Newline);
                }
                // Flush dedents for the indentation still open at EOF.
                if self.pending_indent != 0 {
                    self.pending_indent = 0;
                    continue;
                }
                return Ok(Token::Eof);
            };

            if self.at_line_start {
                let measured = self.read_offset();
                match self.peek() {
                    Option::None => {
                        self.pending_indent = measured;
                    }
                    Some(b'\n') => {
                        // Blank line: no tokens, indentation untouched.
                        self.bump();
                    }
                    Some(b'#') => {
                        self.pending_indent = measured;
                        self.skip_comment();
                    }
                    Some(_) => {
                        self.pending_indent = measured;
                        self.at_line_start = false;
                    }
                }
                continue;
            }

            if byte == b'\n' {
                self.bump();
                self.at_line_start = true;
                return Ok(Token::Newline);
            }

            self.bump();
            match byte {
                b'=' | b'<' | b'>' | b'!' => {
                    if self.peek() == Some(b'=') {
                        self.bump();
                        return Ok(match byte {
                            b'=' => Token::Eq,
                            b'<' => Token::LessOrEq,
                            b'>' => Token::GreaterOrEq,
                            _ => Token::NotEq,
                        });
                    }
                    return Ok(Token::Char(byte));
                }
                b'.' | b',' | b'(' | b')' | b':' | b'+' | b'-' | b'*' | b'/' => {
                    return Ok(Token::Char(byte));
                }
                b'\'' | b'"' => return self.read_string(byte),
                b'#' => self.skip_comment(),
                b'0'..=b'9' => return self.read_number(byte),
                b'a'..=b'z' | b'A'..=b'Z' | b'_' => return Ok(self.read_word(byte)),
                // Anything else is silently consumed.
                _ => {}
            }
        }
    }

    /// Count and consume the run of leading spaces.
    fn read_offset(&mut self) -> usize {
        let mut offset = 0;
        while self.peek() == Some(b' ') {
            self.bump();
            offset += 1;
        }
        offset
    }

    /// Consume up to (but not including) the end of the line.
    fn skip_comment(&mut self) {
        while let Some(byte) = self.peek() {
            if byte == b'\n' {
                break;
            }
            self.bump();
        }
    }

    /// Read a string literal. `quote` is the opening byte and also closes
    /// the literal; recognized escapes are `\n \t \r \" \' \\`.
    fn read_string(&mut self, quote: u8) -> Result<Token, LexerError> {
        let mut bytes = Vec::new();
        loop {
            let Some(byte) = self.bump() else {
                return Err(LexerError::UnterminatedString);
            };
            if byte == quote {
                break;
            }
            match byte {
                b'\\' => {
                    let Some(escaped) = self.bump() else {
                        return Err(LexerError::UnterminatedString);
                    };
                    match escaped {
                        b'n' => bytes.push(b'\n'),
                        b't' => bytes.push(b'\t'),
                        b'r' => bytes.push(b'\r'),
                        b'"' => bytes.push(b'"'),
                        b'\'' => bytes.push(b'\''),
                        b'\\' => bytes.push(b'\\'),
                        other => {
                            return Err(LexerError::UnknownEscape(other as char));
                        }
                    }
                }
                b'\n' | b'\r' => return Err(LexerError::NewlineInString),
                _ => bytes.push(byte),
            }
        }
        Ok(Token::String(bytes))
    }

    /// Read a decimal number literal starting with `first`.
    fn read_number(&mut self, first: u8) -> Result<Token, LexerError> {
        let mut digits = String::new();
        digits.push(first as char);
        while let Some(byte @ b'0'..=b'9') = self.peek() {
            self.bump();
            digits.push(byte as char);
        }
        digits
            .parse::<i64>()
            .map(Token::Number)
            .map_err(|_| LexerError::NumberTooLarge(digits))
    }

    /// Read a word starting with `first` and map keywords.
    fn read_word(&mut self, first: u8) -> Token {
        let mut word = String::new();
        word.push(first as char);
        while let Some(byte) = self.peek() {
            if !byte.is_ascii_alphanumeric() && byte != b'_' {
                break;
            }
            self.bump();
            word.push(byte as char);
        }
        Token::keyword(&word).unwrap_or(Token::Id(word))
    }
}

/// Tokenize `source` completely, including the trailing [`Token::Eof`].
pub fn tokenize(source: impl AsRef<[u8]>) -> Result<Vec<Token>, LexerError> {
    let mut lexer = Lexer::new(source)?;
    let mut tokens = Vec::new();
    loop {
        let token = lexer.current().clone();
        let done = token == Token::Eof;
        tokens.push(token);
        if done {
            return Ok(tokens);
        }
        lexer.next_token()?;
    }
}
