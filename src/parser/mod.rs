//! Parser for the Pygmy language
//!
//! A recursive descent parser consuming the lexer's token stream through
//! `current`/`next_token`, one token of lookahead. Classes are resolved at
//! parse time: a class definition registers its `Class` value, `Name(args)`
//! becomes an instantiation of that value, and a parent in `class B(A):`
//! must already be declared. Method bodies are wrapped in the
//! return-catching node as they are built.

use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::ast::{BinaryOp, CmpOp, Expr, Stmt};
use crate::diagnostics::ParseError;
use crate::interp::{Class, Method, SELF};
use crate::lexer::{Lexer, Token};

/// The builtin stringification operator.
const STR_BUILTIN: &str = "str";

/// Parse a complete program into a compound statement.
pub fn parse(source: impl AsRef<[u8]>) -> Result<Stmt, ParseError> {
    let lexer = Lexer::new(source)?;
    Parser::new(lexer).parse_program()
}

/// Parser state
pub struct Parser {
    lexer: Lexer,
    /// Classes declared so far, by name.
    classes: FxHashMap<String, Rc<Class>>,
}

impl Parser {
    pub fn new(lexer: Lexer) -> Parser {
        Parser {
            lexer,
            classes: FxHashMap::default(),
        }
    }

    fn advance(&mut self) -> Result<(), ParseError> {
        self.lexer.next_token()?;
        Ok(())
    }

    /// Consume `token` or fail.
    fn eat(&mut self, token: &Token) -> Result<(), ParseError> {
        self.lexer.expect(token)?;
        self.advance()
    }

    fn at_char(&self, byte: u8) -> bool {
        matches!(self.lexer.current(), Token::Char(c) if *c == byte)
    }

    /// Consume the current identifier and return its name.
    fn take_id(&mut self) -> Result<String, ParseError> {
        let name = self.lexer.expect_id()?.to_string();
        self.advance()?;
        Ok(name)
    }

    // ==================== STATEMENTS ====================

    pub fn parse_program(&mut self) -> Result<Stmt, ParseError> {
        let mut stmts = Vec::new();
        while !matches!(self.lexer.current(), Token::Eof) {
            stmts.push(self.parse_statement()?);
        }
        Ok(Stmt::Compound(stmts))
    }

    fn parse_statement(&mut self) -> Result<Stmt, ParseError> {
        match self.lexer.current() {
            Token::Class => self.parse_class(),
            Token::If => self.parse_if(),
            Token::Return => self.parse_return(),
            Token::Print => self.parse_print(),
            _ => self.parse_small(),
        }
    }

    fn parse_class(&mut self) -> Result<Stmt, ParseError> {
        self.advance()?;
        let name = self.take_id()?;

        let parent = if self.at_char(b'(') {
            self.advance()?;
            let parent_name = self.take_id()?;
            let parent = self
                .classes
                .get(&parent_name)
                .cloned()
                .ok_or(ParseError::UnknownClass(parent_name))?;
            self.eat(&Token::Char(b')'))?;
            Some(parent)
        } else {
            None
        };

        self.eat(&Token::Char(b':'))?;
        self.eat(&Token::Newline)?;
        self.eat(&Token::Indent)?;

        let mut methods = Vec::new();
        while matches!(self.lexer.current(), Token::Def) {
            methods.push(self.parse_method()?);
        }
        self.eat(&Token::Dedent)?;

        let class = Rc::new(Class::new(name.clone(), methods, parent));
        self.classes.insert(name, class.clone());
        Ok(Stmt::ClassDefinition(class))
    }

    fn parse_method(&mut self) -> Result<Method, ParseError> {
        self.advance()?;
        let name = self.take_id()?;

        self.eat(&Token::Char(b'('))?;
        let receiver = self.take_id()?;
        if receiver != SELF {
            return Err(ParseError::MissingSelf(name));
        }
        // `self` is bound implicitly by the caller, not a formal parameter.
        let mut formal_params = Vec::new();
        while self.at_char(b',') {
            self.advance()?;
            formal_params.push(self.take_id()?);
        }
        self.eat(&Token::Char(b')'))?;

        let body = self.parse_suite()?;
        Ok(Method {
            name,
            formal_params,
            body: Stmt::MethodBody(Box::new(body)),
        })
    }

    /// `: NEWLINE INDENT statement+ DEDENT`
    fn parse_suite(&mut self) -> Result<Stmt, ParseError> {
        self.eat(&Token::Char(b':'))?;
        self.eat(&Token::Newline)?;
        self.eat(&Token::Indent)?;

        let mut stmts = Vec::new();
        while !matches!(self.lexer.current(), Token::Dedent) {
            stmts.push(self.parse_statement()?);
        }
        self.advance()?;
        Ok(Stmt::Compound(stmts))
    }

    fn parse_if(&mut self) -> Result<Stmt, ParseError> {
        self.advance()?;
        let condition = self.parse_test()?;
        let then_body = Box::new(self.parse_suite()?);
        let else_body = if matches!(self.lexer.current(), Token::Else) {
            self.advance()?;
            Some(Box::new(self.parse_suite()?))
        } else {
            None
        };
        Ok(Stmt::IfElse {
            condition,
            then_body,
            else_body,
        })
    }

    fn parse_return(&mut self) -> Result<Stmt, ParseError> {
        self.advance()?;
        let value = if matches!(self.lexer.current(), Token::Newline) {
            None
        } else {
            Some(self.parse_test()?)
        };
        self.eat(&Token::Newline)?;
        Ok(Stmt::Return(value))
    }

    /// `print` takes zero or more expressions up to the end of the line,
    /// separated by whitespace or optional commas.
    fn parse_print(&mut self) -> Result<Stmt, ParseError> {
        self.advance()?;
        let mut args = Vec::new();
        while !matches!(self.lexer.current(), Token::Newline) {
            if !args.is_empty() && self.at_char(b',') {
                self.advance()?;
            }
            args.push(self.parse_test()?);
        }
        self.advance()?;
        Ok(Stmt::Print(args))
    }

    /// Assignment, field assignment, or a bare expression statement.
    fn parse_small(&mut self) -> Result<Stmt, ParseError> {
        let expr = self.parse_test()?;
        let stmt = if self.at_char(b'=') {
            let Expr::Variable(mut path) = expr else {
                return Err(ParseError::InvalidAssignmentTarget);
            };
            self.advance()?;
            let value = self.parse_test()?;
            let field = path.pop().ok_or(ParseError::InvalidAssignmentTarget)?;
            if path.is_empty() {
                Stmt::Assignment { name: field, value }
            } else {
                Stmt::FieldAssignment {
                    object: Expr::Variable(path),
                    field,
                    value,
                }
            }
        } else {
            Stmt::Expression(expr)
        };
        self.eat(&Token::Newline)?;
        Ok(stmt)
    }

    // ==================== EXPRESSIONS ====================

    fn parse_test(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_and_test()?;
        while matches!(self.lexer.current(), Token::Or) {
            self.advance()?;
            let rhs = self.parse_and_test()?;
            lhs = Expr::Binary {
                op: BinaryOp::Or,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    fn parse_and_test(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_not_test()?;
        while matches!(self.lexer.current(), Token::And) {
            self.advance()?;
            let rhs = self.parse_not_test()?;
            lhs = Expr::Binary {
                op: BinaryOp::And,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    fn parse_not_test(&mut self) -> Result<Expr, ParseError> {
        if matches!(self.lexer.current(), Token::Not) {
            self.advance()?;
            let argument = self.parse_not_test()?;
            return Ok(Expr::Not(Box::new(argument)));
        }
        self.parse_comparison()
    }

    /// Comparisons do not chain: `a < b < c` is a syntax error downstream.
    fn parse_comparison(&mut self) -> Result<Expr, ParseError> {
        let lhs = self.parse_sum()?;
        let op = match self.lexer.current() {
            Token::Eq => CmpOp::Eq,
            Token::NotEq => CmpOp::NotEq,
            Token::LessOrEq => CmpOp::LessEq,
            Token::GreaterOrEq => CmpOp::GreaterEq,
            Token::Char(b'<') => CmpOp::Less,
            Token::Char(b'>') => CmpOp::Greater,
            _ => return Ok(lhs),
        };
        self.advance()?;
        let rhs = self.parse_sum()?;
        Ok(Expr::Comparison {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        })
    }

    fn parse_sum(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_term()?;
        loop {
            let op = match self.lexer.current() {
                Token::Char(b'+') => BinaryOp::Add,
                Token::Char(b'-') => BinaryOp::Sub,
                _ => break,
            };
            self.advance()?;
            let rhs = self.parse_term()?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    fn parse_term(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_primary()?;
        loop {
            let op = match self.lexer.current() {
                Token::Char(b'*') => BinaryOp::Mul,
                Token::Char(b'/') => BinaryOp::Div,
                _ => break,
            };
            self.advance()?;
            let rhs = self.parse_primary()?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let expr = match self.lexer.current().clone() {
            Token::Number(n) => {
                self.advance()?;
                Expr::Number(n)
            }
            Token::String(s) => {
                self.advance()?;
                Expr::Str(s)
            }
            Token::True => {
                self.advance()?;
                Expr::Bool(true)
            }
            Token::False => {
                self.advance()?;
                Expr::Bool(false)
            }
            Token::None => {
                self.advance()?;
                Expr::None
            }
            Token::Char(b'(') => {
                self.advance()?;
                let inner = self.parse_test()?;
                self.eat(&Token::Char(b')'))?;
                inner
            }
            Token::Id(name) => {
                self.advance()?;
                if self.at_char(b'(') {
                    let mut args = self.parse_call_args()?;
                    if name == STR_BUILTIN {
                        if args.len() != 1 {
                            return Err(ParseError::StrArity);
                        }
                        let argument = args.pop().ok_or(ParseError::StrArity)?;
                        Expr::Stringify(Box::new(argument))
                    } else {
                        let class = self
                            .classes
                            .get(&name)
                            .cloned()
                            .ok_or(ParseError::UnknownClass(name))?;
                        Expr::NewInstance { class, args }
                    }
                } else {
                    Expr::Variable(vec![name])
                }
            }
            other => return Err(ParseError::UnexpectedExprToken(other.to_string())),
        };
        self.parse_postfix(expr)
    }

    /// `.field` extends a dotted name; `.method(args)` becomes a call.
    fn parse_postfix(&mut self, mut expr: Expr) -> Result<Expr, ParseError> {
        while self.at_char(b'.') {
            self.advance()?;
            let name = self.take_id()?;
            if self.at_char(b'(') {
                let args = self.parse_call_args()?;
                expr = Expr::MethodCall {
                    object: Box::new(expr),
                    method: name,
                    args,
                };
            } else {
                match &mut expr {
                    Expr::Variable(path) => path.push(name),
                    _ => return Err(ParseError::InvalidFieldAccess),
                }
            }
        }
        Ok(expr)
    }

    fn parse_call_args(&mut self) -> Result<Vec<Expr>, ParseError> {
        self.eat(&Token::Char(b'('))?;
        let mut args = Vec::new();
        if !self.at_char(b')') {
            args.push(self.parse_test()?);
            while self.at_char(b',') {
                self.advance()?;
                args.push(self.parse_test()?);
            }
        }
        self.eat(&Token::Char(b')'))?;
        Ok(args)
    }
}
