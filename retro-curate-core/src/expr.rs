//! Boolean predicate language for arcade attribute filters.
//!
//! Two families of predicates share one grammar:
//!
//! - **set predicates** range over the string values of an attribute
//!   (driver, category, controls, ...). A quoted literal is true when the
//!   record's values contain it: `'Shooter' and not 'Mahjong'`.
//! - **numeric predicates** range over a single integer variable named
//!   after the field (`year`, `buttons`, `players`):
//!   `year >= 1985 and year < 1990`.
//!
//! Expressions are parsed and type-checked once, then evaluated per record.

use std::fmt;

use thiserror::Error;

/// Errors reported while parsing a predicate expression.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExprError {
    #[error("expression is empty")]
    Empty,

    #[error("unexpected character '{ch}' at offset {pos}")]
    UnexpectedChar { pos: usize, ch: char },

    #[error("unterminated string starting at offset {pos}")]
    UnterminatedString { pos: usize },

    #[error("integer literal out of range at offset {pos}")]
    IntegerOverflow { pos: usize },

    #[error("expected {expected} at offset {pos}, found '{found}'")]
    UnexpectedToken {
        pos: usize,
        expected: &'static str,
        found: String,
    },

    #[error("expected {expected} but the expression ended")]
    UnexpectedEnd { expected: &'static str },

    #[error("unknown variable '{name}' at offset {pos} ({hint})")]
    UnknownVariable {
        pos: usize,
        name: String,
        hint: String,
    },

    #[error("string literal at offset {pos} is not allowed in a numeric expression")]
    StringInNumeric { pos: usize },

    #[error("type error: {0}")]
    Type(String),
}

/// Arithmetic operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CmpOp {
    fn apply(self, lhs: i64, rhs: i64) -> bool {
        match self {
            CmpOp::Eq => lhs == rhs,
            CmpOp::Ne => lhs != rhs,
            CmpOp::Lt => lhs < rhs,
            CmpOp::Le => lhs <= rhs,
            CmpOp::Gt => lhs > rhs,
            CmpOp::Ge => lhs >= rhs,
        }
    }
}

/// Predicate syntax tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Bool(bool),
    Int(i64),
    /// Set-contains test against the record's attribute values.
    Contains(String),
    /// The numeric variable.
    Var,
    Not(Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Neg(Box<Expr>),
    Arith(ArithOp, Box<Expr>, Box<Expr>),
    Cmp(CmpOp, Box<Expr>, Box<Expr>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Type {
    Bool,
    Int,
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Bool => f.write_str("boolean"),
            Type::Int => f.write_str("integer"),
        }
    }
}

/// What the expression ranges over.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Domain {
    StringSet,
    Numeric(String),
}

/// A parsed, type-checked predicate.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    source: String,
    root: Expr,
}

impl Predicate {
    /// Parse a set predicate over string attribute values.
    pub fn parse_set(source: &str) -> Result<Self, ExprError> {
        Self::parse(source, Domain::StringSet)
    }

    /// Parse a numeric predicate over the integer variable `variable`.
    pub fn parse_numeric(source: &str, variable: &str) -> Result<Self, ExprError> {
        Self::parse(source, Domain::Numeric(variable.to_string()))
    }

    fn parse(source: &str, domain: Domain) -> Result<Self, ExprError> {
        let tokens = lex(source)?;
        if tokens.is_empty() {
            return Err(ExprError::Empty);
        }
        let mut parser = Parser {
            tokens,
            pos: 0,
            domain,
        };
        let root = parser.parse_or()?;
        if let Some(tok) = parser.peek() {
            return Err(ExprError::UnexpectedToken {
                pos: tok.pos,
                expected: "end of expression",
                found: tok.kind.to_string(),
            });
        }
        match type_of(&root)? {
            Type::Bool => Ok(Self {
                source: source.to_string(),
                root,
            }),
            Type::Int => Err(ExprError::Type(
                "expression yields an integer, expected a boolean".to_string(),
            )),
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn ast(&self) -> &Expr {
        &self.root
    }

    /// Evaluate a set predicate against a record's attribute values.
    pub fn matches_set<S: AsRef<str>>(&self, values: &[S]) -> bool {
        let env = SetEnv(values);
        eval_bool(&self.root, &env).unwrap_or(false)
    }

    /// Evaluate a numeric predicate with the variable bound to `value`.
    pub fn matches_value(&self, value: i64) -> bool {
        let env = NumEnv(value);
        eval_bool(&self.root, &env).unwrap_or(false)
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

// ---------------------------------------------------------------------------
// Lexer
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
enum TokenKind {
    Int(i64),
    Str(String),
    Ident(String),
    And,
    Or,
    Not,
    True,
    False,
    LParen,
    RParen,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Cmp(CmpOp),
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Int(n) => write!(f, "{n}"),
            TokenKind::Str(s) => write!(f, "'{s}'"),
            TokenKind::Ident(s) => f.write_str(s),
            TokenKind::And => f.write_str("and"),
            TokenKind::Or => f.write_str("or"),
            TokenKind::Not => f.write_str("not"),
            TokenKind::True => f.write_str("true"),
            TokenKind::False => f.write_str("false"),
            TokenKind::LParen => f.write_str("("),
            TokenKind::RParen => f.write_str(")"),
            TokenKind::Plus => f.write_str("+"),
            TokenKind::Minus => f.write_str("-"),
            TokenKind::Star => f.write_str("*"),
            TokenKind::Slash => f.write_str("/"),
            TokenKind::Percent => f.write_str("%"),
            TokenKind::Cmp(op) => f.write_str(match op {
                CmpOp::Eq => "==",
                CmpOp::Ne => "!=",
                CmpOp::Lt => "<",
                CmpOp::Le => "<=",
                CmpOp::Gt => ">",
                CmpOp::Ge => ">=",
            }),
        }
    }
}

#[derive(Debug, Clone)]
struct Token {
    kind: TokenKind,
    pos: usize,
}

fn lex(source: &str) -> Result<Vec<Token>, ExprError> {
    let mut tokens = Vec::new();
    let mut chars = source.char_indices().peekable();

    while let Some(&(pos, ch)) = chars.peek() {
        if ch.is_whitespace() {
            chars.next();
            continue;
        }

        let kind = match ch {
            '(' => {
                chars.next();
                TokenKind::LParen
            }
            ')' => {
                chars.next();
                TokenKind::RParen
            }
            '+' => {
                chars.next();
                TokenKind::Plus
            }
            '-' => {
                chars.next();
                TokenKind::Minus
            }
            '*' => {
                chars.next();
                TokenKind::Star
            }
            '/' => {
                chars.next();
                TokenKind::Slash
            }
            '%' => {
                chars.next();
                TokenKind::Percent
            }
            '&' | '|' => {
                chars.next();
                match chars.next() {
                    Some((_, next)) if next == ch => {
                        if ch == '&' {
                            TokenKind::And
                        } else {
                            TokenKind::Or
                        }
                    }
                    _ => return Err(ExprError::UnexpectedChar { pos, ch }),
                }
            }
            '=' => {
                chars.next();
                if chars.peek().is_some_and(|&(_, c)| c == '=') {
                    chars.next();
                }
                TokenKind::Cmp(CmpOp::Eq)
            }
            '!' => {
                chars.next();
                if chars.peek().is_some_and(|&(_, c)| c == '=') {
                    chars.next();
                    TokenKind::Cmp(CmpOp::Ne)
                } else {
                    TokenKind::Not
                }
            }
            '<' | '>' => {
                chars.next();
                let or_equal = chars.peek().is_some_and(|&(_, c)| c == '=');
                if or_equal {
                    chars.next();
                }
                TokenKind::Cmp(match (ch, or_equal) {
                    ('<', false) => CmpOp::Lt,
                    ('<', true) => CmpOp::Le,
                    ('>', false) => CmpOp::Gt,
                    _ => CmpOp::Ge,
                })
            }
            '\'' | '"' => {
                chars.next();
                let mut text = String::new();
                let mut closed = false;
                while let Some((_, c)) = chars.next() {
                    if c == '\\' {
                        if let Some((_, escaped)) = chars.next() {
                            text.push(escaped);
                        }
                    } else if c == ch {
                        closed = true;
                        break;
                    } else {
                        text.push(c);
                    }
                }
                if !closed {
                    return Err(ExprError::UnterminatedString { pos });
                }
                TokenKind::Str(text)
            }
            c if c.is_ascii_digit() => {
                let mut digits = String::new();
                while let Some(&(_, d)) = chars.peek() {
                    if !d.is_ascii_digit() {
                        break;
                    }
                    digits.push(d);
                    chars.next();
                }
                let value = digits
                    .parse::<i64>()
                    .map_err(|_| ExprError::IntegerOverflow { pos })?;
                TokenKind::Int(value)
            }
            c if c.is_alphabetic() || c == '_' => {
                let mut word = String::new();
                while let Some(&(_, w)) = chars.peek() {
                    if !(w.is_alphanumeric() || w == '_') {
                        break;
                    }
                    word.push(w);
                    chars.next();
                }
                match word.to_ascii_lowercase().as_str() {
                    "and" => TokenKind::And,
                    "or" => TokenKind::Or,
                    "not" => TokenKind::Not,
                    "true" => TokenKind::True,
                    "false" => TokenKind::False,
                    _ => TokenKind::Ident(word),
                }
            }
            other => return Err(ExprError::UnexpectedChar { pos, ch: other }),
        };

        tokens.push(Token { kind, pos });
    }

    Ok(tokens)
}

// ---------------------------------------------------------------------------
// Parser
// ---------------------------------------------------------------------------

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    domain: Domain,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_kind(&self) -> Option<&TokenKind> {
        self.peek().map(|t| &t.kind)
    }

    fn advance(&mut self) -> Option<Token> {
        let tok = self.tokens.get(self.pos).cloned();
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn parse_or(&mut self) -> Result<Expr, ExprError> {
        let mut lhs = self.parse_and()?;
        while self.peek_kind() == Some(&TokenKind::Or) {
            self.advance();
            let rhs = self.parse_and()?;
            lhs = Expr::Or(Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_and(&mut self) -> Result<Expr, ExprError> {
        let mut lhs = self.parse_not()?;
        while self.peek_kind() == Some(&TokenKind::And) {
            self.advance();
            let rhs = self.parse_not()?;
            lhs = Expr::And(Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_not(&mut self) -> Result<Expr, ExprError> {
        if self.peek_kind() == Some(&TokenKind::Not) {
            self.advance();
            let inner = self.parse_not()?;
            return Ok(Expr::Not(Box::new(inner)));
        }
        self.parse_cmp()
    }

    fn parse_cmp(&mut self) -> Result<Expr, ExprError> {
        let lhs = self.parse_sum()?;
        if let Some(TokenKind::Cmp(op)) = self.peek_kind() {
            let op = *op;
            self.advance();
            let rhs = self.parse_sum()?;
            return Ok(Expr::Cmp(op, Box::new(lhs), Box::new(rhs)));
        }
        Ok(lhs)
    }

    fn parse_sum(&mut self) -> Result<Expr, ExprError> {
        let mut lhs = self.parse_prod()?;
        loop {
            let op = match self.peek_kind() {
                Some(TokenKind::Plus) => ArithOp::Add,
                Some(TokenKind::Minus) => ArithOp::Sub,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_prod()?;
            lhs = Expr::Arith(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_prod(&mut self) -> Result<Expr, ExprError> {
        let mut lhs = self.parse_unary()?;
        loop {
            let op = match self.peek_kind() {
                Some(TokenKind::Star) => ArithOp::Mul,
                Some(TokenKind::Slash) => ArithOp::Div,
                Some(TokenKind::Percent) => ArithOp::Rem,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_unary()?;
            lhs = Expr::Arith(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> Result<Expr, ExprError> {
        if self.peek_kind() == Some(&TokenKind::Minus) {
            self.advance();
            let inner = self.parse_unary()?;
            return Ok(Expr::Neg(Box::new(inner)));
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<Expr, ExprError> {
        let Some(tok) = self.advance() else {
            return Err(ExprError::UnexpectedEnd {
                expected: "a value or '('",
            });
        };

        match tok.kind {
            TokenKind::Int(n) => Ok(Expr::Int(n)),
            TokenKind::True => Ok(Expr::Bool(true)),
            TokenKind::False => Ok(Expr::Bool(false)),
            TokenKind::Str(s) => match self.domain {
                Domain::StringSet => Ok(Expr::Contains(s)),
                Domain::Numeric(_) => Err(ExprError::StringInNumeric { pos: tok.pos }),
            },
            TokenKind::Ident(name) => match &self.domain {
                Domain::Numeric(var) if name.eq_ignore_ascii_case(var) => Ok(Expr::Var),
                Domain::Numeric(var) => Err(ExprError::UnknownVariable {
                    pos: tok.pos,
                    name,
                    hint: format!("the only variable here is '{var}'"),
                }),
                Domain::StringSet => Err(ExprError::UnknownVariable {
                    pos: tok.pos,
                    name,
                    hint: "quote string values".to_string(),
                }),
            },
            TokenKind::LParen => {
                let inner = self.parse_or()?;
                match self.advance() {
                    Some(Token {
                        kind: TokenKind::RParen,
                        ..
                    }) => Ok(inner),
                    Some(other) => Err(ExprError::UnexpectedToken {
                        pos: other.pos,
                        expected: "')'",
                        found: other.kind.to_string(),
                    }),
                    None => Err(ExprError::UnexpectedEnd { expected: "')'" }),
                }
            }
            other => Err(ExprError::UnexpectedToken {
                pos: tok.pos,
                expected: "a value or '('",
                found: other.to_string(),
            }),
        }
    }
}

fn type_of(expr: &Expr) -> Result<Type, ExprError> {
    let expect = |e: &Expr, want: Type, context: &str| -> Result<(), ExprError> {
        let got = type_of(e)?;
        if got == want {
            Ok(())
        } else {
            Err(ExprError::Type(format!(
                "operand of {context} is {got}, expected {want}"
            )))
        }
    };

    match expr {
        Expr::Bool(_) | Expr::Contains(_) => Ok(Type::Bool),
        Expr::Int(_) | Expr::Var => Ok(Type::Int),
        Expr::Not(inner) => {
            expect(inner, Type::Bool, "'not'")?;
            Ok(Type::Bool)
        }
        Expr::And(a, b) | Expr::Or(a, b) => {
            expect(a, Type::Bool, "'and'/'or'")?;
            expect(b, Type::Bool, "'and'/'or'")?;
            Ok(Type::Bool)
        }
        Expr::Neg(inner) => {
            expect(inner, Type::Int, "unary '-'")?;
            Ok(Type::Int)
        }
        Expr::Arith(_, a, b) => {
            expect(a, Type::Int, "arithmetic")?;
            expect(b, Type::Int, "arithmetic")?;
            Ok(Type::Int)
        }
        Expr::Cmp(_, a, b) => {
            expect(a, Type::Int, "a comparison")?;
            expect(b, Type::Int, "a comparison")?;
            Ok(Type::Bool)
        }
    }
}

// ---------------------------------------------------------------------------
// Evaluation
// ---------------------------------------------------------------------------

trait Env {
    fn contains(&self, literal: &str) -> bool;
    fn value(&self) -> Option<i64>;
}

struct SetEnv<'a, S>(&'a [S]);

impl<S: AsRef<str>> Env for SetEnv<'_, S> {
    fn contains(&self, literal: &str) -> bool {
        self.0.iter().any(|v| v.as_ref() == literal)
    }

    fn value(&self) -> Option<i64> {
        None
    }
}

struct NumEnv(i64);

impl Env for NumEnv {
    fn contains(&self, _literal: &str) -> bool {
        false
    }

    fn value(&self) -> Option<i64> {
        Some(self.0)
    }
}

/// `None` means the expression is undefined for this binding (e.g. x / 0).
fn eval_bool(expr: &Expr, env: &dyn Env) -> Option<bool> {
    match expr {
        Expr::Bool(b) => Some(*b),
        Expr::Contains(lit) => Some(env.contains(lit)),
        Expr::Not(inner) => eval_bool(inner, env).map(|b| !b),
        Expr::And(a, b) => {
            if eval_bool(a, env)? {
                eval_bool(b, env)
            } else {
                Some(false)
            }
        }
        Expr::Or(a, b) => {
            if eval_bool(a, env)? {
                Some(true)
            } else {
                eval_bool(b, env)
            }
        }
        Expr::Cmp(op, a, b) => Some(op.apply(eval_int(a, env)?, eval_int(b, env)?)),
        Expr::Int(_) | Expr::Var | Expr::Neg(_) | Expr::Arith(..) => None,
    }
}

fn eval_int(expr: &Expr, env: &dyn Env) -> Option<i64> {
    match expr {
        Expr::Int(n) => Some(*n),
        Expr::Var => env.value(),
        Expr::Neg(inner) => eval_int(inner, env)?.checked_neg(),
        Expr::Arith(op, a, b) => {
            let lhs = eval_int(a, env)?;
            let rhs = eval_int(b, env)?;
            match op {
                ArithOp::Add => lhs.checked_add(rhs),
                ArithOp::Sub => lhs.checked_sub(rhs),
                ArithOp::Mul => lhs.checked_mul(rhs),
                ArithOp::Div => lhs.checked_div(rhs),
                ArithOp::Rem => lhs.checked_rem(rhs),
            }
        }
        _ => None,
    }
}

#[cfg(test)]
#[path = "tests/expr_tests.rs"]
mod tests;
