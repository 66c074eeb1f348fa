//! A small recursive-descent parser for arithmetic and single-variable
//! function expressions.
//!
//! Grammar, lowest precedence first:
//!
//! ```text
//! expr    := term (("+" | "-") term)*
//! term    := unary (("*" | "/") unary)*
//! unary   := ("+" | "-") unary | power
//! power   := primary (("^" | "**") unary)?
//! primary := number | "(" expr ")" | name "(" expr ")" | name
//! ```
//!
//! Exponentiation is right-associative and binds tighter than a leading
//! minus, so `-2^2` is `-4`.
//!
//! Names (`x`, `pi`, `e` and the functions in [`Function`]) are only
//! accepted by [`parse_function`]. [`parse_arithmetic`] rejects every
//! letter.

use thiserror::Error;

/// Nesting deeper than this is rejected instead of recursing further.
pub const MAX_DEPTH: usize = 128;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExpressionError {
    #[error("Expression is empty")]
    Empty,

    #[error("Invalid character '{ch}' at position {pos}")]
    InvalidCharacter { ch: char, pos: usize },

    #[error("Invalid number '{0}'")]
    InvalidNumber(String),

    #[error("Unknown name '{0}'")]
    UnknownName(String),

    #[error("Function '{0}' must be followed by '('")]
    MissingArgument(String),

    #[error("Unexpected '{found}' at position {pos}")]
    UnexpectedToken { found: String, pos: usize },

    #[error("Unexpected end of expression")]
    UnexpectedEnd,

    #[error("Expression is nested too deeply")]
    TooDeep,

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Result is not a finite number")]
    NonFinite,
}

/// Functions callable from a function expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Function {
    Sin,
    Cos,
    Tan,
    Exp,
    Log,
    Sqrt,
    Abs,
}

impl Function {
    fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "sin" => Self::Sin,
            "cos" => Self::Cos,
            "tan" => Self::Tan,
            "exp" => Self::Exp,
            "log" => Self::Log,
            "sqrt" => Self::Sqrt,
            "abs" => Self::Abs,
            _ => return None,
        })
    }

    fn apply(self, x: f64) -> f64 {
        match self {
            Self::Sin => x.sin(),
            Self::Cos => x.cos(),
            Self::Tan => x.tan(),
            Self::Exp => x.exp(),
            Self::Log => x.ln(),
            Self::Sqrt => x.sqrt(),
            Self::Abs => x.abs(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

/// A parsed expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    Variable,
    Neg(Box<Expr>),
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
    Call(Function, Box<Expr>),
}

impl Expr {
    /// Evaluates with IEEE semantics: division by zero and domain errors
    /// yield infinities or NaN.
    #[must_use]
    pub fn evaluate(&self, x: f64) -> f64 {
        match self {
            Self::Number(n) => *n,
            Self::Variable => x,
            Self::Neg(inner) => -inner.evaluate(x),
            Self::Binary(op, lhs, rhs) => {
                let (l, r) = (lhs.evaluate(x), rhs.evaluate(x));
                match op {
                    BinaryOp::Add => l + r,
                    BinaryOp::Sub => l - r,
                    BinaryOp::Mul => l * r,
                    BinaryOp::Div => l / r,
                    BinaryOp::Pow => l.powf(r),
                }
            }
            Self::Call(function, arg) => function.apply(arg.evaluate(x)),
        }
    }

    /// Evaluates, failing on division by zero or any non-finite
    /// intermediate value.
    ///
    /// # Errors
    ///
    /// [`ExpressionError::DivisionByZero`] or [`ExpressionError::NonFinite`].
    pub fn evaluate_checked(&self, x: f64) -> Result<f64, ExpressionError> {
        let value = match self {
            Self::Number(n) => *n,
            Self::Variable => x,
            Self::Neg(inner) => -inner.evaluate_checked(x)?,
            Self::Binary(op, lhs, rhs) => {
                let (l, r) = (lhs.evaluate_checked(x)?, rhs.evaluate_checked(x)?);
                match op {
                    BinaryOp::Add => l + r,
                    BinaryOp::Sub => l - r,
                    BinaryOp::Mul => l * r,
                    BinaryOp::Div if r == 0.0 => return Err(ExpressionError::DivisionByZero),
                    BinaryOp::Div => l / r,
                    BinaryOp::Pow => l.powf(r),
                }
            }
            Self::Call(function, arg) => function.apply(arg.evaluate_checked(x)?),
        };

        if value.is_finite() {
            Ok(value)
        } else {
            Err(ExpressionError::NonFinite)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Grammar {
    Arithmetic,
    Function,
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Name(String),
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    LParen,
    RParen,
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Self::Number(n) => n.to_string(),
            Self::Name(name) => name.clone(),
            Self::Plus => "+".to_string(),
            Self::Minus => "-".to_string(),
            Self::Star => "*".to_string(),
            Self::Slash => "/".to_string(),
            Self::Caret => "^".to_string(),
            Self::LParen => "(".to_string(),
            Self::RParen => ")".to_string(),
        }
    }
}

fn tokenize(input: &str, grammar: Grammar) -> Result<Vec<(Token, usize)>, ExpressionError> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let ch = chars[i];
        let start = i;
        let token = match ch {
            c if c.is_whitespace() => {
                i += 1;
                continue;
            }
            '+' => Token::Plus,
            '-' => Token::Minus,
            '*' if chars.get(i + 1) == Some(&'*') => {
                i += 1;
                Token::Caret
            }
            '*' => Token::Star,
            '/' => Token::Slash,
            '^' => Token::Caret,
            '(' => Token::LParen,
            ')' => Token::RParen,
            c if c.is_ascii_digit() || c == '.' => {
                while i + 1 < chars.len()
                    && (chars[i + 1].is_ascii_digit() || chars[i + 1] == '.')
                {
                    i += 1;
                }
                let literal: String = chars[start..=i].iter().collect();
                let value = literal
                    .parse::<f64>()
                    .map_err(|_| ExpressionError::InvalidNumber(literal.clone()))?;
                Token::Number(value)
            }
            c if grammar == Grammar::Function && c.is_ascii_alphabetic() => {
                while i + 1 < chars.len() && chars[i + 1].is_ascii_alphanumeric() {
                    i += 1;
                }
                Token::Name(chars[start..=i].iter().collect())
            }
            ch => return Err(ExpressionError::InvalidCharacter { ch, pos: start }),
        };
        tokens.push((token, start));
        i += 1;
    }

    Ok(tokens)
}

struct Parser {
    tokens: Vec<(Token, usize)>,
    cursor: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.cursor).map(|(t, _)| t)
    }

    fn next(&mut self) -> Option<(Token, usize)> {
        let token = self.tokens.get(self.cursor).cloned();
        if token.is_some() {
            self.cursor += 1;
        }
        token
    }

    fn eat(&mut self, expected: &Token) -> bool {
        if self.peek() == Some(expected) {
            self.cursor += 1;
            true
        } else {
            false
        }
    }

    fn expect_close(&mut self) -> Result<(), ExpressionError> {
        match self.next() {
            Some((Token::RParen, _)) => Ok(()),
            Some((token, pos)) => Err(ExpressionError::UnexpectedToken {
                found: token.describe(),
                pos,
            }),
            None => Err(ExpressionError::UnexpectedEnd),
        }
    }

    fn descend(&mut self) -> Result<(), ExpressionError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(ExpressionError::TooDeep);
        }
        Ok(())
    }

    fn expr(&mut self) -> Result<Expr, ExpressionError> {
        let mut lhs = self.term()?;
        loop {
            let op = if self.eat(&Token::Plus) {
                BinaryOp::Add
            } else if self.eat(&Token::Minus) {
                BinaryOp::Sub
            } else {
                return Ok(lhs);
            };
            let rhs = self.term()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
    }

    fn term(&mut self) -> Result<Expr, ExpressionError> {
        let mut lhs = self.unary()?;
        loop {
            let op = if self.eat(&Token::Star) {
                BinaryOp::Mul
            } else if self.eat(&Token::Slash) {
                BinaryOp::Div
            } else {
                return Ok(lhs);
            };
            let rhs = self.unary()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
    }

    fn unary(&mut self) -> Result<Expr, ExpressionError> {
        self.descend()?;
        let expr = if self.eat(&Token::Minus) {
            Expr::Neg(Box::new(self.unary()?))
        } else if self.eat(&Token::Plus) {
            self.unary()?
        } else {
            self.power()?
        };
        self.depth -= 1;
        Ok(expr)
    }

    fn power(&mut self) -> Result<Expr, ExpressionError> {
        let base = self.primary()?;
        if self.eat(&Token::Caret) {
            let exponent = self.unary()?;
            return Ok(Expr::Binary(BinaryOp::Pow, Box::new(base), Box::new(exponent)));
        }
        Ok(base)
    }

    fn primary(&mut self) -> Result<Expr, ExpressionError> {
        match self.next() {
            Some((Token::Number(n), _)) => Ok(Expr::Number(n)),
            Some((Token::LParen, _)) => {
                self.descend()?;
                let inner = self.expr()?;
                self.expect_close()?;
                self.depth -= 1;
                Ok(inner)
            }
            Some((Token::Name(name), _)) => self.name(name),
            Some((token, pos)) => Err(ExpressionError::UnexpectedToken {
                found: token.describe(),
                pos,
            }),
            None => Err(ExpressionError::UnexpectedEnd),
        }
    }

    fn name(&mut self, name: String) -> Result<Expr, ExpressionError> {
        match name.as_str() {
            "x" => return Ok(Expr::Variable),
            "pi" => return Ok(Expr::Number(std::f64::consts::PI)),
            "e" => return Ok(Expr::Number(std::f64::consts::E)),
            _ => {}
        }

        let function = Function::from_name(&name)
            .ok_or_else(|| ExpressionError::UnknownName(name.clone()))?;
        if !self.eat(&Token::LParen) {
            return Err(ExpressionError::MissingArgument(name));
        }
        self.descend()?;
        let arg = self.expr()?;
        self.expect_close()?;
        self.depth -= 1;
        Ok(Expr::Call(function, Box::new(arg)))
    }
}

fn parse(input: &str, grammar: Grammar) -> Result<Expr, ExpressionError> {
    let tokens = tokenize(input, grammar)?;
    if tokens.is_empty() {
        return Err(ExpressionError::Empty);
    }

    let mut parser = Parser {
        tokens,
        cursor: 0,
        depth: 0,
    };
    let expr = parser.expr()?;
    match parser.next() {
        None => Ok(expr),
        Some((token, pos)) => Err(ExpressionError::UnexpectedToken {
            found: token.describe(),
            pos,
        }),
    }
}

/// Parses a constant expression of numbers and operators.
///
/// # Errors
///
/// Fails on any letter or other disallowed character, and on malformed
/// syntax.
pub fn parse_arithmetic(input: &str) -> Result<Expr, ExpressionError> {
    parse(input, Grammar::Arithmetic)
}

/// Parses an expression in `x` that may use `pi`, `e` and the functions
/// `sin cos tan exp log sqrt abs`.
///
/// # Errors
///
/// Fails on unknown names and malformed syntax.
pub fn parse_function(input: &str) -> Result<Expr, ExpressionError> {
    parse(input, Grammar::Function)
}
