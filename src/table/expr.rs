//! Numeric filter expression language.
//!
//! A filter on a numeric column is a boolean expression over the row's value
//! for that column. The value is implicit on the left of a comparison with no
//! left operand, so `>0.15` reads as `value > 0.15`:
//!
//! ```text
//! expr       := or
//! or         := and ("||" and)*
//! and        := not ("&&" not)*
//! not        := "!" not | comparison
//! comparison := relop additive | additive (relop additive)?
//! additive   := term (("+" | "-") term)*
//! term       := unary (("*" | "/") unary)*
//! unary      := "-" unary | atom
//! atom       := number | "value" | "true" | "false" | "(" expr ")"
//! ```

use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::{char, digit0, digit1, multispace0, one_of},
    combinator::{map, map_res, not as nom_not, opt, peek, recognize, value as nom_value},
    multi::many0,
    sequence::{delimited, pair, preceded, terminated},
    IResult,
};
use std::fmt;
use thiserror::Error;

/// Value bound to the implicit variable when validating an expression.
pub const VALIDATION_SENTINEL: f64 = 1.0;

/// Expression parse or evaluation failure
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExprError {
    #[error("{0}")]
    Parse(String),

    #[error("operator {op} cannot be applied to {found}")]
    TypeMismatch { op: &'static str, found: &'static str },
}

/// Result of evaluating an expression
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scalar {
    Number(f64),
    Bool(bool),
}

impl Scalar {
    /// Type name used in error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Scalar::Number(_) => "number",
            Scalar::Bool(_) => "boolean",
        }
    }
}

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    NotEq,
    Lt,
    Lte,
    Gt,
    Gte,
}

/// Arithmetic operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
}

/// Logical operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    And,
    Or,
}

/// Parsed expression tree
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// The row's value for the filtered column
    Value,
    Number(f64),
    Bool(bool),
    Neg(Box<Expr>),
    Not(Box<Expr>),
    Arith {
        op: ArithOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Compare {
        op: CompareOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Logical {
        op: LogicalOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
}

/// Insert a `0` before every decimal point that has no integer part.
pub fn normalize_decimal_points(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    let mut prev: Option<char> = None;
    for c in text.chars() {
        if c == '.' && !prev.is_some_and(|p| p.is_ascii_digit()) {
            out.push('0');
        }
        out.push(c);
        prev = Some(c);
    }
    out
}

/// Parse filter text into an expression tree
pub fn parse_expression(text: &str) -> Result<Expr, ExprError> {
    let normalized = normalize_decimal_points(text);
    let input = normalized.trim();

    if input.is_empty() {
        return Err(ExprError::Parse("empty expression".to_string()));
    }

    match expression(input) {
        Ok((remaining, expr)) => {
            if remaining.trim().is_empty() {
                Ok(expr)
            } else {
                Err(ExprError::Parse(format!("unexpected input: '{}'", remaining.trim())))
            }
        },
        Err(e) => Err(ExprError::Parse(format!("failed to parse expression: {}", e))),
    }
}

impl Expr {
    /// Evaluate with `value` bound to the implicit variable
    pub fn evaluate(&self, value: f64) -> Result<Scalar, ExprError> {
        match self {
            Expr::Value => Ok(Scalar::Number(value)),
            Expr::Number(n) => Ok(Scalar::Number(*n)),
            Expr::Bool(b) => Ok(Scalar::Bool(*b)),
            Expr::Neg(inner) => Ok(Scalar::Number(-number(inner.evaluate(value)?, "-")?)),
            Expr::Not(inner) => Ok(Scalar::Bool(!boolean(inner.evaluate(value)?, "!")?)),
            Expr::Arith { op, left, right } => {
                let symbol = op.symbol();
                let l = number(left.evaluate(value)?, symbol)?;
                let r = number(right.evaluate(value)?, symbol)?;
                Ok(Scalar::Number(match op {
                    ArithOp::Add => l + r,
                    ArithOp::Sub => l - r,
                    ArithOp::Mul => l * r,
                    ArithOp::Div => l / r,
                }))
            },
            Expr::Compare { op, left, right } => {
                let l = left.evaluate(value)?;
                let r = right.evaluate(value)?;
                compare(*op, l, r).map(Scalar::Bool)
            },
            Expr::Logical { op, left, right } => {
                let symbol = op.symbol();
                let l = boolean(left.evaluate(value)?, symbol)?;
                // short-circuit like the surface syntax suggests
                match (op, l) {
                    (LogicalOp::And, false) => Ok(Scalar::Bool(false)),
                    (LogicalOp::Or, true) => Ok(Scalar::Bool(true)),
                    _ => Ok(Scalar::Bool(boolean(right.evaluate(value)?, symbol)?)),
                }
            },
        }
    }

    /// True when the expression holds for `value`; evaluation errors never match
    pub fn matches(&self, value: f64) -> bool {
        matches!(self.evaluate(value), Ok(Scalar::Bool(true)))
    }
}

fn number(s: Scalar, op: &'static str) -> Result<f64, ExprError> {
    match s {
        Scalar::Number(n) => Ok(n),
        other => Err(ExprError::TypeMismatch {
            op,
            found: other.type_name(),
        }),
    }
}

fn boolean(s: Scalar, op: &'static str) -> Result<bool, ExprError> {
    match s {
        Scalar::Bool(b) => Ok(b),
        other => Err(ExprError::TypeMismatch {
            op,
            found: other.type_name(),
        }),
    }
}

fn compare(op: CompareOp, l: Scalar, r: Scalar) -> Result<bool, ExprError> {
    match (l, r) {
        (Scalar::Number(a), Scalar::Number(b)) => Ok(match op {
            CompareOp::Eq => a == b,
            CompareOp::NotEq => a != b,
            CompareOp::Lt => a < b,
            CompareOp::Lte => a <= b,
            CompareOp::Gt => a > b,
            CompareOp::Gte => a >= b,
        }),
        (Scalar::Bool(a), Scalar::Bool(b)) => match op {
            CompareOp::Eq => Ok(a == b),
            CompareOp::NotEq => Ok(a != b),
            _ => Err(ExprError::TypeMismatch {
                op: op.symbol(),
                found: "boolean",
            }),
        },
        _ => Err(ExprError::TypeMismatch {
            op: op.symbol(),
            found: "mixed operands",
        }),
    }
}

impl CompareOp {
    fn symbol(&self) -> &'static str {
        match self {
            CompareOp::Eq => "==",
            CompareOp::NotEq => "!=",
            CompareOp::Lt => "<",
            CompareOp::Lte => "<=",
            CompareOp::Gt => ">",
            CompareOp::Gte => ">=",
        }
    }
}

impl ArithOp {
    fn symbol(&self) -> &'static str {
        match self {
            ArithOp::Add => "+",
            ArithOp::Sub => "-",
            ArithOp::Mul => "*",
            ArithOp::Div => "/",
        }
    }
}

impl LogicalOp {
    fn symbol(&self) -> &'static str {
        match self {
            LogicalOp::And => "&&",
            LogicalOp::Or => "||",
        }
    }
}

/// Parse the whole expression
fn expression(input: &str) -> IResult<&str, Expr> {
    logical_or(input)
}

fn logical_or(input: &str) -> IResult<&str, Expr> {
    let (input, first) = logical_and(input)?;
    let (input, rest) = many0(preceded(preceded(multispace0, tag("||")), logical_and))(input)?;

    Ok((
        input,
        rest.into_iter().fold(first, |acc, right| Expr::Logical {
            op: LogicalOp::Or,
            left: Box::new(acc),
            right: Box::new(right),
        }),
    ))
}

fn logical_and(input: &str) -> IResult<&str, Expr> {
    let (input, first) = logical_not(input)?;
    let (input, rest) = many0(preceded(preceded(multispace0, tag("&&")), logical_not))(input)?;

    Ok((
        input,
        rest.into_iter().fold(first, |acc, right| Expr::Logical {
            op: LogicalOp::And,
            left: Box::new(acc),
            right: Box::new(right),
        }),
    ))
}

/// `!` negation, but not the `!=` operator
fn logical_not(input: &str) -> IResult<&str, Expr> {
    alt((
        map(
            preceded(
                preceded(multispace0, terminated(char('!'), peek(nom_not(char('='))))),
                logical_not,
            ),
            |inner| Expr::Not(Box::new(inner)),
        ),
        comparison,
    ))(input)
}

fn comparison(input: &str) -> IResult<&str, Expr> {
    alt((implicit_comparison, explicit_comparison))(input)
}

/// `>0.15`: the row value is the left operand
fn implicit_comparison(input: &str) -> IResult<&str, Expr> {
    map(pair(preceded(multispace0, compare_op), additive), |(op, right)| Expr::Compare {
        op,
        left: Box::new(Expr::Value),
        right: Box::new(right),
    })(input)
}

fn explicit_comparison(input: &str) -> IResult<&str, Expr> {
    let (input, left) = additive(input)?;
    let (input, tail) = opt(pair(preceded(multispace0, compare_op), additive))(input)?;

    Ok((
        input,
        match tail {
            Some((op, right)) => Expr::Compare {
                op,
                left: Box::new(left),
                right: Box::new(right),
            },
            None => left,
        },
    ))
}

fn compare_op(input: &str) -> IResult<&str, CompareOp> {
    alt((
        nom_value(CompareOp::Eq, tag("==")),
        nom_value(CompareOp::NotEq, tag("!=")),
        nom_value(CompareOp::Gte, tag(">=")),
        nom_value(CompareOp::Lte, tag("<=")),
        nom_value(CompareOp::Gt, tag(">")),
        nom_value(CompareOp::Lt, tag("<")),
    ))(input)
}

fn additive(input: &str) -> IResult<&str, Expr> {
    let (input, first) = term(input)?;
    let (input, rest) = many0(pair(preceded(multispace0, one_of("+-")), term))(input)?;

    Ok((
        input,
        rest.into_iter().fold(first, |acc, (op, right)| Expr::Arith {
            op: if op == '+' { ArithOp::Add } else { ArithOp::Sub },
            left: Box::new(acc),
            right: Box::new(right),
        }),
    ))
}

fn term(input: &str) -> IResult<&str, Expr> {
    let (input, first) = unary(input)?;
    let (input, rest) = many0(pair(preceded(multispace0, one_of("*/")), unary))(input)?;

    Ok((
        input,
        rest.into_iter().fold(first, |acc, (op, right)| Expr::Arith {
            op: if op == '*' { ArithOp::Mul } else { ArithOp::Div },
            left: Box::new(acc),
            right: Box::new(right),
        }),
    ))
}

fn unary(input: &str) -> IResult<&str, Expr> {
    alt((
        map(preceded(preceded(multispace0, char('-')), unary), |inner| {
            Expr::Neg(Box::new(inner))
        }),
        atom,
    ))(input)
}

fn atom(input: &str) -> IResult<&str, Expr> {
    preceded(
        multispace0,
        alt((
            map(number_literal, Expr::Number),
            nom_value(Expr::Bool(true), tag("true")),
            nom_value(Expr::Bool(false), tag("false")),
            nom_value(Expr::Value, tag("value")),
            delimited(char('('), expression, preceded(multispace0, char(')'))),
        )),
    )(input)
}

fn number_literal(input: &str) -> IResult<&str, f64> {
    map_res(recognize(pair(digit1, opt(pair(char('.'), digit0)))), |s: &str| {
        s.parse::<f64>()
    })(input)
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Value => write!(f, "value"),
            Expr::Number(n) => write!(f, "{}", n),
            Expr::Bool(b) => write!(f, "{}", b),
            Expr::Neg(inner) => write!(f, "-{}", inner),
            Expr::Not(inner) => write!(f, "!{}", inner),
            Expr::Arith { op, left, right } => write!(f, "({} {} {})", left, op.symbol(), right),
            Expr::Compare { op, left, right } => write!(f, "{} {} {}", left, op.symbol(), right),
            Expr::Logical { op, left, right } => write!(f, "({} {} {})", left, op.symbol(), right),
        }
    }
}
