//! Comparison operators for filter conditions.
//!
//! The [`Op`] enum covers the six operators a filter condition can use.
//! Operators arrive as text tokens (`"="`, `">="`, ...) from the calling
//! layer; a token that is not recognised is kept as [`Op::Unknown`] and
//! never matches.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::coerce::parse_float;
use crate::value::Value;

/// Comparison operator for a filter condition.
///
/// - **Equality**: `Eq`, `Ne` use loose equality on the raw values.
/// - **Relational**: `Gt`, `Lt`, `Gte`, `Lte` read both sides as numbers
///   first and are false when either side is not numeric.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "String")]
pub enum Op {
    /// Loosely equal (`=`).
    Eq,
    /// Loosely not equal (`!=`).
    Ne,
    /// Greater than (`>`).
    Gt,
    /// Less than (`<`).
    Lt,
    /// Greater than or equal (`>=`).
    Gte,
    /// Less than or equal (`<=`).
    Lte,
    /// Unrecognised token. Conditions using it are always false.
    Unknown(String),
}

impl Op {
    /// Parses an operator token.
    pub fn parse(token: &str) -> Op {
        match token {
            "=" => Op::Eq,
            "!=" => Op::Ne,
            ">" => Op::Gt,
            "<" => Op::Lt,
            ">=" => Op::Gte,
            "<=" => Op::Lte,
            other => Op::Unknown(other.to_string()),
        }
    }

    /// Returns `true` for the numeric operators `>`, `<`, `>=`, `<=`.
    pub fn is_relational(&self) -> bool {
        matches!(self, Op::Gt | Op::Lt | Op::Gte | Op::Lte)
    }

    /// Evaluates a relational operator given an ordering result.
    pub fn eval_ordering(&self, ordering: Ordering) -> bool {
        match self {
            Op::Gt => ordering == Ordering::Greater,
            Op::Gte => ordering != Ordering::Less,
            Op::Lt => ordering == Ordering::Less,
            Op::Lte => ordering != Ordering::Greater,
            _ => false, // Not an ordering-based operator
        }
    }

    /// Compares two resolved operands.
    ///
    /// ```
    /// use tabseek_engine::{Op, Value};
    ///
    /// assert!(Op::Eq.eval(&Value::from("5"), &Value::from(5)));
    /// assert!(Op::Gt.eval(&Value::from("30"), &Value::from(20)));
    /// assert!(!Op::Gt.eval(&Value::from("n/a"), &Value::from(20)));
    /// ```
    pub fn eval(&self, left: &Value, right: &Value) -> bool {
        match self {
            Op::Eq => left.loose_eq(right),
            Op::Ne => !left.loose_eq(right),
            Op::Gt | Op::Lt | Op::Gte | Op::Lte => match (parse_float(left), parse_float(right)) {
                (Some(a), Some(b)) => a
                    .partial_cmp(&b)
                    .is_some_and(|ordering| self.eval_ordering(ordering)),
                _ => false,
            },
            Op::Unknown(_) => false,
        }
    }

    /// Returns the token for this operator.
    pub fn as_str(&self) -> &str {
        match self {
            Op::Eq => "=",
            Op::Ne => "!=",
            Op::Gt => ">",
            Op::Lt => "<",
            Op::Gte => ">=",
            Op::Lte => "<=",
            Op::Unknown(token) => token,
        }
    }
}

/// An absent operator is an unrecognised one.
impl Default for Op {
    fn default() -> Self {
        Op::Unknown(String::new())
    }
}

impl From<&str> for Op {
    fn from(token: &str) -> Self {
        Op::parse(token)
    }
}

impl From<Option<String>> for Op {
    fn from(token: Option<String>) -> Self {
        token.map_or_else(Op::default, |t| Op::parse(&t))
    }
}

impl From<Op> for String {
    fn from(op: Op) -> Self {
        op.as_str().to_string()
    }
}

impl std::fmt::Display for Op {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
