//! Filter conditions and the AND/OR fold.
//!
//! A [`FilterCondition`] compares a left operand with a right operand:
//!
//! - An operand names a column, optionally wrapped in an [`Aggregate`]. A bare
//!   column reads the current record's cell; an aggregated column is computed
//!   once over the aggregation domain, so `salary > AVG(salary)` compares each
//!   row against the whole dataset.
//! - When the right side names neither a column nor an aggregate, the literal
//!   `right_value` is used, read with [`try_parse`].
//!
//! Conditions combine in a strict left-to-right fold. The first condition's
//! result seeds the accumulator and each later condition folds in with its
//! own [`Logic`]; there is no precedence and no grouping.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::aggregate::{self, Aggregate};
use crate::coerce::try_parse;
use crate::de;
use crate::op::Op;
use crate::record::Record;
use crate::value::Value;

/// How a condition folds into the running result.
///
/// Parsed case-insensitively; anything other than `OR` is `AND`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "String")]
pub enum Logic {
    /// `accumulator && condition`
    #[default]
    And,
    /// `accumulator || condition`
    Or,
}

impl Logic {
    /// Parses a logic token.
    pub fn parse(token: &str) -> Logic {
        if token.eq_ignore_ascii_case("OR") {
            Logic::Or
        } else {
            Logic::And
        }
    }

    /// Combines the accumulator with a condition result.
    pub fn combine(self, acc: bool, ok: bool) -> bool {
        match self {
            Logic::And => acc && ok,
            Logic::Or => acc || ok,
        }
    }

    /// Returns the token for this logic.
    pub fn as_str(self) -> &'static str {
        match self {
            Logic::And => "AND",
            Logic::Or => "OR",
        }
    }
}

impl From<Option<String>> for Logic {
    fn from(token: Option<String>) -> Self {
        token.as_deref().map_or(Logic::And, Logic::parse)
    }
}

impl From<Logic> for String {
    fn from(logic: Logic) -> Self {
        logic.as_str().to_string()
    }
}

impl std::fmt::Display for Logic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single filter condition.
///
/// Field names follow the calling layer's model (`leftAgg`, `leftCol`, `op`,
/// `rightAgg`, `rightCol`, `rightValue`, `logic`); every field is optional
/// when decoding.
///
/// # Example
///
/// ```
/// use tabseek_engine::{record, Aggregate, FilterCondition, Op};
///
/// let rows = vec![record! { "v" => 10 }, record! { "v" => 20 }, record! { "v" => 30 }];
/// let above_average = FilterCondition::new("v", Op::Gt, "").right_agg(Aggregate::Avg, "v");
///
/// assert!(above_average.evaluate(&rows[2], &rows));
/// assert!(!above_average.evaluate(&rows[1], &rows));
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterCondition {
    /// Fold logic. Ignored on the first condition.
    pub logic: Logic,
    /// Aggregate applied to the left column, if any.
    #[serde(with = "aggregate::token")]
    pub left_agg: Option<Aggregate>,
    /// Left column. Empty means `Null`.
    #[serde(deserialize_with = "de::text")]
    pub left_col: String,
    /// Comparison operator.
    pub op: Op,
    /// Aggregate applied to the right column, if any.
    #[serde(with = "aggregate::token")]
    pub right_agg: Option<Aggregate>,
    /// Right column. When both this and `right_agg` are unset, `right_value` is used.
    #[serde(deserialize_with = "de::text")]
    pub right_col: String,
    /// Literal right operand.
    #[serde(deserialize_with = "de::text")]
    pub right_value: String,
}

impl FilterCondition {
    /// Creates a condition comparing a column with a literal.
    pub fn new(left_col: impl Into<String>, op: impl Into<Op>, right_value: impl Into<String>) -> Self {
        FilterCondition {
            left_col: left_col.into(),
            op: op.into(),
            right_value: right_value.into(),
            ..FilterCondition::default()
        }
    }

    /// Creates a condition comparing two columns of the same record.
    pub fn columns(left_col: impl Into<String>, op: impl Into<Op>, right_col: impl Into<String>) -> Self {
        FilterCondition {
            left_col: left_col.into(),
            op: op.into(),
            right_col: right_col.into(),
            ..FilterCondition::default()
        }
    }

    /// Sets the fold logic.
    pub fn logic(mut self, logic: Logic) -> Self {
        self.logic = logic;
        self
    }

    /// Wraps the left column in an aggregate.
    pub fn left_agg(mut self, aggregate: Aggregate) -> Self {
        self.left_agg = Some(aggregate);
        self
    }

    /// Makes the right operand an aggregate over `column`.
    pub fn right_agg(mut self, aggregate: Aggregate, column: impl Into<String>) -> Self {
        self.right_agg = Some(aggregate);
        self.right_col = column.into();
        self
    }

    /// Returns `true` if the right operand is a column or aggregate rather than the literal.
    pub fn has_right_operand(&self) -> bool {
        self.right_agg.is_some() || !self.right_col.is_empty()
    }

    /// Evaluates this condition alone for `record`, with aggregates computed over `domain`.
    pub fn evaluate(&self, record: &Record, domain: &[Record]) -> bool {
        Predicate::compile(self, domain).matches(record)
    }
}

/// An operand resolved against the aggregation domain.
#[derive(Debug)]
enum Operand<'m> {
    /// The current record's cell.
    Cell(&'m str),
    /// A value that does not depend on the record.
    Fixed(Value),
}

impl<'m> Operand<'m> {
    fn resolve<'r>(&'r self, record: &'r Record) -> &'r Value {
        match self {
            Operand::Cell(column) => record.value(column),
            Operand::Fixed(value) => value,
        }
    }
}

/// A condition compiled for one evaluation.
///
/// Aggregates do not depend on the current record, so they are computed once
/// per query rather than once per row.
#[derive(Debug)]
pub(crate) struct Predicate<'m> {
    logic: Logic,
    op: &'m Op,
    left: Operand<'m>,
    right: Operand<'m>,
}

impl<'m> Predicate<'m> {
    pub(crate) fn compile<'a, I>(condition: &'m FilterCondition, domain: I) -> Self
    where
        I: IntoIterator<Item = &'a Record> + Clone,
    {
        let left = operand(condition.left_agg.as_ref(), &condition.left_col, domain.clone());
        let right = if condition.has_right_operand() {
            operand(condition.right_agg.as_ref(), &condition.right_col, domain)
        } else {
            Operand::Fixed(try_parse(&Value::String(condition.right_value.clone())))
        };

        Predicate {
            logic: condition.logic,
            op: &condition.op,
            left,
            right,
        }
    }

    pub(crate) fn matches(&self, record: &Record) -> bool {
        self.op
            .eval(self.left.resolve(record), self.right.resolve(record))
    }
}

fn operand<'m, 'a, I>(aggregate: Option<&Aggregate>, column: &'m str, domain: I) -> Operand<'m>
where
    I: IntoIterator<Item = &'a Record>,
{
    if column.is_empty() {
        return Operand::Fixed(Value::Null);
    }
    match aggregate {
        None => Operand::Cell(column),
        Some(aggregate) => {
            let value = aggregate.compute(domain, column);
            trace!(%aggregate, column, %value, "aggregate");
            Operand::Fixed(value)
        }
    }
}

/// Folds compiled predicates left to right for one record.
///
/// The first result seeds the accumulator; its logic is ignored.
pub(crate) fn fold(predicates: &[Predicate<'_>], record: &Record) -> bool {
    predicates
        .iter()
        .enumerate()
        .fold(true, |acc, (idx, predicate)| {
            let ok = predicate.matches(record);
            if idx == 0 {
                ok
            } else {
                predicate.logic.combine(acc, ok)
            }
        })
}
