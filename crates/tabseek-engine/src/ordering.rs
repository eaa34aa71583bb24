//! Sort specification and the row comparator.
//!
//! Provides [`SortOrder`] for sort direction and [`SortSpec`] for the single
//! column a query sorts by.
//!
//! Cells are read with [`try_parse`] before comparison, so numeric text sorts
//! numerically. Mixed cells still need a consistent order; [`compare_values`]
//! defines a total one: numbers, then text, then nulls.

use std::cmp::{Ordering, Reverse};

use serde::{Deserialize, Serialize};

use crate::coerce::try_parse;
use crate::de;
use crate::record::Record;
use crate::value::Value;

/// Sort direction.
///
/// Parsed case-insensitively. A missing or empty order is ascending; any other
/// unrecognised order is kept as [`SortOrder::Other`] and leaves rows as they are.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "String")]
pub enum SortOrder {
    /// Ascending order (smallest first).
    #[default]
    Asc,
    /// Descending order (largest first).
    Desc,
    /// Unrecognised order. Sorting is a no-op.
    Other(String),
}

impl SortOrder {
    /// Parses an order token, ignoring case.
    ///
    /// Whitespace is significant: `" desc "` is an unrecognised order.
    pub fn parse(token: &str) -> SortOrder {
        if token.is_empty() || token.eq_ignore_ascii_case("asc") {
            SortOrder::Asc
        } else if token.eq_ignore_ascii_case("desc") {
            SortOrder::Desc
        } else {
            SortOrder::Other(token.to_string())
        }
    }

    /// Returns `true` if this is ascending order.
    pub fn is_asc(&self) -> bool {
        matches!(self, SortOrder::Asc)
    }

    /// Returns `true` if this is descending order.
    pub fn is_desc(&self) -> bool {
        matches!(self, SortOrder::Desc)
    }

    /// Applies this direction to an ordering.
    ///
    /// `Other` treats every pair as equal.
    pub fn apply(&self, ordering: Ordering) -> Ordering {
        match self {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
            SortOrder::Other(_) => Ordering::Equal,
        }
    }

    /// Returns the token for this order.
    pub fn as_str(&self) -> &str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
            SortOrder::Other(token) => token,
        }
    }
}

impl From<&str> for SortOrder {
    fn from(token: &str) -> Self {
        SortOrder::parse(token)
    }
}

impl From<Option<String>> for SortOrder {
    fn from(token: Option<String>) -> Self {
        token.as_deref().map_or(SortOrder::Asc, SortOrder::parse)
    }
}

impl From<SortOrder> for String {
    fn from(order: SortOrder) -> Self {
        order.as_str().to_string()
    }
}

impl std::fmt::Display for SortOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The column a query sorts by, and in which direction.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SortSpec {
    /// The column to sort by. Empty disables sorting.
    #[serde(deserialize_with = "de::text")]
    pub column: String,
    /// The sort direction.
    pub order: SortOrder,
}

impl SortSpec {
    /// Creates a new ascending sort on the given column.
    pub fn asc(column: impl Into<String>) -> Self {
        SortSpec::new(column, SortOrder::Asc)
    }

    /// Creates a new descending sort on the given column.
    pub fn desc(column: impl Into<String>) -> Self {
        SortSpec::new(column, SortOrder::Desc)
    }

    /// Creates a new sort with the given direction.
    pub fn new(column: impl Into<String>, order: impl Into<SortOrder>) -> Self {
        SortSpec {
            column: column.into(),
            order: order.into(),
        }
    }

    /// Returns `true` if this sort reorders rows.
    pub fn is_active(&self) -> bool {
        !self.column.is_empty() && !matches!(self.order, SortOrder::Other(_))
    }

    /// Compares two records by this sort.
    pub fn compare(&self, a: &Record, b: &Record) -> Ordering {
        let left = try_parse(a.value(&self.column));
        let right = try_parse(b.value(&self.column));
        self.order.apply(compare_values(&left, &right))
    }
}

/// Compares two cell values.
///
/// Numbers sort before text and nulls sort last. Numbers compare numerically
/// (`-0` equals `0`, NaN after every other number); text compares by code point.
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(a), Value::Number(b)) => normalize(*a).total_cmp(&normalize(*b)),
        (Value::String(a), Value::String(b)) => a.cmp(b),
        _ => rank(a).cmp(&rank(b)),
    }
}

fn rank(value: &Value) -> u8 {
    match value {
        Value::Number(_) => 0,
        Value::String(_) => 1,
        Value::Null => 2,
    }
}

// total_cmp orders -0 before 0 and negative NaN first
fn normalize(n: f64) -> f64 {
    if n == 0.0 {
        0.0
    } else if n.is_nan() {
        f64::NAN
    } else {
        n
    }
}

/// A cell prepared for sorting.
#[derive(Debug, Clone, PartialEq)]
struct SortKey(Value);

impl Eq for SortKey {}

impl PartialOrd for SortKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SortKey {
    fn cmp(&self, other: &Self) -> Ordering {
        compare_values(&self.0, &other.0)
    }
}

/// Sorts rows in place by `spec`.
///
/// The sort is stable: rows whose keys compare equal keep their relative
/// order in both directions. Each cell is coerced once.
pub fn sort_records<R: AsRef<Record>>(rows: &mut [R], spec: &SortSpec) {
    if !spec.is_active() {
        return;
    }
    let key = |row: &R| SortKey(try_parse(row.as_ref().value(&spec.column)));
    match spec.order {
        SortOrder::Asc => rows.sort_by_cached_key(key),
        SortOrder::Desc => rows.sort_by_cached_key(|row| Reverse(key(row))),
        SortOrder::Other(_) => {}
    }
}
