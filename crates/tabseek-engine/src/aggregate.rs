//! Column aggregates.
//!
//! A filter operand may be an aggregate over a column (`AVG(salary)`) rather
//! than the current row's cell. Aggregates are computed over the aggregation
//! domain: the dataset after search and before filtering.

use serde::{Deserialize, Serialize};

use crate::coerce::parse_float;
use crate::record::Record;
use crate::value::Value;

/// Aggregate function applied to a column.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Aggregate {
    /// Smallest numeric value.
    Min,
    /// Largest numeric value.
    Max,
    /// Sum of numeric values.
    Sum,
    /// Arithmetic mean of numeric values.
    Avg,
    /// Unrecognised function name. Always yields `Null`.
    Unsupported(String),
}

impl Aggregate {
    /// Parses an aggregate name, ignoring case.
    ///
    /// Returns `None` for an empty token, which means "no aggregate".
    pub fn parse(token: &str) -> Option<Aggregate> {
        let token = token.trim();
        if token.is_empty() {
            return None;
        }
        let aggregate = match token.to_ascii_uppercase().as_str() {
            "MIN" => Aggregate::Min,
            "MAX" => Aggregate::Max,
            "SUM" => Aggregate::Sum,
            "AVG" => Aggregate::Avg,
            _ => Aggregate::Unsupported(token.to_string()),
        };
        Some(aggregate)
    }

    /// Returns the canonical name of this aggregate.
    pub fn as_str(&self) -> &str {
        match self {
            Aggregate::Min => "MIN",
            Aggregate::Max => "MAX",
            Aggregate::Sum => "SUM",
            Aggregate::Avg => "AVG",
            Aggregate::Unsupported(name) => name,
        }
    }

    /// Computes this aggregate over `column` across `domain`.
    ///
    /// Each cell is read with [`parse_float`] and non-numeric cells are
    /// skipped. When no numeric value remains the result is `Null`.
    ///
    /// ```
    /// use tabseek_engine::{record, Aggregate, Value};
    ///
    /// let rows = vec![record! { "v" => 10 }, record! { "v" => "20" }, record! { "v" => "n/a" }];
    ///
    /// assert_eq!(Aggregate::Avg.compute(&rows, "v"), Value::Number(15.0));
    /// assert_eq!(Aggregate::Max.compute(&rows, "missing"), Value::Null);
    /// ```
    pub fn compute<'a, I>(&self, domain: I, column: &str) -> Value
    where
        I: IntoIterator<Item = &'a Record>,
    {
        if let Aggregate::Unsupported(_) = self {
            return Value::Null;
        }

        let column = column.trim();
        let values: Vec<f64> = domain
            .into_iter()
            .filter_map(|row| parse_float(row.value(column)))
            .collect();

        if values.is_empty() {
            return Value::Null;
        }

        let result = match self {
            Aggregate::Min => values.iter().copied().fold(f64::INFINITY, f64::min),
            Aggregate::Max => values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            Aggregate::Sum => values.iter().sum(),
            Aggregate::Avg => values.iter().sum::<f64>() / values.len() as f64,
            Aggregate::Unsupported(_) => return Value::Null,
        };
        Value::Number(result)
    }
}

impl From<String> for Aggregate {
    fn from(token: String) -> Self {
        Aggregate::parse(&token).unwrap_or(Aggregate::Unsupported(token))
    }
}

impl From<Aggregate> for String {
    fn from(aggregate: Aggregate) -> Self {
        aggregate.as_str().to_string()
    }
}

impl std::fmt::Display for Aggregate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Serde adapter for an optional aggregate stored as a token.
///
/// The empty string, `null`, and a missing field all mean "no aggregate".
pub(crate) mod token {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::Aggregate;

    pub fn serialize<S: Serializer>(
        aggregate: &Option<Aggregate>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(aggregate.as_ref().map_or("", Aggregate::as_str))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Aggregate>, D::Error> {
        let token = Option::<String>::deserialize(deserializer)?;
        Ok(token.as_deref().and_then(Aggregate::parse))
    }
}
