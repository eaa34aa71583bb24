//! Search terms.
//!
//! A [`SearchTerm`] is a case-insensitive substring match against one column.
//! Several terms are conjunctive: a record survives only if every term
//! matches.

use serde::{Deserialize, Serialize};

use crate::de;
use crate::record::Record;

/// Case-insensitive substring match against one column.
///
/// # Example
///
/// ```
/// use tabseek_engine::{record, SearchTerm};
///
/// let term = SearchTerm::new("name", "ali");
/// assert!(term.matches(&record! { "name" => "Alice" }));
/// assert!(!term.matches(&record! { "name" => "bob" }));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchTerm {
    /// The column to search.
    #[serde(deserialize_with = "de::text")]
    pub column: String,
    /// The text to look for.
    #[serde(deserialize_with = "de::text")]
    pub value: String,
}

impl SearchTerm {
    /// Creates a new search term.
    pub fn new(column: impl Into<String>, value: impl Into<String>) -> Self {
        SearchTerm {
            column: column.into(),
            value: value.into(),
        }
    }

    /// Returns `true` if the record's cell contains this term's value.
    ///
    /// Both sides are lower-cased and trimmed. An absent cell reads as the
    /// empty string, so it only matches an empty search value.
    pub fn matches(&self, record: &Record) -> bool {
        Needle::new(self).matches(record)
    }
}

/// A search term with its needle normalised once.
pub(crate) struct Needle<'a> {
    column: &'a str,
    needle: String,
}

impl<'a> Needle<'a> {
    pub(crate) fn new(term: &'a SearchTerm) -> Self {
        Needle {
            column: &term.column,
            needle: normalize(&term.value),
        }
    }

    pub(crate) fn matches(&self, record: &Record) -> bool {
        normalize(&record.value(self.column).to_text()).contains(&self.needle)
    }
}

fn normalize(text: &str) -> String {
    text.to_lowercase().trim().to_string()
}

/// Returns `true` if every term matches the record.
pub fn matches_all(terms: &[SearchTerm], record: &Record) -> bool {
    terms.iter().all(|term| term.matches(record))
}
