//! Tabseek engine - in-memory query engine for row datasets.
//!
//! A dataset is an ordered list of [`Record`]s, each mapping column names to
//! scalar [`Value`]s. A [`QueryModel`] describes what to do with it:
//!
//! - **Search**: case-insensitive substring terms, all of which must match
//! - **Filter**: conditions folded left to right with AND/OR, whose operands
//!   may be cells, literals, or `MIN`/`MAX`/`SUM`/`AVG` aggregates
//! - **Sort**: one column, ascending or descending, numeric text sorted as numbers
//!
//! # Quick Start
//!
//! ```rust
//! use tabseek_engine::{apply_query, record, Aggregate, FilterCondition, QueryModel};
//!
//! let rows = vec![
//!     record! { "name" => "Alice", "salary" => "120" },
//!     record! { "name" => "Bob", "salary" => "80" },
//!     record! { "name" => "Alina", "salary" => "95" },
//! ];
//!
//! // Rows earning more than the average, highest first
//! let model = QueryModel::new()
//!     .filter(FilterCondition::new("salary", ">", "").right_agg(Aggregate::Avg, "salary"))
//!     .sort_desc("salary");
//!
//! let outcome = apply_query(&rows, &model);
//! assert_eq!(outcome.len(), 1);
//! assert_eq!(outcome.result[0].value("name").to_text(), "Alice");
//!
//! // The input is never modified
//! assert_eq!(rows[1].value("name").to_text(), "Bob");
//! ```
//!
//! # Pipeline
//!
//! Stages always run in the same order:
//!
//! ```text
//! rows ─► search ─► filter ─► sort ─► result
//!                 ▲
//!                 └─ aggregation domain
//! ```
//!
//! Aggregates see the rows that survived search, never the partially filtered
//! set, so a condition's aggregate does not depend on the conditions before it.
//!
//! # Comparison Rules
//!
//! | Operator | Behaviour |
//! |----------|-----------|
//! | `=`, `!=` | Loose equality: `"5" = 5`, `"" = 0`, null only equals null |
//! | `>`, `<`, `>=`, `<=` | Both sides read as leading numbers, false if either is not numeric |
//! | anything else | Never matches |

mod aggregate;
mod coerce;
mod de;
mod error;
mod filter;
mod op;
mod ordering;
mod query;
mod record;
mod search;
mod value;

// Re-export public API
pub use aggregate::Aggregate;
pub use coerce::{parse_float, string_to_number, try_parse};
pub use error::{ModelError, Result};
pub use filter::{FilterCondition, Logic};
pub use op::Op;
pub use ordering::{compare_values, sort_records, SortOrder, SortSpec};
pub use query::{apply_query, QueryModel, QueryOutcome};
pub use record::{columns, Dataset, Record};
pub use search::{matches_all, SearchTerm};
pub use value::Value;
