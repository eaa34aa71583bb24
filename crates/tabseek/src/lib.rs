//! Tabseek - search, filter, and sort CSV, JSON, and spreadsheet tables.
//!
//! This crate wraps [`tabseek_engine`] with the pieces a command-line tool
//! needs around it:
//!
//! - [`source`]: loading CSV, TSV, JSON, and workbook files into named tables
//! - [`model`]: reading query models from files and flags
//! - [`export`]: rendering results as a table, JSON, YAML, or CSV
//! - [`cli`]: the `tabseek` command
//!
//! ```rust
//! use tabseek::{export, Source};
//! use tabseek_engine::QueryModel;
//!
//! let source = Source::from_delimited("people", "name,age\nAlice,30\nBob,25\n", b',').unwrap();
//! let (_, rows) = source.select(None).unwrap();
//!
//! let outcome = QueryModel::new().sort_asc("age").apply(rows);
//! let csv = export::to_csv(&outcome.result, &outcome.columns()).unwrap();
//! assert_eq!(csv, "\"name\",\"age\"\n\"Bob\",\"25\"\n\"Alice\",\"30\"\n");
//! ```

pub mod cli;
pub mod export;
pub mod model;
pub mod source;

pub use export::{ExportError, Format};
pub use source::{Source, SourceError, SourceFormat, TableSummary};
