//! Loading datasets from files.
//!
//! A [`Source`] is the set of named tables found in one file:
//!
//! - **CSV / TSV**: one table named after the file stem. The first line is the
//!   header; empty lines are skipped. Every cell is text.
//! - **JSON**: either an array of objects (one table named after the file stem)
//!   or an object mapping table names to arrays of objects.
//! - **Workbooks** (`xls`, `xlsx`, `xlsm`, `xlsb`, `ods`): one table per sheet,
//!   in sheet order. The first row is the header and empty cells are left out.

use std::collections::HashMap;
use std::path::Path;

use calamine::{open_workbook_auto, Data, DataType, Range, Reader};
use serde::Serialize;
use serde_json::Value as JsonValue;
use tabseek_engine::{Dataset, Record, Value};
use thiserror::Error;
use tracing::debug;

/// Errors that can occur while loading a source.
#[derive(Debug, Error)]
pub enum SourceError {
    /// IO error from std::io
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV parsing error
    #[error("CSV parse error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON parsing error
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Spreadsheet reading error
    #[error("workbook error: {0}")]
    Workbook(#[from] calamine::Error),

    /// The file extension is not one we can read
    #[error("unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// The document parsed but is not a table
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// A table was requested that the source does not have
    #[error("no table named '{0}'")]
    UnknownTable(String),

    /// The source has no tables at all
    #[error("source has no tables")]
    NoTables,
}

/// Result type alias for source loading.
pub type Result<T> = std::result::Result<T, SourceError>;

/// File formats a source can be read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// Comma-separated values.
    Csv,
    /// Tab-separated values.
    Tsv,
    /// JSON rows or tables.
    Json,
    /// Spreadsheet workbook.
    Workbook,
}

impl SourceFormat {
    /// Picks a format from a file extension, ignoring case.
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        match extension.as_str() {
            "csv" => Ok(SourceFormat::Csv),
            "tsv" | "tab" => Ok(SourceFormat::Tsv),
            "json" => Ok(SourceFormat::Json),
            "xls" | "xlsx" | "xlsm" | "xlsb" | "ods" => Ok(SourceFormat::Workbook),
            "" => Err(SourceError::UnsupportedFormat(path.display().to_string())),
            other => Err(SourceError::UnsupportedFormat(format!(".{other}"))),
        }
    }

    fn delimiter(self) -> u8 {
        match self {
            SourceFormat::Tsv => b'\t',
            _ => b',',
        }
    }
}

/// Named tables loaded from one file, in file order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Source {
    /// Table names in the order they appear.
    pub tables: Vec<String>,
    /// Rows of each table.
    pub data: HashMap<String, Dataset>,
}

impl Source {
    /// Loads a file, choosing the format from its extension.
    pub fn load(path: &Path) -> Result<Self> {
        let format = SourceFormat::from_path(path)?;
        let name = table_name(path);

        let source = match format {
            SourceFormat::Csv | SourceFormat::Tsv => {
                let content = std::fs::read_to_string(path)?;
                Source::from_delimited(&name, &content, format.delimiter())?
            }
            SourceFormat::Json => Source::from_json(&name, &std::fs::read_to_string(path)?)?,
            SourceFormat::Workbook => Source::from_workbook(path)?,
        };
        debug!(path = %path.display(), tables = source.tables.len(), "loaded source");
        Ok(source)
    }

    /// Parses delimited text into a single table called `name`.
    ///
    /// Rows shorter than the header leave the trailing columns absent; cells
    /// beyond the header are dropped.
    pub fn from_delimited(name: &str, content: &str, delimiter: u8) -> Result<Self> {
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .flexible(true)
            .from_reader(content.as_bytes());

        let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        let mut rows = Dataset::new();
        for record in reader.records() {
            let record = record?;
            if is_blank(&record) {
                continue;
            }
            rows.push(
                headers
                    .iter()
                    .zip(record.iter())
                    .map(|(column, cell)| (column.as_str(), cell))
                    .collect(),
            );
        }

        debug!(table = name, columns = headers.len(), rows = rows.len(), "parsed delimited table");
        Ok(Source::single(name, rows))
    }

    /// Parses a JSON document.
    ///
    /// An array becomes one table called `name`. An object becomes one table
    /// per key, each of which must hold an array.
    pub fn from_json(name: &str, content: &str) -> Result<Self> {
        let document: JsonValue = serde_json::from_str(content)?;

        match document {
            JsonValue::Array(items) => Ok(Source::single(name, json_rows(name, items)?)),
            JsonValue::Object(tables) => {
                let mut source = Source::default();
                for (table, value) in tables {
                    let JsonValue::Array(items) = value else {
                        return Err(SourceError::InvalidData(format!(
                            "table '{table}' is not an array of objects"
                        )));
                    };
                    let rows = json_rows(&table, items)?;
                    source.push(table, rows);
                }
                Ok(source)
            }
            _ => Err(SourceError::InvalidData(
                "expected an array of objects or an object of tables".to_string(),
            )),
        }
    }

    /// Reads every sheet of a workbook, one table per sheet.
    pub fn from_workbook(path: &Path) -> Result<Self> {
        let mut workbook = open_workbook_auto(path)?;
        let mut source = Source::default();
        for sheet in workbook.sheet_names().to_vec() {
            let range = workbook.worksheet_range(&sheet)?;
            let rows = sheet_rows(&range);
            source.push(sheet, rows);
        }
        Ok(source)
    }

    fn single(name: &str, rows: Dataset) -> Self {
        let mut source = Source::default();
        source.push(name.to_string(), rows);
        source
    }

    fn push(&mut self, name: String, rows: Dataset) {
        debug!(table = %name, rows = rows.len(), "table");
        if self.data.insert(name.clone(), rows).is_none() {
            self.tables.push(name);
        }
    }

    /// Returns the rows of a table.
    pub fn table(&self, name: &str) -> Option<&Dataset> {
        self.data.get(name)
    }

    /// Returns the first table and its name.
    pub fn first_table(&self) -> Option<(&str, &Dataset)> {
        let name = self.tables.first()?;
        self.data.get(name).map(|rows| (name.as_str(), rows))
    }

    /// Lists each table with its row count, in table order.
    pub fn summaries(&self) -> Vec<TableSummary> {
        self.tables
            .iter()
            .map(|name| TableSummary {
                name: name.clone(),
                rows: self.table(name).map_or(0, Vec::len),
            })
            .collect()
    }

    /// Picks the named table, or the first one when no name is given.
    pub fn select(&self, name: Option<&str>) -> Result<(&str, &Dataset)> {
        match name {
            Some(name) => self
                .data
                .get_key_value(name)
                .map(|(name, rows)| (name.as_str(), rows))
                .ok_or_else(|| SourceError::UnknownTable(name.to_string())),
            None => self.first_table().ok_or(SourceError::NoTables),
        }
    }
}

/// A table name and its row count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableSummary {
    pub name: String,
    pub rows: usize,
}

/// Table name for a single-table file: the file name without its extension.
fn table_name(path: &Path) -> String {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("Data")
        .to_string()
}

fn is_blank(record: &csv::StringRecord) -> bool {
    record.len() == 1 && record.get(0).is_some_and(str::is_empty)
}

fn sheet_rows(range: &Range<Data>) -> Dataset {
    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        return Dataset::new();
    };
    let headers = header_names(header);

    rows.filter_map(|cells| {
        let record: Record = headers
            .iter()
            .zip(cells)
            .filter_map(|(column, cell)| sheet_cell(cell).map(|value| (column.as_str(), value)))
            .collect();
        (!record.is_empty()).then_some(record)
    })
    .collect()
}

/// Header names for a sheet. Blank headers become `__EMPTY` and repeats get a
/// numeric suffix, so every column keeps its own key.
fn header_names(cells: &[Data]) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    cells
        .iter()
        .map(|cell| {
            let base = if cell.is_empty() {
                "__EMPTY".to_string()
            } else {
                cell.to_string()
            };
            let count = seen.entry(base.clone()).or_insert(0);
            let name = if *count == 0 {
                base
            } else {
                format!("{base}_{count}")
            };
            *count += 1;
            name
        })
        .collect()
}

fn sheet_cell(cell: &Data) -> Option<Value> {
    match cell {
        Data::Empty => None,
        Data::String(text) => Some(Value::String(text.clone())),
        Data::Float(n) => Some(Value::Number(*n)),
        Data::Int(n) => Some(Value::Number(*n as f64)),
        Data::Bool(b) => Some(Value::String(b.to_string())),
        // date serials stay numeric
        Data::DateTime(_) => cell.as_f64().map(Value::Number),
        other => Some(Value::String(other.to_string())),
    }
}

fn json_rows(table: &str, items: Vec<JsonValue>) -> Result<Dataset> {
    items
        .into_iter()
        .enumerate()
        .map(|(idx, item)| match item {
            JsonValue::Object(fields) => fields
                .into_iter()
                .map(|(column, value)| Ok((column, json_cell(value)?)))
                .collect::<Result<Record>>(),
            other => Err(SourceError::InvalidData(format!(
                "table '{table}' row {}: expected an object, found {}",
                idx + 1,
                json_kind(&other)
            ))),
        })
        .collect()
}

fn json_cell(value: JsonValue) -> Result<Value> {
    match value {
        JsonValue::Array(_) | JsonValue::Object(_) => Ok(Value::String(value.to_string())),
        scalar => Ok(serde_json::from_value(scalar)?),
    }
}

fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "an array",
        JsonValue::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tabseek_engine::record;

    #[test]
    fn format_from_extension() {
        assert_eq!(SourceFormat::from_path(Path::new("a.csv")).unwrap(), SourceFormat::Csv);
        assert_eq!(SourceFormat::from_path(Path::new("a.CSV")).unwrap(), SourceFormat::Csv);
        assert_eq!(SourceFormat::from_path(Path::new("a.tsv")).unwrap(), SourceFormat::Tsv);
        assert_eq!(SourceFormat::from_path(Path::new("a.json")).unwrap(), SourceFormat::Json);
        assert_eq!(
            SourceFormat::from_path(Path::new("book.XLSX")).unwrap(),
            SourceFormat::Workbook
        );
        assert_eq!(SourceFormat::from_path(Path::new("old.xls")).unwrap(), SourceFormat::Workbook);
        assert!(matches!(
            SourceFormat::from_path(Path::new("notes.txt")),
            Err(SourceError::UnsupportedFormat(ext)) if ext == ".txt"
        ));
        assert!(SourceFormat::from_path(Path::new("README")).is_err());
    }

    #[test]
    fn csv_header_and_rows() {
        let source = Source::from_delimited("people", "name,age\nAlice,30\nBob,25\n", b',').unwrap();

        assert_eq!(source.tables, vec!["people"]);
        let rows = source.table("people").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], record! { "name" => "Alice", "age" => "30" });
        assert_eq!(rows[1].columns().collect::<Vec<_>>(), vec!["name", "age"]);
    }

    #[test]
    fn csv_skips_empty_lines() {
        let source = Source::from_delimited("t", "a,b\n\n1,2\n\n3,4\n", b',').unwrap();
        assert_eq!(source.table("t").unwrap().len(), 2);
    }

    #[test]
    fn csv_keeps_empty_cells() {
        let source = Source::from_delimited("t", "a,b\n,2\n", b',').unwrap();
        let row = &source.table("t").unwrap()[0];
        assert_eq!(row.get("a"), Some(&Value::from("")));
    }

    #[test]
    fn csv_ragged_rows() {
        let source = Source::from_delimited("t", "a,b,c\n1\n1,2,3,4\n", b',').unwrap();
        let rows = source.table("t").unwrap();

        assert_eq!(rows[0], record! { "a" => "1" });
        assert!(!rows[0].contains("b"));
        assert_eq!(rows[1], record! { "a" => "1", "b" => "2", "c" => "3" });
    }

    #[test]
    fn csv_quoted_cells() {
        let source =
            Source::from_delimited("t", "name,note\n\"Smith, J\",\"said \"\"hi\"\"\"\n", b',')
                .unwrap();
        let row = &source.table("t").unwrap()[0];
        assert_eq!(row.value("name"), &Value::from("Smith, J"));
        assert_eq!(row.value("note"), &Value::from("said \"hi\""));
    }

    #[test]
    fn csv_strips_byte_order_mark() {
        let source = Source::from_delimited("t", "\u{feff}id\n1\n", b',').unwrap();
        assert_eq!(source.table("t").unwrap()[0].value("id"), &Value::from("1"));
    }

    #[test]
    fn tsv_rows() {
        let source = Source::from_delimited("t", "a\tb\n1\t2\n", b'\t').unwrap();
        assert_eq!(source.table("t").unwrap()[0], record! { "a" => "1", "b" => "2" });
    }

    #[test]
    fn json_array() {
        let source = Source::from_json(
            "sales",
            r#"[{"region": "north", "amount": 10, "ok": true, "note": null}]"#,
        )
        .unwrap();

        assert_eq!(source.tables, vec!["sales"]);
        assert_eq!(
            source.table("sales").unwrap()[0],
            record! { "region" => "north", "amount" => 10, "ok" => "true", "note" => Value::Null }
        );
    }

    #[test]
    fn json_tables_keep_order() {
        let source = Source::from_json(
            "book",
            r#"{"zeta": [{"a": 1}], "alpha": [{"b": 2}, {"b": 3}]}"#,
        )
        .unwrap();

        assert_eq!(source.tables, vec!["zeta", "alpha"]);
        assert_eq!(source.table("alpha").unwrap().len(), 2);
        assert_eq!(source.first_table().unwrap().0, "zeta");
    }

    #[test]
    fn json_nested_cells_become_text() {
        let source = Source::from_json("t", r#"[{"tags": ["a", "b"]}]"#).unwrap();
        assert_eq!(
            source.table("t").unwrap()[0].value("tags"),
            &Value::from(r#"["a","b"]"#)
        );
    }

    #[test]
    fn json_rejects_non_objects() {
        let err = Source::from_json("t", "[1, 2]").unwrap_err();
        assert!(matches!(err, SourceError::InvalidData(_)));
        assert!(err.to_string().contains("row 1"));

        assert!(matches!(
            Source::from_json("t", r#"{"t": 5}"#),
            Err(SourceError::InvalidData(_))
        ));
        assert!(matches!(
            Source::from_json("t", "42"),
            Err(SourceError::InvalidData(_))
        ));
        assert!(matches!(
            Source::from_json("t", "{"),
            Err(SourceError::Json(_))
        ));
    }

    #[test]
    fn select_table() {
        let source = Source::from_json("book", r#"{"a": [], "b": [{"x": 1}]}"#).unwrap();

        assert_eq!(source.select(None).unwrap().0, "a");
        assert_eq!(source.select(Some("b")).unwrap().1.len(), 1);
        assert!(matches!(
            source.select(Some("c")),
            Err(SourceError::UnknownTable(name)) if name == "c"
        ));
        assert!(matches!(
            Source::default().select(None),
            Err(SourceError::NoTables)
        ));
    }

    #[test]
    fn load_names_table_after_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Quarterly Sales.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "region,amount").unwrap();
        writeln!(file, "north,10").unwrap();

        let source = Source::load(&path).unwrap();
        assert_eq!(source.tables, vec!["Quarterly Sales"]);
    }

    #[test]
    fn load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Source::load(&dir.path().join("missing.csv")).unwrap_err();
        assert!(matches!(err, SourceError::Io(_)));
    }

    #[test]
    fn summaries_follow_table_order() {
        let source = Source::from_json("book", r#"{"b": [{"x": 1}], "a": []}"#).unwrap();
        assert_eq!(
            source.summaries(),
            vec![
                TableSummary { name: "b".into(), rows: 1 },
                TableSummary { name: "a".into(), rows: 0 },
            ]
        );
    }

    #[test]
    fn header_names_are_unique() {
        let cells = [
            Data::String("id".into()),
            Data::Empty,
            Data::String("id".into()),
            Data::Empty,
            Data::Float(2024.0),
        ];
        assert_eq!(
            header_names(&cells),
            vec!["id", "__EMPTY", "id_1", "__EMPTY_1", "2024"]
        );
    }

    #[test]
    fn sheet_cells() {
        assert_eq!(sheet_cell(&Data::Empty), None);
        assert_eq!(sheet_cell(&Data::Float(2.5)), Some(Value::Number(2.5)));
        assert_eq!(sheet_cell(&Data::Int(7)), Some(Value::Number(7.0)));
        assert_eq!(sheet_cell(&Data::Bool(true)), Some(Value::from("true")));
        assert_eq!(sheet_cell(&Data::String("x".into())), Some(Value::from("x")));
    }

    #[test]
    fn load_workbook_sheets() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("regions.xlsx");
        std::fs::copy(
            concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/regions.xlsx"),
            &path,
        )
        .unwrap();

        let source = Source::load(&path).unwrap();
        assert_eq!(source.tables, vec!["Q1", "Q2"]);

        let q1 = source.table("Q1").unwrap();
        assert_eq!(q1.len(), 3);
        assert_eq!(
            q1[0],
            record! { "region" => "north", "amount" => 10, "note" => "ok", "active" => "true" }
        );
        // missing cells are left out
        assert_eq!(q1[1], record! { "region" => "south", "note" => "late" });
        assert_eq!(q1[2], record! { "region" => "east", "amount" => 2.5 });

        assert_eq!(source.table("Q2").unwrap()[0], record! { "region" => "west", "amount" => 7 });
    }

    #[test]
    fn load_corrupt_workbook() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("book.xlsx");
        std::fs::write(&path, b"PK").unwrap();
        assert!(matches!(Source::load(&path), Err(SourceError::Workbook(_))));
    }
}
