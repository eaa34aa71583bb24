//! Rendering query results.
//!
//! Handles JSON, YAML, CSV, and plain-text table output of a result set.
//! Every renderer takes the column list explicitly so an empty result still
//! knows its header.

use serde::Serialize;
use tabseek_engine::Record;
use thiserror::Error;
use unicode_width::UnicodeWidthStr;

/// Errors that can occur during rendering.
#[derive(Debug, Error)]
pub enum ExportError {
    /// JSON encoding error
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML encoding error
    #[error("YAML serialization failed: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// CSV writing error
    #[error("CSV serialization failed: {0}")]
    Csv(#[from] csv::Error),

    /// CSV bytes that do not form a UTF-8 string
    #[error("CSV output is not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Result type alias for rendering.
pub type Result<T> = std::result::Result<T, ExportError>;

/// Output format for a result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Format {
    /// Aligned plain-text table
    #[default]
    Table,
    /// Pretty-printed JSON array of objects
    Json,
    /// YAML sequence of mappings
    Yaml,
    /// CSV with every cell quoted
    Csv,
}

impl Format {
    /// Returns true if this format is meant for other programs to read.
    pub fn is_structured(&self) -> bool {
        !matches!(self, Format::Table)
    }
}

/// Renders `rows` in the given format.
pub fn render(format: Format, rows: &[Record], columns: &[String]) -> Result<String> {
    match format {
        Format::Table => Ok(to_table(rows, columns)),
        Format::Json => to_json(rows),
        Format::Yaml => to_yaml(rows),
        Format::Csv => to_csv(rows, columns),
    }
}

/// Serializes plain records such as table summaries.
///
/// Table output writes CSV without quoting; callers with their own text layout
/// should check [`Format::is_structured`] first.
pub fn serialize<T: Serialize>(format: Format, items: &[T]) -> Result<String> {
    match format {
        Format::Json => Ok(serde_json::to_string_pretty(items)?),
        Format::Yaml => Ok(serde_yaml::to_string(items)?),
        Format::Csv | Format::Table => {
            let style = if format == Format::Csv {
                csv::QuoteStyle::Always
            } else {
                csv::QuoteStyle::Necessary
            };
            let mut wtr = csv::WriterBuilder::new()
                .quote_style(style)
                .terminator(csv::Terminator::Any(b'\n'))
                .from_writer(vec![]);
            for item in items {
                wtr.serialize(item)?;
            }
            let bytes = wtr
                .into_inner()
                .map_err(|err| csv::Error::from(err.into_error()))?;
            Ok(String::from_utf8(bytes)?)
        }
    }
}

/// Serializes rows to pretty JSON.
pub fn to_json(rows: &[Record]) -> Result<String> {
    Ok(serde_json::to_string_pretty(rows)?)
}

/// Serializes rows to YAML.
pub fn to_yaml(rows: &[Record]) -> Result<String> {
    Ok(serde_yaml::to_string(rows)?)
}

/// Serializes rows to CSV.
///
/// The header lists `columns`; each row writes those columns in order.
/// Every field is double-quoted and missing or null cells are empty.
pub fn to_csv(rows: &[Record], columns: &[String]) -> Result<String> {
    let mut wtr = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(vec![]);

    wtr.write_record(columns)?;
    for row in rows {
        wtr.write_record(columns.iter().map(|column| row.value(column).to_text()))?;
    }

    let bytes = wtr
        .into_inner()
        .map_err(|err| csv::Error::from(err.into_error()))?;
    Ok(String::from_utf8(bytes)?)
}

/// Renders rows as a left-aligned text table.
///
/// Columns are separated by two spaces and sized to their widest cell.
pub fn to_table(rows: &[Record], columns: &[String]) -> String {
    if columns.is_empty() {
        return String::new();
    }

    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| columns.iter().map(|c| row.value(c).to_text()).collect())
        .collect();

    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(idx, column)| {
            cells
                .iter()
                .map(|line| line[idx].width())
                .chain(std::iter::once(column.width()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();
    push_line(&mut out, columns.iter().map(String::as_str), &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    push_line(&mut out, rule.iter().map(String::as_str), &widths);
    for line in &cells {
        push_line(&mut out, line.iter().map(String::as_str), &widths);
    }
    out
}

fn push_line<'a>(out: &mut String, cells: impl Iterator<Item = &'a str>, widths: &[usize]) {
    let mut line = String::new();
    for (idx, (cell, width)) in cells.zip(widths).enumerate() {
        if idx > 0 {
            line.push_str("  ");
        }
        line.push_str(&pad_right(cell, *width));
    }
    out.push_str(line.trim_end());
    out.push('\n');
}

/// Pads on the right to `width` display columns. Never truncates.
fn pad_right(s: &str, width: usize) -> String {
    let padding = width.saturating_sub(s.width());
    format!("{s}{}", " ".repeat(padding))
}
