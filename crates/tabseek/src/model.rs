//! Reading query models from files and flags.

use std::path::Path;

use tabseek_engine::{QueryModel, Result, SearchTerm, SortSpec};

/// Text formats a query model can be written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModelFormat {
    #[default]
    Json,
    Yaml,
}

impl ModelFormat {
    /// Picks a format from a file extension. Anything but `.yaml`/`.yml` is JSON.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
                ModelFormat::Yaml
            }
            _ => ModelFormat::Json,
        }
    }
}

/// Decodes a model written in `format`.
pub fn parse_model(text: &str, format: ModelFormat) -> Result<QueryModel> {
    match format {
        ModelFormat::Json => QueryModel::from_json(text),
        ModelFormat::Yaml => QueryModel::from_yaml(text),
    }
}

/// Parses a `column=value` search flag.
///
/// Only the first `=` separates; the value may contain more.
pub fn parse_search(arg: &str) -> std::result::Result<SearchTerm, String> {
    let (column, value) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected COLUMN=VALUE, got '{arg}'"))?;
    if column.is_empty() {
        return Err(format!("missing column name in '{arg}'"));
    }
    Ok(SearchTerm::new(column, value))
}

/// Parses a `column[:asc|desc]` sort flag.
///
/// A suffix after the last `:` is an order only when it is `asc` or `desc`;
/// otherwise the whole argument names the column.
pub fn parse_sort(arg: &str) -> std::result::Result<SortSpec, String> {
    let spec = match arg.rsplit_once(':') {
        Some((column, order)) if order.eq_ignore_ascii_case("asc") => SortSpec::asc(column),
        Some((column, order)) if order.eq_ignore_ascii_case("desc") => SortSpec::desc(column),
        _ => SortSpec::asc(arg),
    };
    if spec.column.is_empty() {
        return Err(format!("missing column name in '{arg}'"));
    }
    Ok(spec)
}

/// Adds command-line search terms and sort to a model.
///
/// Search terms are appended after the model's own; a sort replaces the model's.
pub fn merge_flags(mut model: QueryModel, search: Vec<SearchTerm>, sort: Option<SortSpec>) -> QueryModel {
    model.search.extend(search);
    if let Some(spec) = sort {
        model.sort = Some(spec);
    }
    model
}
