//! Query model and executor.
//!
//! A [`QueryModel`] bundles the three stages a query applies, always in this
//! order:
//!
//! ```text
//! search ─► filter ─► sort
//! ```
//!
//! - **Search** keeps records where every [`SearchTerm`] matches.
//! - **Filter** folds the [`FilterCondition`]s left to right. Aggregates are
//!   computed over the searched rows, before any condition removes one.
//! - **Sort** applies the optional [`SortSpec`] with a stable sort.
//!
//! Execution is a pure function of the rows and the model: the input slice is
//! never reordered or modified, and repeated calls give identical results.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::de;
use crate::error::Result;
use crate::filter::{fold, FilterCondition, Logic, Predicate};
use crate::op::Op;
use crate::ordering::{sort_records, SortSpec};
use crate::record::{self, Dataset, Record};
use crate::search::{Needle, SearchTerm};

/// A declarative query over a dataset.
///
/// Models usually arrive as JSON from the calling layer, and every field may
/// be missing or `null`:
///
/// ```
/// use tabseek_engine::{record, QueryModel};
///
/// let model = QueryModel::from_json(r#"{
///     "search": [{ "column": "name", "value": "ali" }],
///     "filters": null,
///     "sort": { "column": "age", "order": "desc" }
/// }"#).unwrap();
///
/// let rows = vec![
///     record! { "name" => "Alice", "age" => "30" },
///     record! { "name" => "Bob", "age" => "25" },
///     record! { "name" => "Alina", "age" => "41" },
/// ];
///
/// let outcome = model.apply(&rows);
/// assert_eq!(outcome.len(), 2);
/// assert_eq!(outcome.result[0].value("name").to_text(), "Alina");
/// ```
///
/// The builder methods assemble the same model in code:
///
/// ```
/// use tabseek_engine::{QueryModel, Op};
///
/// let model = QueryModel::new()
///     .search("name", "ali")
///     .and_filter("age", Op::Gte, "30")
///     .sort_desc("age");
/// assert_eq!(model.filters.len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryModel {
    /// Conjunctive search terms.
    #[serde(deserialize_with = "de::nullable")]
    pub search: Vec<SearchTerm>,
    /// Filter conditions, folded left to right.
    #[serde(deserialize_with = "de::nullable")]
    pub filters: Vec<FilterCondition>,
    /// Optional sort.
    pub sort: Option<SortSpec>,
}

impl QueryModel {
    /// Creates a new empty model.
    ///
    /// An empty model returns every record in input order.
    pub fn new() -> Self {
        QueryModel::default()
    }

    // ========================================================================
    // Builders
    // ========================================================================

    /// Adds a search term.
    pub fn search(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.search.push(SearchTerm::new(column, value));
        self
    }

    /// Appends a filter condition as given.
    pub fn filter(mut self, condition: FilterCondition) -> Self {
        self.filters.push(condition);
        self
    }

    /// Appends a literal condition folded in with AND.
    pub fn and_filter(
        self,
        column: impl Into<String>,
        op: impl Into<Op>,
        value: impl Into<String>,
    ) -> Self {
        self.filter(FilterCondition::new(column, op, value).logic(Logic::And))
    }

    /// Appends a literal condition folded in with OR.
    pub fn or_filter(
        self,
        column: impl Into<String>,
        op: impl Into<Op>,
        value: impl Into<String>,
    ) -> Self {
        self.filter(FilterCondition::new(column, op, value).logic(Logic::Or))
    }

    /// Sets the sort.
    pub fn sort(mut self, spec: SortSpec) -> Self {
        self.sort = Some(spec);
        self
    }

    /// Sorts ascending by `column`.
    pub fn sort_asc(self, column: impl Into<String>) -> Self {
        self.sort(SortSpec::asc(column))
    }

    /// Sorts descending by `column`.
    pub fn sort_desc(self, column: impl Into<String>) -> Self {
        self.sort(SortSpec::desc(column))
    }

    // ========================================================================
    // Introspection
    // ========================================================================

    /// Returns `true` if this model leaves every dataset unchanged.
    pub fn is_empty(&self) -> bool {
        self.search.is_empty()
            && self.filters.is_empty()
            && !self.sort.as_ref().is_some_and(SortSpec::is_active)
    }

    // ========================================================================
    // Encoding
    // ========================================================================

    /// Decodes a model from JSON.
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Decodes a model from YAML.
    pub fn from_yaml(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Encodes this model as pretty JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    // ========================================================================
    // Execution
    // ========================================================================

    /// Runs this model against `rows`. See [`apply_query`].
    pub fn apply(&self, rows: &[Record]) -> QueryOutcome {
        apply_query(rows, self)
    }
}

/// The rows a query produced.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct QueryOutcome {
    /// Surviving records, in result order.
    pub result: Dataset,
}

impl QueryOutcome {
    /// Column list of the result: the keys of its first record.
    pub fn columns(&self) -> Vec<String> {
        record::columns(&self.result)
    }

    /// Number of result records.
    pub fn len(&self) -> usize {
        self.result.len()
    }

    /// Returns `true` if nothing survived.
    pub fn is_empty(&self) -> bool {
        self.result.is_empty()
    }

    /// Consumes the outcome, returning the result records.
    pub fn into_rows(self) -> Dataset {
        self.result
    }
}

/// Applies `model` to `rows`: search, then filter, then sort.
///
/// The returned dataset holds copies of the surviving records; `rows` is left
/// untouched. Evaluation never fails: unknown columns read as null, unknown
/// operators never match, and an unknown sort order keeps rows as they are.
pub fn apply_query(rows: &[Record], model: &QueryModel) -> QueryOutcome {
    let span = tracing::debug_span!("apply_query", rows = rows.len());
    let _enter = span.enter();

    let needles: Vec<Needle<'_>> = model.search.iter().map(Needle::new).collect();
    let mut current: Vec<&Record> = rows
        .iter()
        .filter(|row| needles.iter().all(|needle| needle.matches(row)))
        .collect();
    if !needles.is_empty() {
        debug!(terms = needles.len(), remaining = current.len(), "search");
    }

    if !model.filters.is_empty() {
        let predicates: Vec<Predicate<'_>> = model
            .filters
            .iter()
            .map(|condition| Predicate::compile(condition, current.iter().copied()))
            .collect();
        current.retain(|row| fold(&predicates, row));
        debug!(
            conditions = predicates.len(),
            remaining = current.len(),
            "filter"
        );
    }

    if let Some(spec) = model.sort.as_ref().filter(|spec| spec.is_active()) {
        sort_records(&mut current, spec);
        debug!(column = %spec.column, order = %spec.order, "sort");
    }

    QueryOutcome {
        result: current.into_iter().cloned().collect(),
    }
}
