//! Command-line interface.
//!
//! ```text
//! tabseek tables  <FILE> [--output FMT]
//! tabseek columns <FILE> [--table T]
//! tabseek query   <FILE> [--table T] [--model PATH | --model-json JSON]
//!                 [--search COL=VALUE]... [--sort COL[:asc|desc]] [--output FMT]
//! ```

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use tabseek_engine::{apply_query, columns, QueryModel, SearchTerm, SortSpec};
use tracing::debug;

use crate::export::{self, Format};
use crate::model::{self, ModelFormat};
use crate::source::Source;

/// Search, filter, and sort tabular files.
#[derive(Debug, Parser)]
#[command(name = "tabseek", version, about)]
pub struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List the tables in a file with their row counts
    Tables {
        /// CSV, TSV, JSON, or spreadsheet file
        file: PathBuf,
        /// Output format
        #[arg(short, long, value_enum, default_value_t = Format::Table)]
        output: Format,
    },
    /// List the columns of a table
    Columns {
        /// CSV, TSV, JSON, or spreadsheet file
        file: PathBuf,
        /// Table to inspect (defaults to the first)
        #[arg(short, long)]
        table: Option<String>,
    },
    /// Run a query against a table and print the result
    Query(QueryArgs),
}

#[derive(Debug, Args)]
pub struct QueryArgs {
    /// CSV, TSV, JSON, or spreadsheet file
    pub file: PathBuf,

    /// Table to query (defaults to the first)
    #[arg(short, long)]
    pub table: Option<String>,

    /// Query model file (.json, .yaml, or .yml)
    #[arg(short, long, conflicts_with = "model_json")]
    pub model: Option<PathBuf>,

    /// Query model as an inline JSON string
    #[arg(long)]
    pub model_json: Option<String>,

    /// Case-insensitive search term, may be repeated
    #[arg(short, long = "search", value_name = "COLUMN=VALUE", value_parser = model::parse_search)]
    pub search: Vec<SearchTerm>,

    /// Sort column, replacing the model's sort
    #[arg(long, value_name = "COLUMN[:asc|desc]", value_parser = model::parse_sort)]
    pub sort: Option<SortSpec>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Table)]
    pub output: Format,
}

impl QueryArgs {
    /// Builds the query model from the model source and the flags.
    pub fn query_model(&self) -> Result<QueryModel> {
        let base = match (&self.model, &self.model_json) {
            (Some(path), _) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read model {}", path.display()))?;
                model::parse_model(&text, ModelFormat::from_path(path))
                    .with_context(|| format!("failed to parse model {}", path.display()))?
            }
            (None, Some(json)) => {
                model::parse_model(json, ModelFormat::Json).context("failed to parse --model-json")?
            }
            (None, None) => QueryModel::default(),
        };
        Ok(model::merge_flags(base, self.search.clone(), self.sort.clone()))
    }
}

/// Runs a parsed command, writing its output to `out`.
pub fn run(cli: Cli, out: &mut dyn Write) -> Result<()> {
    match cli.command {
        Command::Tables { file, output } => {
            let summaries = load(&file)?.summaries();
            if output.is_structured() {
                out.write_all(export::serialize(output, &summaries)?.as_bytes())?;
            } else {
                for table in &summaries {
                    writeln!(out, "{}\t{}", table.name, table.rows)?;
                }
            }
        }
        Command::Columns { file, table } => {
            let source = load(&file)?;
            let (_, rows) = source.select(table.as_deref())?;
            for column in columns(rows) {
                writeln!(out, "{column}")?;
            }
        }
        Command::Query(args) => {
            let model = args.query_model()?;
            let source = load(&args.file)?;
            let (name, rows) = source.select(args.table.as_deref())?;
            debug!(table = name, rows = rows.len(), "querying");

            let outcome = apply_query(rows, &model);
            let mut header = outcome.columns();
            if header.is_empty() {
                header = columns(rows);
            }
            let rendered = export::render(args.output, &outcome.result, &header)?;
            out.write_all(rendered.as_bytes())?;
        }
    }
    out.flush()?;
    Ok(())
}

fn load(path: &Path) -> Result<Source> {
    Source::load(path).with_context(|| format!("failed to load {}", path.display()))
}
