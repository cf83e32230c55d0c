//! Command-line surface of the `datagate` binary.

use crate::error::DataAccessError;
use crate::facade::DataAccess;
use clap::{Args, Parser, Subcommand};
use datagate_core::{
    ConfigError, FilterSet, ListQuery, PaginationSpec, Section, SortDirection, DEFAULT_PAGE_SIZE,
};
use serde_json::{json, Value};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "datagate")]
#[command(about = "Query section data through the DATAGATE data-access layer", long_about = None)]
pub struct Cli {
    /// Config file; falls back to $DATAGATE_CONFIG
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// List one page of a section
    Get {
        section: String,

        #[command(flatten)]
        filters: FilterArgs,

        /// Page size
        #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
        limit: usize,

        /// Records to skip
        #[arg(long, default_value_t = 0)]
        offset: usize,

        /// Sort field, optionally suffixed with `:asc` or `:desc`
        #[arg(long, value_name = "FIELD[:DIR]", value_parser = parse_sort)]
        sort: Option<(String, SortDirection)>,
    },

    /// Count the records of a section matching the filters
    Count {
        section: String,

        #[command(flatten)]
        filters: FilterArgs,
    },

    /// Print the URL a section resolves to
    Resolve {
        section: String,

        /// Path appended to the section endpoint
        suffix: Option<String>,
    },
}

#[derive(Args, Debug, Clone, PartialEq, Default)]
pub struct FilterArgs {
    /// Filter as key=value; the value is read as JSON when it parses.
    /// Repeating a key collects its values into an array.
    #[arg(long = "filter", value_name = "KEY=VALUE", value_parser = parse_filter)]
    pub pairs: Vec<(String, Value)>,
}

impl FilterArgs {
    pub fn to_filter_set(&self) -> FilterSet {
        let mut filters = FilterSet::new();
        for (key, value) in &self.pairs {
            add_filter(&mut filters, key.clone(), value.clone());
        }
        filters
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    DataAccess(#[from] DataAccessError),

    #[error("Failed to write output: {0}")]
    Output(#[from] serde_json::Error),
}

/// Execute a command and return the JSON to print.
pub async fn run(access: &DataAccess, command: Command) -> Result<Value, CliError> {
    match command {
        Command::Get {
            section,
            filters,
            limit,
            offset,
            sort,
        } => {
            let mut pagination = PaginationSpec::new(limit).with_offset(offset);
            if let Some((field, direction)) = sort {
                pagination = pagination.with_sort(field, direction);
            }
            let query = ListQuery::new(filters.to_filter_set(), pagination);
            let page = access.get(&Section::new(section), &query).await?;
            Ok(serde_json::to_value(page)?)
        }
        Command::Count { section, filters } => {
            let section = Section::new(section);
            let count = access.get_total_count(&section, &filters.to_filter_set()).await;
            Ok(json!({ "section": section, "count": count }))
        }
        Command::Resolve { section, suffix } => {
            let section = Section::new(section);
            let url = access.resolve_endpoint(&section, suffix.as_deref())?;
            Ok(json!({ "section": section, "url": url }))
        }
    }
}

/// `key=value`; the value is read as JSON when it parses, else as a string.
fn parse_filter(pair: &str) -> Result<(String, Value), String> {
    let (key, raw) = pair
        .split_once('=')
        .filter(|(key, _)| !key.trim().is_empty())
        .ok_or_else(|| format!("expected key=value, got '{pair}'"))?;
    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    Ok((key.trim().to_string(), value))
}

/// Repeated keys collect into an array.
fn add_filter(filters: &mut FilterSet, key: String, value: Value) {
    let merged = match filters.remove(&key) {
        None => value,
        Some(Value::Array(mut existing)) => {
            existing.push(value);
            Value::Array(existing)
        }
        Some(previous) => Value::Array(vec![previous, value]),
    };
    filters.insert(key, merged);
}

fn parse_sort(spec: &str) -> Result<(String, SortDirection), String> {
    let (field, direction) = match spec.split_once(':') {
        Some((field, "asc")) => (field, SortDirection::Asc),
        Some((field, "desc")) => (field, SortDirection::Desc),
        Some((_, other)) => return Err(format!("unknown sort direction '{other}'")),
        None => (spec, SortDirection::Asc),
    };
    if field.trim().is_empty() {
        return Err("a sort field is required".to_string());
    }
    Ok((field.trim().to_string(), direction))
}
