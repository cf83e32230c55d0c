//! Record matching: filter values compiled into criteria, criteria evaluated
//! against loosely-typed records.

use super::dates::{end_of_day, parse_datetime, start_of_day};
use chrono::NaiveDateTime;
use datagate_core::{find_descriptor, is_ignored_key, resolve_field, FilterDescriptor, FilterSet, MatchMode};
use serde_json::Value;

/// Free-text search key matched against every value of a record.
pub const SEARCH_KEY: &str = "q";

/// Field targeted by bare `from` / `to` bounds.
pub const DEFAULT_DATE_FIELD: &str = "created_at";

/// One compiled filter condition. A record matches a filter set when it
/// satisfies every criterion.
#[derive(Debug, Clone, PartialEq)]
pub enum Criterion {
    /// Lowercased needle searched across all primitive values.
    Search(String),
    /// Inclusive window on a date field; at least one side is set.
    DateWindow {
        field: String,
        start: Option<NaiveDateTime>,
        end: Option<NaiveDateTime>,
    },
    /// Comparison of one field under a match mode.
    Field {
        key: String,
        mode: MatchMode,
        value: Value,
    },
}

impl Criterion {
    pub fn matches(&self, record: &Value) -> bool {
        match self {
            Criterion::Search(needle) => contains_text(record, needle),
            Criterion::DateWindow { field, start, end } => {
                let Some(actual) = resolve_field(record, field).and_then(parse_datetime) else {
                    return false;
                };
                start.map_or(true, |start| actual >= start) && end.map_or(true, |end| actual <= end)
            }
            Criterion::Field { key, mode, value } => match resolve_field(record, key) {
                Some(actual) => field_matches(actual, *mode, value),
                None => false,
            },
        }
    }
}

/// Compile a filter set. Ignored keys and empty values produce nothing;
/// unparseable date bounds are dropped rather than rejected.
pub fn compile(filters: &FilterSet, descriptors: &[FilterDescriptor]) -> Vec<Criterion> {
    let mut criteria = Vec::new();
    for (key, value) in filters.active() {
        if is_ignored_key(key) {
            continue;
        }
        if key == SEARCH_KEY {
            criteria.push(Criterion::Search(display(value).to_lowercase()));
            continue;
        }
        if let Some((field, bound)) = range_key(key) {
            match bound_criterion(field, bound, value) {
                Some(criterion) => criteria.push(criterion),
                None => tracing::debug!(key = %key, "ignoring unparseable date bound"),
            }
            continue;
        }

        let mode = resolve_match_mode(find_descriptor(descriptors, key), value);
        if mode == MatchMode::Range {
            match window_criterion(key, value) {
                Some(criterion) => criteria.push(criterion),
                None => tracing::debug!(key = %key, "ignoring unparseable date range"),
            }
            continue;
        }
        criteria.push(Criterion::Field {
            key: key.clone(),
            mode,
            value: value.clone(),
        });
    }
    criteria
}

/// Explicit descriptor hint, then descriptor type, then the value's shape.
/// Array values always use set membership unless a range was requested.
pub fn resolve_match_mode(descriptor: Option<&FilterDescriptor>, value: &Value) -> MatchMode {
    let mode = descriptor
        .and_then(FilterDescriptor::implied_match_mode)
        .unwrap_or(match value {
            Value::Array(_) => MatchMode::Any,
            Value::Bool(_) => MatchMode::Equals,
            _ => MatchMode::Contains,
        });
    match (mode, value) {
        (MatchMode::Exact | MatchMode::Contains, Value::Array(_)) => MatchMode::Any,
        _ => mode,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    From,
    To,
}

/// Split a range key into its target field and side.
pub fn range_key(key: &str) -> Option<(&str, Bound)> {
    match key {
        "from" => return Some((DEFAULT_DATE_FIELD, Bound::From)),
        "to" => return Some((DEFAULT_DATE_FIELD, Bound::To)),
        _ => {}
    }
    if let Some(field) = key.strip_suffix("_from").filter(|f| !f.is_empty()) {
        return Some((field, Bound::From));
    }
    key.strip_suffix("_to")
        .filter(|f| !f.is_empty())
        .map(|field| (field, Bound::To))
}

fn bound_criterion(field: &str, bound: Bound, value: &Value) -> Option<Criterion> {
    let parsed = parse_datetime(value)?;
    let (start, end) = match bound {
        Bound::From => (Some(parsed), None),
        Bound::To => (None, Some(end_of_day(parsed))),
    };
    Some(Criterion::DateWindow {
        field: field.to_string(),
        start,
        end,
    })
}

/// A range-mode filter: `{from, to}` object, or a single date meaning that
/// whole day.
fn window_criterion(key: &str, value: &Value) -> Option<Criterion> {
    let (start, end) = match value {
        Value::Object(bounds) => (
            bounds.get("from").and_then(parse_datetime),
            bounds.get("to").and_then(parse_datetime).map(end_of_day),
        ),
        other => {
            let day = parse_datetime(other)?;
            (Some(start_of_day(day)), Some(end_of_day(day)))
        }
    };
    if start.is_none() && end.is_none() {
        return None;
    }
    Some(Criterion::DateWindow {
        field: key.to_string(),
        start,
        end,
    })
}

fn field_matches(actual: &Value, mode: MatchMode, expected: &Value) -> bool {
    match mode {
        MatchMode::Exact => primitives(actual).any(|a| loosely_equal(a, expected)),
        MatchMode::Contains => {
            let needle = display(expected).to_lowercase();
            primitives(actual).any(|a| display(a).to_lowercase().contains(&needle))
        }
        MatchMode::Equals => primitives(actual).any(|a| boolean_equal(a, expected)),
        MatchMode::Any => {
            let wanted: Vec<String> = primitives(expected)
                .map(|v| display(v).to_lowercase())
                .collect();
            primitives(actual).any(|a| wanted.contains(&display(a).to_lowercase()))
        }
        MatchMode::Range => match window_criterion("", expected) {
            Some(Criterion::DateWindow { start, end, .. }) => parse_datetime(actual).is_some_and(|at| {
                start.map_or(true, |s| at >= s) && end.map_or(true, |e| at <= e)
            }),
            _ => true,
        },
    }
}

/// The value itself, or its elements when it is an array.
fn primitives(value: &Value) -> Box<dyn Iterator<Item = &Value> + '_> {
    match value {
        Value::Array(items) => Box::new(items.iter()),
        other => Box::new(std::iter::once(other)),
    }
}

/// Case-insensitive equality of string forms; numeric when both sides parse
/// as numbers.
pub fn loosely_equal(a: &Value, b: &Value) -> bool {
    if let (Some(x), Some(y)) = (as_number(a), as_number(b)) {
        return x == y;
    }
    display(a).to_lowercase() == display(b).to_lowercase()
}

/// Boolean equality accepting `true`/`false` strings on either side.
pub fn boolean_equal(a: &Value, b: &Value) -> bool {
    match (as_bool(a), as_bool(b)) {
        (Some(x), Some(y)) => x == y,
        _ => loosely_equal(a, b),
    }
}

fn as_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }
}

/// String form of a value: strings unquoted, everything else as JSON.
pub fn display(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Whether any primitive value anywhere in `value` contains `needle`
/// (already lowercased).
pub fn contains_text(value: &Value, needle: &str) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => s.to_lowercase().contains(needle),
        Value::Bool(_) | Value::Number(_) => value.to_string().to_lowercase().contains(needle),
        Value::Array(items) => items.iter().any(|item| contains_text(item, needle)),
        Value::Object(map) => map.values().any(|item| contains_text(item, needle)),
    }
}
