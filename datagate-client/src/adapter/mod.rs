//! Section adapters: per-section request construction and response shaping.
//!
//! Every section is served through a [`SectionAdapter`]. The trait's four
//! operations all have default implementations (exposed as free functions so
//! custom adapters can delegate to them), and adapters override only what
//! their backend does differently.

mod client_paged;
mod query;
mod registry;
mod token;

pub use client_paged::ClientPagedAdapter;
pub use query::{QueryStringAdapter, SearchRoute};
pub use registry::AdapterRegistry;
pub use token::TokenPagedAdapter;

use crate::engine;
use crate::error::{DataAccessError, DataAccessResult};
use crate::pagination::remote_cursors;
use datagate_core::{
    is_empty_value, is_ignored_key, FilterDescriptor, FilterSet, ListQuery, Record, RequestPlan,
    ResultEnvelope, Section,
};
use serde_json::{Map, Value};

/// Filters the default backend contract cannot apply; they are re-applied to
/// the returned page as substring matches.
pub const LOCAL_ONLY_FILTERS: &[&str] = &["email", "country"];

/// Count fields checked on count and list responses, in order.
pub const COUNT_FIELDS: &[&str] = &["count", "totalCount", "total"];

/// Per-call information handed to adapters.
#[derive(Debug, Clone, Copy)]
pub struct AdapterContext<'a> {
    pub section: &'a Section,
    pub environment: &'a str,
    pub descriptors: &'a [FilterDescriptor],
}

/// Strategy translating a section's filters and pagination into backend
/// requests, and backend responses into a [`ResultEnvelope`].
pub trait SectionAdapter: Send + Sync {
    /// Name used in error messages and logs.
    fn name(&self) -> &str;

    fn build_list_request(&self, ctx: &AdapterContext<'_>, query: &ListQuery) -> RequestPlan {
        default_list_request(ctx, query)
    }

    /// `None` means the count is derived from the list call.
    fn build_count_request(&self, _ctx: &AdapterContext<'_>, filters: &FilterSet) -> Option<RequestPlan> {
        Some(default_count_request(filters))
    }

    fn transform_list_response(
        &self,
        ctx: &AdapterContext<'_>,
        raw: Value,
        query: &ListQuery,
    ) -> DataAccessResult<ResultEnvelope> {
        default_transform_list(ctx, raw, query)
    }

    fn transform_count_response(&self, raw: &Value) -> Option<u64> {
        default_count_from(raw)
    }
}

/// The adapter used for every section without a registered one.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultAdapter;

impl SectionAdapter for DefaultAdapter {
    fn name(&self) -> &str {
        "default"
    }
}

// ============================================================================
// DEFAULT BEHAVIOR
// ============================================================================

/// POST with `{env, section, ...filters, pagination}`.
pub fn default_list_request(ctx: &AdapterContext<'_>, query: &ListQuery) -> RequestPlan {
    let mut body = request_filters(&query.filters);
    body.insert("env".to_string(), Value::String(ctx.environment.to_string()));
    body.insert("section".to_string(), Value::String(ctx.section.to_string()));
    body.insert("pagination".to_string(), query.pagination.to_json());
    RequestPlan::post(Value::Object(body))
}

/// GET `/count` with the active, non-pagination filters as query parameters.
pub fn default_count_request(filters: &FilterSet) -> RequestPlan {
    let mut plan = RequestPlan::get().with_suffix("/count");
    for (key, value) in request_filters(filters) {
        if let Some(value) = query_string_value(&value) {
            plan.push_query(key, value);
        }
    }
    plan
}

/// Items from `items` (or a bare array); local-only filters re-applied;
/// total from the count fields; cursors from a backend token or offsets.
pub fn default_transform_list(
    ctx: &AdapterContext<'_>,
    raw: Value,
    query: &ListQuery,
) -> DataAccessResult<ResultEnvelope> {
    let backend_total = default_count_from(&raw);
    let token = response_token(&raw);
    let items = extract_items(raw, "items", ctx.section)?;
    let received = items.len();
    let (next_cursor, prev_cursor) =
        remote_cursors(&query.pagination, received, backend_total, token);

    let local = local_only_filters(&query.filters);
    let items = if local.is_empty() {
        items
    } else {
        engine::filter_records(items, &local, &[])
    };

    let total = if items.len() == received {
        backend_total
    } else {
        tracing::warn!(
            section = %ctx.section,
            received,
            kept = items.len(),
            "applied local-only filters to backend page"
        );
        let complete = query.pagination.offset == 0
            && next_cursor.is_none()
            && backend_total.map_or(true, |total| total <= received as u64);
        complete.then_some(items.len() as u64)
    };

    Ok(ResultEnvelope {
        items,
        total,
        next_cursor,
        prev_cursor,
    })
}

/// A count from a bare number or the first of [`COUNT_FIELDS`] present.
pub fn default_count_from(raw: &Value) -> Option<u64> {
    if let Some(count) = as_count(raw) {
        return Some(count);
    }
    COUNT_FIELDS
        .iter()
        .find_map(|field| raw.get(*field).and_then(as_count))
}

/// Non-negative integer from a number or a numeric string.
pub fn as_count(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0 && f.fract() == 0.0).map(|f| f as u64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// The record array under `field`, or the response itself when it is an
/// array. A null response is an empty page.
pub fn extract_items(raw: Value, field: &str, section: &Section) -> DataAccessResult<Vec<Record>> {
    match raw {
        Value::Array(items) => Ok(items),
        Value::Null => Ok(Vec::new()),
        Value::Object(mut map) => match map.remove(field) {
            Some(Value::Array(items)) => Ok(items),
            Some(Value::Null) | None => Err(DataAccessError::json_parse(
                format!("response for section '{section}'"),
                format!("missing `{field}` array"),
            )),
            Some(_) => Err(DataAccessError::json_parse(
                format!("response for section '{section}'"),
                format!("`{field}` is not an array"),
            )),
        },
        other => Err(DataAccessError::json_parse(
            format!("response for section '{section}'"),
            format!("expected an object or array, got {other}"),
        )),
    }
}

/// Continuation token from `nextToken` or `nextCursor` (strings only).
pub fn response_token(raw: &Value) -> Option<String> {
    ["nextToken", "nextCursor"]
        .iter()
        .filter_map(|key| raw.get(*key))
        .find_map(|value| value.as_str().map(str::trim).filter(|s| !s.is_empty()))
        .map(str::to_string)
}

/// Stringify a filter value for a query string: scalars as-is, arrays
/// comma-joined, empty values omitted.
pub fn query_string_value(value: &Value) -> Option<String> {
    if is_empty_value(value) {
        return None;
    }
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().filter_map(query_string_value).collect();
            (!parts.is_empty()).then(|| parts.join(","))
        }
        other => Some(other.to_string()),
    }
}

/// Active filters minus envelope and pagination keys.
pub fn request_filters(filters: &FilterSet) -> Map<String, Value> {
    filters
        .active()
        .filter(|(key, _)| !is_ignored_key(key))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

fn local_only_filters(filters: &FilterSet) -> FilterSet {
    filters
        .active()
        .filter(|(key, _)| LOCAL_ONLY_FILTERS.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use datagate_core::{Cursor, HttpMethod, PaginationSpec};
    use serde_json::json;

    fn ctx(section: &Section) -> AdapterContext<'_> {
        AdapterContext {
            section,
            environment: "staging",
            descriptors: &[],
        }
    }

    #[test]
    fn default_list_posts_envelope() {
        let section = Section::new("orders");
        let query = ListQuery::new(
            FilterSet::new().with("status", "Active").with("email", "").with("limit", 3),
            PaginationSpec::new(5).with_offset(10),
        );
        let plan = DefaultAdapter.build_list_request(&ctx(&section), &query);
        assert_eq!(plan.method, HttpMethod::Post);
        let body = plan.body.unwrap();
        assert_eq!(body["env"], "staging");
        assert_eq!(body["section"], "orders");
        assert_eq!(body["status"], "Active");
        assert_eq!(body["pagination"]["limit"], 5);
        assert_eq!(body["pagination"]["offset"], 10);
        assert!(body.get("email").is_none());
        assert!(body.get("limit").is_none());
    }

    #[test]
    fn default_count_omits_pagination_keys() {
        let section = Section::new("orders");
        let filters = FilterSet::new()
            .with("status", "Active")
            .with("nextToken", "abc")
            .with("offset", 5)
            .with("tags", json!(["a", "b"]));
        let plan = DefaultAdapter
            .build_count_request(&ctx(&section), &filters)
            .unwrap();
        assert_eq!(plan.method, HttpMethod::Get);
        assert_eq!(plan.url_suffix, "/count");
        assert_eq!(plan.query_value("status"), Some("Active"));
        assert_eq!(plan.query_value("tags"), Some("a,b"));
        assert!(!plan.has_query("nextToken"));
        assert!(!plan.has_query("offset"));
    }

    #[test]
    fn count_fields_in_order() {
        assert_eq!(default_count_from(&json!(12)), Some(12));
        assert_eq!(default_count_from(&json!({"count": 3, "total": 9})), Some(3));
        assert_eq!(default_count_from(&json!({"totalCount": "7"})), Some(7));
        assert_eq!(default_count_from(&json!({"total": 4.0})), Some(4));
        assert_eq!(default_count_from(&json!({"total": -1})), None);
        assert_eq!(default_count_from(&json!({"n": 1})), None);
    }

    #[test]
    fn transform_reads_items_total_and_offsets() {
        let section = Section::new("orders");
        let query = ListQuery::new(FilterSet::new(), PaginationSpec::new(2));
        let raw = json!({"items": [{"id": 1}, {"id": 2}], "total": 5});
        let page = DefaultAdapter
            .transform_list_response(&ctx(&section), raw, &query)
            .unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(page.total, Some(5));
        assert_eq!(page.next_cursor, Some(Cursor::Offset(2)));
        assert_eq!(page.prev_cursor, None);
    }

    #[test]
    fn transform_accepts_bare_array_and_token() {
        let section = Section::new("orders");
        let query = ListQuery::default();
        let page = DefaultAdapter
            .transform_list_response(&ctx(&section), json!([{"id": 1}]), &query)
            .unwrap();
        assert_eq!(page.total, None);
        assert_eq!(page.next_cursor, None);

        let raw = json!({"items": [{"id": 1}], "nextToken": "t-2"});
        let page = DefaultAdapter
            .transform_list_response(&ctx(&section), raw, &query)
            .unwrap();
        assert_eq!(page.next_cursor, Some(Cursor::Token("t-2".into())));
    }

    #[test]
    fn transform_reapplies_local_only_filters() {
        let section = Section::new("users");
        let query = ListQuery::new(
            FilterSet::new().with("email", "EXAMPLE.org"),
            PaginationSpec::new(10),
        );
        let raw = json!({
            "items": [
                {"email": "a@example.org"},
                {"email": "b@other.net"},
                {"email": "c@example.org"}
            ],
            "total": 3
        });
        let page = DefaultAdapter
            .transform_list_response(&ctx(&section), raw, &query)
            .unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(page.total, Some(2));
    }

    #[test]
    fn partial_page_with_local_filter_has_unknown_total() {
        let section = Section::new("users");
        let query = ListQuery::new(
            FilterSet::new().with("country", "de"),
            PaginationSpec::new(2),
        );
        let raw = json!({
            "items": [{"country": "DE"}, {"country": "FR"}],
            "total": 8
        });
        let page = DefaultAdapter
            .transform_list_response(&ctx(&section), raw, &query)
            .unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page.total, None);
        assert_eq!(page.next_cursor, Some(Cursor::Offset(2)));
    }

    #[test]
    fn missing_items_is_json_error() {
        let section = Section::new("orders");
        let err = DefaultAdapter
            .transform_list_response(&ctx(&section), json!({"rows": []}), &ListQuery::default())
            .unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::JsonParse);
    }

    #[test]
    fn query_string_values() {
        assert_eq!(query_string_value(&json!("  x ")), Some("x".into()));
        assert_eq!(query_string_value(&json!(true)), Some("true".into()));
        assert_eq!(query_string_value(&json!(2.5)), Some("2.5".into()));
        assert_eq!(query_string_value(&json!(["a", "", 3])), Some("a,3".into()));
        assert_eq!(query_string_value(&json!([""])), None);
        assert_eq!(query_string_value(&json!(null)), None);
    }
}
