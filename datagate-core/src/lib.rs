//! DATAGATE Core - Data Types
//!
//! Pure data structures shared by every DATAGATE crate. Request orchestration,
//! filtering and transport live in `datagate-client`; this crate only defines
//! the shapes that flow between them plus a few pure helpers.

pub mod config;
pub mod error;
pub mod filter;
pub mod naming;

pub use config::{is_absolute_url, DataGateConfig, EndpointDeclarations, SectionEndpoint};
pub use error::{ConfigError, TransportError, TransportErrorKind};
pub use filter::{
    find_descriptor, is_ignored_key, FilterDescriptor, FilterRegistry, FilterType, MatchMode,
    IGNORED_KEYS,
};
pub use naming::{
    candidate_keys, resolve_field, split_digit_runs, to_camel_case, to_snake_case,
    to_snake_case_grouped,
};

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::fmt;

/// A business entity as returned by a backend or a fixture file.
///
/// Records are never given a fixed schema; fields are looked up through
/// [`resolve_field`] so that naming differences between callers and data
/// sources are absorbed.
pub type Record = Value;

/// Page size used when a caller does not supply one (or supplies zero).
pub const DEFAULT_PAGE_SIZE: usize = 25;

// ============================================================================
// SECTION
// ============================================================================

/// Logical resource name routed through adapter and endpoint resolution.
///
/// Sections may be hierarchical (`admin/billing/payments`); only the last
/// path segment is used when looking up adapters and routes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Section(String);

impl Section {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Last non-empty path segment of the section name.
    pub fn reduced(&self) -> &str {
        self.0
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .filter(|segment| !segment.is_empty())
            .unwrap_or(&self.0)
    }

    /// Whether the section name carries path segments beyond its reduced key.
    pub fn is_hierarchical(&self) -> bool {
        self.reduced() != self.0
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Section {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for Section {
    fn from(name: String) -> Self {
        Self(name)
    }
}

// ============================================================================
// FILTER SET
// ============================================================================

/// Filter values supplied by a caller, keyed by filter-field name.
///
/// Keys are whatever the UI uses and frequently differ from both the backend
/// parameter names and the record field names.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterSet(Map<String, Value>);

impl FilterSet {
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// All entries, including empty ones.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Entries carrying a usable value (absent and empty values omitted).
    pub fn active(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter().filter(|(_, value)| !is_empty_value(value))
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl From<Map<String, Value>> for FilterSet {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for FilterSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Null, blank strings, empty arrays and empty objects carry no filter.
pub fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

// ============================================================================
// PAGINATION
// ============================================================================

/// Sort order for the optional single sort field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    #[serde(alias = "ascending", alias = "ASC")]
    Asc,
    #[serde(alias = "descending", alias = "DESC")]
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

/// Page request. Offset/limit is canonical; `next_token` is an opaque echo
/// for token-paginated backends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationSpec {
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default)]
    pub offset: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_field: Option<String>,
    #[serde(default)]
    pub sort_direction: SortDirection,
}

fn default_limit() -> usize {
    DEFAULT_PAGE_SIZE
}

impl Default for PaginationSpec {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl PaginationSpec {
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            offset: 0,
            next_token: None,
            sort_field: None,
            sort_direction: SortDirection::Asc,
        }
    }

    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_next_token(mut self, token: impl Into<String>) -> Self {
        self.next_token = Some(token.into());
        self
    }

    pub fn with_sort(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.sort_field = Some(field.into());
        self.sort_direction = direction;
        self
    }

    /// Page size with zero normalized to [`DEFAULT_PAGE_SIZE`].
    pub fn effective_limit(&self) -> usize {
        if self.limit == 0 {
            DEFAULT_PAGE_SIZE
        } else {
            self.limit
        }
    }

    /// The request for the page a cursor points at.
    pub fn advance(&self, cursor: &Cursor) -> Self {
        let mut next = self.clone();
        match cursor {
            Cursor::Offset(offset) => {
                next.offset = *offset;
                next.next_token = None;
            }
            Cursor::Token(token) => next.next_token = Some(token.clone()),
        }
        next
    }

    /// JSON form embedded in request bodies.
    pub fn to_json(&self) -> Value {
        let mut value = json!({
            "limit": self.effective_limit(),
            "offset": self.offset,
            "sortDirection": self.sort_direction.as_str(),
        });
        if let Value::Object(map) = &mut value {
            if let Some(token) = &self.next_token {
                map.insert("nextToken".to_string(), Value::String(token.clone()));
            }
            if let Some(field) = &self.sort_field {
                map.insert("sortField".to_string(), Value::String(field.clone()));
            }
        }
        value
    }
}

/// Arguments of a list call: `{filters, pagination}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub filters: FilterSet,
    #[serde(default)]
    pub pagination: PaginationSpec,
}

impl ListQuery {
    pub fn new(filters: FilterSet, pagination: PaginationSpec) -> Self {
        Self { filters, pagination }
    }
}

// ============================================================================
// REQUEST PLAN
// ============================================================================

/// HTTP verbs used by adapters and mutations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Behavior switches attached to a plan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanFlags {
    /// The backend returns its full collection; filtering and paging happen
    /// on the response.
    pub paginate_locally: bool,
}

/// A single outgoing request, built fresh per call and never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestPlan {
    pub method: HttpMethod,
    pub url_suffix: String,
    pub query_params: Vec<(String, String)>,
    pub body: Option<Value>,
    pub flags: PlanFlags,
}

impl RequestPlan {
    pub fn new(method: HttpMethod) -> Self {
        Self {
            method,
            url_suffix: String::new(),
            query_params: Vec::new(),
            body: None,
            flags: PlanFlags::default(),
        }
    }

    pub fn get() -> Self {
        Self::new(HttpMethod::Get)
    }

    pub fn post(body: Value) -> Self {
        Self::new(HttpMethod::Post).with_body(body)
    }

    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.url_suffix = suffix.into();
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.push_query(key, value);
        self
    }

    pub fn push_query(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.query_params.push((key.into(), value.into()));
    }

    pub fn paginated_locally(mut self) -> Self {
        self.flags.paginate_locally = true;
        self
    }

    /// First query value under `key`.
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query_params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn has_query(&self, key: &str) -> bool {
        self.query_value(key).is_some()
    }
}

// ============================================================================
// RESULT ENVELOPE
// ============================================================================

/// Pointer to another page: an offset for offset-paginated sources, an opaque
/// token for token-paginated backends.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cursor {
    Offset(usize),
    Token(String),
}

impl Cursor {
    pub fn as_offset(&self) -> Option<usize> {
        match self {
            Cursor::Offset(offset) => Some(*offset),
            Cursor::Token(_) => None,
        }
    }

    pub fn as_token(&self) -> Option<&str> {
        match self {
            Cursor::Token(token) => Some(token),
            Cursor::Offset(_) => None,
        }
    }
}

/// The single shape every list call returns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultEnvelope {
    pub items: Vec<Record>,
    pub total: Option<u64>,
    pub next_cursor: Option<Cursor>,
    pub prev_cursor: Option<Cursor>,
}

impl ResultEnvelope {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn has_more(&self) -> bool {
        self.next_cursor.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn section_reduces_to_last_segment() {
        assert_eq!(Section::new("orders").reduced(), "orders");
        assert_eq!(Section::new("admin/billing/payments").reduced(), "payments");
        assert_eq!(Section::new("admin/orders/").reduced(), "orders");
        assert!(Section::new("admin/orders").is_hierarchical());
        assert!(!Section::new("orders").is_hierarchical());
    }

    #[test]
    fn active_filters_skip_empty_values() {
        let filters = FilterSet::new()
            .with("status", "Active")
            .with("email", "  ")
            .with("tags", Value::Array(vec![]))
            .with("country", Value::Null)
            .with("verified", false);

        let keys: Vec<&str> = filters.active().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["status", "verified"]);
        assert_eq!(filters.len(), 5);
    }

    #[test]
    fn zero_limit_uses_default_page_size() {
        assert_eq!(PaginationSpec::new(0).effective_limit(), DEFAULT_PAGE_SIZE);
        assert_eq!(PaginationSpec::new(5).effective_limit(), 5);
    }

    #[test]
    fn advance_follows_offset_and_token_cursors() {
        let page = PaginationSpec::new(10).with_next_token("stale");
        let next = page.advance(&Cursor::Offset(10));
        assert_eq!(next.offset, 10);
        assert!(next.next_token.is_none());

        let next = page.advance(&Cursor::Token("abc".into()));
        assert_eq!(next.next_token.as_deref(), Some("abc"));
    }

    #[test]
    fn pagination_json_includes_optional_fields() {
        let page = PaginationSpec::new(5)
            .with_offset(10)
            .with_sort("createdAt", SortDirection::Desc);
        let json = page.to_json();
        assert_eq!(json["limit"], 5);
        assert_eq!(json["offset"], 10);
        assert_eq!(json["sortField"], "createdAt");
        assert_eq!(json["sortDirection"], "desc");
        assert!(json.get("nextToken").is_none());
    }

    #[test]
    fn pagination_deserializes_with_defaults() {
        let page: PaginationSpec = serde_json::from_str(r#"{"offset": 5}"#).unwrap();
        assert_eq!(page.limit, DEFAULT_PAGE_SIZE);
        assert_eq!(page.offset, 5);
        assert_eq!(page.sort_direction, SortDirection::Asc);
    }

    #[test]
    fn cursors_serialize_untagged() {
        let envelope = ResultEnvelope {
            items: vec![],
            total: Some(10),
            next_cursor: Some(Cursor::Offset(5)),
            prev_cursor: Some(Cursor::Token("abc".into())),
        };
        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(json["nextCursor"], 5);
        assert_eq!(json["prevCursor"], "abc");
        assert_eq!(json["total"], 10);
    }

    #[test]
    fn request_plan_query_lookup() {
        let plan = RequestPlan::get()
            .with_query("status", "Active")
            .with_query("limit", "5");
        assert_eq!(plan.query_value("status"), Some("Active"));
        assert!(!plan.has_query("nextToken"));
    }
}
