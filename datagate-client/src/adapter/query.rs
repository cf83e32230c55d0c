//! Declarative GET + querystring adapters.

use super::{
    as_count, default_count_from, extract_items, query_string_value, request_filters,
    response_token, AdapterContext, SectionAdapter,
};
use crate::error::DataAccessResult;
use crate::pagination::remote_cursors;
use datagate_core::{FilterSet, ListQuery, RequestPlan, ResultEnvelope};
use serde_json::Value;

/// Filter key holding free-text search input.
const SEARCH_KEY: &str = "q";

/// One routing rule for the free-text `q` filter. Rules are tried in order;
/// the first that applies decides the backend parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchRoute {
    /// Input starting with `prefix` (case-insensitive).
    Prefix { prefix: String, param: String },
    /// Input containing `needle`.
    Contains { needle: String, param: String },
    /// Any input.
    Fallback { param: String },
}

impl SearchRoute {
    pub fn prefix(prefix: impl Into<String>, param: impl Into<String>) -> Self {
        Self::Prefix {
            prefix: prefix.into(),
            param: param.into(),
        }
    }

    pub fn contains(needle: impl Into<String>, param: impl Into<String>) -> Self {
        Self::Contains {
            needle: needle.into(),
            param: param.into(),
        }
    }

    pub fn fallback(param: impl Into<String>) -> Self {
        Self::Fallback { param: param.into() }
    }

    fn route(&self, input: &str) -> Option<&str> {
        match self {
            SearchRoute::Prefix { prefix, param } => input
                .to_lowercase()
                .starts_with(&prefix.to_lowercase())
                .then_some(param.as_str()),
            SearchRoute::Contains { needle, param } => {
                input.contains(needle.as_str()).then_some(param.as_str())
            }
            SearchRoute::Fallback { param } => Some(param.as_str()),
        }
    }
}

/// A backend queried with GET and query parameters.
///
/// Everything about it is data: parameter renames, fixed parameters, search
/// routing, and JSON pointers locating items and total in the response.
#[derive(Debug, Clone)]
pub struct QueryStringAdapter {
    name: String,
    renames: Vec<(String, String)>,
    fixed_params: Vec<(String, String)>,
    search_routes: Vec<SearchRoute>,
    items_pointer: String,
    total_pointer: Option<String>,
    count_suffix: Option<String>,
}

impl QueryStringAdapter {
    /// An adapter reading items from `/items` with a `/count` endpoint.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            renames: Vec::new(),
            fixed_params: Vec::new(),
            search_routes: Vec::new(),
            items_pointer: "/items".to_string(),
            total_pointer: None,
            count_suffix: Some("/count".to_string()),
        }
    }

    pub fn rename(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.renames.push((from.into(), to.into()));
        self
    }

    pub fn fixed_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fixed_params.push((key.into(), value.into()));
        self
    }

    pub fn search_route(mut self, route: SearchRoute) -> Self {
        self.search_routes.push(route);
        self
    }

    pub fn items_at(mut self, pointer: impl Into<String>) -> Self {
        self.items_pointer = pointer.into();
        self
    }

    pub fn total_at(mut self, pointer: impl Into<String>) -> Self {
        self.total_pointer = Some(pointer.into());
        self
    }

    /// Count derived from the list call's total instead of a count endpoint.
    pub fn without_count_endpoint(mut self) -> Self {
        self.count_suffix = None;
        self
    }

    /// Backend parameter for a filter key after renames.
    fn param_name<'a>(&'a self, key: &'a str) -> &'a str {
        self.renames
            .iter()
            .find(|(from, _)| from == key)
            .map(|(_, to)| to.as_str())
            .unwrap_or(key)
    }

    /// Backend parameter for free-text input. Without routes the key is
    /// passed through unchanged.
    pub fn search_param(&self, input: &str) -> &str {
        self.search_routes
            .iter()
            .find_map(|route| route.route(input))
            .unwrap_or(SEARCH_KEY)
    }

    fn filter_params(&self, filters: &FilterSet) -> Vec<(String, String)> {
        let mut params = Vec::new();
        for (key, value) in request_filters(filters) {
            let Some(value) = query_string_value(&value) else {
                continue;
            };
            let param = if key == SEARCH_KEY {
                self.search_param(&value).to_string()
            } else {
                self.param_name(&key).to_string()
            };
            params.push((param, value));
        }
        params.extend(self.fixed_params.iter().cloned());
        params
    }

    fn locate_total(&self, raw: &Value) -> Option<u64> {
        match &self.total_pointer {
            Some(pointer) => raw.pointer(pointer).and_then(as_count),
            None => default_count_from(raw),
        }
    }
}

impl SectionAdapter for QueryStringAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    fn build_list_request(&self, _ctx: &AdapterContext<'_>, query: &ListQuery) -> RequestPlan {
        let mut plan = RequestPlan::get();
        plan.query_params = self.filter_params(&query.filters);

        let pagination = &query.pagination;
        plan.push_query("limit", pagination.effective_limit().to_string());
        plan.push_query("offset", pagination.offset.to_string());
        if let Some(token) = &pagination.next_token {
            plan.push_query("nextToken", token.clone());
        }
        if let Some(field) = &pagination.sort_field {
            plan.push_query("sortField", field.clone());
            plan.push_query("sortDirection", pagination.sort_direction.as_str());
        }
        plan
    }

    fn build_count_request(&self, _ctx: &AdapterContext<'_>, filters: &FilterSet) -> Option<RequestPlan> {
        let suffix = self.count_suffix.as_ref()?;
        let mut plan = RequestPlan::get().with_suffix(suffix.clone());
        plan.query_params = self.filter_params(filters);
        Some(plan)
    }

    fn transform_list_response(
        &self,
        ctx: &AdapterContext<'_>,
        mut raw: Value,
        query: &ListQuery,
    ) -> DataAccessResult<ResultEnvelope> {
        let total = self.locate_total(&raw);
        let token = response_token(&raw);
        let located = raw.pointer_mut(&self.items_pointer).map(Value::take);
        let items = extract_items(located.unwrap_or(raw), "items", ctx.section)?;
        let (next_cursor, prev_cursor) = remote_cursors(&query.pagination, items.len(), total, token);
        Ok(ResultEnvelope {
            items,
            total,
            next_cursor,
            prev_cursor,
        })
    }

    fn transform_count_response(&self, raw: &Value) -> Option<u64> {
        self.locate_total(raw).or_else(|| default_count_from(raw))
    }
}
