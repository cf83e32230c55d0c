//! Adapter for backends paginated by opaque continuation tokens.

use super::{extract_items, request_filters, AdapterContext, SectionAdapter};
use crate::error::DataAccessResult;
use datagate_core::{Cursor, FilterSet, ListQuery, RequestPlan, ResultEnvelope};
use serde_json::{json, Value};

/// POST `{filters, pageSize, nextToken}`, response `{<items>, nextToken}`.
///
/// These backends report neither a total nor a way back, so `total` and
/// `prev_cursor` are always `None`.
#[derive(Debug, Clone)]
pub struct TokenPagedAdapter {
    name: String,
    items_field: String,
}

impl TokenPagedAdapter {
    pub fn new(name: impl Into<String>, items_field: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            items_field: items_field.into(),
        }
    }
}

impl SectionAdapter for TokenPagedAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    fn build_list_request(&self, _ctx: &AdapterContext<'_>, query: &ListQuery) -> RequestPlan {
        RequestPlan::post(json!({
            "filters": Value::Object(request_filters(&query.filters)),
            "pageSize": query.pagination.effective_limit(),
            "nextToken": query.pagination.next_token,
        }))
    }

    fn build_count_request(&self, _ctx: &AdapterContext<'_>, _filters: &FilterSet) -> Option<RequestPlan> {
        None
    }

    fn transform_list_response(
        &self,
        ctx: &AdapterContext<'_>,
        raw: Value,
        _query: &ListQuery,
    ) -> DataAccessResult<ResultEnvelope> {
        let next_cursor = raw
            .get("nextToken")
            .and_then(Value::as_str)
            .filter(|token| !token.trim().is_empty())
            .map(|token| Cursor::Token(token.to_string()));
        let items = extract_items(raw, &self.items_field, ctx.section)?;
        Ok(ResultEnvelope {
            items,
            total: None,
            next_cursor,
            prev_cursor: None,
        })
    }

    fn transform_count_response(&self, _raw: &Value) -> Option<u64> {
        None
    }
}
