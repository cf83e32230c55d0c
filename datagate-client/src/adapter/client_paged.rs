//! Adapter for backends that return their whole collection at once.

use super::{extract_items, AdapterContext, SectionAdapter};
use crate::engine;
use crate::error::DataAccessResult;
use datagate_core::{FilterSet, ListQuery, RequestPlan, ResultEnvelope};
use serde_json::Value;

/// GET the full set, then filter, sort and page it with the local engine.
#[derive(Debug, Clone)]
pub struct ClientPagedAdapter {
    name: String,
    items_field: String,
}

impl ClientPagedAdapter {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            items_field: "items".to_string(),
        }
    }

    pub fn items_field(mut self, field: impl Into<String>) -> Self {
        self.items_field = field.into();
        self
    }
}

impl SectionAdapter for ClientPagedAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    fn build_list_request(&self, _ctx: &AdapterContext<'_>, _query: &ListQuery) -> RequestPlan {
        RequestPlan::get().paginated_locally()
    }

    fn build_count_request(&self, _ctx: &AdapterContext<'_>, _filters: &FilterSet) -> Option<RequestPlan> {
        None
    }

    fn transform_list_response(
        &self,
        ctx: &AdapterContext<'_>,
        raw: Value,
        query: &ListQuery,
    ) -> DataAccessResult<ResultEnvelope> {
        let records = extract_items(raw, &self.items_field, ctx.section)?;
        Ok(engine::run(records, &query.filters, &query.pagination, ctx.descriptors))
    }
}
