//! Section → adapter lookup.

use super::{
    ClientPagedAdapter, DefaultAdapter, QueryStringAdapter, SearchRoute, SectionAdapter,
    TokenPagedAdapter,
};
use datagate_core::Section;
use std::collections::HashMap;
use std::sync::Arc;

/// Registry of section adapters.
/// Adapters must be explicitly registered; unknown sections get the default.
///
/// # Example
/// ```ignore
/// let mut registry = AdapterRegistry::new();
/// registry.register("invoices", QueryStringAdapter::new("invoices"));
/// let adapter = registry.resolve(&Section::new("billing/invoices"));
/// ```
#[derive(Clone)]
pub struct AdapterRegistry {
    adapters: HashMap<String, Arc<dyn SectionAdapter>>,
    fallback: Arc<dyn SectionAdapter>,
}

impl AdapterRegistry {
    /// An empty registry: every section uses [`DefaultAdapter`].
    pub fn new() -> Self {
        Self {
            adapters: HashMap::new(),
            fallback: Arc::new(DefaultAdapter),
        }
    }

    /// The registry with the built-in section adapters.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register(
            "payments",
            QueryStringAdapter::new("payments")
                .search_route(SearchRoute::prefix("ref-", "reference"))
                .search_route(SearchRoute::contains("@", "email"))
                .search_route(SearchRoute::fallback("userId"))
                .rename("from", "startDate")
                .rename("to", "endDate")
                .items_at("/data/payments")
                .total_at("/data/totalCount"),
        );
        registry.register(
            "users",
            QueryStringAdapter::new("users")
                .rename("userName", "username")
                .fixed_param("includeDeleted", "false")
                .items_at("/results")
                .total_at("/count"),
        );
        registry.register(
            "api-keys",
            QueryStringAdapter::new("api-keys")
                .fixed_param("scope", "admin")
                .items_at("/keys")
                .without_count_endpoint(),
        );
        registry.register("audit-logs", TokenPagedAdapter::new("audit-logs", "events"));
        registry.register("webhooks", ClientPagedAdapter::new("webhooks"));
        registry
    }

    /// Register an adapter for a section key.
    /// Replaces any adapter previously registered under that key.
    pub fn register(&mut self, section: impl Into<String>, adapter: impl SectionAdapter + 'static) {
        self.adapters.insert(section.into(), Arc::new(adapter));
    }

    /// Adapter for a section: reduced key, then raw key, then the default.
    pub fn resolve(&self, section: &Section) -> Arc<dyn SectionAdapter> {
        self.adapters
            .get(section.reduced())
            .or_else(|| self.adapters.get(section.as_str()))
            .cloned()
            .unwrap_or_else(|| Arc::clone(&self.fallback))
    }

    pub fn is_registered(&self, key: &str) -> bool {
        self.adapters.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }
}

impl Default for AdapterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for AdapterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut keys: Vec<&String> = self.adapters.keys().collect();
        keys.sort();
        f.debug_struct("AdapterRegistry")
            .field("adapters", &keys)
            .field("fallback", &self.fallback.name())
            .finish()
    }
}
