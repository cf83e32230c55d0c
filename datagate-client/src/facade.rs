//! The data-access facade: the single entry point for callers.

use crate::adapter::{AdapterContext, AdapterRegistry};
use crate::endpoint::EndpointResolver;
use crate::engine;
use crate::error::{DataAccessError, DataAccessResult};
use crate::fixtures::{DirectoryFixtures, FixtureSource};
use crate::transport::{HttpTransport, Transport};
use datagate_core::{
    DataGateConfig, FilterSet, HttpMethod, ListQuery, PaginationSpec, ResultEnvelope, Section,
};
use serde_json::Value;
use std::sync::Arc;

/// Routes every call to either a remote backend (through the section's
/// adapter) or the section's local fixtures.
///
/// All parts are immutable and shared, so clones are cheap and may be used
/// from any task.
#[derive(Clone)]
pub struct DataAccess {
    config: Arc<DataGateConfig>,
    resolver: EndpointResolver,
    adapters: Arc<AdapterRegistry>,
    transport: Arc<dyn Transport>,
    fixtures: Arc<dyn FixtureSource>,
}

impl DataAccess {
    pub fn new(
        config: DataGateConfig,
        adapters: AdapterRegistry,
        transport: Arc<dyn Transport>,
        fixtures: Arc<dyn FixtureSource>,
    ) -> Self {
        let config = Arc::new(config);
        Self {
            resolver: EndpointResolver::new(Arc::clone(&config)),
            config,
            adapters: Arc::new(adapters),
            transport,
            fixtures,
        }
    }

    /// The production wiring: reqwest transport, fixtures from
    /// `fixtures_dir`, built-in adapters.
    pub fn from_config(config: DataGateConfig) -> DataAccessResult<Self> {
        config.validate()?;
        let transport = HttpTransport::from_config(&config)
            .map_err(|e| DataAccessError::configuration(e.to_string()))?;
        let fixtures = DirectoryFixtures::new(config.fixtures_dir.clone());
        Ok(Self::new(
            config,
            AdapterRegistry::builtin(),
            Arc::new(transport),
            Arc::new(fixtures),
        ))
    }

    pub fn config(&self) -> &DataGateConfig {
        &self.config
    }

    pub fn adapters(&self) -> &AdapterRegistry {
        &self.adapters
    }

    /// URL a section resolves to, or `None` when it is fixture-backed.
    pub fn resolve_endpoint(&self, section: &Section, suffix: Option<&str>) -> DataAccessResult<Option<String>> {
        self.resolver.resolve(section, suffix)
    }

    /// List records of a section.
    pub async fn get(&self, section: &Section, query: &ListQuery) -> DataAccessResult<ResultEnvelope> {
        validate_section(section)?;
        let adapter = self.adapters.resolve(section);
        let ctx = self.context(section);
        let plan = adapter.build_list_request(&ctx, query);

        let Some(url) = self.resolver.resolve(section, Some(plan.url_suffix.as_str()))? else {
            return self.get_local(section, query).await;
        };

        tracing::debug!(
            %section,
            adapter = adapter.name(),
            method = %plan.method,
            url = %url,
            paginate_locally = plan.flags.paginate_locally,
            "executing list request"
        );
        let raw = self
            .transport
            .execute(plan.method, &url, &plan.query_params, plan.body.as_ref())
            .await
            .map_err(|e| DataAccessError::from_transport(section.as_str(), adapter.name(), &url, e))?;
        adapter.transform_list_response(&ctx, raw, query)
    }

    /// Number of records matching `filters`. Never fails: remote errors fall
    /// back to counting fixtures, and `None` means no count is available.
    pub async fn get_total_count(&self, section: &Section, filters: &FilterSet) -> Option<u64> {
        if validate_section(section).is_err() {
            return None;
        }
        match self.remote_count(section, filters).await {
            Ok(Some(count)) => return Some(count),
            Ok(None) => {}
            Err(err) => {
                tracing::warn!(%section, error = %err, "remote count failed; counting fixtures");
            }
        }
        match self.fixtures.load(section).await {
            Ok(records) => {
                let descriptors = self.config.filters.descriptors(section);
                Some(engine::count_matching(&records, filters, descriptors))
            }
            Err(err) => {
                tracing::warn!(%section, error = %err, "no count available");
                None
            }
        }
    }

    /// POST to a section's endpoint (plus optional suffix).
    pub async fn post(&self, section: &Section, suffix: Option<&str>, body: &Value) -> DataAccessResult<Value> {
        self.mutate(HttpMethod::Post, section, suffix, Some(body)).await
    }

    /// DELETE on a section's endpoint (plus optional suffix).
    pub async fn delete(
        &self,
        section: &Section,
        suffix: Option<&str>,
        body: Option<&Value>,
    ) -> DataAccessResult<Value> {
        self.mutate(HttpMethod::Delete, section, suffix, body).await
    }

    fn context<'a>(&'a self, section: &'a Section) -> AdapterContext<'a> {
        AdapterContext {
            section,
            environment: &self.config.environment,
            descriptors: self.config.filters.descriptors(section),
        }
    }

    /// `Ok(None)`: the section is fixture-backed or its backend reports no
    /// total.
    async fn remote_count(&self, section: &Section, filters: &FilterSet) -> DataAccessResult<Option<u64>> {
        let adapter = self.adapters.resolve(section);
        let ctx = self.context(section);

        let Some(plan) = adapter.build_count_request(&ctx, filters) else {
            let query = ListQuery::new(filters.clone(), PaginationSpec::new(1));
            if self.resolver.resolve(section, None)?.is_none() {
                return Ok(None);
            }
            return Ok(self.get(section, &query).await?.total);
        };

        let Some(url) = self.resolver.resolve(section, Some(plan.url_suffix.as_str()))? else {
            return Ok(None);
        };
        tracing::debug!(%section, adapter = adapter.name(), url = %url, "executing count request");
        let raw = self
            .transport
            .execute(plan.method, &url, &plan.query_params, plan.body.as_ref())
            .await
            .map_err(|e| DataAccessError::from_transport(section.as_str(), adapter.name(), &url, e))?;
        adapter
            .transform_count_response(&raw)
            .map(Some)
            .ok_or_else(|| DataAccessError::json_parse(format!("count response from {url}"), "no count field"))
    }

    async fn mutate(
        &self,
        method: HttpMethod,
        section: &Section,
        suffix: Option<&str>,
        body: Option<&Value>,
    ) -> DataAccessResult<Value> {
        validate_section(section)?;
        if !self.resolver.has_declarations() {
            return Err(DataAccessError::configuration(format!(
                "cannot {method} section '{section}': no endpoint declarations configured"
            )));
        }
        let url = self
            .resolver
            .resolve(section, suffix)?
            .ok_or_else(|| DataAccessError::EndpointNotConfigured {
                section: section.to_string(),
            })?;
        let adapter = self.adapters.resolve(section);

        tracing::debug!(%section, %method, url = %url, "executing mutation");
        self.transport
            .execute(method, &url, &[], body)
            .await
            .map_err(|e| DataAccessError::from_transport(section.as_str(), adapter.name(), &url, e))
    }

    async fn get_local(&self, section: &Section, query: &ListQuery) -> DataAccessResult<ResultEnvelope> {
        tracing::info!(%section, "no remote endpoint; serving fixtures");
        let records = self.fixtures.load(section).await?;
        let descriptors = self.config.filters.descriptors(section);
        Ok(engine::run(records, &query.filters, &query.pagination, descriptors))
    }
}

impl std::fmt::Debug for DataAccess {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataAccess")
            .field("environment", &self.config.environment)
            .field("adapters", &self.adapters)
            .finish()
    }
}

fn validate_section(section: &Section) -> DataAccessResult<()> {
    if section.as_str().trim().is_empty() {
        return Err(DataAccessError::Validation {
            field: "section".to_string(),
            reason: "must not be empty".to_string(),
        });
    }
    Ok(())
}
