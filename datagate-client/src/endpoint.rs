//! Endpoint resolution: section + environment → URL, or "use fixtures".

use crate::error::{DataAccessError, DataAccessResult};
use datagate_core::{is_absolute_url, DataGateConfig, Section};
use std::sync::Arc;

/// Resolves the remote URL for a section under the current environment.
///
/// `Ok(None)` means the section has no remote backend and is served from
/// local fixtures.
#[derive(Debug, Clone)]
pub struct EndpointResolver {
    config: Arc<DataGateConfig>,
}

impl EndpointResolver {
    pub fn new(config: Arc<DataGateConfig>) -> Self {
        Self { config }
    }

    pub fn has_declarations(&self) -> bool {
        self.config.has_endpoint_declarations()
    }

    pub fn resolve(&self, section: &Section, suffix: Option<&str>) -> DataAccessResult<Option<String>> {
        if !self.config.has_endpoint_declarations() {
            tracing::debug!(%section, "no endpoint declarations; using fixtures");
            return Ok(None);
        }

        let base = match self.config.declared_endpoint(section) {
            Some(endpoint) if is_absolute_url(endpoint) => endpoint.to_string(),
            Some(endpoint) => join_url(self.environment_base(section)?, endpoint),
            None if self.config.use_remote => {
                let default_route = format!("/{}", section.reduced());
                let route = self.config.route(section).unwrap_or(default_route.as_str());
                join_url(self.environment_base(section)?, route)
            }
            None => return Ok(None),
        };

        let url = match suffix.map(str::trim).filter(|s| !s.is_empty()) {
            Some(suffix) => join_url(&base, suffix),
            None => base,
        };
        tracing::debug!(%section, url = %url, "resolved endpoint");
        Ok(Some(url))
    }

    fn environment_base(&self, section: &Section) -> DataAccessResult<&str> {
        self.config.base_url().ok_or_else(|| {
            DataAccessError::configuration(format!(
                "no base URL for environment '{}' (needed by section '{}')",
                self.config.environment, section
            ))
        })
    }
}

/// Join two URL parts with exactly one `/` between them.
pub fn join_url(base: &str, path: &str) -> String {
    let base = base.trim().trim_end_matches('/');
    let path = path.trim().trim_start_matches('/');
    if path.is_empty() {
        base.to_string()
    } else {
        format!("{}/{}", base, path)
    }
}
