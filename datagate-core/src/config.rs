//! Configuration loading for DATAGATE.
//!
//! The configuration is read once at startup and handed to the data-access
//! facade as an immutable value. Endpoint declarations are optional: when the
//! `endpoints` table is absent every section is served from fixtures.

use crate::error::ConfigError;
use crate::filter::FilterRegistry;
use crate::Section;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable naming the config file when `--config` is absent.
pub const CONFIG_ENV_VAR: &str = "DATAGATE_CONFIG";

/// Transport timeout applied when the config does not set one.
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 20_000;

/// Per-section, per-environment endpoint declarations:
/// `{ section: { env: { endpoint } } }`.
pub type EndpointDeclarations = BTreeMap<String, BTreeMap<String, SectionEndpoint>>;

/// Endpoint declared for one section in one environment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SectionEndpoint {
    /// Absolute URL, or a path relative to the environment base URL.
    #[serde(default)]
    pub endpoint: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DataGateConfig {
    #[serde(default = "default_environment")]
    pub environment: String,
    /// Build URLs from `base_urls` + `routes` for sections without an
    /// explicit endpoint.
    #[serde(default)]
    pub use_remote: bool,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    #[serde(default = "default_fixtures_dir")]
    pub fixtures_dir: PathBuf,
    /// Environment → base URL.
    #[serde(default)]
    pub base_urls: BTreeMap<String, String>,
    /// Section → route path appended to the base URL.
    #[serde(default)]
    pub routes: BTreeMap<String, String>,
    #[serde(default)]
    pub endpoints: Option<EndpointDeclarations>,
    #[serde(default)]
    pub filters: FilterRegistry,
}

fn default_environment() -> String {
    "local".to_string()
}

fn default_request_timeout_ms() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_MS
}

fn default_fixtures_dir() -> PathBuf {
    PathBuf::from("fixtures")
}

impl Default for DataGateConfig {
    fn default() -> Self {
        Self {
            environment: default_environment(),
            use_remote: false,
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            fixtures_dir: default_fixtures_dir(),
            base_urls: BTreeMap::new(),
            routes: BTreeMap::new(),
            endpoints: None,
            filters: FilterRegistry::default(),
        }
    }
}

impl DataGateConfig {
    /// Load from `explicit` (the `--config` flag) or `DATAGATE_CONFIG`, then
    /// validate.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => config_path_from_env().ok_or(ConfigError::MissingConfigPath)?,
        };
        let config = Self::from_path(&path)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: DataGateConfig = toml::from_str(contents)?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.environment.trim().is_empty() {
            return Err(ConfigError::invalid("environment", "must not be empty"));
        }
        if self.request_timeout_ms == 0 {
            return Err(ConfigError::invalid("request_timeout_ms", "must be > 0"));
        }
        for (env, url) in &self.base_urls {
            if !is_absolute_url(url) {
                return Err(ConfigError::invalid(
                    format!("base_urls.{env}"),
                    "must be an absolute http(s) URL",
                ));
            }
        }
        for (section, route) in &self.routes {
            if !route.starts_with('/') {
                return Err(ConfigError::invalid(
                    format!("routes.{section}"),
                    "must start with '/'",
                ));
            }
        }
        if let Some(endpoints) = &self.endpoints {
            for (section, envs) in endpoints {
                for (env, declared) in envs {
                    let blank = declared
                        .endpoint
                        .as_deref()
                        .is_some_and(|endpoint| endpoint.trim().is_empty());
                    if blank {
                        return Err(ConfigError::invalid(
                            format!("endpoints.{section}.{env}.endpoint"),
                            "must not be blank (omit it instead)",
                        ));
                    }
                }
            }
        }
        for (section, descriptors) in self.filters.entries() {
            if descriptors.iter().any(|d| d.name.trim().is_empty()) {
                return Err(ConfigError::invalid(
                    format!("filters.{section}"),
                    "every filter needs a name",
                ));
            }
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Base URL of the current environment.
    pub fn base_url(&self) -> Option<&str> {
        self.base_urls.get(&self.environment).map(String::as_str)
    }

    /// Route for a section, by full key then reduced key.
    pub fn route(&self, section: &Section) -> Option<&str> {
        self.routes
            .get(section.as_str())
            .or_else(|| self.routes.get(section.reduced()))
            .map(String::as_str)
    }

    /// Whether any endpoint-declaration structure exists at all.
    pub fn has_endpoint_declarations(&self) -> bool {
        self.endpoints.is_some()
    }

    /// Declared endpoint for a section in the current environment, by full
    /// key then reduced key.
    pub fn declared_endpoint(&self, section: &Section) -> Option<&str> {
        let endpoints = self.endpoints.as_ref()?;
        endpoints
            .get(section.as_str())
            .or_else(|| endpoints.get(section.reduced()))
            .and_then(|envs| envs.get(&self.environment))
            .and_then(|declared| declared.endpoint.as_deref())
            .map(str::trim)
            .filter(|endpoint| !endpoint.is_empty())
    }

    /// Declare an endpoint for `section` in `environment`, creating the
    /// declaration table if needed.
    pub fn with_endpoint(
        mut self,
        section: impl Into<String>,
        environment: impl Into<String>,
        endpoint: impl Into<String>,
    ) -> Self {
        self.endpoints
            .get_or_insert_with(BTreeMap::new)
            .entry(section.into())
            .or_default()
            .insert(
                environment.into(),
                SectionEndpoint {
                    endpoint: Some(endpoint.into()),
                },
            );
        self
    }

    /// Create an empty declaration table: sections stay on fixtures unless
    /// `use_remote` is set, but mutations become possible.
    pub fn with_empty_declarations(mut self) -> Self {
        self.endpoints.get_or_insert_with(BTreeMap::new);
        self
    }

    pub fn with_base_url(mut self, environment: impl Into<String>, url: impl Into<String>) -> Self {
        self.base_urls.insert(environment.into(), url.into());
        self
    }
}

pub fn is_absolute_url(url: &str) -> bool {
    let lower = url.trim().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

fn config_path_from_env() -> Option<PathBuf> {
    std::env::var_os(CONFIG_ENV_VAR)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FilterType;

    const SAMPLE: &str = r#"
environment = "staging"
use_remote = false
request_timeout_ms = 15000
fixtures_dir = "data/fixtures"

[base_urls]
staging = "https://staging.example.com/api"
production = "https://example.com/api"

[routes]
payments = "/v2/payments"

[endpoints.orders.staging]
endpoint = "/orders"

[endpoints.users.production]
endpoint = "https://users.example.com/v1/users"

[[filters.orders]]
name = "status"
type = "select"

[[filters.orders]]
name = "createdAt"
type = "date"
"#;

    #[test]
    fn parses_sample_config() {
        let config = DataGateConfig::from_toml_str(SAMPLE).unwrap();
        assert_eq!(config.environment, "staging");
        assert_eq!(config.request_timeout(), Duration::from_millis(15_000));
        assert_eq!(config.base_url(), Some("https://staging.example.com/api"));
        assert_eq!(config.route(&Section::new("payments")), Some("/v2/payments"));
        assert_eq!(
            config.declared_endpoint(&Section::new("orders")),
            Some("/orders")
        );
        // declared only for production
        assert_eq!(config.declared_endpoint(&Section::new("users")), None);
        let descriptors = config.filters.descriptors(&Section::new("orders"));
        assert_eq!(descriptors.len(), 2);
        assert_eq!(descriptors[1].filter_type, FilterType::Date);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn defaults_apply_to_minimal_config() {
        let config = DataGateConfig::from_toml_str("").unwrap();
        assert_eq!(config.environment, "local");
        assert_eq!(config.request_timeout_ms, DEFAULT_REQUEST_TIMEOUT_MS);
        assert!(!config.use_remote);
        assert!(!config.has_endpoint_declarations());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn unknown_fields_rejected() {
        assert!(DataGateConfig::from_toml_str("enviroment = \"x\"").is_err());
    }

    #[test]
    fn zero_timeout_rejected() {
        let config = DataGateConfig {
            request_timeout_ms: 0,
            ..DataGateConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { ref field, .. }) if field == "request_timeout_ms"
        ));
    }

    #[test]
    fn relative_base_url_rejected() {
        let config = DataGateConfig::default().with_base_url("local", "localhost:8080");
        assert!(config.validate().is_err());
    }

    #[test]
    fn route_without_leading_slash_rejected() {
        let mut config = DataGateConfig::default();
        config.routes.insert("orders".into(), "orders".into());
        assert!(config.validate().is_err());
    }

    #[test]
    fn blank_endpoint_rejected() {
        let config = DataGateConfig::default().with_endpoint("orders", "local", "  ");
        assert!(config.validate().is_err());
    }

    #[test]
    fn declared_endpoint_falls_back_to_reduced_key() {
        let config = DataGateConfig::default().with_endpoint("orders", "local", "/orders");
        assert_eq!(
            config.declared_endpoint(&Section::new("admin/orders")),
            Some("/orders")
        );
    }

    #[test]
    fn loads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("datagate.toml");
        std::fs::write(&path, SAMPLE).unwrap();
        let config = DataGateConfig::from_path(&path).unwrap();
        assert_eq!(config.environment, "staging");
    }

    #[test]
    fn load_validates_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("datagate.toml");
        std::fs::write(&path, SAMPLE).unwrap();
        assert_eq!(DataGateConfig::load(Some(&path)).unwrap().environment, "staging");

        std::fs::write(&path, "request_timeout_ms = 0\n").unwrap();
        assert!(matches!(
            DataGateConfig::load(Some(&path)),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = DataGateConfig::from_path(Path::new("/nonexistent/datagate.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
