//! Error types for the data-access layer.

use datagate_core::{ConfigError, TransportError};

pub type DataAccessResult<T> = Result<T, DataAccessError>;

#[derive(Debug, thiserror::Error)]
pub enum DataAccessError {
    #[error("Configuration error: {reason}")]
    Configuration { reason: String },

    #[error("No endpoint configured for section '{section}'")]
    EndpointNotConfigured { section: String },

    #[error("Endpoint not found for section '{section}' ({adapter} adapter): {url}")]
    EndpointNotFound {
        section: String,
        adapter: String,
        url: String,
    },

    #[error("API error for section '{section}' ({adapter} adapter) at {url}: HTTP {status}: {message}")]
    Api {
        section: String,
        adapter: String,
        url: String,
        status: u16,
        message: String,
    },

    #[error("Request for section '{section}' to {url} failed: {source}")]
    Transport {
        section: String,
        url: String,
        #[source]
        source: TransportError,
    },

    #[error("Malformed JSON in {context}: {reason}")]
    JsonParse { context: String, reason: String },

    #[error("No data available for section '{section}'")]
    FixtureNotFound { section: String },

    #[error("Could not load data for section '{section}': {reason}")]
    Fixture { section: String, reason: String },

    #[error("Invalid value for {field}: {reason}")]
    Validation { field: String, reason: String },
}

/// Discriminant of [`DataAccessError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Configuration,
    EndpointNotConfigured,
    EndpointNotFound,
    Api,
    Timeout,
    Network,
    JsonParse,
    FixtureNotFound,
    Fixture,
    Validation,
}

impl DataAccessError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DataAccessError::Configuration { .. } => ErrorKind::Configuration,
            DataAccessError::EndpointNotConfigured { .. } => ErrorKind::EndpointNotConfigured,
            DataAccessError::EndpointNotFound { .. } => ErrorKind::EndpointNotFound,
            DataAccessError::Api { .. } => ErrorKind::Api,
            DataAccessError::Transport { source, .. } => match source {
                TransportError::Timeout { .. } => ErrorKind::Timeout,
                TransportError::Network { .. } => ErrorKind::Network,
                TransportError::Http { .. } => ErrorKind::Api,
                TransportError::Decode { .. } => ErrorKind::JsonParse,
            },
            DataAccessError::JsonParse { .. } => ErrorKind::JsonParse,
            DataAccessError::FixtureNotFound { .. } => ErrorKind::FixtureNotFound,
            DataAccessError::Fixture { .. } => ErrorKind::Fixture,
            DataAccessError::Validation { .. } => ErrorKind::Validation,
        }
    }

    /// HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            DataAccessError::EndpointNotFound { .. } => Some(404),
            DataAccessError::Api { status, .. } => Some(*status),
            DataAccessError::Transport { source, .. } => source.status(),
            _ => None,
        }
    }

    pub fn configuration(reason: impl Into<String>) -> Self {
        Self::Configuration {
            reason: reason.into(),
        }
    }

    pub fn json_parse(context: impl Into<String>, reason: impl ToString) -> Self {
        Self::JsonParse {
            context: context.into(),
            reason: reason.to_string(),
        }
    }

    /// Attach section/adapter/URL context to a transport failure.
    ///
    /// 404 becomes "endpoint not found", any other HTTP status an API error;
    /// undecodable bodies become JSON errors. Timeouts and network failures
    /// keep their transport error as the source.
    pub fn from_transport(section: &str, adapter: &str, url: &str, err: TransportError) -> Self {
        match err {
            TransportError::Http { status: 404, .. } => Self::EndpointNotFound {
                section: section.to_string(),
                adapter: adapter.to_string(),
                url: url.to_string(),
            },
            TransportError::Http {
                status, message, ..
            } => Self::Api {
                section: section.to_string(),
                adapter: adapter.to_string(),
                url: url.to_string(),
                status,
                message,
            },
            TransportError::Decode { reason } => Self::JsonParse {
                context: format!("response from {url}"),
                reason,
            },
            source => Self::Transport {
                section: section.to_string(),
                url: url.to_string(),
                source,
            },
        }
    }
}

impl From<ConfigError> for DataAccessError {
    fn from(err: ConfigError) -> Self {
        Self::configuration(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_maps_to_endpoint_not_found() {
        let err = DataAccessError::from_transport(
            "orders",
            "default",
            "https://api.example.com/orders",
            TransportError::Http {
                status: 404,
                status_text: "Not Found".into(),
                message: "Not Found".into(),
            },
        );
        assert_eq!(err.kind(), ErrorKind::EndpointNotFound);
        assert_eq!(err.status(), Some(404));
        assert!(err.to_string().contains("Endpoint not found"));
    }

    #[test]
    fn server_error_maps_to_api_error() {
        let err = DataAccessError::from_transport(
            "orders",
            "default",
            "https://api.example.com/orders",
            TransportError::Http {
                status: 500,
                status_text: "Internal Server Error".into(),
                message: "database unavailable".into(),
            },
        );
        assert_eq!(err.kind(), ErrorKind::Api);
        assert_eq!(err.status(), Some(500));
        assert!(err.to_string().contains("database unavailable"));
    }

    #[test]
    fn timeout_keeps_transport_source() {
        let err = DataAccessError::from_transport(
            "orders",
            "default",
            "https://api.example.com/orders",
            TransportError::Timeout { timeout_ms: 20_000 },
        );
        assert_eq!(err.kind(), ErrorKind::Timeout);
        match err {
            DataAccessError::Transport { source, url, .. } => {
                assert_eq!(source, TransportError::Timeout { timeout_ms: 20_000 });
                assert_eq!(url, "https://api.example.com/orders");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn decode_maps_to_json_parse() {
        let err = DataAccessError::from_transport(
            "orders",
            "default",
            "https://api.example.com/orders",
            TransportError::Decode {
                reason: "expected value at line 1".into(),
            },
        );
        assert_eq!(err.kind(), ErrorKind::JsonParse);
    }
}
