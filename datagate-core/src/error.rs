//! Error types shared across DATAGATE crates

use std::fmt;
use thiserror::Error;

/// Failure of a single transport call.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("Request timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Network error: {message}")]
    Network { message: String },

    #[error("HTTP {status} {status_text}: {message}")]
    Http {
        status: u16,
        status_text: String,
        message: String,
    },

    #[error("Failed to decode response body: {reason}")]
    Decode { reason: String },
}

/// Discriminant of [`TransportError`], for callers that branch on the
/// failure class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportErrorKind {
    Timeout,
    Network,
    Http,
    Decode,
}

impl TransportError {
    pub fn kind(&self) -> TransportErrorKind {
        match self {
            TransportError::Timeout { .. } => TransportErrorKind::Timeout,
            TransportError::Network { .. } => TransportErrorKind::Network,
            TransportError::Http { .. } => TransportErrorKind::Http,
            TransportError::Decode { .. } => TransportErrorKind::Decode,
        }
    }

    pub fn is_timeout(&self) -> bool {
        self.kind() == TransportErrorKind::Timeout
    }

    /// HTTP status for `Http` failures.
    pub fn status(&self) -> Option<u16> {
        match self {
            TransportError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TransportErrorKind::Timeout => "timeout",
            TransportErrorKind::Network => "network",
            TransportErrorKind::Http => "http",
            TransportErrorKind::Decode => "decode",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing configuration file path (use --config or DATAGATE_CONFIG)")]
    MissingConfigPath,
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid config value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

impl ConfigError {
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_error_kinds() {
        let timeout = TransportError::Timeout { timeout_ms: 20_000 };
        assert_eq!(timeout.kind(), TransportErrorKind::Timeout);
        assert!(timeout.is_timeout());
        assert_eq!(timeout.to_string(), "Request timed out after 20000ms");

        let http = TransportError::Http {
            status: 404,
            status_text: "Not Found".into(),
            message: "no such route".into(),
        };
        assert_eq!(http.kind(), TransportErrorKind::Http);
        assert_eq!(http.status(), Some(404));
        assert!(!http.is_timeout());
    }
}
