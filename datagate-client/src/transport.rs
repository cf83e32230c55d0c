//! HTTP transport: one call, one timeout, typed failures.

use async_trait::async_trait;
use datagate_core::{DataGateConfig, HttpMethod, TransportError};
use serde_json::Value;
use std::future::Future;
use std::time::Duration;

/// Executes a single request and returns the decoded JSON body.
///
/// Implementations must not retry; a failure is surfaced once, as is.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(
        &self,
        method: HttpMethod,
        url: &str,
        query: &[(String, String)],
        body: Option<&Value>,
    ) -> Result<Value, TransportError>;
}

/// Run `call` under a wall-clock bound. When the bound fires the call's
/// future is dropped, which aborts whatever it had in flight.
pub async fn with_timeout<T, F>(timeout: Duration, call: F) -> Result<T, TransportError>
where
    F: Future<Output = Result<T, TransportError>>,
{
    match tokio::time::timeout(timeout, call).await {
        Ok(result) => result,
        Err(_) => Err(TransportError::Timeout {
            timeout_ms: millis(timeout),
        }),
    }
}

/// Whole milliseconds, saturating at `u64::MAX`.
fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// [`Transport`] backed by `reqwest`.
#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        // No client-level timeout: `with_timeout` bounds headers and body together.
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| TransportError::Network {
                message: format!("Failed to build HTTP client: {}", e),
            })?;
        Ok(Self { client, timeout })
    }

    pub fn from_config(config: &DataGateConfig) -> Result<Self, TransportError> {
        Self::new(config.request_timeout())
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn send(
        &self,
        method: HttpMethod,
        url: &str,
        query: &[(String, String)],
        body: Option<&Value>,
    ) -> Result<Value, TransportError> {
        let mut request = match method {
            HttpMethod::Get => self.client.get(url),
            HttpMethod::Post => self.client.post(url),
            HttpMethod::Put => self.client.put(url),
            HttpMethod::Delete => self.client.delete(url),
        };
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(network_error)?;
        let status = response.status();
        let text = response.text().await.map_err(network_error)?;

        if status.is_success() {
            if text.trim().is_empty() {
                return Ok(Value::Null);
            }
            return serde_json::from_str(&text).map_err(|e| TransportError::Decode {
                reason: e.to_string(),
            });
        }

        let status_text = status.canonical_reason().unwrap_or("").to_string();
        let message = error_message(&text).unwrap_or_else(|| {
            if status_text.is_empty() {
                format!("HTTP {}", status.as_u16())
            } else {
                status_text.clone()
            }
        });
        Err(TransportError::Http {
            status: status.as_u16(),
            status_text,
            message,
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(
        &self,
        method: HttpMethod,
        url: &str,
        query: &[(String, String)],
        body: Option<&Value>,
    ) -> Result<Value, TransportError> {
        tracing::debug!(%method, url, params = query.len(), "sending request");
        with_timeout(self.timeout, self.send(method, url, query, body)).await
    }
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("timeout", &self.timeout)
            .finish()
    }
}

fn network_error(err: reqwest::Error) -> TransportError {
    TransportError::Network {
        message: err.to_string(),
    }
}

/// Best-effort message from an error body: `message`, then `error` (either a
/// string or an object with its own `message`).
pub(crate) fn error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    let non_blank = |v: &Value| {
        v.as_str()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };
    if let Some(message) = value.get("message").and_then(non_blank) {
        return Some(message);
    }
    match value.get("error")? {
        Value::Object(inner) => inner.get("message").and_then(non_blank),
        other => non_blank(other),
    }
}
