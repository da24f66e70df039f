//! HTTP API client built on the resilient client.

use std::time::Duration;

use reqwest::{header, Method};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::{ClientStats, ResilientClient};
use crate::cache::create_cache_key;
use crate::error::{ResilienceError, Result};

/// Upstream REST API location and per-request timeout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamConfig {
    /// Base URL every endpoint is appended to
    pub base_url: String,
    /// Timeout applied by the HTTP client to each attempt
    pub timeout: Duration,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:4000/api/v1".to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Successful upstream response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse {
    /// The body's `data` field when present, otherwise the whole body
    pub data: Value,
    /// HTTP status of the upstream response
    pub status: u16,
    /// The body's `message` field, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ApiResponse {
    /// Unwraps the conventional `{ data, message }` envelope.
    pub fn from_body(status: u16, body: Value) -> Self {
        let message = body
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string);
        let data = match body.get("data") {
            Some(data) => data.clone(),
            None => body,
        };

        Self {
            data,
            status,
            message,
        }
    }
}

/// REST client whose calls go through breaker, retry and (for GET) cache.
#[derive(Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    resilience: ResilientClient<ApiResponse>,
}

impl ApiClient {
    /// Builds the HTTP client with the upstream timeout.
    ///
    /// # Errors
    /// Returns [`ResilienceError::Internal`] if the HTTP client cannot be built.
    pub fn new(upstream: &UpstreamConfig, resilience: ResilientClient<ApiResponse>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(upstream.timeout)
            .build()
            .map_err(|e| ResilienceError::Internal(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: upstream.base_url.trim_end_matches('/').to_string(),
            resilience,
        })
    }

    /// GET `endpoint` (path plus optional query), served from cache when fresh.
    pub async fn get(&self, endpoint: &str) -> Result<ApiResponse> {
        let key = create_cache_key(["api", "GET", endpoint]);
        let url = self.url(endpoint);

        self.resilience
            .execute(&key, None, || self.send(Method::GET, &url, None))
            .await
    }

    /// POST a JSON body to `endpoint`. Never cached.
    pub async fn post(&self, endpoint: &str, body: &Value) -> Result<ApiResponse> {
        let url = self.url(endpoint);

        self.resilience
            .execute_uncached(|| self.send(Method::POST, &url, Some(body)))
            .await
    }

    pub fn stats(&self) -> ClientStats {
        self.resilience.stats()
    }

    pub fn resilience(&self) -> &ResilientClient<ApiResponse> {
        &self.resilience
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: &str) -> String {
        if endpoint.starts_with('/') {
            format!("{}{}", self.base_url, endpoint)
        } else {
            format!("{}/{}", self.base_url, endpoint)
        }
    }

    /// One attempt. Non-2xx responses carry their status code; transport
    /// failures carry a message the retry classifier recognises as transient.
    async fn send(&self, method: Method, url: &str, body: Option<&Value>) -> Result<ApiResponse> {
        debug!(%method, url, "Sending upstream request");

        let mut request = self
            .http
            .request(method, url)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(transport_error)?;
        let status = response.status();

        if !status.is_success() {
            return Err(ResilienceError::http(
                status.as_u16(),
                format!(
                    "HTTP {}: {}",
                    status.as_u16(),
                    status.canonical_reason().unwrap_or("Unknown")
                ),
            ));
        }

        let bytes = response.bytes().await.map_err(transport_error)?;
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            // A malformed 2xx body is an application failure, never retried
            serde_json::from_slice(&bytes).map_err(|e| {
                debug!(url, error = %e, "Upstream body is not JSON");
                ResilienceError::Internal(format!("upstream returned invalid JSON: {e}"))
            })?
        };

        Ok(ApiResponse::from_body(status.as_u16(), body))
    }
}

/// Maps a reqwest failure by kind only. The message is fixed so that nothing
/// from the URL can reach the transient-message classifier.
fn transport_error(error: reqwest::Error) -> ResilienceError {
    debug!(error = %error, "Upstream transport failure");
    ResilienceError::network(transport_cause(
        error.is_timeout(),
        error.is_connect() || error.is_request() || error.is_body(),
    ))
}

fn transport_cause(is_timeout: bool, is_network: bool) -> &'static str {
    if is_timeout {
        "request timed out"
    } else if is_network {
        "network request failed"
    } else {
        "unexpected transport error"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_body_unwraps_envelope() {
        let resp = ApiResponse::from_body(200, json!({"data": {"height": 7}, "message": "ok"}));
        assert_eq!(resp.data, json!({"height": 7}));
        assert_eq!(resp.message.as_deref(), Some("ok"));
    }

    #[test]
    fn test_from_body_without_envelope() {
        let resp = ApiResponse::from_body(200, json!([1, 2, 3]));
        assert_eq!(resp.data, json!([1, 2, 3]));
        assert_eq!(resp.message, None);
    }

    #[test]
    fn test_url_joining() {
        let client = ApiClient::new(
            &UpstreamConfig {
                base_url: "http://localhost:4000/api/v1/".to_string(),
                timeout: Duration::from_secs(1),
            },
            ResilientClient::new(
                "test",
                Default::default(),
                Default::default(),
                &Default::default(),
            ),
        )
        .unwrap();

        assert_eq!(client.base_url(), "http://localhost:4000/api/v1");
        assert_eq!(client.url("/blocks?page=1"), "http://localhost:4000/api/v1/blocks?page=1");
        assert_eq!(client.url("blocks"), "http://localhost:4000/api/v1/blocks");
    }

    #[test]
    fn test_transport_causes_classify_by_kind() {
        let handler = crate::retry::RetryHandler::default();
        let retryable = |cause: &str| handler.is_retryable(&ResilienceError::network(cause));

        assert!(retryable(transport_cause(true, false)));
        assert!(retryable(transport_cause(false, true)));
        assert!(!retryable(transport_cause(false, false)));
    }

    #[tokio::test]
    async fn test_connection_failure_is_transient() {
        let client = ApiClient::new(
            &UpstreamConfig {
                // Port 9 (discard) is closed on test hosts
                base_url: "http://127.0.0.1:9".to_string(),
                timeout: Duration::from_secs(2),
            },
            ResilientClient::new(
                "test",
                Default::default(),
                crate::retry::RetryConfig {
                    max_retries: 0,
                    ..Default::default()
                },
                &Default::default(),
            ),
        )
        .unwrap();

        let err = client.get("/blocks").await.unwrap_err();
        match err {
            ResilienceError::RetryExhausted { attempts, source, .. } => {
                assert_eq!(attempts, 1);
                assert_eq!(source.status_code(), None);
            }
            other => panic!("expected RetryExhausted, got {other:?}"),
        }
    }
}
