//! GraphQL transport for the store's Admin API
//!
//! The transport performs exactly one HTTP call per [`Transport::send`] and
//! classifies the result into a [`CallOutcome`]. It never retries or waits;
//! that is the executor's job.

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE, RETRY_AFTER};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::ShopSettings;
use crate::error::SyncError;

/// Header carrying the Admin API access token
pub const ACCESS_TOKEN_HEADER: &str = "X-Shopify-Access-Token";

/// Error code the store uses for throttled GraphQL requests
const THROTTLED_CODE: &str = "THROTTLED";

/// GraphQL request envelope
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct GraphqlRequest {
    pub query: String,
    pub variables: Value,
}

impl GraphqlRequest {
    pub fn new(query: impl Into<String>, variables: Value) -> Self {
        Self {
            query: query.into(),
            variables,
        }
    }
}

/// GraphQL response envelope
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct GraphqlResponse {
    #[serde(default)]
    pub data: Option<Value>,

    #[serde(default)]
    pub errors: Vec<GraphqlError>,

    #[serde(default)]
    pub extensions: Option<Value>,
}

impl GraphqlResponse {
    /// Whether any top-level error signals throttling
    pub fn is_throttled(&self) -> bool {
        self.errors.iter().any(GraphqlError::is_throttled)
    }

    /// Top-level error messages joined for logging
    pub fn error_summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| e.message.as_str())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Top-level GraphQL error
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct GraphqlError {
    pub message: String,

    #[serde(default)]
    pub extensions: Option<Value>,
}

impl GraphqlError {
    /// `extensions.code`, if the server sent one
    pub fn code(&self) -> Option<&str> {
        self.extensions
            .as_ref()
            .and_then(|ext| ext.get("code"))
            .and_then(Value::as_str)
    }

    pub fn is_throttled(&self) -> bool {
        self.code() == Some(THROTTLED_CODE)
    }
}

/// Classified result of a single call
#[derive(Debug, Clone, PartialEq)]
pub enum CallOutcome {
    /// Transport succeeded; the body may still carry application errors
    Success(GraphqlResponse),
    /// The store asked us to slow down
    RateLimited { retry_after: Option<Duration> },
    /// Any other failure; never retried
    Failed(SyncError),
}

/// One-shot call primitive used by the executor
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &GraphqlRequest) -> CallOutcome;
}

/// reqwest-backed transport
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    endpoint: String,
    access_token: String,
}

impl HttpTransport {
    /// Create a transport for the configured store
    pub fn new(settings: &ShopSettings) -> Result<Self, SyncError> {
        let client = Client::builder()
            .timeout(settings.request_timeout)
            .build()
            .map_err(|e| SyncError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self::with_client(
            client,
            settings.graphql_endpoint(),
            settings.access_token.clone(),
        ))
    }

    /// Create a transport with a custom reqwest Client
    pub fn with_client(
        client: Client,
        endpoint: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            access_token: access_token.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn post(&self, request: &GraphqlRequest) -> Result<CallOutcome, SyncError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let token = HeaderValue::from_str(&self.access_token)
            .map_err(|_| SyncError::InvalidData("Access token is not a valid header".into()))?;
        headers.insert(ACCESS_TOKEN_HEADER, token);

        debug!(endpoint = %self.endpoint, "Sending GraphQL request");

        let response = self
            .client
            .post(&self.endpoint)
            .headers(headers)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SyncError::NetworkTimeout
                } else if e.is_connect() {
                    SyncError::ConnectionRefused
                } else {
                    SyncError::Network(e.to_string())
                }
            })?;

        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_retry_after);

        match response.status() {
            StatusCode::OK => {
                let body: Bytes = response.bytes().await.map_err(|e| {
                    if e.is_timeout() {
                        SyncError::NetworkTimeout
                    } else {
                        SyncError::Network(e.to_string())
                    }
                })?;

                let parsed: GraphqlResponse = serde_json::from_slice(&body).map_err(|e| {
                    SyncError::InvalidData(format!("Failed to parse GraphQL response: {}", e))
                })?;

                if parsed.is_throttled() {
                    warn!(
                        retry_after_ms = retry_after.map(|d| d.as_millis() as u64),
                        "GraphQL request throttled"
                    );
                    return Ok(CallOutcome::RateLimited { retry_after });
                }

                debug!(
                    body_size = body.len(),
                    errors = parsed.errors.len(),
                    "Received GraphQL response"
                );
                Ok(CallOutcome::Success(parsed))
            }
            StatusCode::TOO_MANY_REQUESTS => {
                warn!(
                    retry_after_ms = retry_after.map(|d| d.as_millis() as u64),
                    "Rate limited by store"
                );
                Ok(CallOutcome::RateLimited { retry_after })
            }
            StatusCode::NOT_FOUND => {
                warn!(endpoint = %self.endpoint, "GraphQL endpoint not found (404)");
                Err(SyncError::NotFound)
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                warn!(status = ?response.status(), "Access token rejected");
                Err(SyncError::Unauthorized)
            }
            status => {
                warn!(status = status.as_u16(), "Unexpected status");
                Err(SyncError::ServerError(status.as_u16()))
            }
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &GraphqlRequest) -> CallOutcome {
        match self.post(request).await {
            Ok(outcome) => outcome,
            Err(err) => CallOutcome::Failed(err),
        }
    }
}

/// Parse a `Retry-After` value given in (possibly fractional) seconds
///
/// Zero, negative, non-numeric and out-of-range values are ignored.
pub fn parse_retry_after(value: &str) -> Option<Duration> {
    let secs: f64 = value.trim().parse().ok()?;
    if secs > 0.0 {
        Duration::try_from_secs_f64(secs).ok()
    } else {
        None
    }
}
