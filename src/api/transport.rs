//! HTTP transport seam.
//!
//! `HelpToolClient` never touches `reqwest` directly; it hands an
//! [`ApiRequest`] to a [`Transport`] and gets the raw status and body back.
//! Tests swap in a recording mock.

use std::time::Duration;

use serde_json::Value;

use super::types::ApiError;
use crate::config::Timeouts;

/// A request relative to the backend base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: reqwest::Method,
    pub path: String,
    pub body: Option<Value>,
}

impl ApiRequest {
    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self { method: reqwest::Method::GET, path: path.into(), body: None }
    }

    #[must_use]
    pub fn with_body(method: reqwest::Method, path: impl Into<String>, body: Value) -> Self {
        Self { method, path: path.into(), body: Some(body) }
    }

    #[must_use]
    pub fn delete(path: impl Into<String>) -> Self {
        Self { method: reqwest::Method::DELETE, path: path.into(), body: None }
    }
}

/// Raw response: status code and body text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    /// Send one request to the backend.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Request`] when the request cannot be sent or the
    /// body cannot be read. Non-2xx statuses are not errors at this layer.
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError>;
}

// =============================================================================
// REQWEST TRANSPORT
// =============================================================================

pub struct HttpTransport {
    http: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    /// # Errors
    ///
    /// Returns [`ApiError::HttpClientBuild`] if the reqwest client fails to build.
    pub fn new(base_url: &str, timeouts: Timeouts) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(timeouts.request)
            .connect_timeout(timeouts.connect)
            .build()
            .map_err(|e| ApiError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, base_url: base_url.trim_end_matches('/').to_owned() })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait::async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let url = self.url(&request.path);
        let builder = self
            .http
            .request(request.method.clone(), &url)
            .header(reqwest::header::CACHE_CONTROL, "no-store");
        let builder = match &request.body {
            Some(body) => builder.json(body),
            None => builder,
        };

        let started = std::time::Instant::now();
        let response = builder
            .send()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;

        tracing::debug!(
            method = %request.method,
            path = %request.path,
            status,
            elapsed_ms = duration_ms(started.elapsed()),
            "helptool request"
        );
        Ok(ApiResponse { status, body })
    }
}

fn duration_ms(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}
