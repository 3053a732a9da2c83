//! Client core: cached JSON fetch and request helpers shared by the
//! endpoint modules.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::de::DeserializeOwned;
use serde_json::Value;

use super::transport::{ApiRequest, HttpTransport, Transport};
use super::types::ApiError;
use crate::cache::{ResponseCache, TTL_FAST, TTL_SLOW};
use crate::config::HelpToolConfig;

/// Cache keys used by the list endpoints.
pub mod cache_keys {
    pub const TOOLS: &str = "tools";
    pub const WORKSETS: &str = "worksets_with_tools";
    pub const NETWORK_SETTINGS: &str = "network-settings";
    pub const NETWORK_DEVICES: &str = "network-devices";
    pub const PRINTERS: &str = "printers";
}

// =============================================================================
// FETCH OPTIONS
// =============================================================================

/// Options for [`HelpToolClient::fetch_json`].
///
/// - `ttl`: validity window; the client's fast TTL when unset
/// - `cache_key`: defaults to the request path
/// - `bust`: skip the cache lookup (the fresh value is still stored)
/// - `allow_error`: resolve failures to `None` instead of an error
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchOptions {
    pub ttl: Option<Duration>,
    pub cache_key: Option<String>,
    pub bust: bool,
    pub allow_error: bool,
}

impl FetchOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    #[must_use]
    pub fn cache_key(mut self, key: impl Into<String>) -> Self {
        self.cache_key = Some(key.into());
        self
    }

    #[must_use]
    pub fn bust(mut self, bust: bool) -> Self {
        self.bust = bust;
        self
    }

    #[must_use]
    pub fn allow_error(mut self, allow_error: bool) -> Self {
        self.allow_error = allow_error;
        self
    }
}

// =============================================================================
// CLIENT
// =============================================================================

/// Time source for cache freshness checks and stamps.
pub type Clock = Arc<dyn Fn() -> Instant + Send + Sync>;

pub struct HelpToolClient {
    transport: Arc<dyn Transport>,
    cache: ResponseCache,
    clock: Clock,
    ttl_fast: Duration,
    ttl_slow: Duration,
}

impl HelpToolClient {
    /// Build a reqwest-backed client from typed config.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn from_config(config: &HelpToolConfig) -> Result<Self, ApiError> {
        let transport = HttpTransport::new(&config.base_url, config.timeouts)?;
        Ok(Self::with_transport(Arc::new(transport)).with_ttls(config.ttl_fast, config.ttl_slow))
    }

    #[must_use]
    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            cache: ResponseCache::new(),
            clock: Arc::new(Instant::now),
            ttl_fast: TTL_FAST,
            ttl_slow: TTL_SLOW,
        }
    }

    /// Replace the wall clock used for cache lookups and stamps.
    #[must_use]
    pub fn with_clock(mut self, clock: impl Fn() -> Instant + Send + Sync + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    #[must_use]
    pub fn with_ttls(mut self, fast: Duration, slow: Duration) -> Self {
        self.ttl_fast = fast;
        self.ttl_slow = slow;
        self
    }

    #[must_use]
    pub fn ttl_fast(&self) -> Duration {
        self.ttl_fast
    }

    #[must_use]
    pub fn ttl_slow(&self) -> Duration {
        self.ttl_slow
    }

    #[must_use]
    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    /// Drop one cached response, or all of them when `key` is `None`.
    pub fn clear_cache(&self, key: Option<&str>) {
        self.cache.clear(key);
    }

    /// GET `path` as JSON through the TTL cache. A fresh response is stamped
    /// when it arrives, so slow requests do not eat into their own TTL.
    ///
    /// Returns `Ok(None)` only when the request failed and
    /// `options.allow_error` is set.
    ///
    /// # Errors
    ///
    /// Returns the transport, status or parse error when `allow_error` is off.
    pub async fn fetch_json(&self, path: &str, options: &FetchOptions) -> Result<Option<Value>, ApiError> {
        let key = options.cache_key.as_deref().unwrap_or(path);

        if !options.bust {
            if let Some(value) = self.cache.get_at(key, (self.clock)()) {
                tracing::debug!(%key, "cache hit");
                return Ok(Some(value));
            }
        }

        match self.send_json(ApiRequest::get(path)).await {
            Ok(value) => {
                let ttl = options.ttl.unwrap_or(self.ttl_fast);
                self.cache.insert_at(key, value.clone(), ttl, (self.clock)());
                Ok(Some(value))
            }
            Err(e) if options.allow_error => {
                tracing::warn!(%path, error = %e, "request failed; ignoring");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Cached list fetch that degrades to an empty list on failure.
    pub(crate) async fn cached_list<T: DeserializeOwned>(
        &self,
        path: &str,
        key: &str,
        ttl: Duration,
    ) -> Result<Vec<T>, ApiError> {
        let options = FetchOptions::new().cache_key(key).ttl(ttl).allow_error(true);
        match self.fetch_json(path, &options).await? {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(value) => decode(value),
        }
    }

    /// Send a request and parse the JSON body. An empty body reads as `null`.
    pub(crate) async fn send_json(&self, request: ApiRequest) -> Result<Value, ApiError> {
        let path = request.path.clone();
        let response = self.transport.send(request).await?;

        if !response.is_success() {
            return Err(ApiError::Status {
                status: response.status,
                message: error_message(&response.body),
                path,
            });
        }

        if response.body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&response.body).map_err(|e| ApiError::Parse(format!("{path}: {e}")))
    }

    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        decode(self.send_json(ApiRequest::get(path)).await?)
    }

    pub(crate) async fn post(&self, path: &str, body: Value) -> Result<Value, ApiError> {
        self.send_json(ApiRequest::with_body(reqwest::Method::POST, path, body))
            .await
    }

    pub(crate) async fn put(&self, path: &str, body: Value) -> Result<Value, ApiError> {
        self.send_json(ApiRequest::with_body(reqwest::Method::PUT, path, body))
            .await
    }

    pub(crate) async fn delete(&self, path: &str) -> Result<Value, ApiError> {
        self.send_json(ApiRequest::delete(path)).await
    }
}

// =============================================================================
// HELPERS
// =============================================================================

pub(crate) fn decode<T: DeserializeOwned>(value: Value) -> Result<T, ApiError> {
    serde_json::from_value(value).map_err(|e| ApiError::Parse(e.to_string()))
}

/// Decode the record under `field` of a `{"success": true, "<field>": {...}}`
/// envelope, or the whole body when the backend answered with the bare record.
pub(crate) fn decode_record<T: DeserializeOwned>(mut value: Value, field: &str) -> Result<T, ApiError> {
    match value.get_mut(field) {
        Some(inner) if inner.is_object() => decode(inner.take()),
        _ => decode(value),
    }
}

/// Pull a readable message out of an error body.
fn error_message(body: &str) -> String {
    let trimmed = body.trim();
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(trimmed) {
        for field in ["error", "message"] {
            if let Some(Value::String(msg)) = map.get(field) {
                return msg.clone();
            }
        }
    }
    if trimmed.is_empty() {
        "empty response".to_owned()
    } else {
        trimmed.chars().take(200).collect()
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
