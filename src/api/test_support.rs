//! Recording mock transport for client tests.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use serde_json::Value;

use super::client::HelpToolClient;
use super::transport::{ApiRequest, ApiResponse, Transport};
use super::types::ApiError;

type Scripted = Result<ApiResponse, String>;

#[derive(Default)]
pub(crate) struct MockTransport {
    once: Mutex<HashMap<String, VecDeque<Scripted>>>,
    sticky: Mutex<HashMap<String, Scripted>>,
    calls: Mutex<Vec<ApiRequest>>,
}

fn route(method: &reqwest::Method, path: &str) -> String {
    format!("{method} {path}")
}

impl MockTransport {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Always answer `method path` with `status` and `body`.
    pub(crate) fn respond(&self, method: reqwest::Method, path: &str, status: u16, body: Value) {
        self.sticky
            .lock()
            .unwrap()
            .insert(route(&method, path), Ok(ApiResponse { status, body: body.to_string() }));
    }

    /// Answer the next `method path` call with a raw body, before any sticky response.
    pub(crate) fn respond_once_raw(&self, method: reqwest::Method, path: &str, status: u16, body: &str) {
        self.once
            .lock()
            .unwrap()
            .entry(route(&method, path))
            .or_default()
            .push_back(Ok(ApiResponse { status, body: body.to_owned() }));
    }

    /// Always fail `method path` at the transport level.
    pub(crate) fn fail(&self, method: reqwest::Method, path: &str) {
        self.sticky
            .lock()
            .unwrap()
            .insert(route(&method, path), Err("connection refused".to_owned()));
    }

    pub(crate) fn calls(&self) -> Vec<ApiRequest> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn call_count(&self, method: reqwest::Method, path: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.method == method && c.path == path)
            .count()
    }

    pub(crate) fn last_body(&self) -> Option<Value> {
        self.calls.lock().unwrap().last().and_then(|c| c.body.clone())
    }
}

#[async_trait::async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let key = route(&request.method, &request.path);
        self.calls.lock().unwrap().push(request);

        let queued = self
            .once
            .lock()
            .unwrap()
            .get_mut(&key)
            .and_then(VecDeque::pop_front);
        let scripted = queued.or_else(|| self.sticky.lock().unwrap().get(&key).cloned());

        match scripted {
            Some(Ok(response)) => Ok(response),
            Some(Err(msg)) => Err(ApiError::Request(msg)),
            None => Ok(ApiResponse { status: 404, body: r#"{"error":"Endpunkt nicht gefunden"}"#.to_owned() }),
        }
    }
}

pub(crate) fn client_with(mock: &Arc<MockTransport>) -> HelpToolClient {
    HelpToolClient::with_transport(mock.clone())
}

/// Hand-driven clock. Clones share the same time.
#[derive(Clone)]
pub(crate) struct ManualClock {
    start: Instant,
    elapsed: Arc<Mutex<Duration>>,
}

impl ManualClock {
    pub(crate) fn new() -> Self {
        Self { start: Instant::now(), elapsed: Arc::default() }
    }

    pub(crate) fn now(&self) -> Instant {
        self.start + *self.elapsed.lock().unwrap()
    }

    pub(crate) fn advance(&self, by: Duration) {
        *self.elapsed.lock().unwrap() += by;
    }

    /// Closure for [`HelpToolClient::with_clock`].
    pub(crate) fn source(&self) -> impl Fn() -> Instant + Send + Sync + 'static {
        let clock = self.clone();
        move || clock.now()
    }
}

/// Wraps the mock and moves a [`ManualClock`] forward by `latency` while
/// every request is in flight.
pub(crate) struct SlowTransport {
    inner: Arc<MockTransport>,
    clock: ManualClock,
    latency: Duration,
}

#[async_trait::async_trait]
impl Transport for SlowTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        self.clock.advance(self.latency);
        tokio::task::yield_now().await;
        self.inner.send(request).await
    }
}

/// Client over `mock` whose requests each take `latency` on `clock`.
pub(crate) fn slow_client_with(mock: &Arc<MockTransport>, clock: &ManualClock, latency: Duration) -> HelpToolClient {
    let transport = SlowTransport { inner: mock.clone(), clock: clock.clone(), latency };
    HelpToolClient::with_transport(Arc::new(transport)).with_clock(clock.source())
}
