//! API: typed client for the `HelpTool` backend.
//!
//! DESIGN
//! ======
//! `HelpToolClient` owns a [`transport::Transport`] and a
//! [`ResponseCache`](crate::cache::ResponseCache). The idempotent list
//! endpoints go through `fetch_json`, which consults the cache first; every
//! other call goes straight to the transport and invalidates the cache keys
//! it may have made stale.
//!
//! ERROR HANDLING
//! ==============
//! Non-2xx responses become [`ApiError::Status`] with the backend's
//! `{"error": "..."}` message when present. List endpoints that the
//! dashboard treated as optional (`allow_error`) degrade to empty lists.

pub mod calendar;
pub mod client;
pub mod contacts;
pub mod network;
pub mod system;
pub mod tickets;
pub mod tools;
pub mod transport;
pub mod types;

pub use client::{FetchOptions, HelpToolClient, cache_keys};
pub use transport::{ApiRequest, ApiResponse, HttpTransport, Transport};
pub use types::ApiError;

#[cfg(test)]
pub(crate) mod test_support;
