//! `helptool`: client library for the `HelpTool` helpdesk REST API.
//!
//! DESIGN
//! ======
//! `api` talks to the backend through a pluggable `Transport` and keeps a
//! TTL response cache in front of the idempotent list endpoints. Everything
//! else is pure data handling that the dashboard used to do in the browser:
//! sniffing pasted contact tables, filtering the phonebook, normalizing
//! calendar entries, and the local device/link store that replaces
//! `localStorage`.

pub mod api;
pub mod cache;
pub mod calendar;
pub mod config;
pub mod contacts;
pub mod network;

pub use api::{ApiError, FetchOptions, HelpToolClient};
pub use config::HelpToolConfig;

/// Current UTC time as an RFC 3339 string, used for `created`/`added_date` stamps.
#[must_use]
pub fn timestamp_iso() -> String {
    time::OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_default()
}
