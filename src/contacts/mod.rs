//! Contact handling that runs without the backend.
//!
//! `sniff` turns pasted spreadsheet text into contacts; `directory` filters,
//! sorts and pages the phonebook list.

pub mod directory;
pub mod sniff;

pub use sniff::{ClipboardAnalysis, ContactField, analyze};
