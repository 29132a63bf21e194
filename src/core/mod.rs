//! Core data handling – forecast model, committed store, selection, info
//! lookup, request sequencing, and the HTTP client.
//!
//! Nothing in this module depends on any TUI or rendering crate.

pub mod client;
pub mod error;
pub mod forecast;
pub mod info;
pub mod request;
pub mod selection;
pub mod store;
