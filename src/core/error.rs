//! Error types for the core layer.

use thiserror::Error;

/// Failure of a single fetch against the forecast service.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid service url: {0}")]
    InvalidUrl(String),

    #[error("cannot build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{endpoint} returned HTTP {status}")]
    Status { endpoint: &'static str, status: u16 },

    #[error("{endpoint} returned malformed JSON: {source}")]
    Decode {
        endpoint: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// A dropdown value that cannot be selected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("unknown column: {0}")]
    UnknownColumn(String),
}

/// Problem loading a user-supplied info table.
#[derive(Debug, Error)]
pub enum InfoTableError {
    #[error("cannot read info table: {0}")]
    Io(#[from] std::io::Error),

    #[error("info table is not a JSON object of strings: {0}")]
    Parse(#[from] serde_json::Error),
}
