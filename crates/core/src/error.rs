//! # Error Taxonomy
//!
//! Four distinct failure classes, each surfaced separately at the HTTP
//! boundary: unknown agent (not found), missing parameter (client error),
//! generation failure (bad gateway), storage failure (internal).

use std::time::Duration;
use thiserror::Error;

use crate::models::AgentId;

/// Persistence failures. An append either fully commits or fails leaving
/// prior entries intact; there is no partial-write recovery.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("store lock poisoned: {0}")]
    Lock(String),

    #[error("corrupt log row: {0}")]
    Corrupt(String),
}

/// Failures from the text generation backend. Retryable at the caller's
/// discretion; the core performs no automatic retry.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("generation backend timed out after {0:?}")]
    Timeout(Duration),

    #[error("generation request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("generation backend returned {status}: {message}")]
    Backend { status: u16, message: String },
}

/// Everything a dispatch can fail with.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("unknown agent: {0}")]
    UnknownAgent(String),

    #[error("{agent} agent requires a non-empty '{param}' parameter")]
    MissingParameter { agent: AgentId, param: &'static str },

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}
