// Keyrack — Top-level error types
//
// Aggregates errors from the store, prompts, and I/O into a single
// error enum for the application boundary.

use thiserror::Error;

/// Top-level error type for all Keyrack operations.
#[derive(Debug, Error)]
pub enum KeyrackError {
    #[error("Store error: {0}")]
    Store(#[from] crate::store::StoreError),

    #[error("Prompt error: {0}")]
    Prompt(#[from] inquire::InquireError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, KeyrackError>;
