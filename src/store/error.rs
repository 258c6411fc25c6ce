// Keyrack — Store error types

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("Unknown platform: {0}")]
    UnknownPlatform(String),

    #[error("Incomplete credentials, missing: {}", .0.join(", "))]
    IncompleteCredentials(Vec<String>),

    #[error("No credentials configured for platform: {0}")]
    NotConfigured(String),

    #[error("Invalid platform schema: {0}")]
    InvalidSchema(String),
}
