//! Error taxonomy shared by every client and job.
//!
//! Per-record problems (`Validation`, `Delivery`) are caught and counted by
//! the jobs; batch-level problems (`Config`, `Auth`, store failures) abort
//! the invocation and surface as a non-zero exit.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, FollowupError>;

#[derive(Debug, Error)]
pub enum FollowupError {
    /// Required configuration or credential is missing/invalid.
    /// Raised before any network call is attempted.
    #[error("Config error: {0}")]
    Config(String),

    /// A dependency rejected our credentials (HTTP 401/403).
    #[error("Authentication rejected: {0}")]
    Auth(String),

    /// Any other non-2xx response from a dependency.
    #[error("Remote error (HTTP {status}): {message}")]
    Remote { status: u16, message: String },

    /// Network timeout or connection failure. Retryable on the next run.
    #[error("Transient network error: {0}")]
    Transient(String),

    /// A record is missing a field the current job requires.
    #[error("Invalid record: {0}")]
    Validation(String),

    /// The SMS gateway refused or failed a send.
    #[error("Delivery failed: {0}")]
    Delivery(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
