//! Gateway error types.

use thiserror::Error;

/// Errors that can occur when talking to the remote record store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// No remote store is configured
    #[error("No remote record store configured. Add remote.server_url to config.")]
    NotConfigured,
    /// Request could not be sent or the connection failed
    #[error("Transport error: {0}")]
    Transport(String),
    /// Request did not finish in time
    #[error("Request timed out")]
    Timeout,
    /// Server answered with an unexpected status
    #[error("Server returned status {0}: {1}")]
    Status(u16, String),
    /// Response body could not be understood
    #[error("Malformed response: {0}")]
    Malformed(String),
    /// A record already exists for the date
    #[error("Record already exists: {0}")]
    Conflict(String),
    /// Gateway has no native upsert
    #[error("Upsert is not supported by this gateway")]
    Unsupported,
}

impl From<reqwest::Error> for GatewayError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            GatewayError::Timeout
        } else {
            GatewayError::Transport(e.to_string())
        }
    }
}
