//! Error types used throughout the application

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for EVE RDA
///
/// Variants carry a short description only. Raw upstream bodies are logged
/// where they are received and never copied into these messages.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum RdaError {
    #[error("Configuration error: {0}")]
    Config(String),

    /// Missing or mismatched code, state or verifier
    #[error("Validation error: {0}")]
    Validation(String),

    /// Token or identity endpoint refused the request
    #[error("Upstream authentication error: {0}")]
    UpstreamAuth(String),

    /// Token refresh could not produce an access token
    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// Account create/update or session issuance failed
    #[error("Session bridge error: {0}")]
    SessionBridge(String),

    /// A single downstream data fetch failed
    #[error("Fetch error: {0}")]
    TransientFetch(String),

    #[error("Name resolution error: {0}")]
    NameResolution(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for EVE RDA operations
pub type Result<T> = std::result::Result<T, RdaError>;
