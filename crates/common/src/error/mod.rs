//! Error classification shared by every EVE RDA error type
//!
//! Each crate defines its own `thiserror` enum at its boundary. This module
//! provides the vocabulary those enums use to describe themselves so callers
//! can make uniform decisions (log level, whether a failure is worth
//! surfacing) without matching on foreign variants.
//!
//! ## ErrorClassification Trait
//!
//! - **`is_retryable()`**: could the same call succeed if issued again later?
//!   Nothing in this workspace retries automatically; the flag only feeds
//!   logging and lets a user-facing surface say "try again".
//! - **`severity()`**: how loudly should this be recorded?
//!
//! ## ErrorSeverity Levels
//!
//! | Level | Use Case | Examples |
//! |-------|----------|----------|
//! | **Info** | Expected conditions | Missing session, unknown ID |
//! | **Warning** | Degraded but operational | Upstream fetch failed, name lookup failed |
//! | **Error** | Failure requiring attention | Token exchange rejected, session store down |
//! | **Critical** | System integrity at risk | Entropy source unavailable, bad signing key |
//!
//! ## Example
//!
//! ```rust,ignore
//! use rda_common::{ErrorClassification, ErrorSeverity};
//!
//! fn record<E: ErrorClassification + std::fmt::Display>(err: &E) {
//!     match err.severity() {
//!         ErrorSeverity::Info => tracing::info!(error = %err, "request_failed"),
//!         ErrorSeverity::Warning => tracing::warn!(error = %err, "request_failed"),
//!         _ => tracing::error!(error = %err, "request_failed"),
//!     }
//! }
//! ```

use std::fmt;

/// Standard interface for classifying errors by their characteristics.
pub trait ErrorClassification {
    /// Check if this error is retryable
    ///
    /// Retryable errors are transient: network failures, 5xx responses,
    /// rate limiting. Validation failures and rejected grants are not.
    fn is_retryable(&self) -> bool;

    /// Get the error severity level
    ///
    /// Used for logging decisions.
    fn severity(&self) -> ErrorSeverity;
}

/// Error severity levels for monitoring and alerting
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// Informational, typically for debugging
    Info,
    /// Warning, should be monitored but not critical
    Warning,
    /// Error, requires attention and action
    Error,
    /// Critical, immediate action required
    Critical,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "INFO"),
            Self::Warning => write!(f, "WARN"),
            Self::Error => write!(f, "ERROR"),
            Self::Critical => write!(f, "CRITICAL"),
        }
    }
}
