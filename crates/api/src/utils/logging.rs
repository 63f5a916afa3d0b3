//! Tracing initialisation and request-outcome logging helpers

use rda_domain::RdaError;
use tracing::{info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{fmt, EnvFilter, Layer};

/// Filter used when `RUST_LOG` is unset
pub const DEFAULT_LOG_FILTER: &str = "info,rda=debug";

/// Output format, selected with `RDA_LOG_FORMAT`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl LogFormat {
    /// `json` (any case) selects JSON; everything else is human text.
    pub fn from_env_value(value: Option<&str>) -> Self {
        match value {
            Some(v) if v.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Text,
        }
    }
}

/// Install the global subscriber
///
/// # Errors
/// Fails if a global subscriber is already installed.
pub fn init_logging() -> Result<(), TryInitError> {
    let format = LogFormat::from_env_value(std::env::var("RDA_LOG_FORMAT").ok().as_deref());
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let layer = match format {
        LogFormat::Json => fmt::layer().json().with_current_span(false).boxed(),
        LogFormat::Text => fmt::layer().with_target(true).boxed(),
    };

    tracing_subscriber::registry().with(filter).with(layer).try_init()
}

/// Log the outcome of a route with structured fields.
///
/// `route` should be a stable identifier without user data.
#[inline]
pub fn log_route_outcome(route: &'static str, status: u16, outcome: &'static str) {
    if status < 400 {
        info!(route, status, outcome, "route_completed");
    } else {
        warn!(route, status, outcome, "route_rejected");
    }
}

/// Convert an `RdaError` into a stable label suitable for logging.
#[inline]
pub fn error_label(error: &RdaError) -> &'static str {
    match error {
        RdaError::Config(_) => "config",
        RdaError::Validation(_) => "validation",
        RdaError::UpstreamAuth(_) => "upstream_auth",
        RdaError::UpstreamUnavailable(_) => "upstream_unavailable",
        RdaError::SessionBridge(_) => "session_bridge",
        RdaError::TransientFetch(_) => "transient_fetch",
        RdaError::NameResolution(_) => "name_resolution",
        RdaError::Network(_) => "network",
        RdaError::NotFound(_) => "not_found",
        RdaError::Internal(_) => "internal",
    }
}
