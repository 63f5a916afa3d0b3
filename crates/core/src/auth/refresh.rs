//! Token refresh service
//!
//! Every authenticated downstream call starts with a fresh access token
//! obtained here within the same request. Access tokens are never cached.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rda_domain::{RdaError, Result};
use tracing::{debug, warn};

use super::ports::UpstreamAuth;

/// Fresh access token for the current request
#[derive(Clone)]
pub struct RefreshedAccess {
    pub access_token: String,
    /// Present only when the provider issued a different refresh token
    pub rotated_refresh_token: Option<String>,
    pub expires_at: DateTime<Utc>,
}

impl std::fmt::Debug for RefreshedAccess {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshedAccess")
            .field("rotated", &self.rotated_refresh_token.is_some())
            .field("expires_at", &self.expires_at)
            .finish_non_exhaustive()
    }
}

#[derive(Clone)]
pub struct TokenRefreshService {
    upstream: Arc<dyn UpstreamAuth>,
}

impl TokenRefreshService {
    pub fn new(upstream: Arc<dyn UpstreamAuth>) -> Self {
        Self { upstream }
    }

    /// Exchange a stored refresh token for an access token
    ///
    /// # Errors
    /// Any failure is reported as `RdaError::UpstreamUnavailable`; callers
    /// degrade to placeholders.
    pub async fn refresh(&self, refresh_token: &str) -> Result<RefreshedAccess> {
        if refresh_token.is_empty() {
            return Err(RdaError::UpstreamUnavailable("no refresh token stored".into()));
        }

        let tokens = self.upstream.refresh(refresh_token).await.map_err(|e| {
            warn!(error = %e, "token_refresh_failed");
            RdaError::UpstreamUnavailable(e.to_string())
        })?;

        let expires_at = tokens.expires_at();
        let rotated_refresh_token =
            tokens.refresh_token.filter(|t| !t.is_empty() && t != refresh_token);
        debug!(rotated = rotated_refresh_token.is_some(), "token_refreshed");

        Ok(RefreshedAccess { access_token: tokens.access_token, rotated_refresh_token, expires_at })
    }
}
