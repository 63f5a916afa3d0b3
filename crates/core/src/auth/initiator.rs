//! Authorization redirect initiator

use chrono::{DateTime, Utc};
use rda_common::auth::{OAuthConfig, PkceChallenge, DEFAULT_STATE_LENGTH};
use rda_domain::{AuthorizationAttempt, RdaError, Result};
use tracing::debug;

/// Redirect target plus the attempt the browser must carry back
#[derive(Debug, Clone)]
pub struct AuthorizationRedirect {
    pub authorization_url: String,
    pub attempt: AuthorizationAttempt,
}

/// Starts a login round trip
///
/// Holds no state between calls; the returned attempt is persisted by the
/// caller (sealed cookie) before the browser is redirected.
#[derive(Debug, Clone)]
pub struct AuthorizationInitiator {
    oauth: OAuthConfig,
    state_length: usize,
}

impl AuthorizationInitiator {
    pub fn new(oauth: OAuthConfig) -> Self {
        Self { oauth, state_length: DEFAULT_STATE_LENGTH }
    }

    /// Override the state token length (16..=256)
    pub fn with_state_length(mut self, state_length: usize) -> Self {
        self.state_length = state_length;
        self
    }

    /// Generate a fresh PKCE pair and state and build the authorization URL
    ///
    /// # Errors
    /// Returns `RdaError::Internal` if the secure random source fails or the
    /// configured state length is out of bounds.
    pub fn begin(&self, now: DateTime<Utc>) -> Result<AuthorizationRedirect> {
        let pkce = PkceChallenge::generate(self.state_length)
            .map_err(|e| RdaError::Internal(format!("PKCE generation failed: {e}")))?;

        let authorization_url =
            self.oauth.authorization_url(&pkce.state, &pkce.code_challenge).to_string();
        debug!(state_len = pkce.state.len(), "authorization_redirect_built");

        Ok(AuthorizationRedirect {
            authorization_url,
            attempt: AuthorizationAttempt::new(pkce.code_verifier, pkce.state, now),
        })
    }
}
