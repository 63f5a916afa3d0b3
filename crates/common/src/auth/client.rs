//! OAuth 2.0 token endpoint client for confidential clients
//!
//! Handles the two grants the login flow needs:
//! - Authorization code exchange (with PKCE verifier)
//! - Token refresh
//!
//! The client authenticates with HTTP Basic credentials and never retries:
//! authorization codes are single-use and a refresh failure is reported to
//! the caller as-is.

use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::{Client, Response};
use thiserror::Error;
use tracing::debug;

use super::types::{OAuthConfig, OAuthError, TokenResponse, UpstreamTokenSet};
use crate::error::{ErrorClassification, ErrorSeverity};

/// Error type for OAuth client operations
#[derive(Debug, Error)]
pub enum OAuthClientError {
    /// HTTP request failed before a response arrived
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Token endpoint answered with a non-success status
    ///
    /// `body` carries the raw provider text for logs only.
    #[error("token endpoint rejected request with status {status}")]
    Rejected {
        /// HTTP status code
        status: u16,
        /// Parsed OAuth error, if the body had one
        error: Option<String>,
        /// Raw response body
        body: String,
    },

    /// Failed to parse a success response
    #[error("Parse error: {0}")]
    ParseError(String),

    /// No refresh token available
    #[error("No refresh token available")]
    NoRefreshToken,
}

impl ErrorClassification for OAuthClientError {
    fn is_retryable(&self) -> bool {
        match self {
            Self::RequestFailed(_) => true,
            Self::Rejected { status, .. } => *status >= 500 || *status == 429,
            Self::ParseError(_) | Self::NoRefreshToken => false,
        }
    }

    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::NoRefreshToken => ErrorSeverity::Info,
            Self::RequestFailed(_) => ErrorSeverity::Warning,
            Self::Rejected { .. } | Self::ParseError(_) => ErrorSeverity::Error,
        }
    }
}

/// OAuth 2.0 token endpoint client
#[derive(Debug, Clone)]
pub struct OAuthClient {
    config: OAuthConfig,
    client: Client,
}

impl OAuthClient {
    /// Create a new OAuth client over a shared `reqwest` client
    #[must_use]
    pub fn new(config: OAuthConfig, client: Client) -> Self {
        Self { config, client }
    }

    /// Exchange authorization code for tokens
    ///
    /// Sends `code`, the configured `redirect_uri` and the PKCE
    /// `code_verifier`. The redirect URI is the same value used to build the
    /// authorization URL; providers reject exchanges where they differ.
    ///
    /// # Errors
    /// Returns error if the request fails, the endpoint rejects the grant, or
    /// the response body does not match [`TokenResponse`].
    pub async fn exchange_code(
        &self,
        code: &str,
        code_verifier: &str,
    ) -> Result<UpstreamTokenSet, OAuthClientError> {
        let form = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", self.config.redirect_uri.as_str()),
            ("code_verifier", code_verifier),
        ];

        debug!(grant = "authorization_code", "sending token request");
        let response = self.post_form(&form).await?;
        Self::parse_token_response(response).await
    }

    /// Refresh access token using refresh token
    ///
    /// The returned set may carry a rotated refresh token; callers persist it.
    ///
    /// # Errors
    /// Returns [`OAuthClientError::NoRefreshToken`] for an empty token, or a
    /// request/rejection/parse error from the endpoint.
    pub async fn refresh_access_token(
        &self,
        refresh_token: &str,
    ) -> Result<UpstreamTokenSet, OAuthClientError> {
        if refresh_token.is_empty() {
            return Err(OAuthClientError::NoRefreshToken);
        }

        let form = [("grant_type", "refresh_token"), ("refresh_token", refresh_token)];

        debug!(grant = "refresh_token", "sending token request");
        let response = self.post_form(&form).await?;
        Self::parse_token_response(response).await
    }

    /// Get a reference to the OAuth configuration
    #[must_use]
    pub fn config(&self) -> &OAuthConfig {
        &self.config
    }

    async fn post_form(&self, form: &[(&str, &str)]) -> Result<Response, OAuthClientError> {
        let response = self
            .client
            .post(self.config.token_endpoint.clone())
            .header(AUTHORIZATION, self.config.basic_auth_header())
            .header(ACCEPT, "application/json")
            .form(form)
            .send()
            .await?;
        Ok(response)
    }

    async fn parse_token_response(
        response: Response,
    ) -> Result<UpstreamTokenSet, OAuthClientError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let error = serde_json::from_str::<OAuthError>(&body).ok().map(|e| e.to_string());
            return Err(OAuthClientError::Rejected { status: status.as_u16(), error, body });
        }

        let token_response: TokenResponse =
            response.json().await.map_err(|e| OAuthClientError::ParseError(e.to_string()))?;

        Ok(token_response.into())
    }
}
