//! OAuth 2.0 types and structures
//!
//! Wire schemas for the token endpoint and the provider configuration used to
//! build authorization requests.

use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use url::Url;

use super::pkce::CHALLENGE_METHOD;

/// Tokens obtained from one call to the provider's token endpoint
///
/// The access token lives only for the request that obtained it. Only the
/// refresh token is ever persisted, inside internal session metadata.
#[derive(Clone, PartialEq, Eq)]
pub struct UpstreamTokenSet {
    /// Short-lived bearer token for downstream API calls
    pub access_token: String,

    /// Long-lived refresh token; providers may omit it on refresh grants
    pub refresh_token: Option<String>,

    /// Access token lifetime in seconds
    pub expires_in: i64,

    /// When the token endpoint answered
    pub obtained_at: DateTime<Utc>,
}

impl UpstreamTokenSet {
    /// Create a token set stamped with the current time
    #[must_use]
    pub fn new(access_token: String, refresh_token: Option<String>, expires_in: i64) -> Self {
        Self { access_token, refresh_token, expires_in, obtained_at: Utc::now() }
    }

    /// Absolute expiry of the access token
    #[must_use]
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.obtained_at + chrono::Duration::seconds(self.expires_in.max(0))
    }
}

// Tokens must never reach a log line through `{:?}`.
impl fmt::Debug for UpstreamTokenSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpstreamTokenSet")
            .field("access_token", &"[redacted]")
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "[redacted]"))
            .field("expires_in", &self.expires_in)
            .field("obtained_at", &self.obtained_at)
            .finish()
    }
}

/// OAuth token response from the authorization server (RFC 6749 §5.1)
///
/// `access_token` and `expires_in` are required; a body missing either fails
/// deserialization and is reported as a parse error. `refresh_token` is
/// optional because refresh grants may not rotate it.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    /// Issued access token
    pub access_token: String,
    /// Issued or rotated refresh token
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Lifetime in seconds
    pub expires_in: i64,
    /// Usually "Bearer"
    #[serde(default)]
    pub token_type: Option<String>,
}

impl From<TokenResponse> for UpstreamTokenSet {
    fn from(response: TokenResponse) -> Self {
        Self::new(response.access_token, response.refresh_token, response.expires_in)
    }
}

/// OAuth error response from the authorization server (RFC 6749 §5.2)
#[derive(Debug, Deserialize)]
pub struct OAuthError {
    /// Error code such as `invalid_grant`
    pub error: String,
    /// Optional human-readable detail
    #[serde(default)]
    pub error_description: Option<String>,
}

impl fmt::Display for OAuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.error_description {
            Some(desc) => write!(f, "{}: {}", self.error, desc),
            None => write!(f, "{}", self.error),
        }
    }
}

impl std::error::Error for OAuthError {}

/// OAuth configuration for one confidential client
#[derive(Clone)]
pub struct OAuthConfig {
    /// Authorization endpoint the browser is sent to
    pub authorization_endpoint: Url,

    /// Token endpoint for code and refresh grants
    pub token_endpoint: Url,

    /// OAuth client ID
    pub client_id: String,

    /// OAuth client secret, sent only in the Basic auth header
    pub client_secret: String,

    /// Redirect URI; must equal the callback the server listens on
    pub redirect_uri: String,

    /// Scopes to request
    pub scopes: Vec<String>,
}

impl OAuthConfig {
    /// Get scopes as space-separated string
    #[must_use]
    pub fn scope_string(&self) -> String {
        self.scopes.join(" ")
    }

    /// `Authorization` header value for client authentication
    #[must_use]
    pub fn basic_auth_header(&self) -> String {
        let credentials = format!("{}:{}", self.client_id, self.client_secret);
        format!("Basic {}", STANDARD.encode(credentials))
    }

    /// Build the authorization URL for one attempt
    #[must_use]
    pub fn authorization_url(&self, state: &str, code_challenge: &str) -> Url {
        let mut url = self.authorization_endpoint.clone();
        url.query_pairs_mut()
            .append_pair("response_type", "code")
            .append_pair("redirect_uri", &self.redirect_uri)
            .append_pair("client_id", &self.client_id)
            .append_pair("scope", &self.scope_string())
            .append_pair("state", state)
            .append_pair("code_challenge", code_challenge)
            .append_pair("code_challenge_method", CHALLENGE_METHOD);
        url
    }
}

impl fmt::Debug for OAuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuthConfig")
            .field("authorization_endpoint", &self.authorization_endpoint.as_str())
            .field("token_endpoint", &self.token_endpoint.as_str())
            .field("client_id", &self.client_id)
            .field("client_secret", &"[redacted]")
            .field("redirect_uri", &self.redirect_uri)
            .field("scopes", &self.scopes)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for auth::types.
    use std::collections::HashMap;

    use super::*;

    fn config() -> OAuthConfig {
        OAuthConfig {
            authorization_endpoint: Url::parse("https://login.example.com/v2/oauth/authorize")
                .unwrap(),
            token_endpoint: Url::parse("https://login.example.com/v2/oauth/token").unwrap(),
            client_id: "client123".to_string(),
            client_secret: "s3cret".to_string(),
            redirect_uri: "http://localhost:3000/auth/callback".to_string(),
            scopes: vec!["publicData".to_string(), "esi-wallet.read_character_wallet.v1".to_string()],
        }
    }

    /// Validates `OAuthConfig::authorization_url` parameters.
    ///
    /// Assertions:
    /// - Every PKCE and OAuth parameter is present exactly as given.
    /// - Scopes are space-delimited.
    #[test]
    fn test_authorization_url_parameters() {
        let url = config().authorization_url("state-value-0123456789", "challenge");
        let params: HashMap<String, String> = url.query_pairs().into_owned().collect();

        assert_eq!(url.path(), "/v2/oauth/authorize");
        assert_eq!(params["response_type"], "code");
        assert_eq!(params["client_id"], "client123");
        assert_eq!(params["redirect_uri"], "http://localhost:3000/auth/callback");
        assert_eq!(params["scope"], "publicData esi-wallet.read_character_wallet.v1");
        assert_eq!(params["state"], "state-value-0123456789");
        assert_eq!(params["code_challenge"], "challenge");
        assert_eq!(params["code_challenge_method"], "S256");
        assert_eq!(params.len(), 7);
    }

    #[test]
    fn test_basic_auth_header() {
        // base64("client123:s3cret")
        assert_eq!(config().basic_auth_header(), "Basic Y2xpZW50MTIzOnMzY3JldA==");
    }

    #[test]
    fn test_token_response_requires_access_token() {
        let missing: Result<TokenResponse, _> =
            serde_json::from_str(r#"{"refresh_token":"R","expires_in":1200}"#);
        assert!(missing.is_err());

        let ok: TokenResponse =
            serde_json::from_str(r#"{"access_token":"A","expires_in":1200}"#).unwrap();
        let set = UpstreamTokenSet::from(ok);
        assert_eq!(set.access_token, "A");
        assert!(set.refresh_token.is_none());
    }

    #[test]
    fn test_debug_output_redacts_secrets() {
        let set = UpstreamTokenSet::new("A-token".into(), Some("R-token".into()), 1200);
        let rendered = format!("{set:?} {:?}", config());
        assert!(!rendered.contains("A-token"));
        assert!(!rendered.contains("R-token"));
        assert!(!rendered.contains("s3cret"));
    }

    #[test]
    fn test_oauth_error_display() {
        let error = OAuthError {
            error: "invalid_grant".to_string(),
            error_description: Some("Code has expired".to_string()),
        };
        assert_eq!(error.to_string(), "invalid_grant: Code has expired");
    }
}
