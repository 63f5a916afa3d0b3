//! EVE SSO adapter
//!
//! Token grants go through the shared [`OAuthClient`]; identity comes from
//! `GET {sso}/oauth/verify` with the fresh bearer token.

use async_trait::async_trait;
use rda_common::auth::{OAuthClient, OAuthClientError, OAuthConfig, UpstreamTokenSet};
use rda_core::UpstreamAuth;
use rda_domain::constants::{SSO_AUTHORIZE_PATH, SSO_TOKEN_PATH, SSO_VERIFY_PATH};
use rda_domain::{ExternalIdentity, ProviderConfig, RdaError, Result};
use reqwest::Method;
use serde::Deserialize;
use tracing::{debug, warn};
use url::Url;

use crate::errors::InfraError;
use crate::http::client::{check_status, truncate};
use crate::http::HttpClient;

/// `GET /oauth/verify` response
///
/// `CharacterID` and `CharacterName` are required; without them the login
/// cannot be bridged and verification fails.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct VerifyResponse {
    #[serde(rename = "CharacterID")]
    pub character_id: i64,
    pub character_name: String,
    #[serde(default)]
    pub character_owner_hash: Option<String>,
    #[serde(default)]
    pub scopes: Option<String>,
    #[serde(default)]
    pub expires_on: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
}

/// Build the OAuth client configuration for EVE SSO
///
/// # Errors
/// Returns `RdaError::Config` if the SSO base URL is not a valid URL.
pub fn oauth_config(provider: &ProviderConfig) -> Result<OAuthConfig> {
    Ok(OAuthConfig {
        authorization_endpoint: sso_url(&provider.sso_base_url, SSO_AUTHORIZE_PATH)?,
        token_endpoint: sso_url(&provider.sso_base_url, SSO_TOKEN_PATH)?,
        client_id: provider.client_id.clone(),
        client_secret: provider.client_secret.expose().to_string(),
        redirect_uri: provider.callback_url.clone(),
        scopes: provider.scopes.clone(),
    })
}

fn sso_url(base: &str, path: &str) -> Result<Url> {
    Url::parse(&format!("{}{}", base.trim_end_matches('/'), path))
        .map_err(|e| RdaError::Config(format!("invalid SSO base URL {base}: {e}")))
}

/// EVE SSO implementation of [`UpstreamAuth`]
#[derive(Debug, Clone)]
pub struct EveSsoClient {
    oauth: OAuthClient,
    http: HttpClient,
    verify_url: Url,
}

impl EveSsoClient {
    /// # Errors
    /// Returns `RdaError::Config` for an unparseable SSO base URL.
    pub fn new(provider: &ProviderConfig, http: HttpClient) -> Result<Self> {
        let oauth = OAuthClient::new(oauth_config(provider)?, http.inner().clone());
        let verify_url = sso_url(&provider.sso_base_url, SSO_VERIFY_PATH)?;
        Ok(Self { oauth, http, verify_url })
    }

    pub fn oauth_config(&self) -> &OAuthConfig {
        self.oauth.config()
    }
}

/// Log the raw provider body, then reduce to a domain error
fn token_error(grant: &'static str, err: OAuthClientError) -> RdaError {
    if let OAuthClientError::Rejected { status, body, .. } = &err {
        warn!(grant, status, body = %truncate(body), "token endpoint rejected grant");
    } else {
        warn!(grant, error = %err, "token request failed");
    }
    InfraError::from(err).into()
}

#[async_trait]
impl UpstreamAuth for EveSsoClient {
    async fn exchange_code(&self, code: &str, verifier: &str) -> Result<UpstreamTokenSet> {
        self.oauth
            .exchange_code(code, verifier)
            .await
            .map_err(|e| token_error("authorization_code", e))
    }

    async fn refresh(&self, refresh_token: &str) -> Result<UpstreamTokenSet> {
        self.oauth
            .refresh_access_token(refresh_token)
            .await
            .map_err(|e| token_error("refresh_token", e))
    }

    async fn verify_identity(&self, access_token: &str) -> Result<ExternalIdentity> {
        let request =
            self.http.request(Method::GET, self.verify_url.clone()).bearer_auth(access_token);
        let response = self.http.send(request).await?;
        let response = check_status(response, "sso verify").await.map_err(|e| match e {
            RdaError::NotFound(msg) | RdaError::Network(msg) => RdaError::UpstreamAuth(msg),
            other => other,
        })?;

        let raw_claims: serde_json::Value = response
            .json()
            .await
            .map_err(|e| RdaError::UpstreamAuth(format!("verify response unreadable: {e}")))?;
        let verified: VerifyResponse = serde_json::from_value(raw_claims.clone())
            .map_err(|e| RdaError::UpstreamAuth(format!("verify response missing identity: {e}")))?;

        debug!(character_id = verified.character_id, "identity_verified");
        Ok(ExternalIdentity {
            external_id: verified.character_id,
            display_name: verified.character_name,
            raw_claims,
        })
    }
}
