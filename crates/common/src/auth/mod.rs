//! OAuth 2.0 + PKCE building blocks
//!
//! Provider-agnostic pieces of the authorization code flow. Nothing here
//! stores state: attempt persistence, replay protection and session bridging
//! live in the crates that own those concerns.
//!
//! # Architecture
//!
//! ```text
//! PkceChallenge ──► OAuthConfig::authorization_url   (browser redirect)
//!       │
//!       └─ code_verifier ──► OAuthClient::exchange_code ──► UpstreamTokenSet
//!                            OAuthClient::refresh_access_token
//! ```
//!
//! # Usage Example
//!
//! ```no_run
//! use rda_common::auth::{OAuthClient, OAuthConfig, PkceChallenge, DEFAULT_STATE_LENGTH};
//!
//! # async fn demo(config: OAuthConfig) -> Result<(), Box<dyn std::error::Error>> {
//! let pkce = PkceChallenge::generate(DEFAULT_STATE_LENGTH)?;
//! let url = config.authorization_url(&pkce.state, &pkce.code_challenge);
//! println!("visit {url}");
//!
//! let client = OAuthClient::new(config, reqwest::Client::new());
//! let tokens = client.exchange_code("code-from-callback", &pkce.code_verifier).await?;
//! println!("expires at {}", tokens.expires_at());
//! # Ok(())
//! # }
//! ```

pub mod pkce;
pub mod types;

#[cfg(feature = "runtime")]
pub mod client;

#[cfg(feature = "runtime")]
pub use client::{OAuthClient, OAuthClientError};
pub use pkce::{
    generate_code_challenge, generate_code_verifier, generate_state, validate_state,
    PkceChallenge, PkceError, DEFAULT_STATE_LENGTH, MAX_STATE_LENGTH, MIN_STATE_LENGTH,
};
pub use types::{OAuthConfig, OAuthError, TokenResponse, UpstreamTokenSet};
