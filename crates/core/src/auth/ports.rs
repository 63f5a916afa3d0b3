//! Port interfaces for the login flow
//!
//! These traits define the boundaries between core business logic
//! and infrastructure implementations.

use async_trait::async_trait;
use rda_common::auth::UpstreamTokenSet;
use rda_domain::{
    AccountRef, ExternalIdentity, InternalSessionIdentity, IssuedSession, LoginKey, Result,
    SessionMetadata,
};

/// Trait for the external identity provider
#[async_trait]
pub trait UpstreamAuth: Send + Sync {
    /// Redeem an authorization code with its PKCE verifier
    async fn exchange_code(&self, code: &str, verifier: &str) -> Result<UpstreamTokenSet>;

    /// Trade a refresh token for a fresh access token
    async fn refresh(&self, refresh_token: &str) -> Result<UpstreamTokenSet>;

    /// Resolve the identity an access token belongs to
    async fn verify_identity(&self, access_token: &str) -> Result<ExternalIdentity>;
}

/// Trait for the internal identity/session store
///
/// The only three capabilities login bridging needs. Implementations must
/// make `upsert_account` idempotent per login key.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// Look up an account by its derived login key
    async fn find_account(&self, login_key: &LoginKey) -> Result<Option<AccountRef>>;

    /// Create the account or replace its stored metadata
    async fn upsert_account(
        &self,
        login_key: &LoginKey,
        metadata: &SessionMetadata,
    ) -> Result<AccountRef>;

    /// Issue a session for an account without any password step
    async fn issue_session(&self, account: &AccountRef) -> Result<IssuedSession>;
}

/// Trait for reading and ending existing internal sessions
#[async_trait]
pub trait SessionDirectory: Send + Sync {
    /// Identity behind a session access token, `None` if unknown or expired
    async fn identity_for(&self, access_token: &str) -> Result<Option<InternalSessionIdentity>>;

    /// Invalidate a session
    async fn revoke(&self, access_token: &str) -> Result<()>;
}

/// Process-wide single-use ledger of attempt states
pub trait ReplayGuard: Send + Sync {
    /// Mark `state` as used; `false` if it was already claimed or retired
    fn claim(&self, state: &str) -> bool;

    /// Mark `state` as consumed whether or not it was claimed
    fn retire(&self, state: &str);
}
