//! Login, identity and session types

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{ATTEMPT_TTL_SECONDS, LOGIN_KEY_NAMESPACE};
use crate::impl_domain_code_conversions;

/// One in-flight login round trip
///
/// Created when the browser is sent to the provider and destroyed by the
/// callback whatever its outcome. Travels inside the sealed attempt cookie.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationAttempt {
    pub verifier: String,
    pub state: String,
    pub challenge_method: String,
    pub created_at: DateTime<Utc>,
    pub ttl_seconds: i64,
}

impl AuthorizationAttempt {
    /// New attempt with the standard ten minute lifetime
    pub fn new(verifier: String, state: String, created_at: DateTime<Utc>) -> Self {
        Self {
            verifier,
            state,
            challenge_method: "S256".to_string(),
            created_at,
            ttl_seconds: ATTEMPT_TTL_SECONDS,
        }
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.created_at + Duration::seconds(self.ttl_seconds)
    }

    /// An attempt is usable strictly before `expires_at`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at()
    }
}

impl fmt::Debug for AuthorizationAttempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthorizationAttempt")
            .field("verifier", &"***")
            .field("state_len", &self.state.len())
            .field("challenge_method", &self.challenge_method)
            .field("created_at", &self.created_at)
            .field("ttl_seconds", &self.ttl_seconds)
            .finish()
    }
}

/// Identity confirmed by the provider's verify endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalIdentity {
    pub external_id: i64,
    pub display_name: String,
    /// Full verify response, kept for diagnostics
    pub raw_claims: serde_json::Value,
}

/// Namespaced, deterministic key for an internal account
///
/// `eve:<character id>`. Distinct characters never share a key because the
/// decimal rendering of an `i64` is unique.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LoginKey(String);

impl LoginKey {
    pub fn for_character(character_id: i64) -> Self {
        Self(format!("{LOGIN_KEY_NAMESPACE}:{character_id}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LoginKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Metadata stored on the internal account
///
/// The provider refresh token is the only upstream credential that outlives
/// a request.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionMetadata {
    pub character_id: i64,
    pub character_name: String,
    #[serde(rename = "eve_refresh_token")]
    pub refresh_token: String,
    pub last_login_at: DateTime<Utc>,
}

impl fmt::Debug for SessionMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionMetadata")
            .field("character_id", &self.character_id)
            .field("character_name", &self.character_name)
            .field("refresh_token", &"***")
            .field("last_login_at", &self.last_login_at)
            .finish()
    }
}

/// Handle to an account in the internal store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountRef {
    pub id: String,
    pub login_key: LoginKey,
}

/// Identity behind an internal session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InternalSessionIdentity {
    pub account: AccountRef,
    pub metadata: SessionMetadata,
}

/// Credentials of an internal session, handed to the browser as cookies
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuedSession {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
}

impl fmt::Debug for IssuedSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IssuedSession").field("expires_in", &self.expires_in).finish_non_exhaustive()
    }
}

/// Coarse error code shown to the browser after a failed login
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoginErrorCode {
    AuthFailedVerification,
    UpstreamAuthFailed,
    SessionBridgeFailed,
}

impl_domain_code_conversions!(LoginErrorCode {
    AuthFailedVerification => "auth_failed_verification",
    UpstreamAuthFailed => "upstream_auth_failed",
    SessionBridgeFailed => "session_bridge_failed",
});

/// Callback state machine stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoginStage {
    AwaitingCode,
    Validated,
    UpstreamExchanged,
    IdentityVerified,
    SessionBridged,
    Done,
    Failed,
}

impl_domain_code_conversions!(LoginStage {
    AwaitingCode => "awaiting_code",
    Validated => "validated",
    UpstreamExchanged => "upstream_exchanged",
    IdentityVerified => "identity_verified",
    SessionBridged => "session_bridged",
    Done => "done",
    Failed => "failed",
});
