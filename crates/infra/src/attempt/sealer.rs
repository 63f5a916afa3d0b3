//! Signed attempt tokens
//!
//! Format: `base64url(json) "." hex(blake3_keyed(key, json))`. The JSON is
//! not encrypted; it holds the verifier and state, which are only useful
//! together with an authorization code bound to them.

use std::fmt;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Utc};
use rda_domain::{AuthorizationAttempt, RdaError, Result, SecretString};
use tracing::debug;

const KEY_CONTEXT: &str = "rda 2026-01 login attempt cookie";

/// Seals and opens [`AuthorizationAttempt`] tokens
#[derive(Clone)]
pub struct AttemptSealer {
    key: [u8; 32],
}

impl AttemptSealer {
    /// Derive the MAC key from the configured signing secret
    pub fn new(signing_key: &SecretString) -> Self {
        Self { key: blake3::derive_key(KEY_CONTEXT, signing_key.expose().as_bytes()) }
    }

    pub fn seal(&self, attempt: &AuthorizationAttempt) -> Result<String> {
        let json = serde_json::to_vec(attempt)
            .map_err(|e| RdaError::Internal(format!("failed to encode attempt: {e}")))?;
        let mac = blake3::keyed_hash(&self.key, &json);
        Ok(format!("{}.{}", URL_SAFE_NO_PAD.encode(&json), hex::encode(mac.as_bytes())))
    }

    /// Open a token, returning `None` when it is malformed, forged or expired
    pub fn unseal(&self, token: &str, now: DateTime<Utc>) -> Option<AuthorizationAttempt> {
        let (payload, mac) = token.split_once('.')?;

        let json = URL_SAFE_NO_PAD.decode(payload).ok()?;
        let presented: [u8; 32] = hex::decode(mac).ok()?.try_into().ok()?;

        // blake3::Hash equality is constant-time
        if blake3::keyed_hash(&self.key, &json) != blake3::Hash::from(presented) {
            debug!("attempt_token_rejected: bad signature");
            return None;
        }

        let attempt: AuthorizationAttempt = serde_json::from_slice(&json).ok()?;
        if attempt.is_expired(now) {
            debug!(expires_at = %attempt.expires_at(), "attempt_token_rejected: expired");
            return None;
        }

        Some(attempt)
    }
}

impl fmt::Debug for AttemptSealer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttemptSealer").field("key", &"***").finish()
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn sealer(key: &str) -> AttemptSealer {
        AttemptSealer::new(&SecretString::new(key))
    }

    fn attempt(now: DateTime<Utc>) -> AuthorizationAttempt {
        AuthorizationAttempt::new("v".repeat(128), "state-abc".to_string(), now)
    }

    #[test]
    fn sealed_attempt_opens_with_same_key() {
        let now = Utc::now();
        let sealer = sealer("0123456789abcdef0123456789abcdef");
        let token = sealer.seal(&attempt(now)).unwrap();

        assert_eq!(sealer.unseal(&token, now + Duration::seconds(30)), Some(attempt(now)));
        assert!(!token.contains('='));
    }

    #[test]
    fn tampered_payload_is_rejected() {
        let now = Utc::now();
        let sealer = sealer("0123456789abcdef0123456789abcdef");
        let token = sealer.seal(&attempt(now)).unwrap();
        let (_, mac) = token.split_once('.').unwrap();

        let mut forged = attempt(now);
        forged.state = "attacker-state".to_string();
        let forged_payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&forged).unwrap());

        assert!(sealer.unseal(&format!("{forged_payload}.{mac}"), now).is_none());
    }

    #[test]
    fn other_key_is_rejected() {
        let now = Utc::now();
        let token = sealer("0123456789abcdef0123456789abcdef").seal(&attempt(now)).unwrap();

        assert!(sealer("fedcba9876543210fedcba9876543210").unseal(&token, now).is_none());
    }

    #[test]
    fn expired_attempt_is_rejected() {
        let created = Utc::now();
        let sealer = sealer("0123456789abcdef0123456789abcdef");
        let token = sealer.seal(&attempt(created)).unwrap();

        assert!(sealer.unseal(&token, created + Duration::seconds(599)).is_some());
        assert!(sealer.unseal(&token, created + Duration::seconds(600)).is_none());
    }

    #[test]
    fn malformed_tokens_are_rejected() {
        let sealer = sealer("0123456789abcdef0123456789abcdef");
        let now = Utc::now();

        for token in ["", "no-dot", "!!!.00", "e30.zz", "e30.00"] {
            assert!(sealer.unseal(token, now).is_none(), "accepted {token:?}");
        }
    }

    #[test]
    fn debug_hides_key() {
        let rendered = format!("{:?}", sealer("0123456789abcdef0123456789abcdef"));
        assert!(rendered.contains("***"));
    }
}
