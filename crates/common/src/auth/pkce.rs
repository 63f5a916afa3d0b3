//! PKCE (Proof Key for Code Exchange) implementation for OAuth 2.0
//!
//! Implements RFC 7636. Verifiers and state tokens are drawn from the
//! operating system CSPRNG; if it cannot be read the error is returned to the
//! caller and no weaker generator is substituted.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};
use thiserror::Error;

/// PKCE unreserved characters (RFC 7636 §4.1).
pub const UNRESERVED_ALPHABET: &[u8; 66] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-._~";

/// Shortest verifier RFC 7636 allows.
pub const MIN_VERIFIER_LENGTH: usize = 43;

/// Longest verifier RFC 7636 allows.
pub const MAX_VERIFIER_LENGTH: usize = 128;

/// Length of verifiers produced by [`generate_code_verifier`].
pub const VERIFIER_LENGTH: usize = MAX_VERIFIER_LENGTH;

/// Shortest accepted state token.
pub const MIN_STATE_LENGTH: usize = 16;

/// Longest accepted state token.
pub const MAX_STATE_LENGTH: usize = 256;

/// State length used by [`PkceChallenge::generate`].
pub const DEFAULT_STATE_LENGTH: usize = 32;

/// The only challenge method this crate emits.
pub const CHALLENGE_METHOD: &str = "S256";

// Largest multiple of the alphabet size that fits in a byte; bytes at or above
// it are discarded so every character is equally likely.
const ACCEPT_BELOW: u8 = (256 - 256 % UNRESERVED_ALPHABET.len()) as u8;

/// Error type for PKCE generation
#[derive(Debug, Error)]
pub enum PkceError {
    /// The operating system random source failed
    #[error("secure random source unavailable: {0}")]
    Entropy(String),

    /// Requested token length is out of bounds
    #[error("requested length {requested} is outside {min}..={max}")]
    InvalidLength {
        /// Length the caller asked for
        requested: usize,
        /// Inclusive lower bound
        min: usize,
        /// Inclusive upper bound
        max: usize,
    },
}

/// Generate a cryptographically secure code verifier
///
/// Returns a 128 character string over the unreserved alphabet.
///
/// # Errors
/// Returns [`PkceError::Entropy`] if the OS random source cannot be read.
pub fn generate_code_verifier() -> Result<String, PkceError> {
    random_unreserved(VERIFIER_LENGTH)
}

/// Generate code challenge from verifier using SHA256
///
/// Per RFC 7636, the challenge is BASE64URL(SHA256(ASCII(code_verifier)))
/// without padding.
#[must_use]
pub fn generate_code_challenge(verifier: &str) -> String {
    let digest = Sha256::digest(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(digest)
}

/// Generate a random state token for CSRF protection
///
/// # Errors
/// Returns [`PkceError::InvalidLength`] if `length` is outside
/// `MIN_STATE_LENGTH..=MAX_STATE_LENGTH`, or [`PkceError::Entropy`] if the OS
/// random source fails.
pub fn generate_state(length: usize) -> Result<String, PkceError> {
    if !(MIN_STATE_LENGTH..=MAX_STATE_LENGTH).contains(&length) {
        return Err(PkceError::InvalidLength {
            requested: length,
            min: MIN_STATE_LENGTH,
            max: MAX_STATE_LENGTH,
        });
    }
    random_unreserved(length)
}

/// Validate that the state token matches
///
/// Exact, constant-time comparison. A prefix of the expected value is a
/// mismatch.
#[must_use]
pub fn validate_state(expected: &str, actual: &str) -> bool {
    let (a, b) = (expected.as_bytes(), actual.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

fn random_unreserved(length: usize) -> Result<String, PkceError> {
    let mut out = String::with_capacity(length);
    let mut buf = [0u8; 64];

    while out.len() < length {
        OsRng.try_fill_bytes(&mut buf).map_err(|e| PkceError::Entropy(e.to_string()))?;
        for byte in buf.iter().copied().filter(|b| *b < ACCEPT_BELOW) {
            let index = usize::from(byte) % UNRESERVED_ALPHABET.len();
            out.push(char::from(UNRESERVED_ALPHABET[index]));
            if out.len() == length {
                break;
            }
        }
    }

    Ok(out)
}

/// PKCE challenge pair for OAuth 2.0 authorization
///
/// Contains the code verifier (sent during token exchange), the code
/// challenge (sent during the authorization request) and the state token
/// bound to the same attempt. The state is independent random data, not
/// derived from the verifier.
#[derive(Debug, Clone)]
pub struct PkceChallenge {
    /// Random secret, kept until token exchange
    pub code_verifier: String,

    /// SHA256 hash of `code_verifier` (base64url)
    pub code_challenge: String,

    /// Random CSRF protection token
    pub state: String,
}

impl PkceChallenge {
    /// Generate a new PKCE challenge with a state of the given length
    ///
    /// # Examples
    /// ```
    /// use rda_common::auth::pkce::PkceChallenge;
    ///
    /// let challenge = PkceChallenge::generate(32).expect("entropy");
    /// assert_eq!(challenge.code_verifier.len(), 128);
    /// assert_eq!(challenge.state.len(), 32);
    /// ```
    ///
    /// # Errors
    /// See [`generate_code_verifier`] and [`generate_state`].
    pub fn generate(state_length: usize) -> Result<Self, PkceError> {
        let code_verifier = generate_code_verifier()?;
        let code_challenge = generate_code_challenge(&code_verifier);
        let state = generate_state(state_length)?;

        Ok(Self { code_verifier, code_challenge, state })
    }

    /// Get the challenge method (always "S256" for SHA256)
    #[must_use]
    pub fn challenge_method(&self) -> &'static str {
        CHALLENGE_METHOD
    }
}
