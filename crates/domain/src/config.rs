//! Application configuration
//!
//! Built once at startup by the infra loader and shared read-only. Every
//! section deserializes from the `rda.toml` fallback file; the loader fills
//! the same structs from `RDA_*` environment variables.

use std::fmt;

use serde::Deserialize;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::constants::{
    DEFAULT_BIND_ADDR, DEFAULT_ESI_BASE_URL, DEFAULT_NAME_CACHE_MAX_CAPACITY,
    DEFAULT_NAME_CACHE_TTL_SECONDS, DEFAULT_SSO_BASE_URL, EVE_SCOPES,
};
use crate::errors::{RdaError, Result};

/// Shortest accepted attempt signing key, in bytes.
pub const MIN_SIGNING_KEY_LENGTH: usize = 32;

/// String secret that zeroes memory on drop
///
/// `Debug` and `Display` never print the value.
#[derive(Clone, Default, PartialEq, Eq, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(transparent)]
pub struct SecretString {
    inner: String,
}

impl SecretString {
    /// Create a new secret
    pub fn new(s: impl Into<String>) -> Self {
        Self { inner: s.into() }
    }

    /// Expose the inner value
    ///
    /// The exposed value should not be stored or logged.
    pub fn expose(&self) -> &str {
        &self.inner
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl From<String> for SecretString {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretString(***)")
    }
}

impl fmt::Display for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "***")
    }
}

/// Top-level configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub provider: ProviderConfig,
    #[serde(default)]
    pub esi: EsiConfig,
    pub session_store: SessionStoreConfig,
    pub server: ServerConfig,
    #[serde(default)]
    pub names: NameCacheConfig,
}

impl Config {
    /// Check cross-field constraints the types cannot express
    ///
    /// # Errors
    /// Returns `RdaError::Config` naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        if self.provider.client_id.trim().is_empty() {
            return Err(RdaError::Config("provider.client_id is empty".into()));
        }
        if self.provider.client_secret.is_empty() {
            return Err(RdaError::Config("provider.client_secret is empty".into()));
        }
        if !self.provider.callback_url.starts_with("http") {
            return Err(RdaError::Config("provider.callback_url must be an absolute URL".into()));
        }
        if self.session_store.service_key.is_empty() {
            return Err(RdaError::Config("session_store.service_key is empty".into()));
        }
        if self.server.attempt_signing_key.len() < MIN_SIGNING_KEY_LENGTH {
            return Err(RdaError::Config(format!(
                "server.attempt_signing_key must be at least {MIN_SIGNING_KEY_LENGTH} bytes"
            )));
        }
        if self.names.ttl_seconds == 0 {
            return Err(RdaError::Config("names.ttl_seconds must be positive".into()));
        }
        Ok(())
    }
}

/// EVE SSO client registration
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    pub client_id: String,
    pub client_secret: SecretString,
    /// Redirect URI registered with the provider; sent verbatim
    pub callback_url: String,
    #[serde(default = "default_sso_base_url")]
    pub sso_base_url: String,
    #[serde(default = "default_scopes")]
    pub scopes: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EsiConfig {
    #[serde(default = "default_esi_base_url")]
    pub base_url: String,
}

impl Default for EsiConfig {
    fn default() -> Self {
        Self { base_url: default_esi_base_url() }
    }
}

/// Internal identity/session store
#[derive(Debug, Clone, Deserialize)]
pub struct SessionStoreConfig {
    /// Base URL of the admin API; `memory://` selects the in-process store
    pub url: String,
    pub service_key: SecretString,
}

impl SessionStoreConfig {
    pub fn is_in_memory(&self) -> bool {
        self.url.starts_with("memory://")
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    /// Origin used for absolute redirects; relative redirects when unset
    #[serde(default)]
    pub public_origin: Option<String>,
    #[serde(default = "default_true")]
    pub secure_cookies: bool,
    pub attempt_signing_key: SecretString,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NameCacheConfig {
    #[serde(default = "default_name_ttl")]
    pub ttl_seconds: u64,
    #[serde(default = "default_name_capacity")]
    pub max_capacity: u64,
}

impl Default for NameCacheConfig {
    fn default() -> Self {
        Self { ttl_seconds: default_name_ttl(), max_capacity: default_name_capacity() }
    }
}

fn default_sso_base_url() -> String {
    DEFAULT_SSO_BASE_URL.to_string()
}

fn default_esi_base_url() -> String {
    DEFAULT_ESI_BASE_URL.to_string()
}

fn default_bind_addr() -> String {
    DEFAULT_BIND_ADDR.to_string()
}

/// Fixed scope list requested on every login
pub fn default_scopes() -> Vec<String> {
    EVE_SCOPES.iter().map(|s| (*s).to_string()).collect()
}

fn default_true() -> bool {
    true
}

fn default_name_ttl() -> u64 {
    DEFAULT_NAME_CACHE_TTL_SECONDS
}

fn default_name_capacity() -> u64 {
    DEFAULT_NAME_CACHE_MAX_CAPACITY
}
