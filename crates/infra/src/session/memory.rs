//! In-process session store for development and tests
//!
//! Accounts are keyed by login key; sessions map an opaque access token to
//! an account and expire after the advertised session lifetime. Nothing
//! survives a restart.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use moka::sync::Cache;
use parking_lot::RwLock;
use rand::rngs::OsRng;
use rand::RngCore;
use rda_core::{SessionDirectory, SessionProvider};
use rda_domain::{
    AccountRef, InternalSessionIdentity, IssuedSession, LoginKey, RdaError, Result,
    SessionMetadata,
};
use tracing::debug;
use uuid::Uuid;

const SESSION_LIFETIME: Duration = Duration::from_secs(3600);

pub struct InMemorySessionStore {
    accounts: RwLock<HashMap<LoginKey, (AccountRef, SessionMetadata)>>,
    /// access token → login key
    sessions: Cache<String, LoginKey>,
    session_lifetime: Duration,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::with_session_lifetime(SESSION_LIFETIME)
    }

    pub fn with_session_lifetime(session_lifetime: Duration) -> Self {
        Self {
            accounts: RwLock::new(HashMap::new()),
            sessions: Cache::builder().time_to_live(session_lifetime).build(),
            session_lifetime,
        }
    }
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

fn opaque_token() -> String {
    let mut bytes = [0u8; 32];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

#[async_trait]
impl SessionProvider for InMemorySessionStore {
    async fn find_account(&self, login_key: &LoginKey) -> Result<Option<AccountRef>> {
        Ok(self.accounts.read().get(login_key).map(|(account, _)| account.clone()))
    }

    async fn upsert_account(
        &self,
        login_key: &LoginKey,
        metadata: &SessionMetadata,
    ) -> Result<AccountRef> {
        let mut accounts = self.accounts.write();
        let entry = accounts.entry(login_key.clone()).or_insert_with(|| {
            let account =
                AccountRef { id: Uuid::now_v7().to_string(), login_key: login_key.clone() };
            debug!(account_id = %account.id, "account_created");
            (account, metadata.clone())
        });
        entry.1 = metadata.clone();
        Ok(entry.0.clone())
    }

    async fn issue_session(&self, account: &AccountRef) -> Result<IssuedSession> {
        match self.accounts.read().get(&account.login_key) {
            Some((stored, _)) if stored.id == account.id => {}
            _ => return Err(RdaError::SessionBridge(format!("unknown account {}", account.id))),
        }

        let session = IssuedSession {
            access_token: opaque_token(),
            refresh_token: opaque_token(),
            expires_in: i64::try_from(self.session_lifetime.as_secs()).unwrap_or(i64::MAX),
        };
        self.sessions.insert(session.access_token.clone(), account.login_key.clone());
        Ok(session)
    }
}

#[async_trait]
impl SessionDirectory for InMemorySessionStore {
    async fn identity_for(&self, access_token: &str) -> Result<Option<InternalSessionIdentity>> {
        let Some(login_key) = self.sessions.get(access_token) else {
            return Ok(None);
        };
        let identity = self.accounts.read().get(&login_key).map(|(account, metadata)| {
            InternalSessionIdentity { account: account.clone(), metadata: metadata.clone() }
        });
        Ok(identity)
    }

    async fn revoke(&self, access_token: &str) -> Result<()> {
        self.sessions.invalidate(access_token);
        Ok(())
    }
}
