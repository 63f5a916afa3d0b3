//! Shared test helpers for `rda-core` integration tests.
//!
//! Lightweight in-process implementations of every port, each counting the
//! calls it receives so tests can assert on network behaviour.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rda_common::auth::UpstreamTokenSet;
use rda_core::{CharacterData, NameDirectory, ReplayGuard, SessionProvider, UpstreamAuth};
use rda_domain::{
    AccountRef, AssetItem, AuthorizationAttempt, CharacterLocation, ExternalIdentity,
    InternalSessionIdentity, IssuedSession, LoginKey, NameMap, RdaError, Result, SessionMetadata,
    SkillSummary,
};

/// Upstream provider returning canned responses
pub struct FakeUpstream {
    pub exchange_calls: AtomicUsize,
    pub verify_calls: AtomicUsize,
    pub refresh_calls: AtomicUsize,
    pub refresh_token: Mutex<Option<String>>,
    pub identity: (i64, String),
    pub fail_exchange: bool,
    pub fail_verify: bool,
    pub fail_refresh: bool,
    pub hang_exchange: bool,
    pub rotate_to: Option<String>,
}

impl FakeUpstream {
    pub fn new(refresh_token: &str, identity_id: i64, name: &str) -> Self {
        Self {
            exchange_calls: AtomicUsize::new(0),
            verify_calls: AtomicUsize::new(0),
            refresh_calls: AtomicUsize::new(0),
            refresh_token: Mutex::new(Some(refresh_token.to_string())),
            identity: (identity_id, name.to_string()),
            fail_exchange: false,
            fail_verify: false,
            fail_refresh: false,
            hang_exchange: false,
            rotate_to: None,
        }
    }

    pub fn network_calls(&self) -> usize {
        self.exchange_calls.load(Ordering::SeqCst)
            + self.verify_calls.load(Ordering::SeqCst)
            + self.refresh_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UpstreamAuth for FakeUpstream {
    async fn exchange_code(&self, _code: &str, verifier: &str) -> Result<UpstreamTokenSet> {
        self.exchange_calls.fetch_add(1, Ordering::SeqCst);
        if self.hang_exchange {
            std::future::pending::<()>().await;
        }
        if self.fail_exchange || verifier.is_empty() {
            return Err(RdaError::UpstreamAuth("token endpoint returned 400".into()));
        }
        Ok(UpstreamTokenSet::new("A".into(), self.refresh_token.lock().clone(), 1200))
    }

    async fn refresh(&self, refresh_token: &str) -> Result<UpstreamTokenSet> {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_refresh {
            return Err(RdaError::UpstreamAuth("token endpoint returned 400".into()));
        }
        let next = self.rotate_to.clone().unwrap_or_else(|| refresh_token.to_string());
        Ok(UpstreamTokenSet::new("A-refreshed".into(), Some(next), 1200))
    }

    async fn verify_identity(&self, access_token: &str) -> Result<ExternalIdentity> {
        self.verify_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_verify || access_token != "A" {
            return Err(RdaError::UpstreamAuth("verify endpoint returned 401".into()));
        }
        Ok(ExternalIdentity {
            external_id: self.identity.0,
            display_name: self.identity.1.clone(),
            raw_claims: serde_json::json!({
                "CharacterID": self.identity.0,
                "CharacterName": self.identity.1,
            }),
        })
    }
}

/// Session store keeping accounts in a map
#[derive(Default)]
pub struct FakeSessions {
    pub accounts: Mutex<HashMap<LoginKey, (AccountRef, SessionMetadata)>>,
    pub creates: AtomicUsize,
    pub upserts: AtomicUsize,
    pub issued: AtomicUsize,
    pub fail_upsert: bool,
    pub fail_issue: bool,
}

impl FakeSessions {
    pub fn stored(&self, key: &LoginKey) -> Option<SessionMetadata> {
        self.accounts.lock().get(key).map(|(_, m)| m.clone())
    }

    pub fn identity(&self, key: &LoginKey) -> Option<InternalSessionIdentity> {
        self.accounts
            .lock()
            .get(key)
            .map(|(a, m)| InternalSessionIdentity { account: a.clone(), metadata: m.clone() })
    }
}

#[async_trait]
impl SessionProvider for FakeSessions {
    async fn find_account(&self, login_key: &LoginKey) -> Result<Option<AccountRef>> {
        Ok(self.accounts.lock().get(login_key).map(|(a, _)| a.clone()))
    }

    async fn upsert_account(
        &self,
        login_key: &LoginKey,
        metadata: &SessionMetadata,
    ) -> Result<AccountRef> {
        self.upserts.fetch_add(1, Ordering::SeqCst);
        if self.fail_upsert {
            return Err(RdaError::SessionBridge("store returned 503".into()));
        }
        let mut accounts = self.accounts.lock();
        let next_id = accounts.len() + 1;
        let entry = accounts.entry(login_key.clone()).or_insert_with(|| {
            self.creates.fetch_add(1, Ordering::SeqCst);
            (
                AccountRef { id: format!("acct-{next_id}"), login_key: login_key.clone() },
                metadata.clone(),
            )
        });
        entry.1 = metadata.clone();
        Ok(entry.0.clone())
    }

    async fn issue_session(&self, account: &AccountRef) -> Result<IssuedSession> {
        self.issued.fetch_add(1, Ordering::SeqCst);
        if self.fail_issue {
            return Err(RdaError::SessionBridge("session issuance refused".into()));
        }
        Ok(IssuedSession {
            access_token: format!("session-{}", account.id),
            refresh_token: format!("session-refresh-{}", account.id),
            expires_in: 3600,
        })
    }
}

/// Replay ledger recording claims and retirements
#[derive(Default)]
pub struct FakeReplay {
    pub used: Mutex<HashSet<String>>,
    pub retired: Mutex<Vec<String>>,
}

impl ReplayGuard for FakeReplay {
    fn claim(&self, state: &str) -> bool {
        self.used.lock().insert(state.to_string())
    }

    fn retire(&self, state: &str) {
        self.used.lock().insert(state.to_string());
        self.retired.lock().push(state.to_string());
    }
}

/// Character data with per-field failure switches
#[derive(Default)]
pub struct FakeCharacterData {
    pub fail_wallet: bool,
    pub fail_skills: bool,
    pub fail_location: bool,
    pub fail_assets: bool,
    pub asset_count: usize,
    pub tokens_seen: Mutex<Vec<String>>,
}

impl FakeCharacterData {
    fn check(&self, fail: bool, token: &str, what: &str) -> Result<()> {
        self.tokens_seen.lock().push(token.to_string());
        if fail {
            return Err(RdaError::TransientFetch(format!("{what} returned 502")));
        }
        Ok(())
    }
}

#[async_trait]
impl CharacterData for FakeCharacterData {
    async fn wallet_balance(&self, _character_id: i64, access_token: &str) -> Result<f64> {
        self.check(self.fail_wallet, access_token, "wallet")?;
        Ok(1_234_567.89)
    }

    async fn skills(&self, _character_id: i64, access_token: &str) -> Result<SkillSummary> {
        self.check(self.fail_skills, access_token, "skills")?;
        Ok(SkillSummary { total_sp: 5_000_000, unallocated_sp: Some(1_000) })
    }

    async fn location(&self, _character_id: i64, access_token: &str) -> Result<CharacterLocation> {
        self.check(self.fail_location, access_token, "location")?;
        Ok(CharacterLocation {
            solar_system_id: 30000142,
            station_id: Some(60003760),
            structure_id: None,
        })
    }

    async fn assets(&self, _character_id: i64, access_token: &str) -> Result<Vec<AssetItem>> {
        self.check(self.fail_assets, access_token, "assets")?;
        Ok((0..self.asset_count)
            .map(|i| AssetItem {
                item_id: i as i64,
                type_id: 34,
                location_id: 60003760,
                location_flag: "Hangar".into(),
                quantity: 100,
                is_singleton: false,
            })
            .collect())
    }
}

/// Name directory with a fixed dictionary, recording each request
#[derive(Default)]
pub struct FakeNames {
    pub known: HashMap<i64, String>,
    pub calls: Mutex<Vec<Vec<i64>>>,
}

impl FakeNames {
    pub fn with(entries: &[(i64, &str)]) -> Self {
        Self {
            known: entries.iter().map(|(id, n)| (*id, (*n).to_string())).collect(),
            calls: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl NameDirectory for FakeNames {
    async fn resolve(&self, ids: &[i64]) -> NameMap {
        self.calls.lock().push(ids.to_vec());
        ids.iter().filter_map(|id| self.known.get(id).map(|n| (*id, n.clone()))).collect()
    }
}

pub fn attempt(state: &str, created_at: DateTime<Utc>) -> AuthorizationAttempt {
    AuthorizationAttempt::new("v".repeat(128), state.to_string(), created_at)
}
