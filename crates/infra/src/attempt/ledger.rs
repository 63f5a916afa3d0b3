//! Process-wide record of attempt states already used

use std::time::Duration;

use moka::sync::Cache;
use rda_core::ReplayGuard;
use rda_domain::constants::ATTEMPT_TTL_SECONDS;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LedgerMark {
    Claimed,
    Consumed,
}

/// TTL-bounded replay ledger
///
/// Entries live as long as an attempt could still be valid; after that the
/// signed token has expired on its own.
#[derive(Clone)]
pub struct ReplayLedger {
    states: Cache<String, LedgerMark>,
}

impl ReplayLedger {
    pub fn new() -> Self {
        Self::with_ttl(Duration::from_secs(ATTEMPT_TTL_SECONDS.unsigned_abs()))
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self { states: Cache::builder().time_to_live(ttl).build() }
    }
}

impl Default for ReplayLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl ReplayGuard for ReplayLedger {
    fn claim(&self, state: &str) -> bool {
        let entry = self.states.entry(state.to_string()).or_insert_with(|| LedgerMark::Claimed);
        if !entry.is_fresh() {
            debug!(mark = ?entry.value(), "attempt_state_replayed");
        }
        entry.is_fresh()
    }

    fn retire(&self, state: &str) {
        self.states.insert(state.to_string(), LedgerMark::Consumed);
    }
}

#[cfg(test)]
impl ReplayLedger {
    fn is_consumed(&self, state: &str) -> bool {
        self.states.get(state) == Some(LedgerMark::Consumed)
    }
}
