//! Port interfaces for name resolution

use async_trait::async_trait;
use rda_domain::{NameMap, NameRecord, Result};

/// One upstream names request
///
/// Callers pass at most the provider's batch maximum and no duplicates.
#[async_trait]
pub trait NameLookup: Send + Sync {
    async fn lookup_names(&self, ids: &[i64]) -> Result<Vec<NameRecord>>;
}

/// Cached, coalescing ID → name resolution
///
/// Never fails: IDs that could not be resolved are absent from the map and
/// callers fall back to the raw number.
#[async_trait]
pub trait NameDirectory: Send + Sync {
    async fn resolve(&self, ids: &[i64]) -> NameMap;
}
