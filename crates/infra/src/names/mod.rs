//! Batched, cached and coalescing name resolution
//!
//! # Architecture
//!
//! - **Cache**: `moka` TTL cache of ID → name, read-shared by every caller
//! - **In-flight map**: ID → shared batch future; an ID being fetched is
//!   awaited instead of fetched again
//! - **Batches**: residual IDs go upstream in sequential sub-batches of at
//!   most the provider maximum
//! - **Errors**: a failed sub-batch is logged and contributes no names;
//!   failures are never cached
//!
//! A batch writes its names into the cache before it leaves the in-flight
//! map, and both are inspected under the same lock, so an ID is always
//! visible in at least one of them while its batch is finishing.
//!
//! The map holds weak handles only. A batch is owned by the callers awaiting
//! it; when the last of them is cancelled the batch future is dropped and
//! its guard removes its IDs from the map.

use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt, Shared, WeakShared};
use moka::sync::Cache;
use parking_lot::Mutex;
use rda_core::{NameDirectory, NameLookup};
use rda_domain::constants::{
    DEFAULT_NAME_CACHE_MAX_CAPACITY, DEFAULT_NAME_CACHE_TTL_SECONDS, MAX_NAMES_PER_REQUEST,
};
use rda_domain::{NameCacheConfig, NameMap};
use tracing::{debug, warn};

type BatchFuture = Shared<BoxFuture<'static, Arc<NameMap>>>;
type WeakBatch = WeakShared<BoxFuture<'static, Arc<NameMap>>>;

/// Name cache configuration
#[derive(Debug, Clone)]
pub struct NameResolverConfig {
    /// Time-to-live for cache entries
    pub ttl: Duration,

    /// Maximum number of cached names
    pub max_capacity: u64,

    /// Largest upstream request
    pub batch_size: usize,
}

impl Default for NameResolverConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(DEFAULT_NAME_CACHE_TTL_SECONDS),
            max_capacity: DEFAULT_NAME_CACHE_MAX_CAPACITY,
            batch_size: MAX_NAMES_PER_REQUEST,
        }
    }
}

impl From<&NameCacheConfig> for NameResolverConfig {
    fn from(config: &NameCacheConfig) -> Self {
        Self {
            ttl: Duration::from_secs(config.ttl_seconds),
            max_capacity: config.max_capacity,
            ..Self::default()
        }
    }
}

impl NameResolverConfig {
    /// Create config with custom TTL (useful for testing)
    pub fn with_ttl(ttl: Duration) -> Self {
        Self { ttl, ..Self::default() }
    }

    /// Log configuration at startup
    pub fn log_config(&self) {
        tracing::info!(
            ttl_seconds = self.ttl.as_secs(),
            max_capacity = self.max_capacity,
            batch_size = self.batch_size,
            "Name cache configuration loaded"
        );
    }
}

struct Inner {
    lookup: Arc<dyn NameLookup>,
    cache: Cache<i64, String>,
    in_flight: Mutex<HashMap<i64, (u64, WeakBatch)>>,
    next_batch: AtomicU64,
    batch_size: usize,
}

/// Shared ID → name resolver
///
/// Cheap to clone; clones share one cache and one in-flight map.
#[derive(Clone)]
pub struct NameResolver {
    inner: Arc<Inner>,
}

impl NameResolver {
    pub fn new(lookup: Arc<dyn NameLookup>, config: NameResolverConfig) -> Self {
        config.log_config();
        let cache =
            Cache::builder().time_to_live(config.ttl).max_capacity(config.max_capacity).build();

        Self {
            inner: Arc::new(Inner {
                lookup,
                cache,
                in_flight: Mutex::new(HashMap::new()),
                next_batch: AtomicU64::new(0),
                batch_size: config.batch_size.max(1),
            }),
        }
    }

    /// Resolve IDs to names
    ///
    /// Duplicates are ignored. IDs the provider could not name are absent
    /// from the result.
    pub async fn resolve_ids(&self, ids: &[i64]) -> NameMap {
        let mut resolved = NameMap::new();
        if ids.is_empty() {
            return resolved;
        }

        let unique: BTreeSet<i64> = ids.iter().copied().collect();
        let mut waits: HashMap<u64, (BatchFuture, Vec<i64>)> = HashMap::new();
        let mut residual = Vec::new();

        {
            let mut in_flight = self.inner.in_flight.lock();
            for id in unique {
                if let Some(name) = self.inner.cache.get(&id) {
                    resolved.insert(id, name);
                    continue;
                }
                let Some((batch, weak)) = in_flight.get(&id) else {
                    residual.push(id);
                    continue;
                };
                if let Some((_, wanted)) = waits.get_mut(batch) {
                    wanted.push(id);
                } else if let Some(future) = weak.upgrade() {
                    waits.insert(*batch, (future, vec![id]));
                } else {
                    residual.push(id);
                }
            }

            if !residual.is_empty() {
                let batch = self.inner.next_batch.fetch_add(1, Ordering::Relaxed);
                let guard =
                    InFlightGuard { inner: self.inner.clone(), batch, ids: residual.clone() };
                let future = run_batch(guard).boxed().shared();
                if let Some(weak) = future.downgrade() {
                    for id in &residual {
                        in_flight.insert(*id, (batch, weak.clone()));
                    }
                }
                waits.insert(batch, (future, residual.clone()));
            }
        }

        debug!(
            cached = resolved.len(),
            joined = waits.values().map(|(_, ids)| ids.len()).sum::<usize>() - residual.len(),
            fetched = residual.len(),
            "name_resolution"
        );

        for (future, wanted) in waits.into_values() {
            let names = future.await;
            for id in wanted {
                if let Some(name) = names.get(&id) {
                    resolved.insert(id, name.clone());
                }
            }
        }

        resolved
    }
}

/// Removes a batch's IDs from the in-flight map when the batch finishes or
/// is dropped unfinished
struct InFlightGuard {
    inner: Arc<Inner>,
    batch: u64,
    ids: Vec<i64>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        let mut in_flight = self.inner.in_flight.lock();
        for id in &self.ids {
            if in_flight.get(id).is_some_and(|(owner, _)| *owner == self.batch) {
                in_flight.remove(id);
            }
        }
    }
}

/// Fetch one batch; `guard` is dropped after the cache writes.
async fn run_batch(guard: InFlightGuard) -> Arc<NameMap> {
    let inner = &guard.inner;
    let mut names = NameMap::with_capacity(guard.ids.len());

    for chunk in guard.ids.chunks(inner.batch_size) {
        match inner.lookup.lookup_names(chunk).await {
            Ok(records) => {
                for record in records {
                    inner.cache.insert(record.id, record.name.clone());
                    names.insert(record.id, record.name);
                }
            }
            Err(e) => {
                warn!(batch = guard.batch, ids = chunk.len(), error = %e, "name_batch_failed");
            }
        }
    }

    Arc::new(names)
}

#[async_trait]
impl NameDirectory for NameResolver {
    async fn resolve(&self, ids: &[i64]) -> NameMap {
        self.resolve_ids(ids).await
    }
}
