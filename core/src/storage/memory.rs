use std::{
    collections::HashSet,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::{Duration, Instant},
};

use dashmap::{mapref::entry::Entry, DashMap, DashSet};
use tangle_proto::{Hash, Transaction};
use tracing::{trace, warn};

use crate::{
    error::TraversalError,
    tangle::{CachedTransaction, Tangle},
};

#[derive(Debug, Clone, Default)]
pub struct CacheConfig {
    /// How long an unreferenced transaction stays cached after a non-forced release.
    pub cache_time: Duration,
}

impl CacheConfig {
    pub fn with_cache_time(mut self, cache_time: Duration) -> Self {
        self.cache_time = cache_time;
        self
    }
}

/// An in-memory tangle with a reference-counted transaction cache.
///
/// Cheap to clone; clones share the same transactions, cache and solid entry points.
#[derive(Clone, Default)]
pub struct MemoryTangle {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    config: CacheConfig,
    storage: DashMap<Hash, Arc<Transaction>>,
    approvers: DashMap<Hash, HashSet<Hash>>,
    cache: DashMap<Hash, CacheEntry>,
    solid_entry_points: DashSet<Hash>,
    acquisitions: AtomicUsize,
    releases: AtomicUsize,
}

struct CacheEntry {
    transaction: Arc<Transaction>,
    references: usize,
    released_at: Option<Instant>,
}

impl CacheEntry {
    fn new(transaction: Arc<Transaction>) -> Self { Self { transaction, references: 0, released_at: None } }
}

impl MemoryTangle {
    pub fn new() -> Self { Self::default() }

    pub fn with_config(config: CacheConfig) -> Self { Self { inner: Arc::new(Inner { config, ..Default::default() }) } }

    /// Store a transaction and index it as an approver of its trunk and branch.
    pub fn insert(&self, transaction: Transaction) -> Hash {
        let hash = transaction.hash().clone();
        for approvee in transaction.approvee_hashes() {
            self.inner.approvers.entry(approvee.clone()).or_default().insert(hash.clone());
        }
        self.inner.storage.insert(hash.clone(), Arc::new(transaction));
        hash
    }

    /// Remove a transaction from storage, as pruning would.
    ///
    /// Outstanding handles stay valid and the approver index is left as is.
    pub fn remove(&self, hash: &Hash) -> Option<Transaction> {
        let (_, transaction) = self.inner.storage.remove(hash)?;
        self.inner.cache.remove_if(hash, |_, entry| entry.references == 0);
        Some((*transaction).clone())
    }

    pub fn contains(&self, hash: &Hash) -> bool { self.inner.storage.contains_key(hash) }

    pub fn len(&self) -> usize { self.inner.storage.len() }

    pub fn is_empty(&self) -> bool { self.inner.storage.is_empty() }

    pub fn add_solid_entry_point(&self, hash: Hash) { self.inner.solid_entry_points.insert(hash); }

    pub fn remove_solid_entry_point(&self, hash: &Hash) -> bool { self.inner.solid_entry_points.remove(hash).is_some() }

    pub fn clear_solid_entry_points(&self) { self.inner.solid_entry_points.clear(); }

    /// Total handles handed out, including retains.
    pub fn acquisitions(&self) -> usize { self.inner.acquisitions.load(Ordering::SeqCst) }

    pub fn releases(&self) -> usize { self.inner.releases.load(Ordering::SeqCst) }

    pub fn cached_count(&self) -> usize { self.inner.cache.len() }

    /// Outstanding references to a cached transaction, or `None` if it is not cached.
    pub fn reference_count(&self, hash: &Hash) -> Option<usize> { self.inner.cache.get(hash).map(|entry| entry.references) }

    /// Evict unreferenced transactions whose cache time has elapsed. Returns the number evicted.
    pub fn flush_expired(&self) -> usize {
        let cache_time = self.inner.config.cache_time;
        let before = self.inner.cache.len();
        self.inner.cache.retain(|_, entry| entry.references > 0 || entry.released_at.map_or(true, |at| at.elapsed() < cache_time));
        before.saturating_sub(self.inner.cache.len())
    }
}

impl Inner {
    fn acquire(self: &Arc<Self>, hash: &Hash) -> Option<MemoryCachedTransaction> {
        let transaction = match self.cache.entry(hash.clone()) {
            Entry::Occupied(mut entry) => {
                let entry = entry.get_mut();
                entry.references += 1;
                entry.released_at = None;
                entry.transaction.clone()
            }
            Entry::Vacant(entry) => {
                let transaction = self.storage.get(hash)?.value().clone();
                entry.insert(CacheEntry { references: 1, ..CacheEntry::new(transaction.clone()) });
                transaction
            }
        };
        self.acquisitions.fetch_add(1, Ordering::SeqCst);
        Some(MemoryCachedTransaction { transaction, tangle: self.clone(), released: false })
    }

    fn retain(self: &Arc<Self>, transaction: &Arc<Transaction>) -> MemoryCachedTransaction {
        {
            let mut entry = self.cache.entry(transaction.hash().clone()).or_insert_with(|| CacheEntry::new(transaction.clone()));
            entry.references += 1;
            entry.released_at = None;
        }
        self.acquisitions.fetch_add(1, Ordering::SeqCst);
        MemoryCachedTransaction { transaction: transaction.clone(), tangle: self.clone(), released: false }
    }

    fn release(&self, hash: &Hash, force: bool) {
        self.releases.fetch_add(1, Ordering::SeqCst);

        let evict = match self.cache.get_mut(hash) {
            Some(mut entry) => {
                if entry.references == 0 {
                    warn!("release of unreferenced transaction {:#}", hash);
                    return;
                }
                entry.references -= 1;
                if entry.references == 0 {
                    entry.released_at = Some(Instant::now());
                }
                force && entry.references == 0
            }
            None => {
                warn!("release of uncached transaction {:#}", hash);
                return;
            }
        };

        if evict {
            trace!("evicting {:#}", hash);
            self.cache.remove_if(hash, |_, entry| entry.references == 0);
        }
    }
}

impl Tangle for MemoryTangle {
    type Cached = MemoryCachedTransaction;

    fn get_cached_transaction(&self, hash: &Hash) -> Result<Option<Self::Cached>, TraversalError> { Ok(self.inner.acquire(hash)) }

    fn solid_entry_points_contain(&self, hash: &Hash) -> bool { self.inner.solid_entry_points.contains(hash) }

    // approver sets are not cached separately, so there is nothing to release here
    fn approver_hashes(&self, hash: &Hash, _force_release: bool) -> Result<Vec<Hash>, TraversalError> {
        Ok(self.inner.approvers.get(hash).map(|approvers| approvers.iter().cloned().collect()).unwrap_or_default())
    }
}

pub struct MemoryCachedTransaction {
    transaction: Arc<Transaction>,
    tangle: Arc<Inner>,
    released: bool,
}

impl CachedTransaction for MemoryCachedTransaction {
    fn transaction(&self) -> &Transaction { &self.transaction }

    fn retain(&self) -> Self { self.tangle.retain(&self.transaction) }

    fn release(mut self, force: bool) {
        self.released = true;
        self.tangle.release(self.transaction.hash(), force);
    }
}

impl Drop for MemoryCachedTransaction {
    fn drop(&mut self) {
        if !self.released {
            self.tangle.release(self.transaction.hash(), false);
        }
    }
}

impl std::fmt::Debug for MemoryCachedTransaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { write!(f, "MemoryCachedTransaction({:#})", self.transaction.hash()) }
}
