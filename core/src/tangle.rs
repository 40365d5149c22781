//! The store interface consumed by traversals.
//!
//! Transactions are loaned out as reference-counted handles. Every successful acquisition must be
//! matched by exactly one release, and each `retain` creates a new handle with its own release obligation.

use std::sync::Arc;

use tangle_proto::{Hash, Transaction};

use crate::error::TraversalError;

/// A reference-counted loan of a transaction from the store.
///
/// Dropping a handle that was not explicitly released releases it with `force = false`.
pub trait CachedTransaction: Sized + Send {
    fn transaction(&self) -> &Transaction;

    /// Increment the reference count, yielding an independent handle.
    fn retain(&self) -> Self;

    /// Decrement the reference count. `force` requests eviction from the cache once no references remain.
    fn release(self, force: bool);
}

pub trait Tangle {
    type Cached: CachedTransaction;

    /// Acquire the transaction with the given hash, or `None` if the store does not have it.
    fn get_cached_transaction(&self, hash: &Hash) -> Result<Option<Self::Cached>, TraversalError>;

    /// Whether `hash` lies on the snapshot horizon, beyond which no history is available.
    fn solid_entry_points_contain(&self, hash: &Hash) -> bool;

    /// Hashes of the transactions approving `hash`, in no particular order.
    fn approver_hashes(&self, hash: &Hash, force_release: bool) -> Result<Vec<Hash>, TraversalError>;
}

impl<T: Tangle + ?Sized> Tangle for &T {
    type Cached = T::Cached;

    fn get_cached_transaction(&self, hash: &Hash) -> Result<Option<Self::Cached>, TraversalError> { (**self).get_cached_transaction(hash) }

    fn solid_entry_points_contain(&self, hash: &Hash) -> bool { (**self).solid_entry_points_contain(hash) }

    fn approver_hashes(&self, hash: &Hash, force_release: bool) -> Result<Vec<Hash>, TraversalError> {
        (**self).approver_hashes(hash, force_release)
    }
}

impl<T: Tangle + ?Sized> Tangle for Arc<T> {
    type Cached = T::Cached;

    fn get_cached_transaction(&self, hash: &Hash) -> Result<Option<Self::Cached>, TraversalError> { (**self).get_cached_transaction(hash) }

    fn solid_entry_points_contain(&self, hash: &Hash) -> bool { (**self).solid_entry_points_contain(hash) }

    fn approver_hashes(&self, hash: &Hash, force_release: bool) -> Result<Vec<Hash>, TraversalError> {
        (**self).approver_hashes(hash, force_release)
    }
}

/// Holds a handle for the duration of a scope and releases it with the chosen policy on every exit path.
pub struct ReleaseGuard<H: CachedTransaction> {
    handle: Option<H>,
    force: bool,
}

impl<H: CachedTransaction> ReleaseGuard<H> {
    pub fn new(handle: H, force: bool) -> Self { Self { handle: Some(handle), force } }

    pub fn transaction(&self) -> &Transaction { self.handle().transaction() }

    /// A new handle for handing to a callback, which becomes responsible for releasing it.
    pub fn retain(&self) -> H { self.handle().retain() }

    fn handle(&self) -> &H { self.handle.as_ref().expect("handle is held until the guard is dropped") }
}

impl<H: CachedTransaction> Drop for ReleaseGuard<H> {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.release(self.force);
        }
    }
}
