use std::collections::HashSet;

use tangle_proto::Hash;

use super::traverse_approvees;
use crate::{
    error::TraversalError,
    tangle::{CachedTransaction, Tangle},
    util::AbortSignal,
};

/// Find all tail transactions referenced by `start`.
///
/// The walk stops at every tail it reaches. If `skip_start` is set, `start` is traversed even when it is
/// a tail itself. Solid entry points are neither recorded nor traversed, and a missing approvee fails the
/// whole search with `FindAllTailsFailed`.
pub fn find_all_tails<T: Tangle>(
    tangle: &T,
    start: &Hash,
    skip_start: bool,
    force_release: bool,
    abort: Option<&AbortSignal>,
) -> Result<HashSet<Hash>, TraversalError> {
    let mut tails = HashSet::new();

    traverse_approvees(
        tangle,
        start,
        &mut |cached_tx: T::Cached| {
            let transaction = cached_tx.transaction();
            let traverse = if skip_start && transaction.hash() == start {
                true
            } else if transaction.is_tail() {
                tails.insert(transaction.hash().clone());
                false
            } else {
                true
            };
            cached_tx.release(force_release);
            Ok(traverse)
        },
        &mut |cached_tx: T::Cached| {
            cached_tx.release(force_release);
            Ok(())
        },
        &mut |approvee_hash: &Hash| Err(TraversalError::FindAllTailsFailed(approvee_hash.clone())),
        // solid entry points, including the snapshot milestone, are ignored
        &mut |_: &Hash| {},
        force_release,
        false,
        abort,
    )?;

    Ok(tails)
}
