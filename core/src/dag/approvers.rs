use std::collections::{HashSet, VecDeque};

use tangle_proto::Hash;
use tracing::{debug, trace};

use super::{Consumer, Predicate};
use crate::{
    error::TraversalError,
    tangle::{ReleaseGuard, Tangle},
    util::AbortSignal,
};

/// Traverse the approvers (future cone) of `start` until no more transactions pass `condition`.
///
/// A transaction is consumed first, then its approvers are queued. This is an unordered BFS because
/// the approver index does not order approvers. Unlike [`super::traverse_approvees`], a transaction
/// that cannot be loaded is a hard `TransactionNotFound` error.
pub fn traverse_approvers<T: Tangle>(
    tangle: &T,
    start: &Hash,
    condition: &mut Predicate<'_, T::Cached>,
    consumer: &mut Consumer<'_, T::Cached>,
    force_release: bool,
    abort: Option<&AbortSignal>,
) -> Result<(), TraversalError> {
    debug!("traverse_approvers from {:#}", start);

    let mut walk = ApproverWalk::new(tangle, start, force_release, abort);
    while !walk.queue.is_empty() {
        walk.step(condition, consumer)?;
    }

    debug!("traverse_approvers from {:#} finished, {} discovered", start, walk.discovered.len());
    Ok(())
}

struct ApproverWalk<'a, T: Tangle> {
    tangle: &'a T,
    queue: VecDeque<Hash>,
    /// Hashes already queued. Marked at enqueue time so a shared approver is scheduled once.
    discovered: HashSet<Hash>,
    force_release: bool,
    abort: Option<&'a AbortSignal>,
}

impl<'a, T: Tangle> ApproverWalk<'a, T> {
    fn new(tangle: &'a T, start: &Hash, force_release: bool, abort: Option<&'a AbortSignal>) -> Self {
        Self { tangle, queue: VecDeque::from([start.clone()]), discovered: HashSet::from([start.clone()]), force_release, abort }
    }

    fn step(&mut self, condition: &mut Predicate<'_, T::Cached>, consumer: &mut Consumer<'_, T::Cached>) -> Result<(), TraversalError> {
        if let Err(err) = AbortSignal::check(self.abort) {
            debug!("traverse_approvers aborted with {} pending", self.queue.len());
            return Err(err);
        }

        let Some(current) = self.queue.pop_front() else {
            return Ok(());
        };
        trace!("approver step {:#}", current);

        let cached = match self.tangle.get_cached_transaction(&current)? {
            Some(cached) => ReleaseGuard::new(cached, self.force_release),
            None => return Err(TraversalError::TransactionNotFound(current)),
        };

        if !condition(cached.retain())? {
            // not consumed, and its approvers are not traversed
            return Ok(());
        }

        consumer(cached.retain())?;

        for approver in self.tangle.approver_hashes(&current, self.force_release)? {
            if self.discovered.insert(approver.clone()) {
                self.queue.push_back(approver);
            }
        }

        Ok(())
    }
}
