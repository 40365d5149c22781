use std::collections::{HashMap, VecDeque};

use tangle_proto::Hash;
use tracing::{debug, trace};

use super::{Consumer, OnMissingApprovee, OnSolidEntryPoint, Predicate};
use crate::{
    error::TraversalError,
    tangle::{ReleaseGuard, Tangle},
    util::AbortSignal,
};

/// Traverse the approvees (past cone) of `start` until no more transactions pass `condition`.
///
/// This is a DFS over trunk, then branch. A transaction is consumed once all of its approvees have
/// been resolved, so consumption respects dependency order between a transaction and its approvees.
/// `condition` is evaluated at most once per hash, eagerly when a hash reaches the top of the stack,
/// which means its invocation order is *not* DFS order.
///
/// Approvees which are solid entry points are reported to `on_solid_entry_point`. They are only walked
/// when `traverse_solid_entry_points` is set.
#[allow(clippy::too_many_arguments)]
pub fn traverse_approvees<T: Tangle>(
    tangle: &T,
    start: &Hash,
    condition: &mut Predicate<'_, T::Cached>,
    consumer: &mut Consumer<'_, T::Cached>,
    on_missing_approvee: &mut OnMissingApprovee<'_>,
    on_solid_entry_point: &mut OnSolidEntryPoint<'_>,
    force_release: bool,
    traverse_solid_entry_points: bool,
    abort: Option<&AbortSignal>,
) -> Result<(), TraversalError> {
    debug!("traverse_approvees from {:#}", start);

    let mut walk = ApproveeWalk::new(tangle, start, force_release, traverse_solid_entry_points, abort);
    while !walk.stack.is_empty() {
        walk.step(condition, consumer, on_missing_approvee, on_solid_entry_point)?;
    }

    debug!("traverse_approvees from {:#} finished, {} visited", start, walk.visited.len());
    Ok(())
}

struct ApproveeWalk<'a, T: Tangle> {
    tangle: &'a T,
    stack: VecDeque<Hash>,
    /// Memoized result of the traverse condition. Absent means not yet evaluated.
    visited: HashMap<Hash, bool>,
    force_release: bool,
    traverse_solid_entry_points: bool,
    abort: Option<&'a AbortSignal>,
}

impl<'a, T: Tangle> ApproveeWalk<'a, T> {
    fn new(tangle: &'a T, start: &Hash, force_release: bool, traverse_solid_entry_points: bool, abort: Option<&'a AbortSignal>) -> Self {
        Self { tangle, stack: VecDeque::from([start.clone()]), visited: HashMap::new(), force_release, traverse_solid_entry_points, abort }
    }

    /// Process the hash on top of the stack: either push its first unresolved approvee and return,
    /// leaving it on the stack, or pop and consume it.
    fn step(
        &mut self,
        condition: &mut Predicate<'_, T::Cached>,
        consumer: &mut Consumer<'_, T::Cached>,
        on_missing_approvee: &mut OnMissingApprovee<'_>,
        on_solid_entry_point: &mut OnSolidEntryPoint<'_>,
    ) -> Result<(), TraversalError> {
        if let Err(err) = AbortSignal::check(self.abort) {
            debug!("traverse_approvees aborted with {} pending", self.stack.len());
            return Err(err);
        }

        let Some(current) = self.stack.front().cloned() else {
            return Ok(());
        };
        trace!("approvee step {:#}", current);

        let cached = match self.tangle.get_cached_transaction(&current)? {
            Some(cached) => ReleaseGuard::new(cached, self.force_release),
            None => {
                // trunk and branch of a missing transaction are not traversed
                self.visited.insert(current.clone(), false);
                self.stack.pop_front();
                debug!("approvee {:#} missing", current);
                return on_missing_approvee(&current);
            }
        };

        let traverse = match self.visited.get(&current) {
            Some(traverse) => *traverse,
            None => {
                let traverse = condition(cached.retain())?;
                self.visited.insert(current.clone(), traverse);
                traverse
            }
        };

        if !traverse {
            self.stack.pop_front();
            return Ok(());
        }

        for approvee in cached.transaction().approvee_hashes() {
            if self.visited.contains_key(approvee) {
                continue;
            }

            if !self.tangle.solid_entry_points_contain(approvee) {
                self.stack.push_front(approvee.clone());
                return Ok(());
            }

            debug!("approvee {:#} is a solid entry point", approvee);
            on_solid_entry_point(approvee);
            if self.traverse_solid_entry_points {
                self.stack.push_front(approvee.clone());
                return Ok(());
            }

            // mark it so the solid entry point is reported only once
            self.visited.insert(approvee.clone(), false);
        }

        self.stack.pop_front();
        consumer(cached.retain())
    }
}
