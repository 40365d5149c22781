//! Past-cone and future-cone traversal over the tangle.
//!
//! Both directions share one shape: an explicit work list plus per-call bookkeeping, driven one
//! step at a time so that deep histories never grow the native call stack and every step can
//! observe an abort signal.
//!
//! - [`traverse_approvees`] walks backward (trunk before branch) as a DFS. A transaction is consumed
//!   only once all of its approvees are settled.
//! - [`traverse_approvers`] walks forward as an unordered BFS, since the approver index has no order.

mod approvees;
mod approvers;
mod tails;

use tangle_proto::Hash;

use crate::error::TraversalError;

pub use approvees::traverse_approvees;
pub use approvers::traverse_approvers;
pub use tails::find_all_tails;

/// Decides whether a transaction is consumed and its neighbours traversed.
pub type Predicate<'a, H> = dyn FnMut(H) -> Result<bool, TraversalError> + 'a;

/// Consumes a transaction during traversal.
pub type Consumer<'a, H> = dyn FnMut(H) -> Result<(), TraversalError> + 'a;

/// Called when an approvee cannot be found in the store. Returning an error stops the traversal.
pub type OnMissingApprovee<'a> = dyn FnMut(&Hash) -> Result<(), TraversalError> + 'a;

/// Called when an approvee is a solid entry point.
pub type OnSolidEntryPoint<'a> = dyn FnMut(&Hash) + 'a;
