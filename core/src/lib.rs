pub mod dag;
pub mod error;
pub mod storage;
pub mod tangle;
pub mod util;

pub use dag::{find_all_tails, traverse_approvees, traverse_approvers};
pub use error::TraversalError;
pub use storage::{CacheConfig, MemoryTangle};
pub use tangle::{CachedTransaction, ReleaseGuard, Tangle};
pub use util::AbortSignal;

pub use tangle_proto as proto;
pub use tangle_proto::{Hash, Transaction};

#[cfg(test)]
#[ctor::ctor]
fn init_tracing() { let _ = tracing_subscriber::fmt().with_max_level(tracing::Level::DEBUG).with_test_writer().try_init(); }
