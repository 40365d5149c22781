use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use tokio::sync::Notify;

use crate::error::TraversalError;

/// Cooperative cancellation for traversals.
///
/// Clones share the same flag. Once aborted, a signal stays aborted.
#[derive(Clone, Default)]
pub struct AbortSignal {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    aborted: AtomicBool,
    notify: Notify,
}

impl AbortSignal {
    pub fn new() -> Self { Self::default() }

    pub fn abort(&self) {
        if !self.inner.aborted.swap(true, Ordering::SeqCst) {
            self.inner.notify.notify_waiters();
        }
    }

    pub fn is_aborted(&self) -> bool { self.inner.aborted.load(Ordering::SeqCst) }

    /// Resolves once the signal has been aborted.
    pub async fn aborted(&self) {
        let notified = self.inner.notify.notified();
        if self.is_aborted() {
            return;
        }
        notified.await;
    }

    /// Fails with `OperationAborted` if `signal` is present and aborted.
    pub fn check(signal: Option<&AbortSignal>) -> Result<(), TraversalError> {
        match signal {
            Some(signal) if signal.is_aborted() => Err(TraversalError::OperationAborted),
            _ => Ok(()),
        }
    }
}

impl std::fmt::Debug for AbortSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { write!(f, "AbortSignal({})", self.is_aborted()) }
}
