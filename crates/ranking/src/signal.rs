use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

/// Coalescing "list changed" flag shared between the owner and its consumer.
///
/// Any number of `raise` calls before the next `consume` leave exactly one
/// pending change. Clones share state.
#[derive(Clone, Default)]
pub struct ChangeSignal {
    inner: Arc<SignalInner>,
}

#[derive(Default)]
struct SignalInner {
    pending: AtomicBool,
    notify: Notify,
}

impl ChangeSignal {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the list as changed. Returns `true` only for the call that made
    /// the signal pending; later calls are absorbed until it is consumed.
    pub fn raise(&self) -> bool {
        let newly_pending = !self.inner.pending.swap(true, Ordering::AcqRel);
        if newly_pending {
            log::trace!("change signal raised");
            self.inner.notify.notify_one();
        }
        newly_pending
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.inner.pending.load(Ordering::Acquire)
    }

    /// Clears the pending change, returning whether one was pending.
    pub fn consume(&self) -> bool {
        self.inner.pending.swap(false, Ordering::AcqRel)
    }

    /// Resolves once a change is pending. Does not consume it.
    pub async fn pending(&self) {
        loop {
            let notified = self.inner.notify.notified();
            if self.is_pending() {
                return;
            }
            notified.await;
        }
    }
}

impl std::fmt::Debug for ChangeSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeSignal")
            .field("pending", &self.is_pending())
            .finish()
    }
}
