//! The page the bootstrap runs in.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Active view that can be forced to reload from scratch.
pub trait View: Send + Sync {
    /// Reloads the view, which re-enters the bootstrap with fresh state.
    fn reload(&self);
}

/// [`View`] that records reload requests for a driver loop to act on.
#[derive(Debug, Clone, Default)]
pub struct ReloadSignal {
    requested: Arc<AtomicUsize>,
}

impl ReloadSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of reloads requested so far.
    pub fn requested(&self) -> usize {
        self.requested.load(Ordering::SeqCst)
    }

    /// Consumes a pending request, returning whether one was pending.
    pub fn take(&self) -> bool {
        self.requested
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

impl View for ReloadSignal {
    fn reload(&self) {
        self.requested.fetch_add(1, Ordering::SeqCst);
    }
}
