// src/checker/signal.rs
// =============================================================================
// The exit signal is the one piece of state every probe task writes to.
//
// It starts out as "success" and flips to "failure" the first time a link is
// classified dead. It can never flip back. Internally it is an atomic counter
// of dead links, so concurrent writers need no mutex and the final count is
// available for the summary.
//
// Tasks get a cloned handle passed in explicitly; there is no global.
// =============================================================================

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct ExitSignal {
    dead: Arc<AtomicUsize>,
}

impl ExitSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one dead link. Monotone: there is no way to undo this.
    pub fn mark_failure(&self) {
        self.dead.fetch_add(1, Ordering::AcqRel);
    }

    /// Whether any dead link has been recorded.
    ///
    /// Only meaningful once every probe task has finished.
    pub fn failure_occurred(&self) -> bool {
        self.dead_links() > 0
    }

    pub fn dead_links(&self) -> usize {
        self.dead.load(Ordering::Acquire)
    }
}
