//! A cooperative cancel flag shared between an orchestrator and the
//! extractor/searcher it drives.
//!
//! The core has no suspension points of its own (see the crate's
//! concurrency notes); a caller that wants to interrupt a long-running
//! extraction or search sets the flag from outside, and the core checks it
//! at its natural boundaries -- between frames, between records.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A cheaply cloneable flag: one side calls [`CancelToken::cancel`], the
/// other polls [`CancelToken::is_cancelled`].
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// A fresh, not-yet-cancelled token.
    #[must_use]
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether [`CancelToken::cancel`] has been called on this token or any
    /// of its clones.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}
