//! Generation-counter cancellation.
//!
//! A [`GenerationCounter`] hands out [`CancelToken`]s tagged with a
//! monotonically increasing generation. Bumping the counter *is* the
//! cancellation mechanism: every token issued earlier observes itself as
//! cancelled at its next checkpoint. No disposal or explicit signalling is
//! required on the cancelling side.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Monotonic generation counter shared between a requester and its workers.
#[derive(Debug, Clone, Default)]
pub struct GenerationCounter {
    current: Arc<AtomicU64>,
}

impl GenerationCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance to a new generation and return its token, cancelling all
    /// tokens issued earlier.
    pub fn bump(&self) -> CancelToken {
        let generation = self.current.fetch_add(1, Ordering::AcqRel) + 1;
        CancelToken {
            current: Arc::clone(&self.current),
            generation,
        }
    }

    /// The most recently issued generation.
    pub fn current(&self) -> u64 {
        self.current.load(Ordering::Acquire)
    }
}

/// Cooperative cancellation checkpoint for one unit of work.
#[derive(Debug, Clone)]
pub struct CancelToken {
    current: Arc<AtomicU64>,
    generation: u64,
}

impl CancelToken {
    /// The generation this token was issued for.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// `true` once a newer generation has been issued.
    pub fn is_cancelled(&self) -> bool {
        self.current.load(Ordering::Acquire) != self.generation
    }

    /// A token that is never cancelled, for synchronous blocking
    /// computations (the export path).
    pub fn never() -> Self {
        Self {
            current: Arc::new(AtomicU64::new(0)),
            generation: 0,
        }
    }
}
