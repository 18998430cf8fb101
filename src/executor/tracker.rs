//! In-flight story counter

use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::error;

use crate::error::{ReportError, Result};

/// Number of stories that have begun but not yet been folded
#[derive(Debug, Default)]
pub struct CompletionTracker {
    active: AtomicUsize,
}

impl CompletionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn story_began(&self) {
        self.active.fetch_add(1, Ordering::AcqRel);
    }

    /// Decrement; `Ok(true)` means this call took the count to zero
    pub fn story_ended(&self) -> Result<bool> {
        match self
            .active
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1))
        {
            Ok(previous) => Ok(previous == 1),
            Err(_) => {
                error!("Story ended with no story in flight");
                Err(ReportError::TrackerUnderflow)
            }
        }
    }

    pub fn active(&self) -> usize {
        self.active.load(Ordering::Acquire)
    }
}
