//! Story coordination engine
//!
//! Completion tracking, the single-writer aggregation coordinator, the
//! story-side reporter and a parallel replayer for recorded stories.

mod coordinator;
mod parallel;
mod reporter;
mod tracker;

pub use coordinator::{Coordinator, CoordinatorHandle, CoordinatorSummary, Emission, LazyCoordinator};
pub use parallel::{ParallelReplayer, ReplaySummary, ScopePlan, StoryPlan};
pub use reporter::StoryReporter;
pub use tracker::CompletionTracker;
