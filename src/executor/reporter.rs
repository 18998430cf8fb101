//! Story-side reporter
//!
//! The hook surface an upstream runner drives for each story:
//! `begin_story`, `enter`, `report`, `exit`, `end_story`. Each reporter is
//! used by one story at a time; it can be reused for the next story once
//! `end_story` has returned.

use super::coordinator::{CoordinatorHandle, Emission};
use crate::error::Result;
use crate::models::{ResultRecord, ScopeAggregator};

#[derive(Debug)]
pub struct StoryReporter {
    handle: CoordinatorHandle,
    scopes: ScopeAggregator,
}

impl StoryReporter {
    pub fn new(handle: CoordinatorHandle) -> Self {
        Self {
            handle,
            scopes: ScopeAggregator::new(),
        }
    }

    /// Count the story as in flight; must precede any `end_story` that
    /// could otherwise bring the count to zero early
    pub fn begin_story(&mut self) {
        self.handle.story_began();
    }

    pub fn enter(&mut self, scope: impl Into<String>) {
        self.scopes.begin_scope(scope);
    }

    pub fn report(&mut self, record: ResultRecord) {
        self.scopes.record_result(record);
    }

    /// Reserved; scopes are closed by `enter` and `end_story`
    pub fn exit(&mut self) {}

    /// Submit the story's scopes and wait until they are folded (and emitted,
    /// if this was the last story in flight)
    pub async fn end_story(&mut self) -> Result<Option<Emission>> {
        let suites = self.scopes.finish();
        self.handle.submit_story(suites).await
    }

    pub fn handle(&self) -> &CoordinatorHandle {
        &self.handle
    }
}
