//! Parallel story replay
//!
//! Drives recorded stories through the coordinator concurrently, the way an
//! upstream runner would.

use anyhow::{Context, Result as AnyResult};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tracing::{debug, info};

use super::coordinator::{CoordinatorHandle, Emission};
use crate::error::{ReportError, Result};
use crate::models::ResultRecord;

/// One recorded scope: a name and its results in order
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ScopePlan {
    pub name: String,
    #[serde(default)]
    pub results: Vec<ResultRecord>,
}

/// One recorded story
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct StoryPlan {
    #[serde(default)]
    pub scopes: Vec<ScopePlan>,
}

impl StoryPlan {
    /// Load a list of stories from a JSON or YAML file
    pub fn load_all(path: impl AsRef<Path>) -> AnyResult<Vec<StoryPlan>> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read story file: {}", path.display()))?;

        let is_yaml = path
            .extension()
            .map(|e| e == "yaml" || e == "yml")
            .unwrap_or(false);

        if is_yaml {
            serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse YAML stories: {}", path.display()))
        } else {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON stories: {}", path.display()))
        }
    }
}

/// Outcome of a replay
#[derive(Clone, Debug, Default)]
pub struct ReplaySummary {
    pub stories: usize,
    pub emissions: Vec<Emission>,
    pub duration_ms: u64,
}

/// Concurrent replayer of recorded stories
pub struct ParallelReplayer {
    max_concurrent: usize,
}

impl ParallelReplayer {
    pub fn new(max_concurrent: usize) -> Self {
        Self {
            max_concurrent: max_concurrent.max(1),
        }
    }

    /// Replay every story; all stories begin before any of them ends, so the
    /// report is emitted once, after the last one
    pub async fn replay(
        &self,
        handle: &CoordinatorHandle,
        stories: Vec<StoryPlan>,
    ) -> Result<ReplaySummary> {
        info!(
            "Replaying {} stories (max {} concurrent)",
            stories.len(),
            self.max_concurrent
        );

        let start = Instant::now();
        let semaphore = Arc::new(Semaphore::new(self.max_concurrent));
        let total = stories.len();

        let mut reporters = Vec::with_capacity(total);
        for _ in 0..total {
            let mut reporter = handle.reporter();
            reporter.begin_story();
            reporters.push(reporter);
        }

        let mut handles = Vec::with_capacity(total);
        for (index, (story, mut reporter)) in stories.into_iter().zip(reporters).enumerate() {
            let semaphore = semaphore.clone();

            handles.push(tokio::spawn(async move {
                // Never closed while tasks hold a clone.
                let _permit = semaphore.acquire_owned().await.ok();
                debug!("Starting story {} ({} scopes)", index, story.scopes.len());

                for scope in story.scopes {
                    reporter.enter(scope.name);
                    for record in scope.results {
                        reporter.report(record);
                    }
                    reporter.exit();
                }
                reporter.end_story().await
            }));
        }

        let mut emissions = Vec::new();
        let mut first_error = None;
        for joined in join_all(handles).await {
            match joined {
                Ok(Ok(Some(emission))) => emissions.push(emission),
                Ok(Ok(None)) => {}
                Ok(Err(e)) => {
                    first_error.get_or_insert(e);
                }
                Err(e) => {
                    first_error.get_or_insert(ReportError::StoryPanicked(e.to_string()));
                }
            }
        }
        if let Some(e) = first_error {
            return Err(e);
        }

        let summary = ReplaySummary {
            stories: total,
            emissions,
            duration_ms: start.elapsed().as_millis() as u64,
        };

        info!(
            "Replay completed in {}ms - {} stories, {} emissions",
            summary.duration_ms,
            summary.stories,
            summary.emissions.len()
        );

        Ok(summary)
    }
}

impl Default for ParallelReplayer {
    fn default() -> Self {
        Self::new(4)
    }
}

#[cfg(test)]
mod unit_tests {
    use super::*;
    use crate::config::ReportConfig;
    use crate::executor::Coordinator;
    use crate::output::MemorySink;
    use tempfile::tempdir;

    const STORIES_JSON: &str = r#"[
        {"scopes": [{"name": "Adding zero", "results": [{}, {}, {}]}]},
        {"scopes": [{"name": "Adding negative", "results": [
            {}, {"failure": "Expected: -5 Actual: -2"}
        ]}]},
        {"scopes": [{"name": "Inserting edges", "results": [{"skipped": true}]}]}
    ]"#;

    #[test]
    fn test_replayer_creation() {
        assert_eq!(ParallelReplayer::new(0).max_concurrent, 1);
        assert_eq!(ParallelReplayer::default().max_concurrent, 4);
    }

    #[test]
    fn test_load_json_and_yaml() {
        let dir = tempdir().unwrap();

        let json = dir.path().join("stories.json");
        std::fs::write(&json, STORIES_JSON).unwrap();
        let stories = StoryPlan::load_all(&json).unwrap();
        assert_eq!(stories.len(), 3);
        assert_eq!(stories[1].scopes[0].results.len(), 2);

        let yaml = dir.path().join("stories.yaml");
        std::fs::write(
            &yaml,
            "- scopes:\n    - name: Empty graph\n      results:\n        - {}\n",
        )
        .unwrap();
        let stories = StoryPlan::load_all(&yaml).unwrap();
        assert_eq!(stories[0].scopes[0].name, "Empty graph");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_replay_emits_once_with_limited_concurrency() {
        let sink = MemorySink::new();
        let coordinator = Coordinator::start(Box::new(sink.clone()), &ReportConfig::default());
        let stories: Vec<StoryPlan> = serde_json::from_str(STORIES_JSON).unwrap();

        let summary = ParallelReplayer::new(1)
            .replay(&coordinator.handle(), stories)
            .await
            .unwrap();

        assert_eq!(summary.stories, 3);
        assert_eq!(summary.emissions.len(), 1);
        let emission = &summary.emissions[0];
        assert_eq!(
            (emission.tests, emission.failures, emission.skipped),
            (6, 1, 1)
        );

        let xml = sink.contents_string();
        assert!(xml.starts_with(r#"<testsuites tests="6" failures="1" errors="0" skipped="1">"#));
        assert_eq!(xml.matches("<testsuite ").count(), 3);
    }

    #[test]
    fn test_replay_empty_plan_list() {
        let sink = MemorySink::new();
        let summary = tokio_test::block_on(async {
            let coordinator =
                Coordinator::start(Box::new(sink.clone()), &ReportConfig::default());
            ParallelReplayer::default()
                .replay(&coordinator.handle(), Vec::new())
                .await
        })
        .unwrap();

        assert_eq!(summary.stories, 0);
        assert!(summary.emissions.is_empty());
        assert!(sink.contents().is_empty());
    }
}
