//! Aggregation coordinator
//!
//! A single worker task owns the cumulative report and the output sink.
//! Stories hand their finished scopes to it over a channel and wait for an
//! acknowledgement; the worker folds, decrements the completion tracker and,
//! when the count reaches zero, emits the report before acknowledging. Fold
//! order is the order in which submissions reach the worker.
//!
//! A story that never submits keeps the count above zero, and no report is
//! emitted for that generation. `Coordinator::shutdown` reports such stories
//! in its summary.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::{Arc, OnceLock};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::reporter::StoryReporter;
use super::tracker::CompletionTracker;
use crate::config::{GenerationMode, ReportConfig};
use crate::error::{ReportError, Result};
use crate::models::{CumulativeReport, ScopeAggregate};
use crate::output::{OutputSink, ReportEmitter};

/// One write of the complete report to the sink
#[derive(Clone, Debug, Serialize)]
pub struct Emission {
    /// 1 for the first emission of this coordinator
    pub generation: u64,
    pub suites: usize,
    pub tests: usize,
    pub failures: usize,
    pub errors: usize,
    pub skipped: usize,
    pub bytes_written: usize,
    pub emitted_at: DateTime<Utc>,
}

impl Emission {
    fn new(generation: u64, report: &CumulativeReport, bytes_written: usize) -> Self {
        Self {
            generation,
            suites: report.suites().len(),
            tests: report.tests(),
            failures: report.failures(),
            errors: report.errors(),
            skipped: report.skipped(),
            bytes_written,
            emitted_at: Utc::now(),
        }
    }
}

/// State of the worker when it stopped
#[derive(Clone, Debug, Default, Serialize)]
pub struct CoordinatorSummary {
    pub generations: u64,
    /// Stories begun but never folded
    pub active_stories: usize,
    /// Suites folded since the last emission
    pub unemitted_suites: usize,
    /// Fatal error that stopped the worker, if any
    pub fatal: Option<String>,
}

enum Request {
    Submit {
        suites: Vec<ScopeAggregate>,
        ack: oneshot::Sender<Result<Option<Emission>>>,
    },
    Shutdown,
}

/// Cloneable access to a running coordinator
#[derive(Clone, Debug)]
pub struct CoordinatorHandle {
    tx: mpsc::Sender<Request>,
    tracker: Arc<CompletionTracker>,
}

impl CoordinatorHandle {
    pub fn story_began(&self) {
        self.tracker.story_began();
    }

    pub fn active_stories(&self) -> usize {
        self.tracker.active()
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    /// New story-side reporter bound to this coordinator
    pub fn reporter(&self) -> StoryReporter {
        StoryReporter::new(self.clone())
    }

    /// Fold one scope as a whole story
    pub async fn submit(&self, aggregate: ScopeAggregate) -> Result<Option<Emission>> {
        self.submit_story(vec![aggregate]).await
    }

    /// Fold every scope of one story and end it
    ///
    /// Returns once the fold is done and, if this was the last story in
    /// flight, the report has been written. `Some` carries that emission.
    pub async fn submit_story(&self, suites: Vec<ScopeAggregate>) -> Result<Option<Emission>> {
        let (ack, response) = oneshot::channel();
        self.tx
            .send(Request::Submit { suites, ack })
            .await
            .map_err(|_| ReportError::CoordinatorClosed)?;
        response.await.map_err(|_| ReportError::CoordinatorClosed)?
    }
}

/// Owner of the worker task
#[derive(Debug)]
pub struct Coordinator {
    handle: CoordinatorHandle,
    worker: JoinHandle<CoordinatorSummary>,
}

impl Coordinator {
    /// Spawn the worker on the current tokio runtime
    pub fn start(sink: Box<dyn OutputSink>, config: &ReportConfig) -> Self {
        let (tx, rx) = mpsc::channel(config.normalized_queue_capacity());
        let tracker = Arc::new(CompletionTracker::new());

        let worker = Worker {
            rx,
            tracker: tracker.clone(),
            report: CumulativeReport::new(),
            emitter: ReportEmitter::new(),
            sink,
            mode: config.generation_mode,
            generations: 0,
            unemitted_suites: 0,
        };

        Self {
            handle: CoordinatorHandle { tx, tracker },
            worker: tokio::spawn(worker.run()),
        }
    }

    pub fn handle(&self) -> CoordinatorHandle {
        self.handle.clone()
    }

    pub fn reporter(&self) -> StoryReporter {
        self.handle.reporter()
    }

    /// Stop the worker and collect its final state
    pub async fn shutdown(self) -> Result<CoordinatorSummary> {
        // Already gone after a fatal error; the join below still reports it.
        let _ = self.handle.tx.send(Request::Shutdown).await;

        let summary = self
            .worker
            .await
            .map_err(|e| ReportError::WorkerPanicked(e.to_string()))?;

        if summary.active_stories > 0 {
            warn!(
                "Coordinator stopped with {} stories still in flight; their results were never emitted",
                summary.active_stories
            );
        }
        Ok(summary)
    }
}

struct Worker {
    rx: mpsc::Receiver<Request>,
    tracker: Arc<CompletionTracker>,
    report: CumulativeReport,
    emitter: ReportEmitter,
    sink: Box<dyn OutputSink>,
    mode: GenerationMode,
    generations: u64,
    unemitted_suites: usize,
}

impl Worker {
    async fn run(mut self) -> CoordinatorSummary {
        info!("Report coordinator started ({:?} mode)", self.mode);
        let mut fatal = None;

        while let Some(request) = self.rx.recv().await {
            match request {
                Request::Submit { suites, ack } => {
                    let outcome = self.fold_story(suites);
                    let failed = outcome.as_ref().err().map(ToString::to_string);
                    // The story may have stopped waiting; the fold stands regardless.
                    let _ = ack.send(outcome);
                    if let Some(message) = failed {
                        error!("Report coordinator stopping: {}", message);
                        fatal = Some(message);
                        break;
                    }
                }
                Request::Shutdown => break,
            }
        }

        info!("Report coordinator stopped after {} emissions", self.generations);

        CoordinatorSummary {
            generations: self.generations,
            active_stories: self.tracker.active(),
            unemitted_suites: self.unemitted_suites,
            fatal,
        }
    }

    fn fold_story(&mut self, suites: Vec<ScopeAggregate>) -> Result<Option<Emission>> {
        for suite in suites {
            debug!("Folding suite {}", suite);
            self.report.fold(suite);
            self.unemitted_suites += 1;
        }

        if !self.tracker.story_ended()? {
            return Ok(None);
        }

        let bytes = self.emitter.print(&self.report, self.sink.as_mut())?;
        self.generations += 1;
        self.unemitted_suites = 0;

        let emission = Emission::new(self.generations, &self.report, bytes);
        info!(
            "Emitted report generation {}: {} suites, {} tests, {} failures, {} errors, {} skipped",
            emission.generation,
            emission.suites,
            emission.tests,
            emission.failures,
            emission.errors,
            emission.skipped
        );

        if self.mode == GenerationMode::Reset {
            self.report.reset();
        }
        Ok(Some(emission))
    }
}

type SinkFactory = Box<dyn Fn() -> Box<dyn OutputSink> + Send + Sync>;

/// Coordinator started on first use
///
/// Concurrent first callers all observe the same worker; the sink factory
/// runs at most once.
pub struct LazyCoordinator {
    cell: OnceLock<Coordinator>,
    config: ReportConfig,
    make_sink: SinkFactory,
}

impl LazyCoordinator {
    pub fn new(
        config: ReportConfig,
        make_sink: impl Fn() -> Box<dyn OutputSink> + Send + Sync + 'static,
    ) -> Self {
        Self {
            cell: OnceLock::new(),
            config,
            make_sink: Box::new(make_sink),
        }
    }

    /// Running coordinator; must be called from within a tokio runtime
    pub fn get(&self) -> &Coordinator {
        self.cell.get_or_init(|| Coordinator::start((self.make_sink)(), &self.config))
    }

    pub fn reporter(&self) -> StoryReporter {
        self.get().reporter()
    }

    pub fn is_initialized(&self) -> bool {
        self.cell.get().is_some()
    }

    pub fn into_inner(self) -> Option<Coordinator> {
        self.cell.into_inner()
    }
}
