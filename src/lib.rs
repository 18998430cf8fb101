//! story-report - concurrent story result aggregation
//!
//! Many test stories run in parallel and report already-classified
//! assertion results. Each story accumulates its own scopes, then hands them
//! to a single coordinator task that folds them into one cumulative report
//! and writes it, exactly once, when the last story in flight finishes.
//!
//! ```no_run
//! use story_report::config::ReportConfig;
//! use story_report::executor::Coordinator;
//! use story_report::models::ResultRecord;
//! use story_report::output::FileSink;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let sink = FileSink::create("target/junit.xml")?;
//! let coordinator = Coordinator::start(Box::new(sink), &ReportConfig::default());
//!
//! let mut story = coordinator.reporter();
//! story.begin_story();
//! story.enter("Adding negative");
//! story.report(ResultRecord::failure("Expected: -5 Actual: -2"));
//! story.end_story().await?;
//!
//! coordinator.shutdown().await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod executor;
pub mod models;
pub mod output;
pub mod utils;

pub use error::{ReportError, Result};
