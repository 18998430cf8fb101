//! Error types for the reporting pipeline
//!
//! Every variant except `CoordinatorClosed` is fatal to the coordinator that
//! produced it: the worker acknowledges the failing request and stops.

use std::{fmt, io};
use thiserror::Error;

/// Reporting pipeline errors
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("story ended without a matching begin (active story count would go negative)")]
    TrackerUnderflow,

    #[error("failed to serialize report: {0}")]
    Serialize(#[from] fmt::Error),

    #[error("failed to seek output sink: {0}")]
    Seek(#[source] io::Error),

    #[error("failed to write report: {0}")]
    Write(#[source] io::Error),

    #[error("output sink accepted zero bytes with {remaining} bytes left to write")]
    WriteZero { remaining: usize },

    #[error("failed to truncate output sink: {0}")]
    Truncate(#[source] io::Error),

    #[error("report coordinator is closed")]
    CoordinatorClosed,

    #[error("report coordinator worker panicked: {0}")]
    WorkerPanicked(String),

    #[error("story task panicked: {0}")]
    StoryPanicked(String),
}

impl ReportError {
    /// True for errors that mean a report on the sink may be partial
    pub fn is_io(&self) -> bool {
        matches!(
            self,
            ReportError::Seek(_)
                | ReportError::Write(_)
                | ReportError::WriteZero { .. }
                | ReportError::Truncate(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, ReportError>;
