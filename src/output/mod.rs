//! Report output
//!
//! XML rendering, single-shot emission to seekable sinks, and console summaries.

mod emitter;
mod formatter;
mod sink;
pub mod xml;

pub use emitter::ReportEmitter;
pub use formatter::{OutputFormat, ResultFormatter};
pub use sink::{ConsoleSink, FileSink, MemorySink, OutputSink};
