//! Report emission
//!
//! Writes the complete report to a sink, replacing whatever an earlier
//! emission left there.

use std::io::{ErrorKind, SeekFrom};
use std::time::Instant;
use tracing::{debug, error};

use super::sink::OutputSink;
use super::xml;
use crate::error::{ReportError, Result};
use crate::models::CumulativeReport;

/// Serializes a report and writes it in full
#[derive(Debug, Default, Clone, Copy)]
pub struct ReportEmitter;

impl ReportEmitter {
    pub fn new() -> Self {
        Self
    }

    /// Write `report` to `sink` from offset zero; returns bytes written
    pub fn print(&self, report: &CumulativeReport, sink: &mut dyn OutputSink) -> Result<usize> {
        let start = Instant::now();
        let buffer = xml::render(report)?;
        let bytes = buffer.as_bytes();

        sink.seek(SeekFrom::Start(0)).map_err(|e| {
            error!("Failed to rewind output sink: {}", e);
            ReportError::Seek(e)
        })?;

        write_all(sink, bytes)?;

        sink.truncate(bytes.len() as u64).map_err(ReportError::Truncate)?;
        sink.flush().map_err(ReportError::Write)?;

        debug!(
            "Emitted {} bytes ({} suites) in {}ms",
            bytes.len(),
            report.suites().len(),
            start.elapsed().as_millis()
        );

        Ok(bytes.len())
    }
}

/// Loop until every byte is accepted; only interrupts are retried
fn write_all(sink: &mut dyn OutputSink, bytes: &[u8]) -> Result<()> {
    let mut written = 0;
    while written < bytes.len() {
        match sink.write(&bytes[written..]) {
            Ok(0) => {
                return Err(ReportError::WriteZero {
                    remaining: bytes.len() - written,
                })
            }
            Ok(n) => written += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => {
                error!(
                    "Report write failed after {}/{} bytes: {}",
                    written,
                    bytes.len(),
                    e
                );
                return Err(ReportError::Write(e));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ResultRecord, ScopeAggregate};
    use crate::output::sink::{FileSink, MemorySink};
    use std::io;
    use tempfile::tempdir;

    /// Accepts at most `chunk` bytes per call and fails on chosen calls
    struct ChunkedSink {
        inner: Vec<u8>,
        chunk: usize,
        calls: usize,
        interrupt_on: Option<usize>,
        fail_on: Option<usize>,
        zero_on: Option<usize>,
        seek_fails: bool,
        truncate_fails: bool,
        seeks: usize,
    }

    impl ChunkedSink {
        fn new(chunk: usize) -> Self {
            Self {
                inner: Vec::new(),
                chunk,
                calls: 0,
                interrupt_on: None,
                fail_on: None,
                zero_on: None,
                seek_fails: false,
                truncate_fails: false,
                seeks: 0,
            }
        }
    }

    impl OutputSink for ChunkedSink {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.calls += 1;
            if self.interrupt_on == Some(self.calls) {
                return Err(io::Error::new(ErrorKind::Interrupted, "signal"));
            }
            if self.fail_on == Some(self.calls) {
                return Err(io::Error::new(ErrorKind::BrokenPipe, "closed"));
            }
            if self.zero_on == Some(self.calls) {
                return Ok(0);
            }
            let n = buf.len().min(self.chunk);
            self.inner.extend_from_slice(&buf[..n]);
            Ok(n)
        }

        fn seek(&mut self, _pos: SeekFrom) -> io::Result<u64> {
            self.seeks += 1;
            if self.seek_fails {
                return Err(io::Error::new(ErrorKind::Unsupported, "not seekable"));
            }
            Ok(0)
        }

        fn truncate(&mut self, _len: u64) -> io::Result<()> {
            if self.truncate_fails {
                return Err(io::Error::new(ErrorKind::PermissionDenied, "read-only"));
            }
            Ok(())
        }
    }

    fn sample_report() -> CumulativeReport {
        let mut report = CumulativeReport::new();
        report.fold(ScopeAggregate::from_records(
            "Multiple insertions",
            vec![ResultRecord::pass(), ResultRecord::skip()],
        ));
        report
    }

    #[test]
    fn test_partial_writes_complete() {
        let report = sample_report();
        let mut sink = ChunkedSink::new(7);
        sink.interrupt_on = Some(2);

        let n = ReportEmitter::new().print(&report, &mut sink).unwrap();

        assert_eq!(sink.seeks, 1);
        assert_eq!(n, sink.inner.len());
        assert_eq!(sink.inner, xml::render(&report).unwrap().into_bytes());
        assert!(sink.calls > 2);
    }

    #[test]
    fn test_write_error_is_fatal() {
        let mut sink = ChunkedSink::new(4);
        sink.fail_on = Some(3);

        let err = ReportEmitter::new()
            .print(&sample_report(), &mut sink)
            .unwrap_err();
        assert!(matches!(err, ReportError::Write(_)));
        assert_eq!(sink.calls, 3);
    }

    #[test]
    fn test_zero_write_is_fatal() {
        let mut sink = ChunkedSink::new(4);
        sink.zero_on = Some(1);

        let err = ReportEmitter::new()
            .print(&sample_report(), &mut sink)
            .unwrap_err();
        assert!(matches!(err, ReportError::WriteZero { .. }));
    }

    #[test]
    fn test_seek_error_writes_nothing() {
        let mut sink = ChunkedSink::new(4);
        sink.seek_fails = true;

        let err = ReportEmitter::new()
            .print(&sample_report(), &mut sink)
            .unwrap_err();
        assert!(matches!(err, ReportError::Seek(_)));
        assert!(err.is_io());
        assert_eq!(sink.calls, 0);
        assert!(sink.inner.is_empty());
    }

    #[test]
    fn test_truncate_error_is_fatal() {
        let mut sink = ChunkedSink::new(64);
        sink.truncate_fails = true;

        let err = ReportEmitter::new()
            .print(&sample_report(), &mut sink)
            .unwrap_err();
        assert!(matches!(err, ReportError::Truncate(_)));
        assert_eq!(sink.inner, xml::render(&sample_report()).unwrap().into_bytes());
    }

    #[test]
    fn test_emission_overwrites_memory_sink() {
        let sink = MemorySink::new();
        let mut writer = sink.clone();
        let emitter = ReportEmitter::new();

        let mut report = sample_report();
        report.fold(ScopeAggregate::from_records(
            "Adding positive",
            vec![ResultRecord::pass(); 3],
        ));
        emitter.print(&report, &mut writer).unwrap();

        let smaller = sample_report();
        emitter.print(&smaller, &mut writer).unwrap();

        assert_eq!(sink.contents_string(), xml::render(&smaller).unwrap());
    }

    #[test]
    fn test_file_sink_overwrite_is_byte_identical() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("report.xml");
        let mut sink = FileSink::create(&path).unwrap();
        let emitter = ReportEmitter::new();

        let mut big = sample_report();
        big.fold(ScopeAggregate::from_records("extra", vec![ResultRecord::pass()]));
        emitter.print(&big, &mut sink).unwrap();

        let report = sample_report();
        emitter.print(&report, &mut sink).unwrap();
        let first = std::fs::read(&path).unwrap();
        emitter.print(&report, &mut sink).unwrap();
        let second = std::fs::read(&path).unwrap();

        assert_eq!(first, second);
        assert_eq!(first, xml::render(&report).unwrap().into_bytes());
    }
}
