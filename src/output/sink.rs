//! Output sinks for emitted reports
//!
//! A sink is a seekable byte destination. Emission rewinds to offset zero
//! before every write so each report replaces the previous one; the console
//! cannot rewind, so on the console successive reports simply follow each
//! other.

use std::fs::File;
use std::io::{self, Cursor, Seek, SeekFrom, Write};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

/// Seekable byte destination owned by the report coordinator
pub trait OutputSink: Send {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize>;

    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64>;

    /// Cut the sink to `len` bytes after a full report has been written
    fn truncate(&mut self, _len: u64) -> io::Result<()> {
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Standard output; seeking is a no-op
#[derive(Debug, Default)]
pub struct ConsoleSink;

impl ConsoleSink {
    pub fn new() -> Self {
        Self
    }
}

impl OutputSink for ConsoleSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        io::stdout().lock().write(buf)
    }

    fn seek(&mut self, _pos: SeekFrom) -> io::Result<u64> {
        Ok(0)
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stdout().lock().flush()
    }
}

/// File on disk; each emission overwrites the whole file
#[derive(Debug)]
pub struct FileSink {
    file: File,
}

impl FileSink {
    /// Create (or truncate) the file at `path`
    pub fn create(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        Ok(Self {
            file: File::create(path)?,
        })
    }

    pub fn from_file(file: File) -> Self {
        Self { file }
    }
}

impl OutputSink for FileSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file.write(buf)
    }

    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.file.seek(pos)
    }

    fn truncate(&mut self, len: u64) -> io::Result<()> {
        self.file.set_len(len)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

/// In-memory buffer; clones share the same bytes
#[derive(Clone, Debug, Default)]
pub struct MemorySink {
    buffer: Arc<Mutex<Cursor<Vec<u8>>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Cursor<Vec<u8>>> {
        // A poisoned buffer still holds whatever was written.
        self.buffer.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn contents(&self) -> Vec<u8> {
        self.lock().get_ref().clone()
    }

    pub fn contents_string(&self) -> String {
        String::from_utf8_lossy(&self.contents()).into_owned()
    }
}

impl OutputSink for MemorySink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.lock().write(buf)
    }

    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.lock().seek(pos)
    }

    fn truncate(&mut self, len: u64) -> io::Result<()> {
        let mut cursor = self.lock();
        let len = usize::try_from(len)
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "length overflows usize"))?;
        cursor.get_mut().truncate(len);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use tempfile::tempdir;

    #[test]
    fn test_console_seek_is_noop() {
        let mut sink = ConsoleSink::new();
        assert_eq!(sink.seek(SeekFrom::Start(42)).unwrap(), 0);
        assert_eq!(sink.seek(SeekFrom::End(-1)).unwrap(), 0);
    }

    #[test]
    fn test_memory_sink_overwrite_and_truncate() {
        let sink = MemorySink::new();
        let mut writer = sink.clone();

        writer.write(b"long report").unwrap();
        writer.seek(SeekFrom::Start(0)).unwrap();
        writer.write(b"short").unwrap();
        assert_eq!(sink.contents_string(), "shortreport");

        writer.truncate(5).unwrap();
        assert_eq!(sink.contents_string(), "short");
    }

    #[test]
    fn test_file_sink_creates_parent_dirs() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("report.xml");

        let mut sink = FileSink::create(&path).unwrap();
        sink.write(b"<testsuites></testsuites>").unwrap();
        sink.flush().unwrap();

        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "<testsuites></testsuites>"
        );
    }

    #[test]
    fn test_file_sink_from_open_file_truncates() {
        let mut sink = FileSink::from_file(tempfile::tempfile().unwrap());
        sink.write(b"long report").unwrap();
        sink.truncate(4).unwrap();
        sink.seek(SeekFrom::Start(0)).unwrap();

        let mut contents = String::new();
        sink.file.read_to_string(&mut contents).unwrap();
        assert_eq!(contents, "long");
    }
}
