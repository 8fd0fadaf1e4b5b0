//! Diagnostic sinks
//!
//! Append-only text destinations for the unresolved-reference report.

use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Append-only text sink.
pub trait DiagnosticSink: Send {
    fn append(&mut self, text: &str) -> io::Result<()>;
}

/// Format one report block: a heading line naming the citing entity,
/// one indented line per unresolved target, then a blank line.
pub fn unresolved_block(heading: &str, citing: &str, targets: &[String]) -> String {
    let mut block = format!("{}: {}\n", heading, citing);
    for target in targets {
        block.push_str("  - ");
        block.push_str(target);
        block.push('\n');
    }
    block.push('\n');
    block
}

/// Sink appending to a file. The file is opened (and created if needed) on
/// the first append, so a run with nothing to report leaves no file behind.
pub struct FileSink {
    path: PathBuf,
    writer: Option<BufWriter<File>>,
    appended: usize,
}

impl FileSink {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            writer: None,
            appended: 0,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of appended blocks
    pub fn appended(&self) -> usize {
        self.appended
    }

    fn open(&mut self) -> io::Result<&mut BufWriter<File>> {
        if self.writer.is_none() {
            if let Some(parent) = self.path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.path)?;
            info!("Writing unresolved references to {:?}", self.path);
            self.writer = Some(BufWriter::new(file));
        }
        match self.writer.as_mut() {
            Some(writer) => Ok(writer),
            None => Err(io::Error::new(io::ErrorKind::Other, "sink writer unavailable")),
        }
    }
}

impl DiagnosticSink for FileSink {
    fn append(&mut self, text: &str) -> io::Result<()> {
        let writer = self.open()?;
        writer.write_all(text.as_bytes())?;
        // Flushed per block so a crash mid-run keeps what was reported.
        writer.flush()?;
        self.appended += 1;
        debug!("Appended {} bytes to {:?}", text.len(), self.path);
        Ok(())
    }
}

/// In-memory sink.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    entries: Vec<String>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn contents(&self) -> String {
        self.entries.concat()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl DiagnosticSink for MemorySink {
    fn append(&mut self, text: &str) -> io::Result<()> {
        self.entries.push(text.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unresolved_block_format() {
        let block = unresolved_block("Paper", "A", &["Z".to_string(), "Y".to_string()]);
        assert_eq!(block, "Paper: A\n  - Z\n  - Y\n\n");
    }

    #[test]
    fn test_file_sink_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reports").join("not_found.txt");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "previous run\n").unwrap();

        let mut sink = FileSink::new(&path);
        sink.append("Paper: A\n").unwrap();
        sink.append("Paper: B\n").unwrap();
        assert_eq!(sink.appended(), 2);

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "previous run\nPaper: A\nPaper: B\n");
    }

    #[test]
    fn test_file_sink_is_lazy() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("never.txt");
        let sink = FileSink::new(&path);
        assert_eq!(sink.path(), path.as_path());
        drop(sink);
        assert!(!path.exists());
    }

    #[test]
    fn test_memory_sink() {
        let mut sink = MemorySink::new();
        assert!(sink.is_empty());
        sink.append("one\n").unwrap();
        sink.append("two\n").unwrap();
        assert_eq!(sink.entries().len(), 2);
        assert_eq!(sink.contents(), "one\ntwo\n");
    }
}
