//! Bounded log buffer that mirrors formatted output and can persist it to disk.
//!
//! # Design
//! - Reuse the formatted subscriber output instead of formatting lines twice.
//! - Keep at most `capacity` lines; the oldest lines are dropped first.
//! - Persistence is explicit (`persist`) so the logging hot path never touches the filesystem.

use std::collections::VecDeque;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing_subscriber::fmt::MakeWriter;

use crate::error::{Result, TelemetryError};

/// Maximum number of lines retained by a store.
pub const LOG_STORE_CAPACITY: usize = 2_000;
/// File name used when a store is opened in a directory.
pub const LOG_FILE_NAME: &str = "app_logs.txt";

/// Shared, cloneable handle to the log buffer.
#[derive(Clone)]
pub struct LogStore {
    inner: Arc<Mutex<StoreInner>>,
}

struct StoreInner {
    lines: VecDeque<String>,
    capacity: usize,
    path: Option<PathBuf>,
}

impl StoreInner {
    fn push(&mut self, line: String) {
        self.lines.push_back(line);
        while self.lines.len() > self.capacity {
            self.lines.pop_front();
        }
    }
}

impl LogStore {
    /// Create a store that never touches the filesystem.
    #[must_use]
    pub fn in_memory(capacity: usize) -> Self {
        Self::from_parts(VecDeque::new(), capacity, None)
    }

    /// Open the store backed by `dir/app_logs.txt`, loading any lines already persisted there.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing log file cannot be read.
    pub fn open(dir: &Path) -> Result<Self> {
        let path = dir.join(LOG_FILE_NAME);
        let lines = match fs::read_to_string(&path) {
            Ok(content) => content
                .lines()
                .filter(|line| !line.is_empty())
                .map(str::to_string)
                .collect(),
            Err(err) if err.kind() == io::ErrorKind::NotFound => VecDeque::new(),
            Err(source) => {
                return Err(TelemetryError::LogStoreIo {
                    operation: "log_store.load",
                    path,
                    source,
                });
            }
        };
        Ok(Self::from_parts(lines, LOG_STORE_CAPACITY, Some(path)))
    }

    fn from_parts(lines: VecDeque<String>, capacity: usize, path: Option<PathBuf>) -> Self {
        let mut inner = StoreInner {
            lines: VecDeque::new(),
            capacity: capacity.max(1),
            path,
        };
        for line in lines {
            inner.push(line);
        }
        Self {
            inner: Arc::new(Mutex::new(inner)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, StoreInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append a single line, evicting the oldest line when full.
    pub fn append(&self, line: impl Into<String>) {
        self.lock().push(line.into());
    }

    /// Snapshot of the retained lines, oldest first.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.lock().lines.iter().cloned().collect()
    }

    /// Path of the backing file, if any.
    #[must_use]
    pub fn path(&self) -> Option<PathBuf> {
        self.lock().path.clone()
    }

    /// Write the retained lines to the backing file. In-memory stores do nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn persist(&self) -> Result<()> {
        let (path, content) = {
            let inner = self.lock();
            let Some(path) = inner.path.clone() else {
                return Ok(());
            };
            let content = inner.lines.iter().cloned().collect::<Vec<_>>().join("\n");
            (path, content)
        };
        fs::write(&path, content).map_err(|source| TelemetryError::LogStoreIo {
            operation: "log_store.persist",
            path,
            source,
        })
    }

    /// Drop every retained line and remove the backing file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be removed.
    pub fn clear(&self) -> Result<()> {
        let path = {
            let mut inner = self.lock();
            inner.lines.clear();
            inner.path.clone()
        };
        let Some(path) = path else {
            return Ok(());
        };
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(TelemetryError::LogStoreIo {
                operation: "log_store.clear",
                path,
                source,
            }),
        }
    }

    pub(crate) fn make_writer(&self) -> LogStoreMakeWriter {
        LogStoreMakeWriter {
            store: self.clone(),
        }
    }
}

/// `tracing_subscriber` writer that mirrors output to stderr and captures log lines.
#[derive(Clone)]
pub(crate) struct LogStoreMakeWriter {
    store: LogStore,
}

impl<'a> MakeWriter<'a> for LogStoreMakeWriter {
    type Writer = LogStoreWriter;

    fn make_writer(&'a self) -> Self::Writer {
        LogStoreWriter {
            store: self.store.clone(),
            stderr: io::stderr(),
            buffer: LineBuffer::default(),
        }
    }
}

pub(crate) struct LogStoreWriter {
    store: LogStore,
    stderr: io::Stderr,
    buffer: LineBuffer,
}

impl Write for LogStoreWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.stderr.write_all(buf)?;
        for line in self.buffer.push(buf) {
            if !line.is_empty() {
                self.store.append(line);
            }
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.stderr.flush()
    }
}

impl Drop for LogStoreWriter {
    fn drop(&mut self) {
        if let Some(line) = self.buffer.finish() {
            self.store.append(line);
        }
    }
}

#[derive(Default)]
struct LineBuffer {
    buffer: Vec<u8>,
}

impl LineBuffer {
    fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(chunk);
        let mut lines = Vec::new();
        let mut start = 0usize;
        for (idx, byte) in self.buffer.iter().enumerate() {
            if *byte == b'\n' {
                lines.push(trim_line(&String::from_utf8_lossy(&self.buffer[start..idx])));
                start = idx.saturating_add(1);
            }
        }
        if start > 0 {
            self.buffer.drain(0..start);
        }
        lines
    }

    fn finish(&mut self) -> Option<String> {
        if self.buffer.is_empty() {
            return None;
        }
        let line = trim_line(&String::from_utf8_lossy(&self.buffer));
        self.buffer.clear();
        Some(line)
    }
}

fn trim_line(line: &str) -> String {
    line.trim_end_matches(['\r', '\n']).to_string()
}
