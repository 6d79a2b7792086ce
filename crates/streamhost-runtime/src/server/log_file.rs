//! Append-only log file for the streaming server's output.

use std::fs::{File, OpenOptions};
use std::io::{self, LineWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use streamhost_core::ports::ServerLogSinkPort;
use tracing::debug;

/// Writes server stdout/stderr lines verbatim, one per line, in append mode.
#[derive(Debug)]
pub struct ServerLogFile {
    path: PathBuf,
    writer: Mutex<Option<LineWriter<File>>>,
}

impl ServerLogFile {
    pub fn open(path: impl Into<PathBuf>) -> io::Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            path,
            writer: Mutex::new(Some(LineWriter::new(file))),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Flush and release the file handle. Later appends are dropped.
    pub fn close(&self) {
        if let Some(mut writer) = self
            .writer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            && let Err(e) = writer.flush()
        {
            debug!(path = %self.path.display(), error = %e, "Flushing server log on close failed");
        }
    }
}

impl ServerLogSinkPort for ServerLogFile {
    fn append(&self, _stream_type: &str, line: String) {
        let mut guard = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(writer) = guard.as_mut()
            && let Err(e) = writeln!(writer, "{line}")
        {
            debug!(path = %self.path.display(), error = %e, "Server log write failed");
        }
    }

    fn flush(&self) {
        let mut guard = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(writer) = guard.as_mut()
            && let Err(e) = writer.flush()
        {
            debug!(path = %self.path.display(), error = %e, "Server log flush failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appends_across_opens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stremio-server.log");

        let first = ServerLogFile::open(&path).unwrap();
        first.append("stdout", "one".to_string());
        first.close();

        let second = ServerLogFile::open(&path).unwrap();
        second.append("stderr", "two".to_string());
        second.flush();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "one\ntwo\n");
    }

    #[test]
    fn appends_after_close_are_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let log = ServerLogFile::open(dir.path().join("log")).unwrap();
        log.close();
        log.append("stdout", "late".to_string());
        assert_eq!(std::fs::read_to_string(log.path()).unwrap(), "");
    }
}
