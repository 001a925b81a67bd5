//! Error log: one two-line record per failed URL.
//!
//! Format: `<key> -- <message>` followed by an empty line. The file is
//! truncated when the batch starts and flushed after every record, so the
//! log is complete even when the run is cut short.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Append-only record sink. Closed (flushed) when dropped.
pub struct ErrorLog<W: Write = BufWriter<File>> {
    out: W,
    path: Option<PathBuf>,
    records: usize,
}

impl ErrorLog<BufWriter<File>> {
    /// Creates (or truncates) the log file at `path`.
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path)
            .with_context(|| format!("failed to create error log {}", path.display()))?;
        Ok(Self {
            out: BufWriter::new(file),
            path: Some(path.to_path_buf()),
            records: 0,
        })
    }
}

impl<W: Write> ErrorLog<W> {
    /// Log into an arbitrary writer (used by tests).
    pub fn from_writer(out: W) -> Self {
        Self {
            out,
            path: None,
            records: 0,
        }
    }

    /// Appends one record and flushes.
    pub fn record(&mut self, key: &str, message: &str) -> io::Result<()> {
        write!(self.out, "{} -- {}\n\n", key, message)?;
        self.out.flush()?;
        self.records += 1;
        Ok(())
    }

    /// Number of records written so far.
    pub fn records(&self) -> usize {
        self.records
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }
}

impl<W: Write> Drop for ErrorLog<W> {
    fn drop(&mut self) {
        if let Err(e) = self.out.flush() {
            tracing::warn!("failed to flush error log: {}", e);
        }
    }
}
