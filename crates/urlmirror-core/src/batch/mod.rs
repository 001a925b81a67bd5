//! Batch driver: input list → fetch-and-store → error log.
//!
//! The driver owns the error log and the summary tallies. Per-URL failures
//! are recorded and the batch moves on; an unreadable input list, an empty
//! precount, and an interrupt end the run with an error.

mod pool;

use anyhow::{Context, Result};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::control::Interrupt;
use crate::error::MirrorError;
use crate::error_log::ErrorLog;
use crate::fetch::Fetch;
use crate::line_source::{self, UrlEntry, UrlList};
use crate::mirror::{Mirror, Outcome};

/// Settings for one batch run.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Input list, one URL per line.
    pub input: PathBuf,
    /// Error log, truncated at batch start.
    pub error_log: PathBuf,
    /// Directory that local paths are resolved under.
    pub output_root: PathBuf,
    /// Re-fetch URLs whose local file already exists.
    pub reload: bool,
    /// Count eligible lines before starting, for "index / total" progress.
    pub precount: bool,
    /// Concurrent downloads; 1 processes strictly in input order.
    pub jobs: usize,
}

impl BatchOptions {
    pub fn new(input: impl Into<PathBuf>, output_root: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            error_log: PathBuf::from("errors.log"),
            output_root: output_root.into(),
            reload: false,
            precount: true,
            jobs: 1,
        }
    }
}

/// Progress notifications for the console.
#[derive(Debug)]
pub enum BatchEvent<'a> {
    /// Processing of an entry begins. `total` is set when the precount ran.
    Started {
        entry: &'a UrlEntry,
        total: Option<usize>,
    },
    Stored {
        entry: &'a UrlEntry,
        path: &'a Path,
        bytes: u64,
    },
    Skipped {
        entry: &'a UrlEntry,
        path: &'a Path,
    },
    /// The entry failed and one record was appended to the error log.
    Failed {
        entry: &'a UrlEntry,
        key: &'a str,
        error: &'a MirrorError,
    },
}

/// Totals for one batch run. `failed` equals the number of error-log records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub total: Option<usize>,
    pub processed: usize,
    pub stored: usize,
    pub skipped: usize,
    pub failed: usize,
    pub error_log: PathBuf,
}

impl BatchSummary {
    pub fn is_clean(&self) -> bool {
        self.failed == 0
    }
}

/// Runs a whole batch.
///
/// Fatal conditions return `Err`; `MirrorError::Interrupted` can be
/// recovered with `downcast_ref`. The error log is closed on every path.
pub fn run_batch<F, E>(
    opts: &BatchOptions,
    fetcher: &F,
    interrupt: &Interrupt,
    on_event: E,
) -> Result<BatchSummary>
where
    F: Fetch + ?Sized,
    E: FnMut(BatchEvent<'_>),
{
    let list = UrlList::open(&opts.input)?;
    let total = if opts.precount {
        let count = line_source::count_entries(&opts.input)?;
        if count == 0 {
            anyhow::bail!("no URLs found in {}", opts.input.display());
        }
        Some(count)
    } else {
        None
    };

    let log = ErrorLog::create(&opts.error_log)?;
    let mut recorder = Recorder {
        log,
        on_event,
        summary: BatchSummary {
            total,
            error_log: opts.error_log.clone(),
            ..BatchSummary::default()
        },
    };
    let mirror = Mirror::new(&opts.output_root, opts.reload, fetcher, interrupt.clone());
    let input = list.path().to_path_buf();
    tracing::info!(
        input = %input.display(),
        root = %opts.output_root.display(),
        reload = opts.reload,
        jobs = opts.jobs,
        "batch started"
    );

    if opts.jobs > 1 {
        pool::run_pool(&mirror, list.entries(), opts.jobs, interrupt, |entry, result| {
            recorder.started(&entry);
            recorder.finish(&entry, result)
        })
        .with_context(|| format!("batch over {} aborted", input.display()))?;
    } else {
        for entry in list.entries() {
            let entry =
                entry.with_context(|| format!("failed to read URL list {}", input.display()))?;
            if interrupt.is_set() {
                return Err(MirrorError::Interrupted.into());
            }
            recorder.started(&entry);
            let result = mirror.download(&entry.url);
            recorder.finish(&entry, result)?;
        }
    }

    debug_assert_eq!(recorder.summary.failed, recorder.log.records());
    tracing::info!(
        processed = recorder.summary.processed,
        stored = recorder.summary.stored,
        skipped = recorder.summary.skipped,
        failed = recorder.summary.failed,
        "batch finished"
    );
    Ok(recorder.summary)
}

/// Single owner of the error log and tallies; only the driver thread touches it.
struct Recorder<W: Write, E> {
    log: ErrorLog<W>,
    on_event: E,
    summary: BatchSummary,
}

impl<W: Write, E: FnMut(BatchEvent<'_>)> Recorder<W, E> {
    fn started(&mut self, entry: &UrlEntry) {
        (self.on_event)(BatchEvent::Started {
            entry,
            total: self.summary.total,
        });
    }

    fn finish(&mut self, entry: &UrlEntry, result: Result<Outcome, MirrorError>) -> Result<()> {
        match result {
            Ok(Outcome::Stored { path, bytes }) => {
                self.summary.processed += 1;
                self.summary.stored += 1;
                (self.on_event)(BatchEvent::Stored {
                    entry,
                    path: &path,
                    bytes,
                });
            }
            Ok(Outcome::Skipped { path }) => {
                self.summary.processed += 1;
                self.summary.skipped += 1;
                (self.on_event)(BatchEvent::Skipped { entry, path: &path });
            }
            Err(MirrorError::Interrupted) => return Err(MirrorError::Interrupted.into()),
            Err(
                error @ (MirrorError::Transport { .. }
                | MirrorError::Directory { .. }
                | MirrorError::Storage { .. }
                | MirrorError::Unexpected { .. }),
            ) => {
                let key = error.record_key().unwrap_or_else(|| entry.url.clone());
                tracing::warn!(url = %entry.url, key = %key, "{}", error);
                self.log
                    .record(&key, &error.to_string())
                    .context("failed to write error log")?;
                self.summary.processed += 1;
                self.summary.failed += 1;
                (self.on_event)(BatchEvent::Failed {
                    entry,
                    key: &key,
                    error: &error,
                });
            }
        }
        Ok(())
    }
}
