//! Fetch-and-store for a single URL.

use crate::control::Interrupt;
use crate::error::MirrorError;
use crate::fetch::Fetch;
use crate::storage;
use crate::url_model::{check_dirs, ensure_dirs, LocalPath};
use std::any::Any;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};

/// Successful result of [`Mirror::download`]. Paths are relative to the output root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// A file already exists at the local path and reload was not forced.
    Skipped { path: PathBuf },
    /// The resource was fetched and written.
    Stored { path: PathBuf, bytes: u64 },
}

impl Outcome {
    pub fn path(&self) -> &Path {
        match self {
            Outcome::Skipped { path } | Outcome::Stored { path, .. } => path,
        }
    }
}

/// Mirrors URLs into a directory tree rooted at `root`.
pub struct Mirror<'a, F: Fetch + ?Sized> {
    root: PathBuf,
    reload: bool,
    fetcher: &'a F,
    interrupt: Interrupt,
}

impl<'a, F: Fetch + ?Sized> Mirror<'a, F> {
    pub fn new(root: &Path, reload: bool, fetcher: &'a F, interrupt: Interrupt) -> Self {
        Self {
            root: root.to_path_buf(),
            reload,
            fetcher,
            interrupt,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Downloads `url` to its mapped local path.
    ///
    /// The mapped path is validated first. Without reload, an existing file
    /// then short-circuits to `Skipped` before any network access. Every error except `Interrupted` is specific to this URL.
    pub fn download(&self, url: &str) -> Result<Outcome, MirrorError> {
        if self.interrupt.is_set() {
            return Err(MirrorError::Interrupted);
        }

        let local = LocalPath::from_url(url);
        let relative = local.relative();
        check_file_name(&local, &relative)?;
        check_dirs(&local)?;
        let target = self.root.join(&relative);

        if !self.reload && target.is_file() {
            tracing::debug!(url, path = %relative.display(), "already present, skipping");
            return Ok(Outcome::Skipped { path: relative });
        }

        let body = self.fetch(url)?;
        ensure_dirs(&self.root, &local)?;
        storage::persist(&target, &body).map_err(|source| MirrorError::Storage {
            path: relative.clone(),
            source,
        })?;

        tracing::info!(url, path = %relative.display(), bytes = body.len(), "stored");
        Ok(Outcome::Stored {
            path: relative,
            bytes: body.len() as u64,
        })
    }

    /// Runs the fetcher, turning a panic inside it into an `Unexpected` error
    /// for this URL.
    fn fetch(&self, url: &str) -> Result<Vec<u8>, MirrorError> {
        let attempt = panic::catch_unwind(AssertUnwindSafe(|| {
            self.fetcher.fetch(url, &self.interrupt)
        }));
        match attempt {
            Ok(Ok(body)) => Ok(body),
            Ok(Err(e)) => Err(MirrorError::from_fetch(url, e)),
            Err(payload) => Err(MirrorError::Unexpected {
                key: url.to_string(),
                message: panic_message(payload.as_ref()),
            }),
        }
    }
}

fn check_file_name(local: &LocalPath, relative: &Path) -> Result<(), MirrorError> {
    let reason = match local.file_name() {
        "" => "URL has no file name",
        "." | ".." => "URL file name is not a valid file name",
        _ => return Ok(()),
    };
    Err(MirrorError::Storage {
        path: relative.to_path_buf(),
        source: io::Error::new(io::ErrorKind::InvalidInput, reason),
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "fetcher panicked".to_string()
    }
}
