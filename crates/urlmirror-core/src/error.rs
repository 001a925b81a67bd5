//! Per-URL error taxonomy.
//!
//! Every failure while mirroring a single URL maps to one `MirrorError`
//! variant. The batch driver matches on the variant: `Interrupted` ends the
//! run, everything else becomes one error-log record keyed by
//! [`MirrorError::record_key`].

use crate::fetch::FetchError;
use std::io;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum MirrorError {
    /// The URL could not be parsed, resolved, reached, or returned a non-2xx status.
    #[error("{message}")]
    Transport { url: String, message: String },

    /// A directory on the local path could not be created, or a
    /// non-directory is in the way. `path` is relative to the output root.
    #[error("{message}")]
    Directory { path: PathBuf, message: String },

    /// The fetched bytes could not be persisted at `path` (relative to the output root).
    #[error("Could not write file to disk: {source}")]
    Storage {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Anything else that went wrong while handling one URL.
    #[error("Unexpected error - {message}")]
    Unexpected { key: String, message: String },

    /// Ctrl-C / termination request. Fatal to the whole batch.
    #[error("interrupted")]
    Interrupted,
}

impl MirrorError {
    /// Maps a fetch failure for `url` onto the per-URL taxonomy.
    pub fn from_fetch(url: &str, err: FetchError) -> Self {
        match err {
            FetchError::Interrupted => MirrorError::Interrupted,
            FetchError::Setup(e) => MirrorError::Unexpected {
                key: url.to_string(),
                message: format!("curl setup failed: {}", e),
            },
            FetchError::InvalidUrl(_) | FetchError::Curl(_) | FetchError::Http(_) => {
                MirrorError::Transport {
                    url: url.to_string(),
                    message: err.to_string(),
                }
            }
        }
    }

    /// Key written in front of the message in the error log: the URL for
    /// transport and unexpected failures, the local path for filesystem ones.
    pub fn record_key(&self) -> Option<String> {
        match self {
            MirrorError::Transport { url, .. } => Some(url.clone()),
            MirrorError::Directory { path, .. } | MirrorError::Storage { path, .. } => {
                Some(path.display().to_string())
            }
            MirrorError::Unexpected { key, .. } => Some(key.clone()),
            MirrorError::Interrupted => None,
        }
    }

    pub fn is_interrupted(&self) -> bool {
        matches!(self, MirrorError::Interrupted)
    }
}
