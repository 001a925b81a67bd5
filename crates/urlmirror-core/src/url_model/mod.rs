//! URL to local path mapping.
//!
//! `http://example.com/a/b.jpg` maps to `example.com/a/b.jpg` under the
//! output root: everything up to and including the first `//` is dropped,
//! the remaining `/`-separated segments become nested directories, and the
//! last segment is the filename. The mapping is pure; directories are
//! materialized separately by [`ensure_dirs`].

mod dirs;

pub use dirs::{check_dirs, ensure_dirs};

use std::fmt;
use std::path::{Path, PathBuf};

/// Separator between scheme and authority (`http:` + `//` + `host/...`).
const AUTHORITY_MARKER: &str = "//";

/// Local destination of a URL, relative to the output root.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LocalPath {
    dirs: Vec<String>,
    file_name: String,
}

impl LocalPath {
    /// Derives the local path for `url`. Never fails and never touches the filesystem.
    ///
    /// A URL without `//` maps its whole text. Query strings are kept as part
    /// of the filename.
    pub fn from_url(url: &str) -> Self {
        let rest = url
            .split_once(AUTHORITY_MARKER)
            .map_or(url, |(_, rest)| rest);
        let mut dirs: Vec<String> = rest.split('/').map(str::to_string).collect();
        // split always yields at least one segment
        let file_name = dirs.pop().unwrap_or_default();
        Self { dirs, file_name }
    }

    /// Directory segments in nesting order. May contain empty strings for `//` runs.
    pub fn dirs(&self) -> &[String] {
        &self.dirs
    }

    /// Last segment; empty when the URL ends with `/`.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Directory part as a relative path (empty segments skipped).
    pub fn parent(&self) -> PathBuf {
        self.dirs.iter().filter(|s| !s.is_empty()).collect()
    }

    /// Relative filesystem path (empty segments skipped).
    pub fn relative(&self) -> PathBuf {
        let mut path = self.parent();
        if !self.file_name.is_empty() {
            path.push(&self.file_name);
        }
        path
    }

    /// Absolute (or root-relative) path of the file under `root`.
    pub fn under(&self, root: &Path) -> PathBuf {
        root.join(self.relative())
    }
}

impl fmt::Display for LocalPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for dir in self.dirs.iter().filter(|s| !s.is_empty()) {
            write!(f, "{}/", dir)?;
        }
        f.write_str(&self.file_name)
    }
}
