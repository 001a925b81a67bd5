//! File persistence.
//!
//! Bytes are written to a `.part` sibling, synced, then renamed over the final
//! path, so the final name only ever holds a complete download. This is what
//! makes "file already present" a safe resume signal.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Temporary file suffix used before atomic rename.
pub const TEMP_SUFFIX: &str = ".part";

/// Path for the temp file: appends `.part` to the final path (e.g. `cat.jpg` → `cat.jpg.part`).
pub fn temp_path(final_path: &Path) -> PathBuf {
    let mut o = final_path.as_os_str().to_owned();
    o.push(TEMP_SUFFIX);
    PathBuf::from(o)
}

/// Writes `bytes` to `final_path`, replacing any existing file.
/// A failure may leave a stale `.part` behind; the next attempt truncates it.
pub fn persist(final_path: &Path, bytes: &[u8]) -> io::Result<()> {
    let temp = temp_path(final_path);
    let mut file = File::options()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&temp)?;
    file.write_all(bytes)?;
    file.sync_all()?;
    drop(file);
    fs::rename(&temp, final_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temp_path_appends_part() {
        let p = temp_path(Path::new("cat.jpg"));
        assert_eq!(p.to_string_lossy(), "cat.jpg.part");
        let p2 = temp_path(Path::new("/tmp/a.test/x.png"));
        assert_eq!(p2.to_string_lossy(), "/tmp/a.test/x.png.part");
    }

    #[test]
    fn persist_writes_and_leaves_no_temp() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out.jpg");
        persist(&target, b"first").unwrap();
        assert_eq!(fs::read(&target).unwrap(), b"first");
        assert!(!temp_path(&target).exists());
    }

    #[test]
    fn persist_overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out.jpg");
        fs::write(&target, b"old contents that are longer").unwrap();
        fs::write(temp_path(&target), b"stale partial").unwrap();
        persist(&target, b"new").unwrap();
        assert_eq!(fs::read(&target).unwrap(), b"new");
    }

    #[test]
    fn persist_into_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("missing/out.jpg");
        let err = persist(&target, b"x").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
