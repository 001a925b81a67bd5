//! Directory materialization for a [`LocalPath`].
//!
//! Each ancestor is addressed by an explicit path under the output root; the
//! process working directory is never changed, so concurrent workers can
//! create overlapping trees safely.

use super::LocalPath;
use crate::error::MirrorError;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Creates every directory segment of `local` under `root`, in order.
///
/// Errors are keyed by the failing directory relative to `root`. A path
/// segment that exists as something other than a directory is reported and
/// left untouched.
pub fn ensure_dirs(root: &Path, local: &LocalPath) -> Result<(), MirrorError> {
    check_dirs(local)?;
    let mut relative = PathBuf::new();
    for segment in local.dirs().iter().filter(|s| !s.is_empty()) {
        relative.push(segment);
        ensure_one(&root.join(&relative), &relative)?;
    }
    Ok(())
}

/// Rejects `.` and `..` directory segments so a mapped path stays under the
/// output root. Touches no filesystem state.
pub fn check_dirs(local: &LocalPath) -> Result<(), MirrorError> {
    let mut relative = PathBuf::new();
    for segment in local.dirs().iter().filter(|s| !s.is_empty()) {
        relative.push(segment);
        if segment == "." || segment == ".." {
            return Err(MirrorError::Directory {
                message: format!("{} is not a valid directory name", relative.display()),
                path: relative,
            });
        }
    }
    Ok(())
}

fn ensure_one(absolute: &Path, relative: &Path) -> Result<(), MirrorError> {
    match fs::metadata(absolute) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(not_a_directory(relative)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => match fs::create_dir(absolute) {
            Ok(()) => {
                tracing::debug!(dir = %absolute.display(), "created directory");
                Ok(())
            }
            // Another worker created it first.
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                if absolute.is_dir() {
                    Ok(())
                } else {
                    Err(not_a_directory(relative))
                }
            }
            Err(e) => Err(could_not_create(relative, &e)),
        },
        Err(e) => Err(could_not_create(relative, &e)),
    }
}

fn not_a_directory(relative: &Path) -> MirrorError {
    MirrorError::Directory {
        path: relative.to_path_buf(),
        message: format!("{} exists, but is no directory!", relative.display()),
    }
}

fn could_not_create(relative: &Path, e: &io::Error) -> MirrorError {
    MirrorError::Directory {
        path: relative.to_path_buf(),
        message: format!("Could not create {} - {}", relative.display(), e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creates_nested_directories() {
        let root = tempfile::tempdir().unwrap();
        let local = LocalPath::from_url("http://a.test/x/y/z.jpg");
        ensure_dirs(root.path(), &local).unwrap();
        assert!(root.path().join("a.test/x/y").is_dir());
        assert!(!root.path().join("a.test/x/y/z.jpg").exists());
    }

    #[test]
    fn existing_directories_are_fine() {
        let root = tempfile::tempdir().unwrap();
        fs::create_dir_all(root.path().join("a.test/x")).unwrap();
        let local = LocalPath::from_url("http://a.test/x/y.jpg");
        ensure_dirs(root.path(), &local).unwrap();
        ensure_dirs(root.path(), &local).unwrap();
    }

    #[test]
    fn file_in_the_way_is_not_overwritten() {
        let root = tempfile::tempdir().unwrap();
        fs::create_dir(root.path().join("a.test")).unwrap();
        fs::write(root.path().join("a.test/x"), b"keep me").unwrap();

        let local = LocalPath::from_url("http://a.test/x/y.jpg");
        let err = ensure_dirs(root.path(), &local).unwrap_err();
        match &err {
            MirrorError::Directory { path, message } => {
                assert_eq!(path, &PathBuf::from("a.test/x"));
                assert!(message.contains("exists, but is no directory"));
            }
            other => panic!("expected Directory error, got {:?}", other),
        }
        assert_eq!(fs::read(root.path().join("a.test/x")).unwrap(), b"keep me");
    }

    #[test]
    fn parent_segments_are_rejected() {
        let root = tempfile::tempdir().unwrap();
        let local = LocalPath::from_url("http://a.test/../../etc/passwd");
        let err = ensure_dirs(root.path(), &local).unwrap_err();
        assert!(matches!(err, MirrorError::Directory { .. }));
        assert_eq!(err.record_key().as_deref(), Some("a.test/.."));
        assert!(!root.path().join("a.test").exists());
    }

    #[test]
    fn current_dir_segment_is_rejected() {
        let local = LocalPath::from_url("http://a.test/./x.jpg");
        let err = check_dirs(&local).unwrap_err();
        assert_eq!(err.record_key().as_deref(), Some("a.test/."));
        assert!(check_dirs(&LocalPath::from_url("http://a.test/x/y.jpg")).is_ok());
    }

    #[test]
    fn working_directory_is_untouched() {
        let before = std::env::current_dir().unwrap();
        let root = tempfile::tempdir().unwrap();
        let local = LocalPath::from_url("http://a.test/deep/er/file.jpg");
        ensure_dirs(root.path(), &local).unwrap();
        assert_eq!(std::env::current_dir().unwrap(), before);
    }
}
