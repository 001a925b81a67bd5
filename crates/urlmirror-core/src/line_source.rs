//! Input list reading: one URL per line, blank and `#` lines ignored.
//!
//! [`is_url_entry`] is the only filtering rule. Both the main pass
//! ([`UrlList::entries`]) and the precount ([`count_entries`]) go through it,
//! so the progress total always matches what the batch processes.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

/// Marker that turns a line into a comment when it is the first non-blank character.
pub const COMMENT_MARKER: char = '#';

/// Returns the URL carried by `line`, or `None` if the line is blank or a comment.
/// Edge whitespace (including `\r` from CRLF files) is stripped.
pub fn is_url_entry(line: &str) -> Option<&str> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with(COMMENT_MARKER) {
        None
    } else {
        Some(trimmed)
    }
}

/// One eligible line of the input list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlEntry {
    /// 1-based position among eligible lines.
    pub index: usize,
    pub url: String,
}

/// An opened input list.
#[derive(Debug)]
pub struct UrlList {
    path: PathBuf,
    reader: BufReader<File>,
}

impl UrlList {
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("failed to open URL list {}", path.display()))?;
        Ok(Self {
            path: path.to_path_buf(),
            reader: BufReader::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Consumes the list; entries can only be walked once.
    pub fn entries(self) -> Entries<BufReader<File>> {
        entries(self.reader)
    }
}

/// Lazily yields eligible entries from any line-oriented reader.
pub fn entries<R: BufRead>(reader: R) -> Entries<R> {
    Entries {
        lines: reader.lines(),
        next_index: 1,
    }
}

/// Iterator returned by [`entries`]. A read error (including invalid UTF-8)
/// is yielded once; callers treat it as fatal.
pub struct Entries<R> {
    lines: io::Lines<R>,
    next_index: usize,
}

impl<R: BufRead> Iterator for Entries<R> {
    type Item = io::Result<UrlEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => return Some(Err(e)),
            };
            if let Some(url) = is_url_entry(&line) {
                let entry = UrlEntry {
                    index: self.next_index,
                    url: url.to_string(),
                };
                self.next_index += 1;
                return Some(Ok(entry));
            }
        }
    }
}

/// Read-only pass counting eligible lines, used for "index / total" progress.
pub fn count_entries(path: &Path) -> Result<usize> {
    let list = UrlList::open(path)?;
    let mut count = 0;
    for entry in list.entries() {
        entry.with_context(|| format!("failed to read URL list {}", path.display()))?;
        count += 1;
    }
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};

    #[test]
    fn filters_blank_and_comment_lines() {
        assert_eq!(is_url_entry("http://a.test/x.jpg\n"), Some("http://a.test/x.jpg"));
        assert_eq!(is_url_entry("  http://a.test/x.jpg \r\n"), Some("http://a.test/x.jpg"));
        assert_eq!(is_url_entry(""), None);
        assert_eq!(is_url_entry("   \t"), None);
        assert_eq!(is_url_entry("# comment"), None);
        assert_eq!(is_url_entry("   # indented comment"), None);
    }

    #[test]
    fn entries_are_numbered_among_eligible_lines() {
        let input = "http://a.test/x/y.jpg\n# comment\n\nhttp://a.test/z.jpg\n";
        let got: Vec<UrlEntry> = entries(Cursor::new(input))
            .collect::<io::Result<_>>()
            .unwrap();
        assert_eq!(
            got,
            vec![
                UrlEntry {
                    index: 1,
                    url: "http://a.test/x/y.jpg".into()
                },
                UrlEntry {
                    index: 2,
                    url: "http://a.test/z.jpg".into()
                },
            ]
        );
    }

    #[test]
    fn crlf_and_missing_final_newline() {
        let input = "http://a.test/1.jpg\r\n\r\nhttp://a.test/2.jpg";
        let urls: Vec<String> = entries(Cursor::new(input))
            .map(|e| e.unwrap().url)
            .collect();
        assert_eq!(urls, vec!["http://a.test/1.jpg", "http://a.test/2.jpg"]);
    }

    #[test]
    fn invalid_utf8_is_an_error() {
        let input: &[u8] = b"http://a.test/1.jpg\n\xff\xfe\n";
        let mut it = entries(Cursor::new(input));
        assert!(it.next().unwrap().is_ok());
        assert!(it.next().unwrap().is_err());
    }

    #[test]
    fn precount_matches_main_pass() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        write!(
            f,
            "# header\nhttp://a.test/x/y.jpg\n# comment\n\n   \nhttp://a.test/z.jpg\n"
        )
        .unwrap();
        f.flush().unwrap();

        let counted = count_entries(f.path()).unwrap();
        let walked = UrlList::open(f.path()).unwrap().entries().count();
        assert_eq!(counted, 2);
        assert_eq!(counted, walked);
    }

    #[test]
    fn missing_list_fails_to_open() {
        let dir = tempfile::tempdir().unwrap();
        let err = UrlList::open(&dir.path().join("missing.txt")).unwrap_err();
        assert!(err.to_string().contains("failed to open URL list"));
    }
}
