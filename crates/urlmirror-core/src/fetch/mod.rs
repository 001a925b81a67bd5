//! Transport seam: "fetch the bytes at this URL".
//!
//! The batch only depends on the [`Fetch`] trait. [`CurlFetcher`] is the
//! production implementation (libcurl via the `curl` crate); tests plug in
//! in-memory fetchers.

mod curl;

pub use self::curl::{CurlFetcher, CurlOptions};

use crate::control::Interrupt;
use std::fmt;

/// Retrieves the full body of a remote resource.
///
/// Implementations must be shareable across worker threads and must return
/// `FetchError::Interrupted` promptly once `interrupt` is set.
pub trait Fetch: Send + Sync {
    fn fetch(&self, url: &str, interrupt: &Interrupt) -> Result<Vec<u8>, FetchError>;
}

/// Error returned by a single fetch attempt.
#[derive(Debug)]
pub enum FetchError {
    /// The URL is not an absolute URL.
    InvalidUrl(String),
    /// Curl reported a transfer error (timeout, DNS, connection, etc.).
    Curl(::curl::Error),
    /// HTTP response had a non-2xx status.
    Http(u32),
    /// Configuring the curl handle failed; not a property of the URL.
    Setup(::curl::Error),
    /// The transfer was aborted because an interrupt was requested.
    Interrupted,
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::InvalidUrl(reason) => write!(f, "invalid URL: {}", reason),
            FetchError::Curl(e) => write!(f, "{}", e),
            FetchError::Http(code) => write!(f, "HTTP {}", code),
            FetchError::Setup(e) => write!(f, "curl setup: {}", e),
            FetchError::Interrupted => write!(f, "interrupted"),
        }
    }
}

impl std::error::Error for FetchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FetchError::Curl(e) | FetchError::Setup(e) => Some(e),
            FetchError::InvalidUrl(_) | FetchError::Http(_) | FetchError::Interrupted => None,
        }
    }
}
