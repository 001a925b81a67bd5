//! Single GET per URL with libcurl, body buffered in memory.

use super::{Fetch, FetchError};
use crate::control::Interrupt;
use crate::retry::{run_with_retry, RetryPolicy};
use std::time::Duration;

/// Transfer tuning applied to every curl handle.
#[derive(Debug, Clone)]
pub struct CurlOptions {
    pub connect_timeout: Duration,
    /// Upper bound for a whole transfer.
    pub timeout: Duration,
    /// Abort if throughput stays below `low_speed_limit` bytes/s for `low_speed_time`.
    pub low_speed_limit: u32,
    pub low_speed_time: Duration,
    pub max_redirections: u32,
    pub user_agent: Option<String>,
}

impl Default for CurlOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(30),
            timeout: Duration::from_secs(300),
            low_speed_limit: 1024,
            low_speed_time: Duration::from_secs(60),
            max_redirections: 10,
            user_agent: None,
        }
    }
}

/// Production fetcher. A fresh `Easy` handle per attempt keeps it `Sync`.
#[derive(Debug, Clone, Default)]
pub struct CurlFetcher {
    options: CurlOptions,
    retry: Option<RetryPolicy>,
}

impl CurlFetcher {
    pub fn new(options: CurlOptions, retry: Option<RetryPolicy>) -> Self {
        Self { options, retry }
    }

    fn fetch_once(&self, url: &str, interrupt: &Interrupt) -> Result<Vec<u8>, FetchError> {
        url::Url::parse(url).map_err(|e| FetchError::InvalidUrl(e.to_string()))?;

        let mut body = Vec::new();
        let mut easy = curl::easy::Easy::new();
        easy.url(url).map_err(FetchError::Curl)?;
        easy.follow_location(true).map_err(FetchError::Setup)?;
        easy.max_redirections(self.options.max_redirections)
            .map_err(FetchError::Setup)?;
        easy.connect_timeout(self.options.connect_timeout)
            .map_err(FetchError::Setup)?;
        easy.low_speed_limit(self.options.low_speed_limit)
            .map_err(FetchError::Setup)?;
        easy.low_speed_time(self.options.low_speed_time)
            .map_err(FetchError::Setup)?;
        easy.timeout(self.options.timeout).map_err(FetchError::Setup)?;
        if let Some(agent) = &self.options.user_agent {
            easy.useragent(agent).map_err(FetchError::Setup)?;
        }
        // Needed for the progress callback to run.
        easy.progress(true).map_err(FetchError::Setup)?;

        {
            let mut transfer = easy.transfer();
            transfer
                .write_function(|data| {
                    body.extend_from_slice(data);
                    Ok(data.len())
                })
                .map_err(FetchError::Setup)?;
            // Returning false aborts the transfer.
            transfer
                .progress_function(|_, _, _, _| !interrupt.is_set())
                .map_err(FetchError::Setup)?;
            if let Err(e) = transfer.perform() {
                if interrupt.is_set() {
                    return Err(FetchError::Interrupted);
                }
                return Err(FetchError::Curl(e));
            }
        }

        let code = easy.response_code().map_err(FetchError::Curl)?;
        // Non-HTTP schemes (file://, ftp:// ...) report 0.
        if code != 0 && !(200..300).contains(&code) {
            return Err(FetchError::Http(code));
        }
        tracing::debug!(url, code, bytes = body.len(), "fetched");
        Ok(body)
    }
}

impl Fetch for CurlFetcher {
    fn fetch(&self, url: &str, interrupt: &Interrupt) -> Result<Vec<u8>, FetchError> {
        match &self.retry {
            Some(policy) => run_with_retry(policy, interrupt, || self.fetch_once(url, interrupt)),
            None => self.fetch_once(url, interrupt),
        }
    }
}
