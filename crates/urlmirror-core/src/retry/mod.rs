//! Retry and backoff policy.
//!
//! Classifies fetch failures (timeouts, throttling, connection failures) and
//! makes exponential backoff decisions. Only used when a `[retry]` section is
//! configured; otherwise every URL gets exactly one attempt.

mod classify;
mod policy;
mod run;

pub use classify::{classify, classify_curl_error, classify_http_status};
pub use policy::{ErrorKind, RetryDecision, RetryPolicy};
pub use run::run_with_retry;
