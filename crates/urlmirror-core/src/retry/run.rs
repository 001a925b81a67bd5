//! Retry loop: run a closure until success or policy says stop.

use super::classify;
use super::policy::{RetryDecision, RetryPolicy};
use crate::control::Interrupt;
use crate::fetch::FetchError;
use std::time::Duration;

/// Granularity of the interrupt check while sleeping between attempts.
const SLEEP_SLICE: Duration = Duration::from_millis(50);

/// Runs a closure until it succeeds or the retry policy says to stop.
/// On retryable failure, sleeps for the backoff duration then tries again.
/// Returns `FetchError::Interrupted` as soon as `interrupt` is set during a backoff.
pub fn run_with_retry<T, F>(
    policy: &RetryPolicy,
    interrupt: &Interrupt,
    mut f: F,
) -> Result<T, FetchError>
where
    F: FnMut() -> Result<T, FetchError>,
{
    let mut attempt = 1u32;
    loop {
        match f() {
            Ok(value) => return Ok(value),
            Err(e) => {
                let kind = classify::classify(&e);
                match policy.decide(attempt, kind) {
                    RetryDecision::NoRetry => return Err(e),
                    RetryDecision::RetryAfter(d) => {
                        tracing::debug!(
                            attempt,
                            ?kind,
                            delay_ms = d.as_millis() as u64,
                            "retrying fetch: {}",
                            e
                        );
                        sleep_unless_interrupted(d, interrupt)?;
                        attempt += 1;
                    }
                }
            }
        }
    }
}

fn sleep_unless_interrupted(total: Duration, interrupt: &Interrupt) -> Result<(), FetchError> {
    let mut remaining = total;
    while !remaining.is_zero() {
        if interrupt.is_set() {
            return Err(FetchError::Interrupted);
        }
        let step = remaining.min(SLEEP_SLICE);
        std::thread::sleep(step);
        remaining -= step;
    }
    if interrupt.is_set() {
        return Err(FetchError::Interrupted);
    }
    Ok(())
}
