//! Interrupt control: a shared token set by Ctrl-C (or SIGTERM).
//!
//! The token is checked between URLs by the batch driver, during retry
//! backoff, and from curl's progress callback so a transfer in flight is
//! aborted promptly. An interrupt is the one failure class that ends the
//! whole batch instead of being recorded in the error log.

use anyhow::{Context, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cloneable interrupt flag shared between the signal handler and workers.
#[derive(Debug, Clone, Default)]
pub struct Interrupt {
    flag: Arc<AtomicBool>,
}

impl Interrupt {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request termination of the batch.
    pub fn trigger(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_set(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Install a process-wide SIGINT/SIGTERM handler that triggers `interrupt`.
/// Can only be installed once per process.
pub fn install_ctrlc_handler(interrupt: &Interrupt) -> Result<()> {
    let token = interrupt.clone();
    ctrlc::set_handler(move || {
        token.trigger();
    })
    .context("failed to install Ctrl-C handler")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_state() {
        let a = Interrupt::new();
        let b = a.clone();
        assert!(!b.is_set());
        a.trigger();
        assert!(b.is_set());
    }
}
