//! Bounded worker pool for `jobs > 1`.
//!
//! Workers pull entries from the shared line iterator and download them; the
//! calling thread receives results over a channel and is the only one that
//! touches the error log. Completion order may differ from input order, so
//! the `Started` event for an entry is emitted together with its result.

use anyhow::Result;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Mutex};
use std::thread;

use crate::control::Interrupt;
use crate::error::MirrorError;
use crate::fetch::Fetch;
use crate::line_source::UrlEntry;
use crate::mirror::{Mirror, Outcome};

enum Message {
    Done(UrlEntry, Result<Outcome, MirrorError>),
    ReadFailed(io::Error),
}

/// Runs `entries` through `mirror` on `jobs` threads, handing each result to
/// `handle` on the calling thread. The first error from `handle` (or a read
/// error, or an interrupt) stops workers from taking new entries; in-flight
/// downloads finish but are not reported.
pub(super) fn run_pool<F, I, H>(
    mirror: &Mirror<'_, F>,
    entries: I,
    jobs: usize,
    interrupt: &Interrupt,
    mut handle: H,
) -> Result<()>
where
    F: Fetch + ?Sized,
    I: Iterator<Item = io::Result<UrlEntry>> + Send,
    H: FnMut(UrlEntry, Result<Outcome, MirrorError>) -> Result<()>,
{
    let entries = Mutex::new(entries);
    let stop = AtomicBool::new(false);
    let (tx, rx) = mpsc::channel::<Message>();

    let outcome = thread::scope(|scope| {
        let workers: Vec<_> = (0..jobs)
            .map(|_| {
                let tx = tx.clone();
                let entries = &entries;
                let stop = &stop;
                scope.spawn(move || loop {
                    if stop.load(Ordering::SeqCst) || interrupt.is_set() {
                        break;
                    }
                    let next = match entries.lock() {
                        Ok(mut it) => it.next(),
                        // Another worker panicked mid-read; the list position is unknown.
                        Err(_) => Some(Err(io::Error::new(
                            io::ErrorKind::Other,
                            "URL list reader panicked",
                        ))),
                    };
                    let message = match next {
                        None => break,
                        Some(Ok(entry)) => {
                            let result = mirror.download(&entry.url);
                            Message::Done(entry, result)
                        }
                        Some(Err(e)) => {
                            stop.store(true, Ordering::SeqCst);
                            Message::ReadFailed(e)
                        }
                    };
                    if tx.send(message).is_err() {
                        break;
                    }
                })
            })
            .collect();
        drop(tx);

        let mut outcome: Result<()> = Ok(());
        for message in rx {
            if outcome.is_err() {
                continue;
            }
            outcome = match message {
                Message::Done(entry, result) => handle(entry, result),
                Message::ReadFailed(e) => {
                    Err(anyhow::Error::new(e).context("failed to read URL list"))
                }
            };
            if outcome.is_err() {
                stop.store(true, Ordering::SeqCst);
            }
        }

        for worker in workers {
            if worker.join().is_err() && outcome.is_ok() {
                outcome = Err(anyhow::anyhow!("URL list worker panicked"));
            }
        }
        outcome
    });
    outcome?;

    if interrupt.is_set() {
        return Err(MirrorError::Interrupted.into());
    }
    Ok(())
}
