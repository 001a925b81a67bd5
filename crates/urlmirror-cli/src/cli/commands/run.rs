//! `urlmirror run` – mirror every URL in a list.

use anyhow::Result;
use std::path::PathBuf;
use urlmirror_core::batch::{self, BatchEvent, BatchOptions, BatchSummary};
use urlmirror_core::config::MirrorConfig;
use urlmirror_core::control::{self, Interrupt};
use urlmirror_core::fetch::CurlFetcher;

/// Parsed `run` flags, before config defaults are applied.
#[derive(Debug)]
pub struct RunArgs {
    pub input_file: PathBuf,
    pub error_file: Option<PathBuf>,
    pub reload: bool,
    pub precount: bool,
    pub output_dir: PathBuf,
    pub jobs: Option<usize>,
}

impl RunArgs {
    /// CLI flags win over config values.
    pub fn into_options(self, cfg: &MirrorConfig) -> BatchOptions {
        BatchOptions {
            input: self.input_file,
            error_log: self.error_file.unwrap_or_else(|| cfg.error_log.clone()),
            output_root: self.output_dir,
            reload: self.reload,
            precount: self.precount,
            jobs: self.jobs.unwrap_or(cfg.jobs).max(1),
        }
    }
}

pub fn run_mirror(cfg: &MirrorConfig, args: RunArgs) -> Result<()> {
    let opts = args.into_options(cfg);
    let fetcher = CurlFetcher::new(cfg.curl_options(), cfg.retry_policy());

    let interrupt = Interrupt::new();
    if let Err(e) = control::install_ctrlc_handler(&interrupt) {
        tracing::warn!("{:#}; Ctrl-C will terminate without cleanup", e);
    }

    let summary = batch::run_batch(&opts, &fetcher, &interrupt, print_event)?;
    print_summary(&summary);
    Ok(())
}

fn print_event(event: BatchEvent<'_>) {
    match event {
        BatchEvent::Started { entry, total } => match total {
            Some(total) => println!("[{}/{}] {} ...", entry.index, total, entry.url),
            None => println!("[{}] {} ...", entry.index, entry.url),
        },
        BatchEvent::Stored { path, .. } => {
            println!("...successfully saved to '{}'", path.display());
            println!();
        }
        BatchEvent::Skipped { path, .. } => {
            println!(
                "...is already present at '{}' - continuing with next URL",
                path.display()
            );
            println!();
        }
        BatchEvent::Failed { error, .. } => {
            println!("...failed: {}", error);
            println!();
        }
    }
}

fn print_summary(summary: &BatchSummary) {
    println!(
        "Finished mirroring: {} stored, {} already present, {} failed.",
        summary.stored, summary.skipped, summary.failed
    );
    if !summary.is_clean() {
        println!(
            "There were {} errors, check '{}'",
            summary.failed,
            summary.error_log.display()
        );
    }
}
