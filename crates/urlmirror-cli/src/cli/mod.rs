//! CLI for urlmirror.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use urlmirror_core::config;

use commands::{run_count, run_map, run_mirror, RunArgs};

/// Top-level CLI for urlmirror.
#[derive(Debug, Parser)]
#[command(name = "urlmirror", version)]
#[command(about = "Mirror a list of image URLs into a host/path directory tree", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Download every URL in a list, skipping files that are already present.
    Run {
        /// File containing image URLs, one per line (`#` starts a comment).
        #[arg(short = 'i', long = "input-file", value_name = "PATH")]
        input_file: PathBuf,

        /// File for the error log (default: `error_log` from config, `errors.log`).
        #[arg(short = 'e', long = "error-file", value_name = "PATH")]
        error_file: Option<PathBuf>,

        /// Reload all URLs, even if the local file already exists.
        #[arg(short = 'r', long)]
        reload: bool,

        /// Skip counting the list first (progress shows no total).
        #[arg(long)]
        no_count: bool,

        /// Directory to mirror into (default: current directory).
        #[arg(short = 'o', long = "output-dir", value_name = "DIR")]
        output_dir: Option<PathBuf>,

        /// Download up to N URLs concurrently (default: `jobs` from config, 1).
        #[arg(short = 'j', long, value_name = "N")]
        jobs: Option<usize>,
    },

    /// Print the local path each URL would be saved to.
    Map {
        /// One or more URLs.
        #[arg(required = true)]
        urls: Vec<String>,
    },

    /// Count the URLs in a list (blank and comment lines excluded).
    Count {
        /// File containing image URLs.
        #[arg(short = 'i', long = "input-file", value_name = "PATH")]
        input_file: PathBuf,
    },
}

impl CliCommand {
    pub fn run_from_args() -> Result<()> {
        let cli = Cli::parse();

        match cli.command {
            CliCommand::Run {
                input_file,
                error_file,
                reload,
                no_count,
                output_dir,
                jobs,
            } => {
                let cfg = config::load_or_init()?;
                tracing::debug!("loaded config: {:?}", cfg);
                let output_dir = match output_dir {
                    Some(dir) => dir,
                    None => std::env::current_dir()?,
                };
                run_mirror(
                    &cfg,
                    RunArgs {
                        input_file,
                        error_file,
                        reload,
                        precount: !no_count,
                        output_dir,
                        jobs,
                    },
                )?;
            }
            CliCommand::Map { urls } => run_map(&urls),
            CliCommand::Count { input_file } => run_count(&input_file)?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
