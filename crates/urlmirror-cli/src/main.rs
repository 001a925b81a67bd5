use urlmirror_core::error::MirrorError;
use urlmirror_core::logging;

mod cli;

use crate::cli::CliCommand;

/// Conventional exit status for a process ended by SIGINT.
const EXIT_INTERRUPTED: i32 = 130;

fn main() {
    // Initialize logging as early as possible; fall back to stderr if the state dir is unusable.
    if let Err(err) = logging::init_logging() {
        match logging::init_logging_stderr() {
            Ok(()) => tracing::warn!("file logging unavailable, using stderr: {:#}", err),
            Err(fallback) => eprintln!("urlmirror: logging disabled: {:#}; {:#}", err, fallback),
        }
    }

    if let Err(err) = CliCommand::run_from_args() {
        if err
            .downcast_ref::<MirrorError>()
            .is_some_and(MirrorError::is_interrupted)
        {
            eprintln!("urlmirror: interrupted");
            std::process::exit(EXIT_INTERRUPTED);
        }
        eprintln!("urlmirror error: {:#}", err);
        std::process::exit(1);
    }
}
