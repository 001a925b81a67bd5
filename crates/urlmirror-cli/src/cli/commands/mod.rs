//! CLI command handlers. Each command is in its own file.

mod count;
mod map;
mod run;

pub use count::run_count;
pub use map::run_map;
pub use run::{run_mirror, RunArgs};
