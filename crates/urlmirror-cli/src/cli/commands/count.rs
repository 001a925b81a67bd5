//! `urlmirror count` – precount a URL list.

use anyhow::Result;
use std::path::Path;
use urlmirror_core::line_source;

pub fn run_count(input: &Path) -> Result<()> {
    let count = line_source::count_entries(input)?;
    println!("{}", count);
    Ok(())
}
