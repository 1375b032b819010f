//! # ot-cli: OpenTrials Command-Line Interface
//!
//! ## Subcommands
//!
//! - `get`: fetch one trial by ID
//! - `search`: fetch one page of search results
//! - `count`: count the hits for a query
//! - `tidy`: normalize a local JSON document without any network access
//!
//! Output is pretty-printed JSON on stdout. Logs go to stderr.
//!
//! ## Crate Policy
//!
//! - Argument parsing is separated from the handlers.
//! - Handlers delegate to `ot-client` / `ot-core`; no record logic here.

pub mod fetch;
pub mod settings;
pub mod tidy;

use std::io::Write;

use anyhow::{Context, Result};
use serde::Serialize;

/// Write a value to stdout as pretty JSON followed by a newline.
pub fn print_json(value: &impl Serialize) -> Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    serde_json::to_writer_pretty(&mut out, value).context("failed to write JSON to stdout")?;
    writeln!(out).context("failed to write to stdout")?;
    Ok(())
}
