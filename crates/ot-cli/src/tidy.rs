//! # Tidy Subcommand
//!
//! Normalizes a local JSON document (an API response saved to disk) with
//! the same rules the client applies to live responses. No network access:
//! population is never attempted here.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use ot_client::ClientConfig;
use ot_core::{normalize, Document, TidyOverride};

/// Arguments for the `ot tidy` subcommand.
#[derive(Args, Debug)]
pub struct TidyArgs {
    /// Path to a JSON document.
    #[arg(value_name = "JSON_FILE")]
    pub file: PathBuf,

    /// Keep snake_case keys.
    #[arg(long)]
    pub no_keys: bool,

    /// Keep date strings as strings.
    #[arg(long)]
    pub no_dates: bool,
}

/// Execute the tidy subcommand.
pub fn run_tidy(args: &TidyArgs, config: &ClientConfig) -> Result<u8> {
    let over = TidyOverride {
        keys: args.no_keys.then_some(false),
        dates: args.no_dates.then_some(false),
        ..Default::default()
    };
    let doc = tidy_file(&args.file, &config.tidy.merge(&over))?;
    crate::print_json(&doc)?;
    Ok(0)
}

/// Read and normalize a JSON file.
pub fn tidy_file(path: &Path, config: &ot_core::TidyConfig) -> Result<Document> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read document: {}", path.display()))?;
    let doc: Document = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse document: {}", path.display()))?;
    tracing::debug!(path = %path.display(), "normalizing local document");
    Ok(normalize(doc, config))
}
