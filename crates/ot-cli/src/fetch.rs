//! # Fetch Subcommands
//!
//! `get`, `search` and `count` against the configured OpenTrials API.
//! Each handler turns its flags into a per-call [`ConfigOverride`], calls
//! the client and prints the result.

use anyhow::{Context, Result};
use clap::Args;
use ot_client::{ConfigOverride, TrialsClient};

/// Arguments for the `ot get` subcommand.
#[derive(Args, Debug)]
pub struct GetArgs {
    /// Trial identifier.
    #[arg(value_name = "TRIAL_ID")]
    pub trial: String,

    /// Replace record references with the fetched records.
    #[arg(long)]
    pub populate: bool,

    /// Print the API response without normalization.
    #[arg(long)]
    pub raw: bool,
}

/// Arguments for the `ot search` subcommand.
#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Search query.
    #[arg(value_name = "QUERY")]
    pub query: String,

    /// Page number (1-based).
    #[arg(long)]
    pub page: Option<u32>,

    /// Results per page.
    #[arg(long)]
    pub page_limit: Option<u32>,

    /// Replace record references with the fetched records.
    #[arg(long)]
    pub populate: bool,

    /// Print the API response without normalization.
    #[arg(long)]
    pub raw: bool,
}

/// Arguments for the `ot count` subcommand.
#[derive(Args, Debug)]
pub struct CountArgs {
    /// Search query.
    #[arg(value_name = "QUERY")]
    pub query: String,
}

/// Flags only ever switch features on; absent flags leave the
/// configured value alone.
fn flag_override(populate: bool, raw: bool) -> ConfigOverride {
    let mut over = ConfigOverride::default();
    if populate {
        over = over.with_populate(true);
    }
    if raw {
        over = over.with_raw_response(true);
    }
    over
}

fn search_override(args: &SearchArgs) -> ConfigOverride {
    ConfigOverride {
        page: args.page,
        page_limit: args.page_limit,
        ..flag_override(args.populate, args.raw)
    }
}

/// Execute the get subcommand.
pub async fn run_get(args: &GetArgs, client: &TrialsClient) -> Result<u8> {
    let over = flag_override(args.populate, args.raw);
    let trial = client
        .get(&args.trial, &over)
        .await
        .with_context(|| format!("failed to fetch trial {}", args.trial))?;
    crate::print_json(&trial)?;
    Ok(0)
}

/// Execute the search subcommand.
pub async fn run_search(args: &SearchArgs, client: &TrialsClient) -> Result<u8> {
    let items = client
        .search(&args.query, &search_override(args))
        .await
        .with_context(|| format!("search failed for query {:?}", args.query))?;
    tracing::info!(results = items.len(), "search complete");
    crate::print_json(&items)?;
    Ok(0)
}

/// Execute the count subcommand.
pub async fn run_count(args: &CountArgs, client: &TrialsClient) -> Result<u8> {
    let total = client
        .count(&args.query, &ConfigOverride::default())
        .await
        .with_context(|| format!("count failed for query {:?}", args.query))?;
    crate::print_json(&total)?;
    Ok(0)
}
