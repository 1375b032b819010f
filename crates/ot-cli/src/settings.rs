//! Loading per-call settings from a JSON file (`--config`).

use std::path::Path;

use anyhow::{Context, Result};
use ot_client::ConfigOverride;

/// Read a [`ConfigOverride`] from `path`, or the empty override when no
/// file was given.
pub fn load_override(path: Option<&Path>) -> Result<ConfigOverride> {
    let Some(path) = path else {
        return Ok(ConfigOverride::default());
    };
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read settings file: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("failed to parse settings file: {}", path.display()))
}
