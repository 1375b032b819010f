//! OpenTrials client configuration.
//!
//! [`ClientConfig`] is the base configuration an instance is built with.
//! Defaults point at the public OpenTrials API. Override via environment
//! variables, or per call with a [`ConfigOverride`].

use std::str::FromStr;

use ot_core::{TidyConfig, TidyOverride};
use serde::{Deserialize, Serialize};

use crate::templating::UrlTemplate;

/// Default endpoint for fetching one trial.
pub const DEFAULT_GET_URL: &str = "https://api.opentrials.net/v1/trials/{{trial}}";

/// Default endpoint for searching trials.
pub const DEFAULT_SEARCH_URL: &str =
    "https://api.opentrials.net/v1/search?q={{search}}&page={{page}}&per_page={{pageLimit}}";

/// Endpoint templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UrlTemplates {
    /// Single-trial endpoint. Placeholders: `trial`.
    pub get: UrlTemplate,
    /// Search endpoint. Placeholders: `search`, `page`, `pageLimit`.
    pub search: UrlTemplate,
}

impl Default for UrlTemplates {
    fn default() -> Self {
        Self {
            get: UrlTemplate::new(DEFAULT_GET_URL),
            search: UrlTemplate::new(DEFAULT_SEARCH_URL),
        }
    }
}

/// Configuration for an OpenTrials client instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfig {
    /// Normalization and population settings.
    pub tidy: TidyConfig,
    /// Endpoint templates.
    pub urls: UrlTemplates,
    /// Search page, 1-based.
    pub page: u32,
    /// Search results per page.
    pub page_limit: u32,
    /// Return response bodies without tidying.
    pub raw_response: bool,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Upper bound on concurrent fetches for one populate key or one
    /// search page.
    pub max_concurrency: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            tidy: TidyConfig::default(),
            urls: UrlTemplates::default(),
            page: 1,
            page_limit: 10,
            raw_response: false,
            timeout_secs: 30,
            max_concurrency: 16,
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `OPENTRIALS_GET_URL` (default: [`DEFAULT_GET_URL`])
    /// - `OPENTRIALS_SEARCH_URL` (default: [`DEFAULT_SEARCH_URL`])
    /// - `OPENTRIALS_PAGE_LIMIT` (default: 10)
    /// - `OPENTRIALS_TIMEOUT_SECS` (default: 30)
    /// - `OPENTRIALS_MAX_CONCURRENCY` (default: 16)
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            urls: UrlTemplates {
                get: env_template("OPENTRIALS_GET_URL", DEFAULT_GET_URL),
                search: env_template("OPENTRIALS_SEARCH_URL", DEFAULT_SEARCH_URL),
            },
            page_limit: env_number("OPENTRIALS_PAGE_LIMIT", defaults.page_limit)?,
            timeout_secs: env_number("OPENTRIALS_TIMEOUT_SECS", defaults.timeout_secs)?,
            max_concurrency: env_number("OPENTRIALS_MAX_CONCURRENCY", defaults.max_concurrency)?,
            ..defaults
        })
    }

    /// Create a configuration pointing at a local mock server (for testing).
    ///
    /// Paths mirror the public API: `/v1/trials/{id}` and `/v1/search`.
    pub fn local_mock(base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        Self {
            urls: UrlTemplates {
                get: UrlTemplate::new(format!("{base}/v1/trials/{{{{trial}}}}")),
                search: UrlTemplate::new(format!(
                    "{base}/v1/search?q={{{{search}}}}&page={{{{page}}}}&per_page={{{{pageLimit}}}}"
                )),
            },
            timeout_secs: 5,
            ..Self::default()
        }
    }

    /// Layer a per-call override on top of this configuration.
    pub fn merge(&self, over: &ConfigOverride) -> ClientConfig {
        ClientConfig {
            tidy: self.tidy.merge(&over.tidy),
            urls: UrlTemplates {
                get: over.urls.get.clone().unwrap_or_else(|| self.urls.get.clone()),
                search: over
                    .urls
                    .search
                    .clone()
                    .unwrap_or_else(|| self.urls.search.clone()),
            },
            page: over.page.unwrap_or(self.page),
            page_limit: over.page_limit.unwrap_or(self.page_limit),
            raw_response: over.raw_response.unwrap_or(self.raw_response),
            timeout_secs: self.timeout_secs,
            max_concurrency: over.max_concurrency.unwrap_or(self.max_concurrency),
        }
    }
}

/// Per-call endpoint overrides.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UrlOverride {
    pub get: Option<UrlTemplate>,
    pub search: Option<UrlTemplate>,
}

/// Per-call settings. Every absent field falls back to the instance's
/// [`ClientConfig`].
///
/// Deserializes from camelCase JSON, so a settings file looks like:
///
/// ```json
/// { "tidy": { "populate": true }, "pageLimit": 50 }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConfigOverride {
    pub tidy: TidyOverride,
    pub urls: UrlOverride,
    pub page: Option<u32>,
    pub page_limit: Option<u32>,
    pub raw_response: Option<bool>,
    pub max_concurrency: Option<usize>,
}

impl ConfigOverride {
    /// Enable or disable reference population for this call.
    pub fn with_populate(mut self, populate: bool) -> Self {
        self.tidy.populate = Some(populate);
        self
    }

    /// Request the untidied response body.
    pub fn with_raw_response(mut self, raw: bool) -> Self {
        self.raw_response = Some(raw);
        self
    }
}

fn env_template(var: &str, default: &str) -> UrlTemplate {
    UrlTemplate::new(std::env::var(var).unwrap_or_else(|_| default.to_string()))
}

fn env_number<T: FromStr>(var: &str, default: T) -> Result<T, ConfigError> {
    match std::env::var(var) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidNumber(var.to_string(), raw)),
        Err(_) => Ok(default),
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid number for {0}: {1:?}")]
    InvalidNumber(String, String),
}
