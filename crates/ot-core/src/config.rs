//! # Tidy Configuration
//!
//! Per-call settings for the normalizer and populator, and the pure merge
//! that layers a call's [`TidyOverride`] over a base [`TidyConfig`].
//!
//! Field names serialize in camelCase (`dateKeys`, `populateKeys`) so a
//! settings file reads the same as the OpenTrials client documentation.

use std::fmt;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// A leaf key eligible for date coercion.
///
/// Written as plain text for an exact match, or as `/expr/` for a regular
/// expression tested against the key.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum DateKey {
    Exact(String),
    Pattern(Regex),
}

impl DateKey {
    /// Parse the textual form. `/Date$/` is a pattern, `updatedAt` is exact.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s.strip_prefix('/').and_then(|rest| rest.strip_suffix('/')) {
            Some(expr) => Regex::new(expr)
                .map(Self::Pattern)
                .map_err(|source| CoreError::InvalidDateKey {
                    key: s.to_string(),
                    source,
                }),
            None => Ok(Self::Exact(s.to_string())),
        }
    }

    /// Test a leaf key against this entry.
    pub fn matches(&self, key: &str) -> bool {
        match self {
            Self::Exact(exact) => exact == key,
            Self::Pattern(re) => re.is_match(key),
        }
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(s) => f.write_str(s),
            Self::Pattern(re) => write!(f, "/{}/", re.as_str()),
        }
    }
}

impl TryFrom<String> for DateKey {
    type Error = CoreError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<DateKey> for String {
    fn from(key: DateKey) -> Self {
        key.to_string()
    }
}

/// Settings consumed by normalization and population.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TidyConfig {
    /// Rewrite snake_case mapping keys to camelCase.
    pub keys: bool,
    /// Coerce date-keyed leaves to date values.
    pub dates: bool,
    /// Leaf keys eligible for date coercion, tested in order.
    pub date_keys: Vec<DateKey>,
    /// Follow reference objects under `populate_keys`.
    pub populate: bool,
    /// Fields whose sequence values hold reference objects.
    pub populate_keys: Vec<String>,
}

impl Default for TidyConfig {
    fn default() -> Self {
        let mut date_keys = vec![DateKey::Pattern(date_suffix_pattern())];
        date_keys.extend(
            ["createdAt", "updatedAt", "metaCreated", "metaUpdated"]
                .into_iter()
                .map(|k| DateKey::Exact(k.to_string())),
        );
        Self {
            keys: true,
            dates: true,
            date_keys,
            populate: false,
            populate_keys: vec!["records".to_string()],
        }
    }
}

fn date_suffix_pattern() -> Regex {
    Regex::new("Date$").expect("literal pattern compiles")
}

impl TidyConfig {
    /// True if `key` matches any configured date key.
    pub fn is_date_key(&self, key: &str) -> bool {
        self.date_keys.iter().any(|k| k.matches(key))
    }

    /// Layer `over` on top of `self`. Present override fields win;
    /// sequences are replaced as a whole.
    pub fn merge(&self, over: &TidyOverride) -> TidyConfig {
        TidyConfig {
            keys: over.keys.unwrap_or(self.keys),
            dates: over.dates.unwrap_or(self.dates),
            date_keys: over
                .date_keys
                .clone()
                .unwrap_or_else(|| self.date_keys.clone()),
            populate: over.populate.unwrap_or(self.populate),
            populate_keys: over
                .populate_keys
                .clone()
                .unwrap_or_else(|| self.populate_keys.clone()),
        }
    }
}

/// Per-call overrides for [`TidyConfig`]. Absent fields fall back to the base.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TidyOverride {
    pub keys: Option<bool>,
    pub dates: Option<bool>,
    pub date_keys: Option<Vec<DateKey>>,
    pub populate: Option<bool>,
    pub populate_keys: Option<Vec<String>>,
}
