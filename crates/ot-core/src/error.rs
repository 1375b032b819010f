//! # Error Types
//!
//! Normalization itself is total and has no error path. The only fallible
//! operation in this crate is building a configuration from text.

use thiserror::Error;

/// Errors raised while building normalizer configuration.
#[derive(Error, Debug)]
pub enum CoreError {
    /// A `/pattern/` date key did not compile as a regular expression.
    #[error("invalid date key pattern {key:?}: {source}")]
    InvalidDateKey {
        /// The date key as written, including the surrounding slashes.
        key: String,
        /// The underlying regex compilation error.
        source: regex::Error,
    },
}
