//! OpenTrials client error types.

/// Errors from OpenTrials API calls and record population.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// HTTP transport error.
    #[error("HTTP error calling {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    /// The API returned a non-2xx status.
    #[error("OpenTrials API {url} returned {status}: {body}")]
    Status {
        url: String,
        status: u16,
        body: String,
    },

    /// Response body was not valid JSON.
    #[error("failed to deserialize response from {url}: {source}")]
    Deserialization { url: String, source: reqwest::Error },

    /// The response body carried an `error` field.
    #[error("OpenTrials API {url} reported an error: {message}")]
    Remote { url: String, message: String },

    /// A count query came back without its total.
    #[error("no count found in response: missing `{field}`")]
    MissingCount { field: String },

    /// A URL template referenced a parameter that was not supplied.
    #[error("URL template {template:?} references unknown parameter {placeholder:?}")]
    Template {
        template: String,
        placeholder: String,
    },

    /// A rendered URL did not parse.
    #[error("invalid URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    /// Normalizer configuration error.
    #[error(transparent)]
    Core(#[from] ot_core::CoreError),
}
