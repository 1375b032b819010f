//! # Transport: JSON over HTTP GET
//!
//! The populator and the request wrappers only ever need "GET this URL and
//! give me the JSON body". [`Transport`] captures exactly that, so tests can
//! swap in an in-memory stub and production uses [`HttpTransport`].
//!
//! One attempt per call. Retry policy belongs to the caller.

use std::future::Future;
use std::time::Duration;

use serde_json::Value;

use crate::error::ClientError;

/// Fetches a JSON document from a URL.
///
/// Implementations must be `Send + Sync` so one transport can serve every
/// concurrent fetch of a populate pass behind an `Arc`.
pub trait Transport: Send + Sync {
    /// GET `url` and decode the body as JSON.
    fn get_json(&self, url: &str) -> impl Future<Output = Result<Value, ClientError>> + Send;
}

/// `reqwest`-backed transport.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: reqwest::Client,
}

impl HttpTransport {
    /// Build a transport with the given request timeout.
    pub fn new(timeout_secs: u64) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .default_headers({
                let mut headers = reqwest::header::HeaderMap::new();
                headers.insert(
                    reqwest::header::ACCEPT,
                    reqwest::header::HeaderValue::from_static("application/json"),
                );
                headers
            })
            .build()
            .map_err(|e| ClientError::Http {
                url: "client_init".into(),
                source: e,
            })?;
        Ok(Self { http })
    }
}

impl Transport for HttpTransport {
    async fn get_json(&self, url: &str) -> Result<Value, ClientError> {
        tracing::debug!(url, "GET");

        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| ClientError::Http {
                url: url.to_string(),
                source: e,
            })?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(ClientError::Status {
                url: url.to_string(),
                status,
                body,
            });
        }

        resp.json().await.map_err(|e| ClientError::Deserialization {
            url: url.to_string(),
            source: e,
        })
    }
}
