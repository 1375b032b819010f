//! URL templates with `{{name}}` placeholders.
//!
//! The default endpoints are written as templates, e.g.
//! `https://api.opentrials.net/v1/trials/{{trial}}`. Rendering substitutes
//! each placeholder with its percent-encoded value and parses the result.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::ClientError;

/// A URL pattern with `{{name}}` placeholders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UrlTemplate(String);

impl UrlTemplate {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self(pattern.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Render the template against `params`.
    ///
    /// Values are percent-encoded; spaces become `%20` so the same encoding
    /// is valid in both path and query positions. An unterminated `{{` is
    /// copied literally.
    pub fn render(&self, params: &[(&str, &str)]) -> Result<Url, ClientError> {
        let mut out = String::with_capacity(self.0.len());
        let mut rest = self.0.as_str();

        while let Some(start) = rest.find("{{") {
            let Some(len) = rest[start + 2..].find("}}") else {
                break;
            };
            out.push_str(&rest[..start]);

            let name = rest[start + 2..start + 2 + len].trim();
            let value = params
                .iter()
                .find(|(k, _)| *k == name)
                .map(|(_, v)| *v)
                .ok_or_else(|| ClientError::Template {
                    template: self.0.clone(),
                    placeholder: name.to_string(),
                })?;
            out.push_str(&encode(value));

            rest = &rest[start + 2 + len + 2..];
        }
        out.push_str(rest);

        Url::parse(&out).map_err(|e| ClientError::InvalidUrl {
            url: out.clone(),
            reason: e.to_string(),
        })
    }
}

fn encode(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}
