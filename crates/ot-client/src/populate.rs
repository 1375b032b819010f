//! # Tidy and Populate
//!
//! `tidy` normalizes a document and, when `tidy.populate` is set, expands
//! it. Expansion walks `tidy.populate_keys` in order. For each key holding
//! a sequence, every element with a string `url` field is fetched, tidied
//! (which recurses into its own references) and written back at the same
//! index. Elements without a `url` are left alone.
//!
//! ## Ordering and failure
//!
//! - Fetches for one key run concurrently, bounded by `max_concurrency`.
//! - Each key is a barrier: all of its fetches settle before the next key.
//! - Each resolved element is spliced in, and its `PostPopulate` sent, as
//!   soon as its own fetch completes, without waiting for slower siblings.
//! - The first failing fetch aborts the whole call. In-flight siblings are
//!   dropped; siblings that already resolved have had their events sent.
//!
//! Reference cycles between remote documents are not detected; a document
//! that transitively references itself will be expanded until the remote
//! side stops answering.

use futures_util::future::BoxFuture;
use futures_util::{stream, FutureExt, StreamExt, TryStreamExt};
use ot_core::Document;
use serde_json::Value;

use crate::config::{ClientConfig, ConfigOverride};
use crate::error::ClientError;
use crate::events::{self, PopulateEvent};
use crate::transport::Transport;
use crate::TrialsClient;

/// A followable element of a populate sequence.
struct Reference {
    index: usize,
    original: Document,
    url: String,
}

impl<T: Transport> TrialsClient<T> {
    /// Normalize without population. Synchronous; performs no I/O.
    pub fn normalize(&self, doc: Document, over: &ConfigOverride) -> Document {
        let config = self.config.merge(over);
        ot_core::normalize(doc, &config.tidy)
    }

    /// Normalize, then populate if `tidy.populate` is set.
    pub async fn tidy(&self, doc: Document, over: &ConfigOverride) -> Result<Document, ClientError> {
        let config = self.config.merge(over);
        self.tidy_with(doc, &config).await
    }

    /// Expand reference objects under the configured populate keys.
    ///
    /// Emits [`PopulateEvent::PrePopulate`] before each fetch and
    /// [`PopulateEvent::PostPopulate`] after each splice.
    pub async fn populate(
        &self,
        doc: Document,
        over: &ConfigOverride,
    ) -> Result<Document, ClientError> {
        let config = self.config.merge(over);
        self.populate_with(doc, &config).await
    }

    pub(crate) fn tidy_with<'a>(
        &'a self,
        doc: Document,
        config: &'a ClientConfig,
    ) -> BoxFuture<'a, Result<Document, ClientError>> {
        async move {
            let tidied = ot_core::normalize(doc, &config.tidy);
            if !config.tidy.populate {
                return Ok(tidied);
            }
            self.populate_with(tidied, config).await
        }
        .boxed()
    }

    async fn populate_with(
        &self,
        mut doc: Document,
        config: &ClientConfig,
    ) -> Result<Document, ClientError> {
        for key in &config.tidy.populate_keys {
            let references = match doc.get(key) {
                None => continue,
                Some(Document::Sequence(items)) => followable(items),
                Some(_) => {
                    tracing::warn!(key = %key, "populate key does not hold a sequence, skipping");
                    continue;
                }
            };
            tracing::debug!(key = %key, references = references.len(), "populating");

            let pending: Vec<_> = references
                .into_iter()
                .map(|reference| self.resolve(reference, config))
                .collect();
            let mut resolved =
                stream::iter(pending).buffer_unordered(config.max_concurrency.max(1));

            while let Some((reference, document)) = resolved.try_next().await? {
                let Some(Document::Sequence(items)) = doc.get_mut(key) else {
                    continue;
                };
                let Some(slot) = items.get_mut(reference.index) else {
                    continue;
                };
                *slot = document;
                if self.events.receiver_count() > 0 {
                    events::emit(
                        &self.events,
                        PopulateEvent::PostPopulate {
                            reference: reference.original,
                            resolved: slot.clone(),
                        },
                    );
                }
            }
        }
        Ok(doc)
    }

    async fn resolve(
        &self,
        reference: Reference,
        config: &ClientConfig,
    ) -> Result<(Reference, Document), ClientError> {
        if self.events.receiver_count() > 0 {
            events::emit(
                &self.events,
                PopulateEvent::PrePopulate {
                    reference: reference.original.clone(),
                },
            );
        }

        let body = self.fetch(&reference.url).await?;
        let resolved = self.tidy_with(Document::from(body), config).await?;
        Ok((reference, resolved))
    }

    /// GET a URL and reject bodies that carry an `error` field.
    pub(crate) async fn fetch(&self, url: &str) -> Result<Value, ClientError> {
        let body = self.transport.get_json(url).await?;
        if let Some(message) = body.get("error").and_then(error_message) {
            return Err(ClientError::Remote {
                url: url.to_string(),
                message,
            });
        }
        Ok(body)
    }
}

fn followable(items: &[Document]) -> Vec<Reference> {
    items
        .iter()
        .enumerate()
        .filter_map(|(index, item)| {
            let url = item.get("url")?.as_str()?;
            Some(Reference {
                index,
                original: item.clone(),
                url: url.to_string(),
            })
        })
        .collect()
}

/// Text of a truthy `error` field. `null`, `false`, `0` and `""` do not
/// count as errors.
fn error_message(value: &Value) -> Option<String> {
    match value {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.is_empty() => None,
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
