//! Request wrappers for the OpenTrials API.
//!
//! | Method | Endpoint template | Operation |
//! |--------|-------------------|-----------|
//! | GET    | `urls.get`    (`{{trial}}`) | [`TrialsClient::get`] |
//! | GET    | `urls.search` (`{{search}}`, `{{page}}`, `{{pageLimit}}`) | [`TrialsClient::search`], [`TrialsClient::count`] |
//!
//! Each wrapper renders its template, fetches, rejects bodies with an
//! `error` field and hands the result to the tidy pipeline unless
//! `rawResponse` is set.

use futures_util::{stream, StreamExt, TryStreamExt};
use ot_core::Document;
use serde_json::Value;

use crate::config::{ClientConfig, ConfigOverride};
use crate::error::ClientError;
use crate::transport::Transport;
use crate::TrialsClient;

/// Field of a search response carrying the total number of hits.
const TOTAL_COUNT_FIELD: &str = "total_count";

/// Field of a search response carrying the page of results.
const ITEMS_FIELD: &str = "items";

/// Page size used when only the total is wanted.
const COUNT_PAGE_LIMIT: u32 = 10;

impl<T: Transport> TrialsClient<T> {
    /// Fetch one trial by ID, e.g. `4cd4011e-8caf-11e6-be70-0242ac12000f`.
    pub async fn get(&self, trial: &str, over: &ConfigOverride) -> Result<Document, ClientError> {
        let config = self.config.merge(over);
        let url = config.urls.get.render(&[("trial", trial)])?;

        let body = self.fetch(url.as_str()).await?;
        if config.raw_response {
            return Ok(Document::from(body));
        }
        self.tidy_with(Document::from(body), &config).await
    }

    /// Search trials. Returns the tidied `items` of the requested page in
    /// response order.
    ///
    /// With `rawResponse` set the whole response body is returned as the
    /// only element.
    pub async fn search(
        &self,
        query: &str,
        over: &ConfigOverride,
    ) -> Result<Vec<Document>, ClientError> {
        let config = self.config.merge(over);
        let mut body = self.search_body(query, &config).await?;
        if config.raw_response {
            return Ok(vec![Document::from(body)]);
        }

        let items = match body.get_mut(ITEMS_FIELD).map(Value::take) {
            Some(Value::Array(items)) => items,
            _ => {
                tracing::debug!(query, "search response has no items");
                return Ok(Vec::new());
            }
        };

        let pending: Vec<_> = items
            .into_iter()
            .map(|item| self.tidy_with(Document::from(item), &config))
            .collect();
        stream::iter(pending)
            .buffered(config.max_concurrency.max(1))
            .try_collect()
            .await
    }

    /// Count the hits for a query.
    pub async fn count(&self, query: &str, over: &ConfigOverride) -> Result<u64, ClientError> {
        let mut config = self.config.merge(over);
        config.raw_response = true;
        config.page_limit = COUNT_PAGE_LIMIT;

        let body = self.search_body(query, &config).await?;
        body.get(TOTAL_COUNT_FIELD)
            .and_then(Value::as_u64)
            .ok_or_else(|| ClientError::MissingCount {
                field: TOTAL_COUNT_FIELD.to_string(),
            })
    }

    async fn search_body(&self, query: &str, config: &ClientConfig) -> Result<Value, ClientError> {
        let page = config.page.to_string();
        let page_limit = config.page_limit.to_string();
        let url = config.urls.search.render(&[
            ("search", query),
            ("page", page.as_str()),
            ("pageLimit", page_limit.as_str()),
        ])?;
        self.fetch(url.as_str()).await
    }
}
