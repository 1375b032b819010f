//! # ot-client -- Typed Rust client for the OpenTrials API
//!
//! Fetches trial records and returns them tidied:
//! - keys rewritten from `snake_case` to `camelCase`;
//! - date-keyed leaves coerced to date values;
//! - optionally, reference objects (`{"url": ...}`) under configured keys
//!   fetched, tidied and spliced in place, recursively.
//!
//! ## Architecture
//!
//! [`TrialsClient`] owns an immutable base [`ClientConfig`], a
//! [`Transport`] and a broadcast channel of [`PopulateEvent`]s. Every call
//! takes a [`ConfigOverride`] which is merged over the base configuration
//! for that call only.
//!
//! ```text
//! raw JSON ─► normalize ─► (populate?) ─► fetch refs ─► tidy each ─► splice
//!                                   ▲                       │
//!                                   └─────── recursive ─────┘
//! ```
//!
//! ## Concurrency
//!
//! Sibling references under one populate key are fetched concurrently, up
//! to `max_concurrency` at a time. Keys are processed in order, each one
//! fully settled before the next starts. The first error aborts the call.

pub mod config;
pub mod error;
pub mod events;
pub mod populate;
pub mod templating;
pub mod transport;
pub mod trials;

pub use config::{ClientConfig, ConfigOverride};
pub use error::ClientError;
pub use events::PopulateEvent;
pub use ot_core::{DateValue, Document, TidyConfig, TidyOverride};
pub use transport::{HttpTransport, Transport};

use std::sync::Arc;

use tokio::sync::broadcast;

/// OpenTrials client: request wrappers plus the tidy/populate engine.
pub struct TrialsClient<T: Transport = HttpTransport> {
    config: ClientConfig,
    transport: Arc<T>,
    events: broadcast::Sender<PopulateEvent>,
}

impl TrialsClient<HttpTransport> {
    /// Create a client that talks HTTP.
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let transport = HttpTransport::new(config.timeout_secs)?;
        Ok(Self::with_transport(config, transport))
    }
}

impl<T: Transport> TrialsClient<T> {
    /// Create a client over any transport.
    pub fn with_transport(config: ClientConfig, transport: T) -> Self {
        Self {
            config,
            transport: Arc::new(transport),
            events: events::channel(),
        }
    }

    /// A fresh, independent instance: default configuration, no
    /// subscribers. Shares only the transport.
    pub fn new_instance(&self) -> Self {
        Self {
            config: ClientConfig::default(),
            transport: Arc::clone(&self.transport),
            events: events::channel(),
        }
    }

    /// The base configuration every call is merged over.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Mutable access to the base configuration.
    pub fn config_mut(&mut self) -> &mut ClientConfig {
        &mut self.config
    }

    /// The transport shared by this instance and its [`new_instance`]s.
    ///
    /// [`new_instance`]: TrialsClient::new_instance
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Subscribe to populate events for every later call on this instance.
    pub fn subscribe(&self) -> broadcast::Receiver<PopulateEvent> {
        self.events.subscribe()
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.events.receiver_count()
    }
}

impl<T: Transport> std::fmt::Debug for TrialsClient<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrialsClient")
            .field("config", &self.config)
            .field("subscribers", &self.events.receiver_count())
            .finish_non_exhaustive()
    }
}
