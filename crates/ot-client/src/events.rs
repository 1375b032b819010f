//! Populate notifications.
//!
//! Every client instance owns a broadcast channel. Subscribers receive a
//! [`PopulateEvent::PrePopulate`] before each reference is fetched and a
//! [`PopulateEvent::PostPopulate`] once its resolved document is spliced in.
//!
//! Sending never waits on subscribers: a slow receiver lags and loses the
//! oldest events, it cannot throttle population.

use ot_core::Document;
use tokio::sync::broadcast;

/// Buffered events per subscriber before the oldest are dropped.
pub const EVENT_CAPACITY: usize = 256;

/// A populate lifecycle notification.
#[derive(Debug, Clone, PartialEq)]
pub enum PopulateEvent {
    /// A reference object is about to be fetched.
    PrePopulate { reference: Document },
    /// A reference object was replaced by its resolved document.
    PostPopulate {
        reference: Document,
        resolved: Document,
    },
}

pub(crate) fn channel() -> broadcast::Sender<PopulateEvent> {
    broadcast::channel(EVENT_CAPACITY).0
}

/// Broadcast an event. Having no subscribers is not an error.
pub(crate) fn emit(sender: &broadcast::Sender<PopulateEvent>, event: PopulateEvent) {
    let _ = sender.send(event);
}
