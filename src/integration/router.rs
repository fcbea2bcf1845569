//! Type-string routing of integration events to local subscribers.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use thiserror::Error;
use tracing::trace;

use super::event::IntegrationEvent;
use super::subscriber::{MessageError, MessageSubscriber};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("subscriber for {event_type} failed: {source}")]
pub struct RoutingError {
    pub event_type: String,
    #[source]
    pub source: MessageError,
}

/// Fans incoming integration events out to subscribers by type string.
///
/// Unlike the domain dispatcher there is no reentrancy guard and no scoping:
/// dispatch runs on whatever thread the transport calls from, and several
/// dispatches may run at once. The subscriber list is append-only.
#[derive(Default)]
pub struct MessageRouter {
    subscribers: RwLock<Vec<Arc<dyn MessageSubscriber>>>,
}

impl MessageRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a subscriber. No deduplication.
    pub fn register(&self, subscriber: Arc<dyn MessageSubscriber>) {
        self.subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(subscriber);
    }

    /// Call `on_receive` on every subscriber whose type equals the event type.
    ///
    /// Returns how many subscribers were invoked, or the first failure.
    pub fn dispatch(&self, event: &IntegrationEvent) -> Result<usize, RoutingError> {
        let matching: Vec<Arc<dyn MessageSubscriber>> = self
            .subscribers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|subscriber| subscriber.subscribed_type() == event.event_type())
            .cloned()
            .collect();

        trace!(
            event_type = event.event_type(),
            subscribers = matching.len(),
            "routing integration event"
        );

        for subscriber in &matching {
            subscriber
                .on_receive(event)
                .map_err(|source| RoutingError {
                    event_type: event.event_type().to_string(),
                    source,
                })?;
        }

        Ok(matching.len())
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl fmt::Debug for MessageRouter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageRouter")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}
