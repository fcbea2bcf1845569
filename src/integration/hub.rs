//! Outbound bridge from integration events to the message queue.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, error};

use super::event::IntegrationEvent;
use crate::transport::{QueueTransport, TransportError};

/// Destination every integration event is sent to.
pub const USER_DESTINATION: &str = "User";

#[derive(Debug, Error)]
pub enum EventHubError {
    #[error("could not serialize integration event: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Outbound bridge: serializes integration events and hands them to the
/// message queue transport.
#[derive(Clone)]
pub struct EventHub {
    transport: Arc<dyn QueueTransport>,
}

impl EventHub {
    pub fn new(transport: Arc<dyn QueueTransport>) -> Self {
        Self { transport }
    }

    /// Send `event` to [`USER_DESTINATION`] as a JSON text payload.
    ///
    /// Transport failures are returned as-is; nothing is retried here.
    pub fn send(&self, event: &IntegrationEvent) -> Result<(), EventHubError> {
        let payload = event.to_json()?;

        match self.transport.publish(USER_DESTINATION, &payload) {
            Ok(()) => {
                debug!(
                    event_type = event.event_type(),
                    destination = USER_DESTINATION,
                    "integration event sent"
                );
                Ok(())
            }
            Err(err) => {
                error!(
                    event_type = event.event_type(),
                    destination = USER_DESTINATION,
                    error = %err,
                    "integration event could not be sent"
                );
                Err(err.into())
            }
        }
    }
}

impl fmt::Debug for EventHub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventHub")
            .field("destination", &USER_DESTINATION)
            .finish_non_exhaustive()
    }
}
