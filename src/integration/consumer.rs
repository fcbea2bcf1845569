//! Inbound bridge from the message queue to the router.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use tracing::{debug, error};

use super::event::IntegrationEvent;
use super::hub::USER_DESTINATION;
use super::router::MessageRouter;
use crate::transport::{PayloadListener, QueueTransport, TransportError};

/// What happened to one received payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsumeOutcome {
    /// Decoded and routed; `subscribers` handlers ran successfully.
    Dispatched { subscribers: usize },
    /// Not a valid integration event envelope.
    Poisoned,
    /// A subscriber returned an error.
    HandlerFailed,
    /// A subscriber panicked.
    HandlerPanicked,
}

/// Decodes text payloads and routes them. Nothing received here is allowed
/// to propagate back into the transport: every failure ends as a log line.
#[derive(Debug, Clone)]
pub struct MessageConsumer {
    router: Arc<MessageRouter>,
}

impl MessageConsumer {
    pub fn new(router: Arc<MessageRouter>) -> Self {
        Self { router }
    }

    /// Register this consumer as a listener for [`USER_DESTINATION`].
    pub fn listen(self: &Arc<Self>, transport: &dyn QueueTransport) -> Result<(), TransportError> {
        transport.register_listener(USER_DESTINATION, self.clone())
    }

    pub fn receive(&self, payload: &str) -> ConsumeOutcome {
        let event = match IntegrationEvent::from_json(payload) {
            Ok(event) => event,
            Err(err) => {
                error!(payload, error = %err, "discarding malformed integration event");
                return ConsumeOutcome::Poisoned;
            }
        };

        let routed = panic::catch_unwind(AssertUnwindSafe(|| self.router.dispatch(&event)));

        match routed {
            Ok(Ok(subscribers)) => {
                debug!(event_type = event.event_type(), subscribers, "integration event consumed");
                ConsumeOutcome::Dispatched { subscribers }
            }
            Ok(Err(err)) => {
                error!(
                    event_type = event.event_type(),
                    payload,
                    error = %err,
                    "integration event subscriber failed"
                );
                ConsumeOutcome::HandlerFailed
            }
            Err(panic) => {
                error!(
                    event_type = event.event_type(),
                    payload,
                    panic = panic_message(panic.as_ref()),
                    "integration event subscriber panicked"
                );
                ConsumeOutcome::HandlerPanicked
            }
        }
    }
}

impl PayloadListener for MessageConsumer {
    fn on_payload(&self, payload: &str) {
        self.receive(payload);
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(message) = panic.downcast_ref::<&'static str>() {
        message
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.as_str()
    } else {
        "unknown panic"
    }
}
