//! Integration events between bounded contexts.
//!
//! ```text
//!  directive ── EventHub::send ──► QueueTransport ("User")
//!                                        │
//!                                        ▼
//!                   MessageConsumer::receive ── MessageRouter::dispatch ──► MessageSubscriber
//! ```

mod consumer;
mod event;
mod hub;
mod router;
mod subscriber;

pub use consumer::{ConsumeOutcome, MessageConsumer};
pub use event::{IntegrationEvent, IntegrationEventError};
pub use hub::{EventHub, EventHubError, USER_DESTINATION};
pub use router::{MessageRouter, RoutingError};
pub use subscriber::{ensure_type, required, MessageError, MessageSubscriber};
