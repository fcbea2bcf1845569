//! Message queue transport.
//!
//! The integration bridge depends only on the [`QueueTransport`] and
//! [`PayloadListener`] traits. A broker client (JMS, AMQP, Kafka, ...)
//! implements them outside this crate; [`InMemoryQueue`] and
//! [`DeliveryThread`] cover tests and single-process setups.

mod delivery_thread;
mod in_memory_queue;
mod transport;

pub use delivery_thread::{DeliveryStats, DeliveryThread};
pub use in_memory_queue::{InMemoryQueue, DEFAULT_CAPACITY};
pub use transport::{PayloadListener, QueueTransport, TransportError};
