//! Queue transport interface consumed by the integration bridge.

use std::sync::Arc;

use thiserror::Error;

/// Error type for transport operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// Connection to the broker failed.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),
    /// The broker rejected the message.
    #[error("message rejected: {0}")]
    Rejected(String),
    /// Timed out waiting for the broker.
    #[error("transport timeout")]
    Timeout,
    #[error("transport lock poisoned during {0}")]
    LockPoisoned(&'static str),
}

/// Receives raw payloads pushed by a transport.
///
/// Implementations are invoked on the transport's listener thread and must not
/// let errors escape; there is nothing the transport could do with them.
pub trait PayloadListener: Send + Sync {
    fn on_payload(&self, payload: &str);
}

/// A message queue reachable through named destinations.
///
/// Publishing is point-to-point onto one destination. Delivery is push based:
/// every listener registered for a destination is called with each payload
/// published to it.
pub trait QueueTransport: Send + Sync {
    /// Send a payload to a destination. May block on I/O.
    fn publish(&self, destination: &str, payload: &str) -> Result<(), TransportError>;

    /// Register a listener for payloads arriving on `destination`.
    fn register_listener(
        &self,
        destination: &str,
        listener: Arc<dyn PayloadListener>,
    ) -> Result<(), TransportError>;
}
