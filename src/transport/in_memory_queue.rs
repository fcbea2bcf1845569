//! In-memory queue for tests and single-process deployments.

use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::{Arc, Mutex, RwLock};
use std::time::{Duration, Instant};

use tracing::{trace, warn};

use super::transport::{PayloadListener, QueueTransport, TransportError};

/// Unconsumed payloads a destination holds before `publish` rejects more.
pub const DEFAULT_CAPACITY: usize = 100;

type Listeners = HashMap<String, Vec<Arc<dyn PayloadListener>>>;

#[derive(Default)]
struct Channel {
    pending: VecDeque<String>,
    /// Most recent payloads, consumed or not, capped at the queue capacity.
    history: VecDeque<String>,
}

/// In-memory, thread-safe queue implementing [`QueueTransport`].
///
/// Features:
/// - Cheap to clone; clones share the same storage
/// - Bounded: each destination holds at most `capacity` unconsumed payloads,
///   further publishes fail with [`TransportError::Rejected`]
/// - Point-to-point: each payload is consumed once, either by `poll` or by
///   delivery to the destination's listeners, and is dropped afterwards
/// - Delivery happens on whichever thread calls [`deliver_pending`](Self::deliver_pending)
///   (see [`DeliveryThread`](super::DeliveryThread) for a background listener)
///
/// ```
/// use domain_messaging::transport::{InMemoryQueue, QueueTransport};
///
/// let queue = InMemoryQueue::new();
/// queue.publish("User", r#"{"type":"userActivated","content":{}}"#).unwrap();
///
/// assert_eq!(queue.len(), 1);
/// let payload = queue.poll("User", 10).unwrap();
/// assert!(payload.is_some());
/// assert!(queue.is_empty());
/// ```
#[derive(Clone)]
pub struct InMemoryQueue {
    channels: Arc<Mutex<HashMap<String, Channel>>>,
    listeners: Arc<RwLock<Listeners>>,
    capacity: usize,
}

impl Default for InMemoryQueue {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl InMemoryQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// A queue holding at most `capacity` unconsumed payloads per destination
    /// (at least one).
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            channels: Arc::default(),
            listeners: Arc::default(),
            capacity: capacity.max(1),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Take the next unconsumed payload of `destination`, waiting up to
    /// `timeout_ms` for one to arrive.
    pub fn poll(&self, destination: &str, timeout_ms: u64) -> Result<Option<String>, TransportError> {
        let deadline = Instant::now() + Duration::from_millis(timeout_ms);

        loop {
            if let Some(payload) = self.take_pending(destination, 1)?.pop() {
                return Ok(Some(payload));
            }

            if Instant::now() >= deadline {
                return Ok(None);
            }

            std::thread::sleep(Duration::from_millis(1));
        }
    }

    /// Deliver every unconsumed payload to the listeners of its destination,
    /// on the calling thread. Destinations without listeners keep their
    /// payloads. Returns the number of payloads delivered.
    pub fn deliver_pending(&self) -> Result<usize, TransportError> {
        let targets: Vec<(String, Vec<Arc<dyn PayloadListener>>)> = self
            .listeners
            .read()
            .map_err(|_| TransportError::LockPoisoned("deliver_pending"))?
            .iter()
            .filter(|(_, listeners)| !listeners.is_empty())
            .map(|(destination, listeners)| (destination.clone(), listeners.clone()))
            .collect();

        let mut delivered = 0;
        for (destination, listeners) in targets {
            for payload in self.take_pending(&destination, usize::MAX)? {
                trace!(destination = %destination, "delivering payload");
                for listener in &listeners {
                    listener.on_payload(&payload);
                }
                delivered += 1;
            }
        }
        Ok(delivered)
    }

    /// The most recent payloads published to `destination`, consumed or not,
    /// oldest first. At most `capacity` are kept.
    pub fn messages(&self, destination: &str) -> Vec<String> {
        self.channels
            .lock()
            .map(|channels| {
                channels
                    .get(destination)
                    .map(|channel| channel.history.iter().cloned().collect())
                    .unwrap_or_default()
            })
            .unwrap_or_default()
    }

    /// Number of payloads of `destination` not consumed yet.
    pub fn pending(&self, destination: &str) -> usize {
        self.channels
            .lock()
            .map(|channels| channels.get(destination).map_or(0, |channel| channel.pending.len()))
            .unwrap_or(0)
    }

    /// Total number of unconsumed payloads across all destinations.
    pub fn len(&self) -> usize {
        self.channels
            .lock()
            .map(|channels| channels.values().map(|channel| channel.pending.len()).sum())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop all payloads and history. Listeners stay registered.
    pub fn clear(&self) {
        if let Ok(mut channels) = self.channels.lock() {
            channels.clear();
        }
    }

    fn take_pending(&self, destination: &str, max: usize) -> Result<Vec<String>, TransportError> {
        let mut channels = self
            .channels
            .lock()
            .map_err(|_| TransportError::LockPoisoned("take pending"))?;

        let Some(channel) = channels.get_mut(destination) else {
            return Ok(Vec::new());
        };
        let count = channel.pending.len().min(max);
        Ok(channel.pending.drain(..count).collect())
    }
}

impl QueueTransport for InMemoryQueue {
    fn publish(&self, destination: &str, payload: &str) -> Result<(), TransportError> {
        let mut channels = self
            .channels
            .lock()
            .map_err(|_| TransportError::LockPoisoned("publish"))?;
        let channel = channels.entry(destination.to_string()).or_default();

        if channel.pending.len() >= self.capacity {
            warn!(destination, capacity = self.capacity, "queue full, payload rejected");
            return Err(TransportError::Rejected(format!(
                "destination {destination} is full (capacity {})",
                self.capacity
            )));
        }

        channel.pending.push_back(payload.to_string());
        if channel.history.len() == self.capacity {
            channel.history.pop_front();
        }
        channel.history.push_back(payload.to_string());
        Ok(())
    }

    fn register_listener(
        &self,
        destination: &str,
        listener: Arc<dyn PayloadListener>,
    ) -> Result<(), TransportError> {
        self.listeners
            .write()
            .map_err(|_| TransportError::LockPoisoned("register_listener"))?
            .entry(destination.to_string())
            .or_default()
            .push(listener);
        Ok(())
    }
}

impl fmt::Debug for InMemoryQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemoryQueue")
            .field("len", &self.len())
            .field("capacity", &self.capacity)
            .finish()
    }
}
