//! Background listener thread for an [`InMemoryQueue`].

use std::sync::mpsc::{channel, Sender, TryRecvError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::warn;

use super::in_memory_queue::InMemoryQueue;

/// Statistics from the delivery thread.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DeliveryStats {
    /// Payloads handed to listeners.
    pub delivered: usize,
    /// Delivery rounds that failed at the queue level.
    pub errors: usize,
    /// Number of poll cycles completed.
    pub polls: usize,
}

/// A background thread that pushes queued payloads to their listeners,
/// playing the role of a broker's listener container.
///
/// ```ignore
/// let queue = InMemoryQueue::new();
/// consumer.listen(&queue)?;
/// let delivery = DeliveryThread::spawn(queue.clone(), Duration::from_millis(10));
/// // ... publish through an EventHub ...
/// let stats = delivery.stop();
/// ```
pub struct DeliveryThread {
    stop_tx: Sender<()>,
    handle: Option<JoinHandle<DeliveryStats>>,
}

impl DeliveryThread {
    pub fn spawn(queue: InMemoryQueue, poll_interval: Duration) -> Self {
        let (stop_tx, stop_rx) = channel();

        let handle = thread::spawn(move || {
            let mut stats = DeliveryStats::default();

            loop {
                let stopping = match stop_rx.try_recv() {
                    Ok(()) | Err(TryRecvError::Disconnected) => true,
                    Err(TryRecvError::Empty) => false,
                };

                stats.polls += 1;

                match queue.deliver_pending() {
                    Ok(count) => stats.delivered += count,
                    Err(err) => {
                        warn!(error = %err, "payload delivery failed");
                        stats.errors += 1;
                    }
                }

                // One last round after the stop signal flushes what is queued.
                if stopping {
                    break;
                }

                thread::sleep(poll_interval);
            }

            stats
        });

        Self {
            stop_tx,
            handle: Some(handle),
        }
    }

    /// Signal the thread to stop and wait for it to finish.
    /// Returns the delivery statistics.
    pub fn stop(mut self) -> DeliveryStats {
        let _ = self.stop_tx.send(());
        if let Some(handle) = self.handle.take() {
            handle.join().unwrap_or_default()
        } else {
            DeliveryStats::default()
        }
    }

    /// Signal the thread to stop without waiting.
    pub fn signal_stop(&self) {
        let _ = self.stop_tx.send(());
    }
}

impl Drop for DeliveryThread {
    fn drop(&mut self) {
        let _ = self.stop_tx.send(());
    }
}
