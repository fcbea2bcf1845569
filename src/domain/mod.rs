//! Domain events and the local, thread-confined dispatcher.
//!
//! ```text
//! domain service ──publish──▶ DomainEventDispatcher ──handle_event──▶ directives
//!                               (same thread, in order,      │
//!                                nested publish ignored)     ▼
//!                                                      JobScheduler::enqueue
//! ```

mod dispatcher;
mod event;
mod publish_state;
mod subscriber;

pub use dispatcher::{DispatchError, DomainEventDispatcher};
pub use event::DomainEvent;
pub use publish_state::PublishState;
pub use subscriber::DomainEventSubscriber;
