//! Domain and integration event messaging for a modular monolith.
//!
//! Inside a bounded context, aggregates publish domain events through a
//! thread-confined [`DomainEventDispatcher`]. Directives grouped into
//! [`Policy`] objects react to them by enqueuing jobs. Facts that other
//! contexts care about leave through the [`EventHub`] as JSON integration
//! events and come back in through the [`MessageConsumer`], which routes them
//! with a [`MessageRouter`].

pub mod authorization;
pub mod clock;
pub mod communication;
pub mod config;
pub mod domain;
pub mod identity;
pub mod integration;
pub mod jobs;
pub mod policy;
pub mod projectmanagement;
pub mod telemetry;
pub mod transport;

pub use clock::{Clock, SystemClock};
pub use config::{ConfigError, MessagingConfig};
pub use domain::{DispatchError, DomainEvent, DomainEventDispatcher, DomainEventSubscriber};
pub use integration::{
    ConsumeOutcome, EventHub, EventHubError, IntegrationEvent, MessageConsumer, MessageError,
    MessageRouter, MessageSubscriber, USER_DESTINATION,
};
pub use jobs::{Job, JobError, JobId, JobScheduler, ThreadJobRunner};
pub use policy::{DirectiveError, Policy};
pub use transport::{InMemoryQueue, QueueTransport, TransportError};
