//! Subscriber side of the local dispatcher.

use super::event::DomainEvent;
use crate::policy::DirectiveError;

/// Reacts to exactly one kind of domain event.
///
/// A subscriber only ever receives events whose `kind()` equals
/// [`subscribed_to_event_type`](Self::subscribed_to_event_type). Errors are not
/// isolated: the first failing subscriber aborts the publish and its error is
/// returned to the publisher.
pub trait DomainEventSubscriber<E: DomainEvent> {
    fn subscribed_to_event_type(&self) -> E::Kind;

    fn handle_event(&self, event: &E) -> Result<(), DirectiveError>;
}
