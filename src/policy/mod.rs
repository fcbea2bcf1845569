//! Policies and directives.
//!
//! A directive is a [`DomainEventSubscriber`](crate::domain::DomainEventSubscriber)
//! that turns one kind of domain event into exactly one side effect, usually
//! by enqueuing a [`Job`](crate::jobs::Job) that carries only identifiers.
//! A [`Policy`] groups the directives of one bounded context.

mod error;
mod policy;

pub use error::DirectiveError;
pub use policy::Policy;
