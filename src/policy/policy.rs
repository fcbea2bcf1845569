//! Named groups of directives registered on a dispatcher.

use std::fmt;
use std::rc::Rc;

use tracing::debug;

use crate::domain::{DomainEvent, DomainEventDispatcher, DomainEventSubscriber};

/// A named group of directives wired together at application start.
///
/// Directives are process-lifetime objects: build the policy once, register
/// it once, and keep it (or the dispatcher) alive for as long as the
/// reactions should happen.
pub struct Policy<E: DomainEvent> {
    name: &'static str,
    directives: Vec<Rc<dyn DomainEventSubscriber<E>>>,
}

impl<E: DomainEvent> Policy<E> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            directives: Vec::new(),
        }
    }

    /// Add a directive. Directives are registered in the order they are added.
    pub fn with<D>(mut self, directive: D) -> Self
    where
        D: DomainEventSubscriber<E> + 'static,
    {
        self.directives.push(Rc::new(directive));
        self
    }

    /// Subscribe every directive of this policy to `dispatcher`.
    pub fn register(&self, dispatcher: &DomainEventDispatcher<E>) {
        for directive in &self.directives {
            dispatcher.subscribe(Rc::clone(directive));
        }
        debug!(
            policy = self.name,
            directives = self.directives.len(),
            "policy registered"
        );
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn len(&self) -> usize {
        self.directives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.directives.is_empty()
    }

    /// Event kinds covered by this policy, in registration order.
    pub fn event_kinds(&self) -> Vec<E::Kind> {
        self.directives
            .iter()
            .map(|directive| directive.subscribed_to_event_type())
            .collect()
    }
}

impl<E: DomainEvent> fmt::Debug for Policy<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Policy")
            .field("name", &self.name)
            .field("event_kinds", &self.event_kinds())
            .finish()
    }
}
