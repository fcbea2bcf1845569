//! In-process, synchronous publish/subscribe for domain events.

use std::any::{Any, TypeId};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use thiserror::Error;
use tracing::{debug, trace};

use super::event::DomainEvent;
use super::publish_state::{thread_is_publishing, PublishGuard, PublishState, ThreadPublishGuard};
use super::subscriber::DomainEventSubscriber;
use crate::policy::DirectiveError;

/// Error returned by [`DomainEventDispatcher::publish`].
#[derive(Debug, Error)]
pub enum DispatchError {
    /// A subscriber failed. Subscribers registered after it were not invoked.
    #[error("subscriber for {event} failed: {source}")]
    Subscriber {
        event: String,
        #[source]
        source: DirectiveError,
    },
}

thread_local! {
    static THREAD_DISPATCHERS: RefCell<HashMap<TypeId, Rc<dyn Any>>> =
        RefCell::new(HashMap::new());
}

/// A dispatch scope for one bounded context's domain events.
///
/// Publishing is synchronous: every subscriber whose declared kind equals the
/// event's kind runs on the caller's thread, in subscription order, before
/// `publish` returns.
///
/// While a publish is in progress, nested `publish` and `subscribe` calls on
/// the same dispatcher do nothing. This stops publish loops and keeps the
/// subscriber list stable during delivery; the nested event is dropped.
///
/// The dispatcher is `!Send` and `!Sync`. Subscriptions made through one
/// instance are only seen by publishes through that instance, so they never
/// cross threads. [`current`](Self::current) gives the calling thread's
/// ambient instance for code that does not pass a dispatcher around. Ambient
/// instances share one publishing state per thread: while any of them is
/// delivering, nested calls on every ambient dispatcher of that thread are
/// ignored, whatever their event type.
///
/// ```ignore
/// let dispatcher = DomainEventDispatcher::<IdentityEvent>::new();
/// dispatcher.subscribe(Rc::new(send_confirmation_email));
/// dispatcher.publish(&UserRegistered::new(id, name, email, &SystemClock).into())?;
/// ```
pub struct DomainEventDispatcher<E: DomainEvent> {
    subscribers: RefCell<Vec<Rc<dyn DomainEventSubscriber<E>>>>,
    state: Cell<PublishState>,
    ambient: bool,
}

impl<E: DomainEvent> DomainEventDispatcher<E> {
    pub fn new() -> Self {
        Self {
            subscribers: RefCell::new(Vec::new()),
            state: Cell::new(PublishState::Idle),
            ambient: false,
        }
    }

    /// The calling thread's dispatcher for `E`, created on first use.
    ///
    /// Every thread gets its own instance: subscribers registered on one
    /// thread are invisible to publishes made on another.
    pub fn current() -> Rc<Self> {
        THREAD_DISPATCHERS.with(|dispatchers| {
            let mut dispatchers = dispatchers.borrow_mut();
            let key = TypeId::of::<E>();
            let existing = dispatchers
                .get(&key)
                .and_then(|scope| Rc::clone(scope).downcast::<Self>().ok());

            match existing {
                Some(dispatcher) => dispatcher,
                None => {
                    let dispatcher = Rc::new(Self {
                        ambient: true,
                        ..Self::new()
                    });
                    dispatchers.insert(key, Rc::clone(&dispatcher) as Rc<dyn Any>);
                    dispatcher
                }
            }
        })
    }

    /// Register a subscriber for the event kind it declares.
    ///
    /// Registering the same subscriber twice makes it run twice per matching
    /// event. Ignored while a publish is in progress.
    pub fn subscribe(&self, subscriber: Rc<dyn DomainEventSubscriber<E>>) {
        if self.is_publishing() {
            debug!(
                kind = ?subscriber.subscribed_to_event_type(),
                "subscribe ignored during publish"
            );
            return;
        }
        self.subscribers.borrow_mut().push(subscriber);
    }

    /// Deliver `event` to every subscriber registered for its kind.
    ///
    /// Returns the first subscriber error. A publish made while another one is
    /// running on this dispatcher, or for an ambient dispatcher on any ambient
    /// dispatcher of this thread, returns `Ok(())` without delivering anything.
    pub fn publish(&self, event: &E) -> Result<(), DispatchError> {
        let kind = event.kind();
        let Some(_guard) = PublishGuard::enter(&self.state) else {
            debug!(kind = ?kind, "nested publish ignored");
            return Ok(());
        };
        let _thread_guard = if self.ambient {
            let Some(guard) = ThreadPublishGuard::enter() else {
                debug!(kind = ?kind, "nested publish on this thread ignored");
                return Ok(());
            };
            Some(guard)
        } else {
            None
        };

        let matching: Vec<Rc<dyn DomainEventSubscriber<E>>> = self
            .subscribers
            .borrow()
            .iter()
            .filter(|subscriber| subscriber.subscribed_to_event_type() == kind)
            .cloned()
            .collect();

        trace!(kind = ?kind, subscribers = matching.len(), "publishing domain event");

        for subscriber in matching {
            subscriber
                .handle_event(event)
                .map_err(|source| DispatchError::Subscriber {
                    event: format!("{kind:?}"),
                    source,
                })?;
        }

        Ok(())
    }

    /// Remove every subscriber.
    ///
    /// Returns `false`, leaving the subscribers in place, while a publish is in
    /// progress.
    pub fn clear(&self) -> bool {
        if self.is_publishing() {
            return false;
        }
        self.subscribers.borrow_mut().clear();
        true
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.borrow().len()
    }

    pub fn is_publishing(&self) -> bool {
        self.state.get().is_publishing() || (self.ambient && thread_is_publishing())
    }
}

impl<E: DomainEvent> Default for DomainEventDispatcher<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: DomainEvent> fmt::Debug for DomainEventDispatcher<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DomainEventDispatcher")
            .field("subscribers", &self.subscriber_count())
            .field("state", &self.state.get())
            .field("ambient", &self.ambient)
            .finish()
    }
}
