//! Reactions of the identity context to its own domain events.
//!
//! Every directive does the same two things inside `handle_event`: pull the
//! values it needs out of the event, and enqueue a job. The job does the
//! actual work later, outside the publishing transaction.

use std::sync::Arc;

use tracing::debug;

use super::events::{IdentityEvent, IdentityEventKind};
use super::jobs::{SendConfirmationEmail, SendPasswordResetEmail, SubmitIntegrationEvent};
use super::services::{EmailConfirmationLinkSupplier, PasswordResetLinkSupplier, UserDirectory};
use crate::communication::EmailService;
use crate::domain::{DomainEvent, DomainEventSubscriber};
use crate::integration::{EventHub, IntegrationEvent};
use crate::jobs::{Job, JobScheduler};
use crate::policy::DirectiveError;

/// Integration event type announcing a registration.
pub const USER_REGISTERED: &str = "userRegistered";
/// Integration event type announcing an activation.
pub const USER_ACTIVATED: &str = "userActivated";

fn enqueue(
    directive: &'static str,
    scheduler: &dyn JobScheduler,
    job: Box<dyn Job>,
) -> Result<(), DirectiveError> {
    let name = job.name();
    let id = scheduler
        .enqueue(job)
        .map_err(|source| DirectiveError::scheduling(directive, source))?;
    debug!(directive, job = %name, job_id = %id, "job enqueued");
    Ok(())
}

fn integration_event(
    directive: &'static str,
    event_type: &str,
) -> Result<IntegrationEvent, DirectiveError> {
    IntegrationEvent::create(event_type, Default::default()).map_err(|err| {
        DirectiveError::Execution {
            directive,
            reason: err.to_string(),
        }
    })
}

pub struct WhenUserRegisteredSendConfirmationEmail {
    scheduler: Arc<dyn JobScheduler>,
    users: Arc<dyn UserDirectory>,
    links: Arc<dyn EmailConfirmationLinkSupplier>,
    email: Arc<dyn EmailService>,
}

impl WhenUserRegisteredSendConfirmationEmail {
    const NAME: &'static str = "WhenUserRegisteredSendConfirmationEmail";

    pub fn new(
        scheduler: Arc<dyn JobScheduler>,
        users: Arc<dyn UserDirectory>,
        links: Arc<dyn EmailConfirmationLinkSupplier>,
        email: Arc<dyn EmailService>,
    ) -> Self {
        Self {
            scheduler,
            users,
            links,
            email,
        }
    }
}

impl DomainEventSubscriber<IdentityEvent> for WhenUserRegisteredSendConfirmationEmail {
    fn subscribed_to_event_type(&self) -> IdentityEventKind {
        IdentityEventKind::UserRegistered
    }

    fn handle_event(&self, event: &IdentityEvent) -> Result<(), DirectiveError> {
        let IdentityEvent::UserRegistered(registered) = event else {
            return Err(DirectiveError::unexpected(Self::NAME, event.kind()));
        };

        let job = SendConfirmationEmail {
            user_id: registered.user_id().to_string(),
            users: Arc::clone(&self.users),
            links: Arc::clone(&self.links),
            email: Arc::clone(&self.email),
        };
        enqueue(Self::NAME, self.scheduler.as_ref(), Box::new(job))
    }
}

/// Announces a registration to other bounded contexts as `userRegistered`
/// with `userId`, `fullName` and `email`.
pub struct WhenUserRegisteredSubmitIntegrationEvent {
    scheduler: Arc<dyn JobScheduler>,
    hub: EventHub,
}

impl WhenUserRegisteredSubmitIntegrationEvent {
    const NAME: &'static str = "WhenUserRegisteredSubmitIntegrationEvent";

    pub fn new(scheduler: Arc<dyn JobScheduler>, hub: EventHub) -> Self {
        Self { scheduler, hub }
    }
}

impl DomainEventSubscriber<IdentityEvent> for WhenUserRegisteredSubmitIntegrationEvent {
    fn subscribed_to_event_type(&self) -> IdentityEventKind {
        IdentityEventKind::UserRegistered
    }

    fn handle_event(&self, event: &IdentityEvent) -> Result<(), DirectiveError> {
        let IdentityEvent::UserRegistered(registered) = event else {
            return Err(DirectiveError::unexpected(Self::NAME, event.kind()));
        };

        let event = integration_event(Self::NAME, USER_REGISTERED)?
            .with_entry("userId", registered.user_id())
            .with_entry("fullName", registered.full_name())
            .with_entry("email", registered.email());
        let job = SubmitIntegrationEvent {
            event,
            hub: self.hub.clone(),
        };
        enqueue(Self::NAME, self.scheduler.as_ref(), Box::new(job))
    }
}

/// Announces an activation as `userActivated` with `userId`.
pub struct WhenUserActivatedSubmitIntegrationEvent {
    scheduler: Arc<dyn JobScheduler>,
    hub: EventHub,
}

impl WhenUserActivatedSubmitIntegrationEvent {
    const NAME: &'static str = "WhenUserActivatedSubmitIntegrationEvent";

    pub fn new(scheduler: Arc<dyn JobScheduler>, hub: EventHub) -> Self {
        Self { scheduler, hub }
    }
}

impl DomainEventSubscriber<IdentityEvent> for WhenUserActivatedSubmitIntegrationEvent {
    fn subscribed_to_event_type(&self) -> IdentityEventKind {
        IdentityEventKind::UserActivated
    }

    fn handle_event(&self, event: &IdentityEvent) -> Result<(), DirectiveError> {
        let IdentityEvent::UserActivated(activated) = event else {
            return Err(DirectiveError::unexpected(Self::NAME, event.kind()));
        };

        let event =
            integration_event(Self::NAME, USER_ACTIVATED)?.with_entry("userId", activated.user_id());
        let job = SubmitIntegrationEvent {
            event,
            hub: self.hub.clone(),
        };
        enqueue(Self::NAME, self.scheduler.as_ref(), Box::new(job))
    }
}

pub struct WhenPasswordResetRequestedSendEmail {
    scheduler: Arc<dyn JobScheduler>,
    links: Arc<dyn PasswordResetLinkSupplier>,
    email: Arc<dyn EmailService>,
}

impl WhenPasswordResetRequestedSendEmail {
    const NAME: &'static str = "WhenPasswordResetRequestedSendEmail";

    pub fn new(
        scheduler: Arc<dyn JobScheduler>,
        links: Arc<dyn PasswordResetLinkSupplier>,
        email: Arc<dyn EmailService>,
    ) -> Self {
        Self {
            scheduler,
            links,
            email,
        }
    }
}

impl DomainEventSubscriber<IdentityEvent> for WhenPasswordResetRequestedSendEmail {
    fn subscribed_to_event_type(&self) -> IdentityEventKind {
        IdentityEventKind::PasswordResetRequested
    }

    fn handle_event(&self, event: &IdentityEvent) -> Result<(), DirectiveError> {
        let IdentityEvent::PasswordResetRequested(requested) = event else {
            return Err(DirectiveError::unexpected(Self::NAME, event.kind()));
        };

        let job = SendPasswordResetEmail {
            user_id: requested.user_id().to_string(),
            full_name: requested.full_name().to_string(),
            email_address: requested.email().to_string(),
            links: Arc::clone(&self.links),
            email: Arc::clone(&self.email),
        };
        enqueue(Self::NAME, self.scheduler.as_ref(), Box::new(job))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::SystemClock;
    use crate::identity::events::UserActivated;
    use crate::jobs::{JobError, JobId};
    use crate::transport::InMemoryQueue;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Collecting {
        jobs: Mutex<Vec<Box<dyn Job>>>,
    }

    impl JobScheduler for Collecting {
        fn enqueue(&self, job: Box<dyn Job>) -> Result<JobId, JobError> {
            self.jobs.lock().unwrap().push(job);
            Ok(JobId::new())
        }
    }

    struct Refusing;

    impl JobScheduler for Refusing {
        fn enqueue(&self, _job: Box<dyn Job>) -> Result<JobId, JobError> {
            Err(JobError::RunnerStopped)
        }
    }

    fn activated() -> IdentityEvent {
        UserActivated::new("42", &SystemClock).into()
    }

    #[test]
    fn activation_directive_defers_the_send() {
        let queue = InMemoryQueue::new();
        let scheduler = Arc::new(Collecting::default());
        let directive = WhenUserActivatedSubmitIntegrationEvent::new(
            scheduler.clone(),
            EventHub::new(Arc::new(queue.clone())),
        );

        directive.handle_event(&activated()).unwrap();

        assert!(queue.is_empty());
        let jobs = scheduler.jobs.lock().unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].name(), "submit integration event userActivated");

        jobs[0].run().unwrap();
        let sent = IntegrationEvent::from_json(&queue.messages("User")[0]).unwrap();
        assert_eq!(sent.get("userId"), Some("42"));
    }

    #[test]
    fn scheduler_failure_becomes_directive_error() {
        let directive = WhenUserActivatedSubmitIntegrationEvent::new(
            Arc::new(Refusing),
            EventHub::new(Arc::new(InMemoryQueue::new())),
        );

        assert_eq!(
            directive.handle_event(&activated()).unwrap_err(),
            DirectiveError::Scheduling {
                directive: "WhenUserActivatedSubmitIntegrationEvent",
                source: JobError::RunnerStopped,
            }
        );
    }

    #[test]
    fn wrong_variant_is_rejected() {
        let directive = WhenUserRegisteredSubmitIntegrationEvent::new(
            Arc::new(Collecting::default()),
            EventHub::new(Arc::new(InMemoryQueue::new())),
        );

        assert!(matches!(
            directive.handle_event(&activated()),
            Err(DirectiveError::UnexpectedEvent { .. })
        ));
    }
}
