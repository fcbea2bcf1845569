//! Authorization context: reacts to identity integration events.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info};

use crate::integration::{ensure_type, required, IntegrationEvent, MessageError, MessageSubscriber};
use crate::jobs::{Job, JobError, JobScheduler};

/// Integration event type this context listens for.
pub const USER_ACTIVATED: &str = "userActivated";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("could not grant authority to user {user_id}: {reason}")]
pub struct AuthorityError {
    pub user_id: String,
    pub reason: String,
}

/// Access control storage owned by this context.
pub trait AuthorityService: Send + Sync {
    fn grant_default_authority(&self, user_id: &str) -> Result<(), AuthorityError>;
}

/// Gives every newly activated user the default authority.
pub struct GrantDefaultAuthorityOnUserActivation {
    scheduler: Arc<dyn JobScheduler>,
    authorities: Arc<dyn AuthorityService>,
}

impl GrantDefaultAuthorityOnUserActivation {
    pub fn new(scheduler: Arc<dyn JobScheduler>, authorities: Arc<dyn AuthorityService>) -> Self {
        Self {
            scheduler,
            authorities,
        }
    }
}

impl MessageSubscriber for GrantDefaultAuthorityOnUserActivation {
    fn subscribed_type(&self) -> &str {
        USER_ACTIVATED
    }

    fn on_receive(&self, event: &IntegrationEvent) -> Result<(), MessageError> {
        ensure_type(USER_ACTIVATED, event)?;
        let user_id = required(event, "userId")?;

        let job = GrantDefaultAuthority {
            user_id: user_id.to_string(),
            authorities: Arc::clone(&self.authorities),
        };
        let id = self.scheduler.enqueue(Box::new(job))?;
        debug!(user_id, job_id = %id, "default authority grant enqueued");
        Ok(())
    }
}

pub struct GrantDefaultAuthority {
    user_id: String,
    authorities: Arc<dyn AuthorityService>,
}

impl Job for GrantDefaultAuthority {
    fn name(&self) -> String {
        format!("grant default authority to user {}", self.user_id)
    }

    fn run(&self) -> Result<(), JobError> {
        self.authorities
            .grant_default_authority(&self.user_id)
            .map_err(JobError::failed)?;
        info!(user_id = %self.user_id, "default authority granted");
        Ok(())
    }
}

impl fmt::Debug for GrantDefaultAuthority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GrantDefaultAuthority")
            .field("user_id", &self.user_id)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jobs::JobId;
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Inline;

    impl JobScheduler for Inline {
        fn enqueue(&self, job: Box<dyn Job>) -> Result<JobId, JobError> {
            job.run()?;
            Ok(JobId::new())
        }
    }

    #[derive(Default)]
    struct Granted {
        users: Mutex<Vec<String>>,
    }

    impl AuthorityService for Granted {
        fn grant_default_authority(&self, user_id: &str) -> Result<(), AuthorityError> {
            self.users.lock().unwrap().push(user_id.to_string());
            Ok(())
        }
    }

    fn subscriber(granted: Arc<Granted>) -> GrantDefaultAuthorityOnUserActivation {
        GrantDefaultAuthorityOnUserActivation::new(Arc::new(Inline), granted)
    }

    #[test]
    fn grants_authority_to_activated_user() {
        let granted = Arc::new(Granted::default());
        let event = IntegrationEvent::create(USER_ACTIVATED, BTreeMap::new())
            .unwrap()
            .with_entry("userId", "42");

        subscriber(granted.clone()).on_receive(&event).unwrap();

        assert_eq!(*granted.users.lock().unwrap(), vec!["42".to_string()]);
    }

    #[test]
    fn missing_user_id_is_an_error() {
        let granted = Arc::new(Granted::default());
        let event = IntegrationEvent::create(USER_ACTIVATED, BTreeMap::new()).unwrap();

        assert_eq!(
            subscriber(granted.clone()).on_receive(&event).unwrap_err(),
            MessageError::MissingContent {
                event_type: USER_ACTIVATED.into(),
                key: "userId".into(),
            }
        );
        assert!(granted.users.lock().unwrap().is_empty());
    }

    #[test]
    fn other_types_are_refused() {
        let event = IntegrationEvent::create("userRegistered", BTreeMap::new())
            .unwrap()
            .with_entry("userId", "42");

        assert!(matches!(
            subscriber(Arc::new(Granted::default())).on_receive(&event),
            Err(MessageError::WrongType { .. })
        ));
    }
}
