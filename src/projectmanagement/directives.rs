//! Notifies project collaborators about newly registered sample batches.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use super::events::{ProjectEvent, ProjectEventKind};
use super::services::{AppContextProvider, ProjectAccess};
use crate::communication::{messages, Content, EmailService, Recipient, Subject};
use crate::domain::DomainEventSubscriber;
use crate::identity::UserDirectory;
use crate::jobs::{Job, JobError, JobScheduler};
use crate::policy::{DirectiveError, Policy};

/// Emails every project collaborator when a sample batch is registered.
///
/// Collaborators are resolved while handling the event; unknown user ids are
/// skipped. One job is enqueued per recipient so a failing address does not
/// hold back the others.
///
/// Every job is built before the first one is enqueued, so lookups never
/// leave a half-notified project behind. The scheduler itself is not
/// transactional: if it refuses a job, the jobs enqueued before it stay
/// queued and the refusal is returned.
pub struct InformUsersAboutBatchRegistration {
    scheduler: Arc<dyn JobScheduler>,
    access: Arc<dyn ProjectAccess>,
    users: Arc<dyn UserDirectory>,
    context: Arc<dyn AppContextProvider>,
    email: Arc<dyn EmailService>,
}

impl InformUsersAboutBatchRegistration {
    const NAME: &'static str = "InformUsersAboutBatchRegistration";

    pub fn new(
        scheduler: Arc<dyn JobScheduler>,
        access: Arc<dyn ProjectAccess>,
        users: Arc<dyn UserDirectory>,
        context: Arc<dyn AppContextProvider>,
        email: Arc<dyn EmailService>,
    ) -> Self {
        Self {
            scheduler,
            access,
            users,
            context,
            email,
        }
    }
}

impl DomainEventSubscriber<ProjectEvent> for InformUsersAboutBatchRegistration {
    fn subscribed_to_event_type(&self) -> ProjectEventKind {
        ProjectEventKind::BatchRegistered
    }

    fn handle_event(&self, event: &ProjectEvent) -> Result<(), DirectiveError> {
        let ProjectEvent::BatchRegistered(batch) = event;

        let sample_uri = self
            .context
            .url_to_sample_page(batch.project_id(), batch.experiment_id());

        let jobs: Vec<NotifyAboutBatchRegistration> = self
            .access
            .list_collaborators(batch.project_id())
            .into_iter()
            .filter_map(|user_id| {
                let user = self.users.find_by_id(&user_id);
                if user.is_none() {
                    warn!(user_id = %user_id, project_id = batch.project_id(), "collaborator not found");
                }
                user
            })
            .map(|user| NotifyAboutBatchRegistration {
                email_address: user.email,
                full_name: user.full_name,
                project_title: batch.project_title().to_string(),
                batch_name: batch.batch_name().to_string(),
                sample_uri: sample_uri.clone(),
                email: Arc::clone(&self.email),
            })
            .collect();

        let total = jobs.len();
        for (enqueued, job) in jobs.into_iter().enumerate() {
            if let Err(source) = self.scheduler.enqueue(Box::new(job)) {
                warn!(
                    batch_id = batch.batch_id(),
                    enqueued,
                    dropped = total - enqueued,
                    "batch registration notifications partially enqueued"
                );
                return Err(DirectiveError::scheduling(Self::NAME, source));
            }
        }

        debug!(
            batch_id = batch.batch_id(),
            project_id = batch.project_id(),
            recipients = total,
            "batch registration notifications enqueued"
        );
        Ok(())
    }
}

/// One "samples added" email. Carries plain strings only.
pub struct NotifyAboutBatchRegistration {
    email_address: String,
    full_name: String,
    project_title: String,
    batch_name: String,
    sample_uri: String,
    email: Arc<dyn EmailService>,
}

impl Job for NotifyAboutBatchRegistration {
    fn name(&self) -> String {
        format!(
            "notify users about batch registration of batch {} in project {}",
            self.batch_name, self.project_title
        )
    }

    fn run(&self) -> Result<(), JobError> {
        self.email
            .send(
                Subject(messages::SAMPLES_ADDED_SUBJECT.to_string()),
                Recipient::new(&self.email_address, &self.full_name),
                Content(messages::samples_added_to_project(
                    &self.full_name,
                    &self.project_title,
                    &self.batch_name,
                    &self.sample_uri,
                )),
            )
            .map_err(JobError::failed)
    }
}

impl fmt::Debug for NotifyAboutBatchRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotifyAboutBatchRegistration")
            .field("email_address", &self.email_address)
            .field("batch_name", &self.batch_name)
            .finish_non_exhaustive()
    }
}

pub fn batch_registered_policy(inform: InformUsersAboutBatchRegistration) -> Policy<ProjectEvent> {
    Policy::new("BatchRegisteredPolicy").with(inform)
}
