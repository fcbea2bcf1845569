//! Deferred side effects scheduled by the identity directives.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use super::services::{EmailConfirmationLinkSupplier, PasswordResetLinkSupplier, UserDirectory};
use crate::communication::{messages, Content, EmailService, Recipient, Subject};
use crate::integration::{EventHub, IntegrationEvent};
use crate::jobs::{Job, JobError};

/// Sends the confirmation email for a freshly registered user.
///
/// Only the user id travels with the job. Name and address are read again
/// when the job runs; a user deleted in between is skipped.
pub struct SendConfirmationEmail {
    pub(crate) user_id: String,
    pub(crate) users: Arc<dyn UserDirectory>,
    pub(crate) links: Arc<dyn EmailConfirmationLinkSupplier>,
    pub(crate) email: Arc<dyn EmailService>,
}

impl Job for SendConfirmationEmail {
    fn name(&self) -> String {
        format!("send confirmation email to user {}", self.user_id)
    }

    fn run(&self) -> Result<(), JobError> {
        let Some(user) = self.users.find_by_id(&self.user_id) else {
            warn!(user_id = %self.user_id, "user not found, confirmation email skipped");
            return Ok(());
        };

        let link = self.links.email_confirmation_url(&user.id);
        self.email
            .send(
                Subject(messages::CONFIRM_EMAIL_SUBJECT.to_string()),
                Recipient::new(&user.email, &user.full_name),
                Content(messages::confirm_email(&user.full_name, &link)),
            )
            .map_err(JobError::failed)?;

        debug!(user_id = %self.user_id, "confirmation email sent");
        Ok(())
    }
}

impl fmt::Debug for SendConfirmationEmail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SendConfirmationEmail")
            .field("user_id", &self.user_id)
            .finish_non_exhaustive()
    }
}

pub struct SendPasswordResetEmail {
    pub(crate) user_id: String,
    pub(crate) full_name: String,
    pub(crate) email_address: String,
    pub(crate) links: Arc<dyn PasswordResetLinkSupplier>,
    pub(crate) email: Arc<dyn EmailService>,
}

impl Job for SendPasswordResetEmail {
    fn name(&self) -> String {
        format!("send password reset email to user {}", self.user_id)
    }

    fn run(&self) -> Result<(), JobError> {
        let link = self.links.password_reset_url(&self.user_id);
        self.email
            .send(
                Subject(messages::PASSWORD_RESET_SUBJECT.to_string()),
                Recipient::new(&self.email_address, &self.full_name),
                Content(messages::password_reset(&self.full_name, &link)),
            )
            .map_err(JobError::failed)
    }
}

impl fmt::Debug for SendPasswordResetEmail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SendPasswordResetEmail")
            .field("user_id", &self.user_id)
            .finish_non_exhaustive()
    }
}

/// Hands one integration event to the Event Hub.
#[derive(Debug)]
pub struct SubmitIntegrationEvent {
    pub(crate) event: IntegrationEvent,
    pub(crate) hub: EventHub,
}

impl Job for SubmitIntegrationEvent {
    fn name(&self) -> String {
        format!("submit integration event {}", self.event.event_type())
    }

    fn run(&self) -> Result<(), JobError> {
        self.hub.send(&self.event).map_err(JobError::failed)
    }
}
