//! Assembly of the identity context policies.

use std::sync::Arc;

use super::directives::{
    WhenPasswordResetRequestedSendEmail, WhenUserActivatedSubmitIntegrationEvent,
    WhenUserRegisteredSendConfirmationEmail, WhenUserRegisteredSubmitIntegrationEvent,
};
use super::events::IdentityEvent;
use super::services::{EmailConfirmationLinkSupplier, PasswordResetLinkSupplier, UserDirectory};
use crate::communication::EmailService;
use crate::integration::EventHub;
use crate::jobs::JobScheduler;
use crate::policy::Policy;

/// Collaborators shared by the identity directives.
#[derive(Clone)]
pub struct IdentityServices {
    pub scheduler: Arc<dyn JobScheduler>,
    pub users: Arc<dyn UserDirectory>,
    pub email: Arc<dyn EmailService>,
    pub confirmation_links: Arc<dyn EmailConfirmationLinkSupplier>,
    pub password_reset_links: Arc<dyn PasswordResetLinkSupplier>,
    pub hub: EventHub,
}

/// After a registration: send the confirmation email and tell the other
/// contexts.
pub fn user_registered_policy(services: &IdentityServices) -> Policy<IdentityEvent> {
    Policy::new("UserRegisteredPolicy")
        .with(WhenUserRegisteredSendConfirmationEmail::new(
            Arc::clone(&services.scheduler),
            Arc::clone(&services.users),
            Arc::clone(&services.confirmation_links),
            Arc::clone(&services.email),
        ))
        .with(WhenUserRegisteredSubmitIntegrationEvent::new(
            Arc::clone(&services.scheduler),
            services.hub.clone(),
        ))
}

/// Every identity directive: registration, activation and password reset.
pub fn identity_policy(services: &IdentityServices) -> Policy<IdentityEvent> {
    user_registered_policy(services)
        .with(WhenUserActivatedSubmitIntegrationEvent::new(
            Arc::clone(&services.scheduler),
            services.hub.clone(),
        ))
        .with(WhenPasswordResetRequestedSendEmail::new(
            Arc::clone(&services.scheduler),
            Arc::clone(&services.password_reset_links),
            Arc::clone(&services.email),
        ))
}
