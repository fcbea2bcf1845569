//! Identity bounded context: user registration, activation and password
//! reset, and the directives reacting to them.

mod directives;
mod events;
mod jobs;
mod policy;
mod services;

pub use directives::{
    WhenPasswordResetRequestedSendEmail, WhenUserActivatedSubmitIntegrationEvent,
    WhenUserRegisteredSendConfirmationEmail, WhenUserRegisteredSubmitIntegrationEvent,
    USER_ACTIVATED, USER_REGISTERED,
};
pub use events::{
    IdentityEvent, IdentityEventKind, PasswordResetRequested, UserActivated, UserEmailConfirmed,
    UserRegistered,
};
pub use jobs::{SendConfirmationEmail, SendPasswordResetEmail, SubmitIntegrationEvent};
pub use policy::{identity_policy, user_registered_policy, IdentityServices};
pub use services::{
    BaseUrlLinks, EmailConfirmationLinkSupplier, PasswordResetLinkSupplier, UserDirectory,
    UserInfo,
};
