//! Domain events of the identity context.

use chrono::{DateTime, Utc};

use crate::clock::Clock;
use crate::domain::DomainEvent;

/// A new user account was created and awaits email confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRegistered {
    user_id: String,
    full_name: String,
    email: String,
    occurred_on: DateTime<Utc>,
}

impl UserRegistered {
    pub fn new(
        user_id: impl Into<String>,
        full_name: impl Into<String>,
        email: impl Into<String>,
        clock: &dyn Clock,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            full_name: full_name.into(),
            email: email.into(),
            occurred_on: clock.now(),
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    pub fn email(&self) -> &str {
        &self.email
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserEmailConfirmed {
    user_id: String,
    email: String,
    occurred_on: DateTime<Utc>,
}

impl UserEmailConfirmed {
    pub fn new(user_id: impl Into<String>, email: impl Into<String>, clock: &dyn Clock) -> Self {
        Self {
            user_id: user_id.into(),
            email: email.into(),
            occurred_on: clock.now(),
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn email(&self) -> &str {
        &self.email
    }
}

/// The account became usable. Follows [`UserEmailConfirmed`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserActivated {
    user_id: String,
    occurred_on: DateTime<Utc>,
}

impl UserActivated {
    pub fn new(user_id: impl Into<String>, clock: &dyn Clock) -> Self {
        Self {
            user_id: user_id.into(),
            occurred_on: clock.now(),
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordResetRequested {
    user_id: String,
    full_name: String,
    email: String,
    occurred_on: DateTime<Utc>,
}

impl PasswordResetRequested {
    pub fn new(
        user_id: impl Into<String>,
        full_name: impl Into<String>,
        email: impl Into<String>,
        clock: &dyn Clock,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            full_name: full_name.into(),
            email: email.into(),
            occurred_on: clock.now(),
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    pub fn email(&self) -> &str {
        &self.email
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdentityEventKind {
    UserRegistered,
    UserEmailConfirmed,
    UserActivated,
    PasswordResetRequested,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityEvent {
    UserRegistered(UserRegistered),
    UserEmailConfirmed(UserEmailConfirmed),
    UserActivated(UserActivated),
    PasswordResetRequested(PasswordResetRequested),
}

impl DomainEvent for IdentityEvent {
    type Kind = IdentityEventKind;

    fn kind(&self) -> IdentityEventKind {
        match self {
            IdentityEvent::UserRegistered(_) => IdentityEventKind::UserRegistered,
            IdentityEvent::UserEmailConfirmed(_) => IdentityEventKind::UserEmailConfirmed,
            IdentityEvent::UserActivated(_) => IdentityEventKind::UserActivated,
            IdentityEvent::PasswordResetRequested(_) => IdentityEventKind::PasswordResetRequested,
        }
    }

    fn occurred_on(&self) -> DateTime<Utc> {
        match self {
            IdentityEvent::UserRegistered(event) => event.occurred_on,
            IdentityEvent::UserEmailConfirmed(event) => event.occurred_on,
            IdentityEvent::UserActivated(event) => event.occurred_on,
            IdentityEvent::PasswordResetRequested(event) => event.occurred_on,
        }
    }
}

impl From<UserRegistered> for IdentityEvent {
    fn from(event: UserRegistered) -> Self {
        IdentityEvent::UserRegistered(event)
    }
}

impl From<UserEmailConfirmed> for IdentityEvent {
    fn from(event: UserEmailConfirmed) -> Self {
        IdentityEvent::UserEmailConfirmed(event)
    }
}

impl From<UserActivated> for IdentityEvent {
    fn from(event: UserActivated) -> Self {
        IdentityEvent::UserActivated(event)
    }
}

impl From<PasswordResetRequested> for IdentityEvent {
    fn from(event: PasswordResetRequested) -> Self {
        IdentityEvent::PasswordResetRequested(event)
    }
}
