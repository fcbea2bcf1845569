//! Receiving side of integration events.

use thiserror::Error;

use super::event::IntegrationEvent;
use crate::jobs::JobError;

/// Error type for integration event handlers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessageError {
    /// The subscriber was given an event it did not subscribe to.
    #[error("wrong integration event type: expected {expected}, got {actual}")]
    WrongType { expected: String, actual: String },
    /// A content entry the subscriber relies on is absent.
    #[error("integration event {event_type} is missing content entry {key}")]
    MissingContent { event_type: String, key: String },
    #[error("could not schedule follow-up work: {0}")]
    Scheduling(#[from] JobError),
    #[error("handler failed: {0}")]
    Handler(String),
}

/// Reacts to integration events of one type.
///
/// Subscribers are matched by exact, case-sensitive comparison of
/// [`subscribed_type`](Self::subscribed_type) with the event type. An
/// implementation handed any other type must fail with
/// [`MessageError::WrongType`]; [`ensure_type`] does the check.
pub trait MessageSubscriber: Send + Sync {
    fn subscribed_type(&self) -> &str;

    fn on_receive(&self, event: &IntegrationEvent) -> Result<(), MessageError>;
}

/// Fail with [`MessageError::WrongType`] unless `event` has type `expected`.
pub fn ensure_type(expected: &str, event: &IntegrationEvent) -> Result<(), MessageError> {
    if event.event_type() == expected {
        Ok(())
    } else {
        Err(MessageError::WrongType {
            expected: expected.to_string(),
            actual: event.event_type().to_string(),
        })
    }
}

/// Look up a required content entry.
pub fn required<'a>(event: &'a IntegrationEvent, key: &str) -> Result<&'a str, MessageError> {
    event.get(key).ok_or_else(|| MessageError::MissingContent {
        event_type: event.event_type().to_string(),
        key: key.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn event(event_type: &str) -> IntegrationEvent {
        IntegrationEvent::create(event_type, BTreeMap::new()).unwrap()
    }

    #[test]
    fn ensure_type_is_case_sensitive() {
        assert!(ensure_type("userActivated", &event("userActivated")).is_ok());
        assert_eq!(
            ensure_type("userActivated", &event("UserActivated")).unwrap_err(),
            MessageError::WrongType {
                expected: "userActivated".into(),
                actual: "UserActivated".into(),
            }
        );
    }

    #[test]
    fn required_reports_missing_key() {
        let err = required(&event("userActivated"), "userId").unwrap_err();
        assert_eq!(
            err.to_string(),
            "integration event userActivated is missing content entry userId"
        );
    }
}
