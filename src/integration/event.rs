//! Integration events and their JSON wire envelope.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntegrationEventError {
    #[error("integration event type must not be empty")]
    EmptyType,
}

/// A flat, string-keyed fact meant for another bounded context.
///
/// Carries only strings so the receiving side never depends on the producer's
/// types. Serializes to the envelope
/// `{"type": "<type>", "content": {"<key>": "<value>", ...}}`.
///
/// ```
/// use domain_messaging::integration::IntegrationEvent;
///
/// let event = IntegrationEvent::create("userRegistered", Default::default())
///     .unwrap()
///     .with_entry("userId", "42");
///
/// let json = event.to_json().unwrap();
/// let decoded = IntegrationEvent::from_json(&json).unwrap();
/// assert_eq!(decoded.get("userId"), Some("42"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Envelope")]
pub struct IntegrationEvent {
    #[serde(rename = "type")]
    event_type: String,
    content: BTreeMap<String, String>,
}

/// Wire shape before validation.
#[derive(Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    event_type: String,
    content: BTreeMap<String, String>,
}

impl TryFrom<Envelope> for IntegrationEvent {
    type Error = IntegrationEventError;

    fn try_from(envelope: Envelope) -> Result<Self, Self::Error> {
        IntegrationEvent::create(envelope.event_type, envelope.content)
    }
}

impl IntegrationEvent {
    /// Build an event. The type is used verbatim and case-sensitively for
    /// routing, so it must not be empty.
    pub fn create(
        event_type: impl Into<String>,
        content: BTreeMap<String, String>,
    ) -> Result<Self, IntegrationEventError> {
        let event_type = event_type.into();
        if event_type.is_empty() {
            return Err(IntegrationEventError::EmptyType);
        }
        Ok(Self {
            event_type,
            content,
        })
    }

    /// Add or replace a content entry.
    pub fn with_entry(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.content.insert(key.into(), value.into());
        self
    }

    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    pub fn content(&self) -> &BTreeMap<String, String> {
        &self.content
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.content.get(key).map(String::as_str)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(payload: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_type_is_rejected() {
        assert_eq!(
            IntegrationEvent::create("", BTreeMap::new()).unwrap_err(),
            IntegrationEventError::EmptyType
        );
    }

    #[test]
    fn serializes_to_envelope() {
        let event = IntegrationEvent::create("userActivated", BTreeMap::new())
            .unwrap()
            .with_entry("userId", "42");

        let value: serde_json::Value = serde_json::from_str(&event.to_json().unwrap()).unwrap();
        assert_eq!(value, json!({"type": "userActivated", "content": {"userId": "42"}}));
    }

    #[test]
    fn round_trip_keeps_type_and_content() {
        let event = IntegrationEvent::create("userRegistered", BTreeMap::new())
            .unwrap()
            .with_entry("userId", "42")
            .with_entry("email", "ada@example.org")
            .with_entry("fullName", "Ada Lovelace");

        let decoded = IntegrationEvent::from_json(&event.to_json().unwrap()).unwrap();
        assert_eq!(decoded, event);
    }

    #[test]
    fn empty_content_is_allowed() {
        let decoded = IntegrationEvent::from_json(r#"{"type":"ping","content":{}}"#).unwrap();
        assert_eq!(decoded.event_type(), "ping");
        assert!(decoded.content().is_empty());
    }

    #[test]
    fn decoding_validates_the_envelope() {
        assert!(IntegrationEvent::from_json(r#"{"type":"","content":{}}"#).is_err());
        assert!(IntegrationEvent::from_json(r#"{"type":"ping"}"#).is_err());
        assert!(IntegrationEvent::from_json(r#"{"content":{}}"#).is_err());
        assert!(IntegrationEvent::from_json(r#"{"type":"ping","content":{"n":1}}"#).is_err());
    }
}
