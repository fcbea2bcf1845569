//! Email sending abstraction and its message value types.

use std::fmt;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EmailError {
    #[error("could not send email to {address}: {reason}")]
    Submission { address: String, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subject(pub String);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Content(pub String);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipient {
    pub address: String,
    pub full_name: String,
}

impl Recipient {
    pub fn new(address: impl Into<String>, full_name: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            full_name: full_name.into(),
        }
    }
}

impl fmt::Display for Recipient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <{}>", self.full_name, self.address)
    }
}

/// Outgoing mail. Implementations own the SMTP (or other) plumbing; the
/// directives only ever hand over a subject, a recipient and a body.
pub trait EmailService: Send + Sync {
    fn send(&self, subject: Subject, recipient: Recipient, content: Content)
        -> Result<(), EmailError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recipient_display() {
        let recipient = Recipient::new("ada@example.org", "Ada Lovelace");
        assert_eq!(recipient.to_string(), "Ada Lovelace <ada@example.org>");
    }
}
