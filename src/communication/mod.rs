//! Outgoing user communication.

mod email;
pub mod messages;

pub use email::{Content, EmailError, EmailService, Recipient, Subject};
