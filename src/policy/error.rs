//! Errors raised by directives.

use thiserror::Error;

use crate::jobs::JobError;

/// Failure raised by a directive while reacting to a domain event.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DirectiveError {
    /// The directive was handed an event variant it does not subscribe to.
    #[error("{directive} cannot handle {actual} events")]
    UnexpectedEvent {
        directive: &'static str,
        actual: String,
    },

    /// The deferred work could not be handed to the job scheduler.
    #[error("{directive} could not schedule its job: {source}")]
    Scheduling {
        directive: &'static str,
        #[source]
        source: JobError,
    },

    #[error("{directive} failed: {reason}")]
    Execution {
        directive: &'static str,
        reason: String,
    },
}

impl DirectiveError {
    pub fn unexpected(directive: &'static str, actual: impl std::fmt::Debug) -> Self {
        DirectiveError::UnexpectedEvent {
            directive,
            actual: format!("{actual:?}"),
        }
    }

    pub fn scheduling(directive: &'static str, source: JobError) -> Self {
        DirectiveError::Scheduling { directive, source }
    }
}
