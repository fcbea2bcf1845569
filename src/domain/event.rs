//! Domain event abstractions.

use std::fmt;

use chrono::{DateTime, Utc};

/// A business fact that became true inside one bounded context.
///
/// Each bounded context implements this for one enum that wraps its concrete,
/// immutable event structs. `kind()` returns the fieldless discriminant that
/// subscribers declare interest in, so matching is by exact variant and the
/// set of event types is checked at compile time.
pub trait DomainEvent: fmt::Debug + 'static {
    /// Fieldless tag identifying the concrete event type.
    type Kind: Copy + Eq + fmt::Debug + 'static;

    /// Returns the tag of this event's concrete type.
    fn kind(&self) -> Self::Kind;

    /// The moment the fact occurred. Set at construction, never changed.
    fn occurred_on(&self) -> DateTime<Utc>;
}
