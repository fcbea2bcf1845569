//! Project management bounded context, limited to sample batch registration.

mod directives;
mod events;
mod services;

pub use directives::{
    batch_registered_policy, InformUsersAboutBatchRegistration, NotifyAboutBatchRegistration,
};
pub use events::{BatchRegistered, ProjectEvent, ProjectEventKind};
pub use services::{AppContextProvider, BaseUrlContext, ProjectAccess};
