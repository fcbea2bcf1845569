//! Deferred work handed off by directives.
//!
//! The messaging core only enqueues jobs. How and where they run is up to the
//! [`JobScheduler`] implementation; [`ThreadJobRunner`] is the in-process one.

mod job;
mod runner;

pub use job::{Job, JobError, JobId, JobScheduler};
pub use runner::{JobRunnerHandle, JobRunnerStats, ThreadJobRunner};
