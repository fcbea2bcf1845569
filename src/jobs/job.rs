//! Units of deferred work and the scheduler interface that accepts them.

use std::fmt;

use thiserror::Error;
use uuid::Uuid;

/// Error type for scheduling and running jobs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JobError {
    /// The scheduler refused the job.
    #[error("job rejected: {0}")]
    Rejected(String),
    /// The scheduler no longer accepts work.
    #[error("job runner has been stopped")]
    RunnerStopped,
    /// The job ran and failed; the runner may execute it again.
    #[error("job failed: {0}")]
    Failed(String),
}

impl JobError {
    pub fn failed(err: impl fmt::Display) -> Self {
        JobError::Failed(err.to_string())
    }
}

/// Identifier handed out for every accepted job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct JobId(Uuid);

impl JobId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A unit of work executed later, possibly on another thread and possibly
/// more than once.
///
/// Jobs carry identifiers and plain values only. Anything else they need is
/// looked up again when `run` is called, because the state that produced the
/// job may have changed (or been rolled back) by then.
pub trait Job: Send + Sync + fmt::Debug {
    /// Human readable name used in logs.
    fn name(&self) -> String;

    /// Execute the job. An error makes the job eligible for another attempt.
    fn run(&self) -> Result<(), JobError>;
}

/// Accepts jobs for asynchronous, at-least-once execution.
pub trait JobScheduler: Send + Sync {
    fn enqueue(&self, job: Box<dyn Job>) -> Result<JobId, JobError>;
}
