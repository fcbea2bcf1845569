//! Domain events of the project management context.

use chrono::{DateTime, Utc};

use crate::clock::Clock;
use crate::domain::DomainEvent;

/// A batch of samples was registered for an experiment of a project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchRegistered {
    batch_name: String,
    batch_id: String,
    project_title: String,
    project_id: String,
    experiment_id: String,
    occurred_on: DateTime<Utc>,
}

impl BatchRegistered {
    pub fn new(
        batch_name: impl Into<String>,
        batch_id: impl Into<String>,
        project_title: impl Into<String>,
        project_id: impl Into<String>,
        experiment_id: impl Into<String>,
        clock: &dyn Clock,
    ) -> Self {
        Self {
            batch_name: batch_name.into(),
            batch_id: batch_id.into(),
            project_title: project_title.into(),
            project_id: project_id.into(),
            experiment_id: experiment_id.into(),
            occurred_on: clock.now(),
        }
    }

    pub fn batch_name(&self) -> &str {
        &self.batch_name
    }

    pub fn batch_id(&self) -> &str {
        &self.batch_id
    }

    pub fn project_title(&self) -> &str {
        &self.project_title
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    pub fn experiment_id(&self) -> &str {
        &self.experiment_id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProjectEventKind {
    BatchRegistered,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectEvent {
    BatchRegistered(BatchRegistered),
}

impl DomainEvent for ProjectEvent {
    type Kind = ProjectEventKind;

    fn kind(&self) -> ProjectEventKind {
        match self {
            ProjectEvent::BatchRegistered(_) => ProjectEventKind::BatchRegistered,
        }
    }

    fn occurred_on(&self) -> DateTime<Utc> {
        match self {
            ProjectEvent::BatchRegistered(event) => event.occurred_on,
        }
    }
}

impl From<BatchRegistered> for ProjectEvent {
    fn from(event: BatchRegistered) -> Self {
        ProjectEvent::BatchRegistered(event)
    }
}
