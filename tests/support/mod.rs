//! Test doubles shared by the integration suites.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::io;
use std::rc::Rc;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, TimeZone, Utc};
use tracing_subscriber::fmt::MakeWriter;

use domain_messaging::authorization::{AuthorityError, AuthorityService};
use domain_messaging::communication::{Content, EmailError, EmailService, Recipient, Subject};
use domain_messaging::identity::{
    EmailConfirmationLinkSupplier, IdentityEvent, IdentityEventKind, PasswordResetLinkSupplier,
    UserDirectory, UserInfo,
};
use domain_messaging::integration::{ensure_type, IntegrationEvent, MessageError, MessageSubscriber};
use domain_messaging::projectmanagement::{AppContextProvider, ProjectAccess};
use domain_messaging::transport::{PayloadListener, QueueTransport, TransportError};
use domain_messaging::{Clock, DirectiveError, DomainEventSubscriber, Job, JobError, JobId, JobScheduler};

// =============================================================================
// Time
// =============================================================================

pub struct FixedClock(pub DateTime<Utc>);

impl FixedClock {
    pub fn new() -> Self {
        Self(Utc.with_ymd_and_hms(2024, 5, 17, 9, 30, 0).unwrap())
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

// =============================================================================
// Jobs
// =============================================================================

/// Keeps enqueued jobs until the test runs them.
#[derive(Default)]
pub struct RecordingScheduler {
    jobs: Mutex<Vec<Box<dyn Job>>>,
}

impl RecordingScheduler {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn len(&self) -> usize {
        self.jobs.lock().unwrap().len()
    }

    pub fn names(&self) -> Vec<String> {
        self.jobs.lock().unwrap().iter().map(|job| job.name()).collect()
    }

    /// Run and drop every job enqueued so far.
    pub fn run_all(&self) -> Vec<Result<(), JobError>> {
        let jobs: Vec<Box<dyn Job>> = self.jobs.lock().unwrap().drain(..).collect();
        jobs.iter().map(|job| job.run()).collect()
    }
}

impl JobScheduler for RecordingScheduler {
    fn enqueue(&self, job: Box<dyn Job>) -> Result<JobId, JobError> {
        self.jobs.lock().unwrap().push(job);
        Ok(JobId::new())
    }
}

/// Runs each job right away on the caller's thread.
pub struct InlineScheduler;

impl JobScheduler for InlineScheduler {
    fn enqueue(&self, job: Box<dyn Job>) -> Result<JobId, JobError> {
        job.run()?;
        Ok(JobId::new())
    }
}

pub struct RefusingScheduler;

impl JobScheduler for RefusingScheduler {
    fn enqueue(&self, _job: Box<dyn Job>) -> Result<JobId, JobError> {
        Err(JobError::Rejected("queue full".into()))
    }
}

/// Accepts `limit` jobs, then refuses every further one.
pub struct LimitedScheduler {
    limit: usize,
    accepted: RecordingScheduler,
}

impl LimitedScheduler {
    pub fn new(limit: usize) -> Arc<Self> {
        Arc::new(Self {
            limit,
            accepted: RecordingScheduler::default(),
        })
    }

    pub fn len(&self) -> usize {
        self.accepted.len()
    }

    pub fn names(&self) -> Vec<String> {
        self.accepted.names()
    }
}

impl JobScheduler for LimitedScheduler {
    fn enqueue(&self, job: Box<dyn Job>) -> Result<JobId, JobError> {
        if self.accepted.len() >= self.limit {
            return Err(JobError::Rejected("queue full".into()));
        }
        self.accepted.enqueue(job)
    }
}

// =============================================================================
// Collaborators
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentEmail {
    pub subject: String,
    pub recipient: Recipient,
    pub content: String,
}

#[derive(Default)]
pub struct RecordingEmailService {
    pub sent: Mutex<Vec<SentEmail>>,
    pub fail: bool,
}

impl RecordingEmailService {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            sent: Mutex::new(Vec::new()),
            fail: true,
        })
    }

    pub fn sent(&self) -> Vec<SentEmail> {
        self.sent.lock().unwrap().clone()
    }
}

impl EmailService for RecordingEmailService {
    fn send(&self, subject: Subject, recipient: Recipient, content: Content) -> Result<(), EmailError> {
        if self.fail {
            return Err(EmailError::Submission {
                address: recipient.address,
                reason: "mail server unreachable".into(),
            });
        }
        self.sent.lock().unwrap().push(SentEmail {
            subject: subject.0,
            recipient,
            content: content.0,
        });
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryUsers {
    users: Mutex<HashMap<String, UserInfo>>,
}

impl InMemoryUsers {
    pub fn with(users: &[(&str, &str, &str)]) -> Arc<Self> {
        let directory = Self::default();
        for (id, full_name, email) in users {
            directory.users.lock().unwrap().insert(
                id.to_string(),
                UserInfo {
                    id: id.to_string(),
                    full_name: full_name.to_string(),
                    email: email.to_string(),
                },
            );
        }
        Arc::new(directory)
    }

    pub fn remove(&self, user_id: &str) {
        self.users.lock().unwrap().remove(user_id);
    }
}

impl UserDirectory for InMemoryUsers {
    fn find_by_id(&self, user_id: &str) -> Option<UserInfo> {
        self.users.lock().unwrap().get(user_id).cloned()
    }
}

pub struct FakeLinks;

impl EmailConfirmationLinkSupplier for FakeLinks {
    fn email_confirmation_url(&self, user_id: &str) -> String {
        format!("https://test/confirm/{user_id}")
    }
}

impl PasswordResetLinkSupplier for FakeLinks {
    fn password_reset_url(&self, user_id: &str) -> String {
        format!("https://test/reset/{user_id}")
    }
}

pub struct FixedCollaborators(pub Vec<String>);

impl ProjectAccess for FixedCollaborators {
    fn list_collaborators(&self, _project_id: &str) -> Vec<String> {
        self.0.clone()
    }
}

pub struct FakeAppContext;

impl AppContextProvider for FakeAppContext {
    fn url_to_sample_page(&self, project_id: &str, experiment_id: &str) -> String {
        format!("https://test/{project_id}/{experiment_id}/samples")
    }
}

#[derive(Default)]
pub struct RecordingAuthorities {
    pub granted: Mutex<Vec<String>>,
}

impl AuthorityService for RecordingAuthorities {
    fn grant_default_authority(&self, user_id: &str) -> Result<(), AuthorityError> {
        self.granted.lock().unwrap().push(user_id.to_string());
        Ok(())
    }
}

// =============================================================================
// Transport
// =============================================================================

pub struct FailingTransport;

impl QueueTransport for FailingTransport {
    fn publish(&self, _destination: &str, _payload: &str) -> Result<(), TransportError> {
        Err(TransportError::ConnectionFailed("broker down".into()))
    }

    fn register_listener(
        &self,
        _destination: &str,
        _listener: Arc<dyn PayloadListener>,
    ) -> Result<(), TransportError> {
        Err(TransportError::ConnectionFailed("broker down".into()))
    }
}

// =============================================================================
// Subscribers
// =============================================================================

/// Domain subscriber that appends `label` to a shared log.
pub struct Recorder {
    pub label: &'static str,
    pub kind: IdentityEventKind,
    pub log: Rc<RefCell<Vec<String>>>,
}

impl Recorder {
    pub fn new(label: &'static str, kind: IdentityEventKind, log: &Rc<RefCell<Vec<String>>>) -> Rc<Self> {
        Rc::new(Self {
            label,
            kind,
            log: Rc::clone(log),
        })
    }
}

impl DomainEventSubscriber<IdentityEvent> for Recorder {
    fn subscribed_to_event_type(&self) -> IdentityEventKind {
        self.kind
    }

    fn handle_event(&self, _event: &IdentityEvent) -> Result<(), DirectiveError> {
        self.log.borrow_mut().push(self.label.to_string());
        Ok(())
    }
}

/// Integration subscriber that keeps every event it receives.
pub struct RecordingMessageSubscriber {
    pub event_type: &'static str,
    pub received: Mutex<Vec<IntegrationEvent>>,
}

impl RecordingMessageSubscriber {
    pub fn new(event_type: &'static str) -> Arc<Self> {
        Arc::new(Self {
            event_type,
            received: Mutex::new(Vec::new()),
        })
    }

    pub fn received(&self) -> Vec<IntegrationEvent> {
        self.received.lock().unwrap().clone()
    }
}

impl MessageSubscriber for RecordingMessageSubscriber {
    fn subscribed_type(&self) -> &str {
        self.event_type
    }

    fn on_receive(&self, event: &IntegrationEvent) -> Result<(), MessageError> {
        ensure_type(self.event_type, event)?;
        self.received.lock().unwrap().push(event.clone());
        Ok(())
    }
}

// =============================================================================
// Log capture
// =============================================================================

#[derive(Clone, Default)]
pub struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogBuffer {
    type Writer = LogBuffer;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Run `f` with a `tracing` subscriber that writes into a buffer on this
/// thread, and return what was logged.
pub fn capture_logs<T>(f: impl FnOnce() -> T) -> (T, String) {
    let buffer = LogBuffer::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(buffer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::TRACE)
        .finish();

    let result = tracing::subscriber::with_default(subscriber, f);
    (result, buffer.contents())
}
