//! Runs one registration and one activation through the whole pipeline:
//! domain dispatcher, directives, job runner, Event Hub, in-memory queue,
//! Message Consumer and the authorization subscriber.
//!
//! Usage: `domain_messaging [config.toml]`

use std::collections::HashMap;
use std::process::ExitCode;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use tracing::{error, info};

use domain_messaging::authorization::{
    AuthorityError, AuthorityService, GrantDefaultAuthorityOnUserActivation,
};
use domain_messaging::communication::{Content, EmailError, EmailService, Recipient, Subject};
use domain_messaging::config::MessagingConfig;
use domain_messaging::identity::{
    identity_policy, BaseUrlLinks, IdentityEvent, IdentityServices, UserActivated, UserDirectory,
    UserInfo, UserRegistered,
};
use domain_messaging::jobs::JobRunnerStats;
use domain_messaging::telemetry::init_tracing;
use domain_messaging::transport::DeliveryThread;
use domain_messaging::{
    DomainEventDispatcher, EventHub, InMemoryQueue, JobScheduler, MessageConsumer, MessageRouter,
    SystemClock, ThreadJobRunner, USER_DESTINATION,
};

struct Users(HashMap<String, UserInfo>);

impl UserDirectory for Users {
    fn find_by_id(&self, user_id: &str) -> Option<UserInfo> {
        self.0.get(user_id).cloned()
    }
}

struct LogMailer;

impl EmailService for LogMailer {
    fn send(&self, subject: Subject, recipient: Recipient, content: Content) -> Result<(), EmailError> {
        info!(to = %recipient, subject = %subject.0, body_len = content.0.len(), "email sent");
        Ok(())
    }
}

#[derive(Default)]
struct Authorities(Mutex<Vec<String>>);

impl AuthorityService for Authorities {
    fn grant_default_authority(&self, user_id: &str) -> Result<(), AuthorityError> {
        self.0
            .lock()
            .map_err(|_| AuthorityError {
                user_id: user_id.to_string(),
                reason: "authority store poisoned".to_string(),
            })?
            .push(user_id.to_string());
        Ok(())
    }
}

fn main() -> ExitCode {
    let config = match std::env::args().nth(1) {
        Some(path) => match MessagingConfig::load(&path) {
            Ok(config) => config,
            Err(err) => {
                eprintln!("{err}");
                return ExitCode::FAILURE;
            }
        },
        None => MessagingConfig::default(),
    };
    init_tracing(&config.logging);

    let runner = ThreadJobRunner::spawn(config.job_runner.clone());
    let scheduler: Arc<dyn JobScheduler> = Arc::new(runner.handle());

    let queue = InMemoryQueue::with_capacity(config.queue.capacity);
    let hub = EventHub::new(Arc::new(queue.clone()));

    let user = UserInfo {
        id: "user-1".to_string(),
        full_name: "Ada Lovelace".to_string(),
        email: "ada@example.org".to_string(),
    };
    let users = Users(HashMap::from([(user.id.clone(), user.clone())]));
    let links = Arc::new(BaseUrlLinks::new("https://data.example.org"));

    let services = IdentityServices {
        scheduler: Arc::clone(&scheduler),
        users: Arc::new(users),
        email: Arc::new(LogMailer),
        confirmation_links: links.clone(),
        password_reset_links: links,
        hub,
    };
    let dispatcher = DomainEventDispatcher::<IdentityEvent>::current();
    identity_policy(&services).register(&dispatcher);

    let authorities = Arc::new(Authorities::default());
    let router = Arc::new(MessageRouter::new());
    router.register(Arc::new(GrantDefaultAuthorityOnUserActivation::new(
        Arc::clone(&scheduler),
        authorities.clone(),
    )));
    let consumer = Arc::new(MessageConsumer::new(router));
    if let Err(err) = consumer.listen(&queue) {
        error!(error = %err, "could not register message consumer");
        return ExitCode::FAILURE;
    }
    let delivery = DeliveryThread::spawn(queue.clone(), config.queue.delivery_poll_interval());

    let events: [IdentityEvent; 2] = [
        UserRegistered::new(&user.id, &user.full_name, &user.email, &SystemClock).into(),
        UserActivated::new(&user.id, &SystemClock).into(),
    ];
    for event in &events {
        if let Err(err) = dispatcher.publish(event) {
            error!(error = %err, "publishing failed");
        }
    }

    // The grant job is scheduled only after the userActivated payload made
    // the round trip through the queue.
    let job_stats = wait_for_grants(&authorities, runner, &queue);
    let delivery_stats = delivery.stop();

    info!(
        completed = job_stats.completed,
        failed = job_stats.failed,
        retried = job_stats.retried,
        delivered = delivery_stats.delivered,
        granted = authorities.0.lock().map(|granted| granted.len()).unwrap_or(0),
        "done"
    );
    ExitCode::SUCCESS
}

fn wait_for_grants(
    authorities: &Authorities,
    runner: ThreadJobRunner,
    queue: &InMemoryQueue,
) -> JobRunnerStats {
    for _ in 0..100 {
        let granted = authorities.0.lock().map(|granted| !granted.is_empty()).unwrap_or(true);
        if granted && queue.pending(USER_DESTINATION) == 0 {
            break;
        }
        thread::sleep(Duration::from_millis(10));
    }
    runner.stop()
}
