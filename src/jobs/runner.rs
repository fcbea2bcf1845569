//! In-process job runner on a background thread.

use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{channel, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use tracing::{debug, error, warn};

use super::job::{Job, JobError, JobId, JobScheduler};
use crate::config::JobRunnerConfig;

/// Statistics from the job runner.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct JobRunnerStats {
    /// Jobs that eventually ran successfully.
    pub completed: usize,
    /// Jobs that used up all their attempts.
    pub failed: usize,
    /// Re-executions after a failed attempt.
    pub retried: usize,
}

enum Command {
    Run(QueuedJob),
    Stop,
}

struct QueuedJob {
    id: JobId,
    job: Box<dyn Job>,
    attempts: u32,
    ready_at: Instant,
}

/// Cloneable scheduler handle feeding a [`ThreadJobRunner`].
#[derive(Clone)]
pub struct JobRunnerHandle {
    sender: Sender<Command>,
    accepting: Arc<AtomicBool>,
}

impl JobScheduler for JobRunnerHandle {
    fn enqueue(&self, job: Box<dyn Job>) -> Result<JobId, JobError> {
        if !self.accepting.load(Ordering::Acquire) {
            return Err(JobError::RunnerStopped);
        }
        let id = JobId::new();
        debug!(job_id = %id, job = %job.name(), "job enqueued");
        self.sender
            .send(Command::Run(QueuedJob {
                id,
                job,
                attempts: 0,
                ready_at: Instant::now(),
            }))
            .map_err(|_| JobError::RunnerStopped)?;
        Ok(id)
    }
}

/// A background thread executing enqueued jobs at least once.
///
/// A job whose `run` fails (or panics) is executed again after the configured
/// backoff until `max_attempts` executions have happened. Follows the same
/// lifecycle as the other worker threads: spawn, do work, stop and collect
/// stats.
///
/// ```ignore
/// let runner = ThreadJobRunner::spawn(JobRunnerConfig::default());
/// let scheduler: Arc<dyn JobScheduler> = Arc::new(runner.handle());
/// // ... directives enqueue work through `scheduler` ...
/// let stats = runner.stop();
/// ```
pub struct ThreadJobRunner {
    handle: JobRunnerHandle,
    thread: Option<JoinHandle<JobRunnerStats>>,
}

impl ThreadJobRunner {
    pub fn spawn(config: JobRunnerConfig) -> Self {
        let (sender, receiver) = channel();
        let accepting = Arc::new(AtomicBool::new(true));

        let thread = thread::Builder::new()
            .name("job-runner".into())
            .spawn(move || run_loop(&receiver, &config));

        let thread = match thread {
            Ok(handle) => Some(handle),
            Err(err) => {
                error!(error = %err, "failed to spawn job runner thread");
                accepting.store(false, Ordering::Release);
                None
            }
        };

        Self {
            handle: JobRunnerHandle { sender, accepting },
            thread,
        }
    }

    /// A scheduler handle that can be shared with directives.
    pub fn handle(&self) -> JobRunnerHandle {
        self.handle.clone()
    }

    /// Stop accepting work, finish everything already queued (including
    /// pending retries) and return the runner statistics.
    pub fn stop(mut self) -> JobRunnerStats {
        self.signal_stop();
        match self.thread.take() {
            Some(thread) => thread.join().unwrap_or_default(),
            None => JobRunnerStats::default(),
        }
    }

    /// Signal the runner to stop without waiting.
    pub fn signal_stop(&self) {
        self.handle.accepting.store(false, Ordering::Release);
        let _ = self.handle.sender.send(Command::Stop);
    }
}

impl JobScheduler for ThreadJobRunner {
    fn enqueue(&self, job: Box<dyn Job>) -> Result<JobId, JobError> {
        self.handle.enqueue(job)
    }
}

impl Drop for ThreadJobRunner {
    fn drop(&mut self) {
        self.signal_stop();
    }
}

fn run_loop(receiver: &Receiver<Command>, config: &JobRunnerConfig) -> JobRunnerStats {
    let mut stats = JobRunnerStats::default();
    let mut retries: VecDeque<QueuedJob> = VecDeque::new();
    let mut stopping = false;
    let poll_interval = config.poll_interval();

    loop {
        while retries
            .front()
            .is_some_and(|queued| queued.ready_at <= Instant::now())
        {
            if let Some(queued) = retries.pop_front() {
                execute(queued, config, &mut retries, &mut stats);
            }
        }

        let wait = retries
            .front()
            .map(|queued| {
                queued
                    .ready_at
                    .saturating_duration_since(Instant::now())
                    .min(poll_interval)
            })
            .unwrap_or(poll_interval);

        if stopping {
            match receiver.try_recv() {
                Ok(Command::Run(queued)) => execute(queued, config, &mut retries, &mut stats),
                Ok(Command::Stop) => {}
                Err(_) if retries.is_empty() => break,
                Err(_) => thread::sleep(wait),
            }
            continue;
        }

        match receiver.recv_timeout(wait) {
            Ok(Command::Run(queued)) => execute(queued, config, &mut retries, &mut stats),
            Ok(Command::Stop) | Err(RecvTimeoutError::Disconnected) => stopping = true,
            Err(RecvTimeoutError::Timeout) => {}
        }
    }

    debug!(
        completed = stats.completed,
        failed = stats.failed,
        retried = stats.retried,
        "job runner stopped"
    );
    stats
}

fn execute(
    mut queued: QueuedJob,
    config: &JobRunnerConfig,
    retries: &mut VecDeque<QueuedJob>,
    stats: &mut JobRunnerStats,
) {
    queued.attempts += 1;
    let name = queued.job.name();
    debug!(job_id = %queued.id, job = %name, attempt = queued.attempts, "running job");

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| queued.job.run()))
        .unwrap_or_else(|_| Err(JobError::Failed("job panicked".into())));

    match outcome {
        Ok(()) => stats.completed += 1,
        Err(err) if queued.attempts < config.max_attempts.max(1) => {
            warn!(
                job_id = %queued.id,
                job = %name,
                attempt = queued.attempts,
                error = %err,
                "job failed, scheduling retry"
            );
            stats.retried += 1;
            queued.ready_at = Instant::now() + config.retry_backoff();
            retries.push_back(queued);
        }
        Err(err) => {
            error!(
                job_id = %queued.id,
                job = %name,
                attempts = queued.attempts,
                error = %err,
                "job failed permanently"
            );
            stats.failed += 1;
        }
    }
}
