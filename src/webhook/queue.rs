//! Bounded job queue drained by a fixed pool of worker tasks.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::{PushEvent, WebhookError};
use crate::detector::Verdict;

/// Jobs buffered per worker before the queue reports full.
pub const QUEUE_SLOTS_PER_WORKER: usize = 25;

/// Seconds completed and failed jobs stay queryable.
pub const DEFAULT_JOB_RETENTION_SECS: i64 = 3600;

/// Lifecycle of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    /// Waiting for a worker
    Queued,
    /// Picked up by a worker
    Processing,
    /// Finished successfully
    Completed,
    /// Processing returned an error
    Failed,
}

/// Verdict for one pushed commit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommitVerdict {
    /// Commit SHA
    pub hash: String,
    /// First line of the message
    pub message: String,
    /// Engine verdict
    pub verdict: Verdict,
}

/// Tracked state of one queued push.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    /// Job identifier
    pub id: String,
    /// Current state
    pub status: JobStatus,
    /// `owner/name` of the pushed repository
    pub repository: String,
    /// Pushed branch
    pub branch: String,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last state change
    pub updated_at: DateTime<Utc>,
    /// Per-commit results once completed
    pub results: Vec<CommitVerdict>,
    /// Failure description once failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Job {
    /// Whether the job has completed or failed.
    pub fn is_finished(&self) -> bool {
        matches!(self.status, JobStatus::Completed | JobStatus::Failed)
    }
}

/// Work performed for each queued push.
pub trait JobProcessor: Send + Sync {
    /// Scores the commits of one push.
    fn process(&self, event: &PushEvent) -> Result<Vec<CommitVerdict>, WebhookError>;
}

struct QueuedJob {
    id: String,
    event: PushEvent,
}

type JobTable = Arc<RwLock<HashMap<String, Job>>>;

/// Bounded queue with a fixed worker pool.
pub struct JobQueue {
    processor: Arc<dyn JobProcessor>,
    max_workers: usize,
    capacity: usize,
    retention: TimeDelta,
    jobs: JobTable,
    sender: Mutex<Option<mpsc::Sender<QueuedJob>>>,
    workers: Mutex<Vec<JoinHandle<()>>>,
}

impl JobQueue {
    /// Creates a stopped queue; zero workers falls back to one.
    pub fn new(max_workers: usize, processor: Arc<dyn JobProcessor>) -> Self {
        let max_workers = max_workers.max(1);
        Self::with_capacity(max_workers, max_workers * QUEUE_SLOTS_PER_WORKER, processor)
    }

    /// Creates a stopped queue with an explicit buffer size.
    pub fn with_capacity(
        max_workers: usize,
        capacity: usize,
        processor: Arc<dyn JobProcessor>,
    ) -> Self {
        Self {
            processor,
            max_workers: max_workers.max(1),
            capacity: capacity.max(1),
            retention: TimeDelta::seconds(DEFAULT_JOB_RETENTION_SECS),
            jobs: Arc::new(RwLock::new(HashMap::new())),
            sender: Mutex::new(None),
            workers: Mutex::new(Vec::new()),
        }
    }

    /// Sets how long finished jobs are kept.
    #[must_use]
    pub fn with_retention(mut self, retention: TimeDelta) -> Self {
        self.retention = retention;
        self
    }

    /// Whether workers are running.
    pub fn is_running(&self) -> bool {
        self.sender.lock().is_ok_and(|s| s.is_some())
    }

    /// Spawns the workers.
    pub fn start(&self) -> Result<(), WebhookError> {
        let mut sender = self
            .sender
            .lock()
            .map_err(|_| WebhookError::Processing("queue lock poisoned".to_string()))?;
        if sender.is_some() {
            return Err(WebhookError::AlreadyStarted);
        }

        let (tx, rx) = mpsc::channel(self.capacity);
        let rx = Arc::new(tokio::sync::Mutex::new(rx));
        let handles: Vec<_> = (0..self.max_workers)
            .map(|worker| {
                tokio::spawn(run_worker(
                    worker,
                    Arc::clone(&rx),
                    Arc::clone(&self.processor),
                    Arc::clone(&self.jobs),
                ))
            })
            .collect();

        if let Ok(mut workers) = self.workers.lock() {
            *workers = handles;
        }
        *sender = Some(tx);
        info!(workers = self.max_workers, capacity = self.capacity, "Job queue started");
        Ok(())
    }

    /// Closes the queue and waits for workers to drain it.
    pub async fn stop(&self) -> Result<(), WebhookError> {
        // Dropping the last sender lets workers drain the buffer and exit.
        drop(self.take_sender()?);

        for handle in self.take_workers() {
            if let Err(e) = handle.await {
                warn!(error = %e, "Worker task ended abnormally");
            }
        }
        info!("Job queue stopped");
        Ok(())
    }

    /// Queues a push and returns its job id.
    pub async fn enqueue(&self, event: PushEvent) -> Result<String, WebhookError> {
        let sender = self.current_sender()?;

        self.prune().await;

        let id = Uuid::new_v4().to_string();
        let now = Utc::now();
        self.jobs.write().await.insert(
            id.clone(),
            Job {
                id: id.clone(),
                status: JobStatus::Queued,
                repository: event.repository.full_name.clone(),
                branch: event.branch().to_string(),
                created_at: now,
                updated_at: now,
                results: Vec::new(),
                error: None,
            },
        );

        let queued = QueuedJob {
            id: id.clone(),
            event,
        };
        if let Err(e) = sender.try_send(queued) {
            self.jobs.write().await.remove(&id);
            return Err(match e {
                mpsc::error::TrySendError::Full(_) => WebhookError::QueueFull,
                mpsc::error::TrySendError::Closed(_) => WebhookError::NotRunning,
            });
        }

        debug!(job = %id, "Job queued");
        Ok(id)
    }

    fn current_sender(&self) -> Result<mpsc::Sender<QueuedJob>, WebhookError> {
        self.sender
            .lock()
            .map_err(|_| WebhookError::NotRunning)?
            .clone()
            .ok_or(WebhookError::NotRunning)
    }

    fn take_sender(&self) -> Result<mpsc::Sender<QueuedJob>, WebhookError> {
        self.sender
            .lock()
            .map_err(|_| WebhookError::NotRunning)?
            .take()
            .ok_or(WebhookError::NotRunning)
    }

    fn take_workers(&self) -> Vec<JoinHandle<()>> {
        self.workers
            .lock()
            .map(|mut workers| std::mem::take(&mut *workers))
            .unwrap_or_default()
    }

    /// Snapshot of one job.
    pub async fn get(&self, id: &str) -> Option<Job> {
        self.jobs.read().await.get(id).cloned()
    }

    /// Drops finished jobs older than the retention period; returns how many.
    pub async fn prune(&self) -> usize {
        let cutoff = Utc::now() - self.retention;
        let mut jobs = self.jobs.write().await;
        let before = jobs.len();
        jobs.retain(|_, job| !(job.is_finished() && job.updated_at <= cutoff));
        let removed = before - jobs.len();
        if removed > 0 {
            debug!(removed, remaining = jobs.len(), "Pruned finished jobs");
        }
        removed
    }

    /// Number of tracked jobs.
    pub async fn job_count(&self) -> usize {
        self.jobs.read().await.len()
    }
}

async fn run_worker(
    worker: usize,
    rx: Arc<tokio::sync::Mutex<mpsc::Receiver<QueuedJob>>>,
    processor: Arc<dyn JobProcessor>,
    jobs: JobTable,
) {
    loop {
        let next = rx.lock().await.recv().await;
        let Some(QueuedJob { id, event }) = next else {
            break;
        };

        set_status(&jobs, &id, JobStatus::Processing, |_| {}).await;
        debug!(worker, job = %id, commits = event.commits.len(), "Processing job");

        let processor = Arc::clone(&processor);
        let outcome = tokio::task::spawn_blocking(move || processor.process(&event)).await;

        match outcome {
            Ok(Ok(results)) => {
                set_status(&jobs, &id, JobStatus::Completed, |job| job.results = results).await;
            }
            Ok(Err(e)) => {
                warn!(job = %id, error = %e, "Job failed");
                set_status(&jobs, &id, JobStatus::Failed, |job| job.error = Some(e.to_string()))
                    .await;
            }
            Err(e) => {
                warn!(job = %id, error = %e, "Job panicked");
                set_status(&jobs, &id, JobStatus::Failed, |job| job.error = Some(e.to_string()))
                    .await;
            }
        }
    }
    debug!(worker, "Worker exiting");
}

async fn set_status(jobs: &JobTable, id: &str, status: JobStatus, update: impl FnOnce(&mut Job)) {
    if let Some(job) = jobs.write().await.get_mut(id) {
        job.status = status;
        job.updated_at = Utc::now();
        update(job);
    }
}
