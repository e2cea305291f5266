//! Manages the state of long-running, asynchronous background jobs.
//!
//! Imports triggered over HTTP run outside the request/response cycle (see
//! `services::imports::job`). Clients poll their status by job id.
//!
//! The main components are:
//! - `JobsState`: a clonable, thread-safe struct holding the status of every job
//!   plus the lock that keeps storage writers one at a time.
//! - `JobUpdate`: a message sent by a background job to report a status change.
//! - `start_job_updater`: a long-running task that applies `JobUpdate` messages
//!   to the shared map.

use common::jobs::JobStatus;
use std::{collections::HashMap, sync::Arc};
use tokio::sync::{mpsc, RwLock};

/// Capacity of the update channel.
const UPDATE_BUFFER: usize = 100;

/// A thread-safe, shareable container for the state of all background jobs.
///
/// Created in `main.rs` and shared across the Actix application as
/// `web::Data`.
#[derive(Clone)]
pub struct JobsState {
    /// A map from a unique job ID to its current `JobStatus`.
    ///
    /// Read concurrently by the status endpoint, written by `start_job_updater`
    /// and by the task that owns each job.
    pub jobs: Arc<RwLock<HashMap<String, JobStatus>>>,

    /// Background tasks push `JobUpdate` messages through this sender instead
    /// of writing to `jobs` directly.
    pub tx: mpsc::Sender<JobUpdate>,

    /// Held for the whole duration of anything that writes to storage, so
    /// imports and purges never overlap.
    pub writer: Arc<std::sync::Mutex<()>>,
}

impl JobsState {
    /// Creates an empty state and the receiving end that `start_job_updater`
    /// must be given.
    pub fn new() -> (Self, mpsc::Receiver<JobUpdate>) {
        let (tx, rx) = mpsc::channel(UPDATE_BUFFER);
        let state = JobsState {
            jobs: Arc::new(RwLock::new(HashMap::new())),
            tx,
            writer: Arc::new(std::sync::Mutex::new(())),
        };
        (state, rx)
    }

    pub async fn status(&self, job_id: &str) -> Option<JobStatus> {
        self.jobs.read().await.get(job_id).cloned()
    }
}

/// Represents a status update for a specific background job.
#[derive(Debug)]
pub struct JobUpdate {
    /// The unique identifier of the job being updated.
    pub(crate) job_id: String,
    /// The new status of the job.
    pub(crate) status: JobStatus,
}

/// Starts the central job state updater task.
///
/// Spawned once at startup. It listens for `JobUpdate` messages and records the
/// new status of the corresponding job. A late progress update never
/// overwrites a job that already finished.
pub async fn start_job_updater(state: JobsState, mut rx: mpsc::Receiver<JobUpdate>) {
    while let Some(update) = rx.recv().await {
        let mut jobs = state.jobs.write().await;
        let finished = matches!(
            jobs.get(&update.job_id),
            Some(JobStatus::Completed(_) | JobStatus::Failed(_))
        );
        if !finished {
            jobs.insert(update.job_id, update.status);
        }
    }
}
