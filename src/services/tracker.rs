use std::sync::Arc;

use crate::models::job::{JobStatus, JobUpdate};
use crate::models::status::{PublicStatus, SubmitResponse};
use crate::services::poller::{
    self, SourceError, StatusSource, WatchHandle, WatchOptions, WatchResult,
};
use crate::services::projection::project;
use crate::services::store::{JobStore, StatusCounts, StoreError};
use crate::services::validation::{validate_parameters, ValidationError};

/// Client-facing job lifecycle API over an owned [`JobStore`].
pub struct JobTracker {
    store: JobStore,
}

impl JobTracker {
    pub fn new() -> Self {
        Self::with_store(JobStore::new())
    }

    pub fn with_store(store: JobStore) -> Self {
        Self { store }
    }

    /// Validate `parameters` and create a Queued job for them.
    ///
    /// Nothing is stored when validation fails.
    pub fn submit(&self, parameters: serde_json::Value) -> Result<SubmitResponse, TrackerError> {
        let request = match validate_parameters(&parameters) {
            Ok(request) => request,
            Err(e) => {
                metrics::counter!("training_jobs_rejected_total").increment(1);
                tracing::info!(error = %e, "Rejected job submission");
                return Err(e.into());
            }
        };

        let job = self.store.create(parameters);
        metrics::counter!("training_jobs_submitted_total").increment(1);
        self.record_active();

        tracing::info!(
            job_id = %job.id,
            model_type = %request.model_type,
            datasets = request.dataset_ids.len(),
            "Training job submitted"
        );

        Ok(SubmitResponse { id: job.id })
    }

    pub fn status(&self, id: &str) -> Result<PublicStatus, TrackerError> {
        let job = self.store.get(id)?;
        Ok(project(&job))
    }

    /// Apply a backend status report.
    pub fn update(&self, id: &str, update: JobUpdate) -> Result<PublicStatus, TrackerError> {
        let job = match self.store.update(id, update) {
            Ok(job) => job,
            Err(e @ StoreError::InvalidTransition { .. }) => {
                tracing::error!(job_id = %id, error = %e, "Rejected invalid job transition");
                return Err(e.into());
            }
            Err(e) => return Err(e.into()),
        };

        match job.status {
            JobStatus::Completed => {
                metrics::counter!("training_jobs_completed_total").increment(1);
                tracing::info!(job_id = %job.id, "Training job completed");
            }
            JobStatus::Failed => {
                metrics::counter!("training_jobs_failed_total").increment(1);
                tracing::warn!(
                    job_id = %job.id,
                    error = job.error.as_deref().unwrap_or_default(),
                    "Training job failed"
                );
            }
            status => {
                tracing::debug!(job_id = %job.id, %status, progress = job.progress, "Job progress");
            }
        }
        self.record_active();

        Ok(project(&job))
    }

    /// Public view of every job, oldest first.
    pub fn list(&self) -> Vec<PublicStatus> {
        self.store.list().iter().map(project).collect()
    }

    pub fn counts(&self) -> StatusCounts {
        self.store.counts()
    }

    /// Poll this tracker for `id` until it finishes; see [`poller::watch_job`].
    pub fn watch<F>(
        self: &Arc<Self>,
        id: impl Into<String>,
        options: WatchOptions,
        on_update: F,
    ) -> WatchHandle
    where
        F: FnOnce(WatchResult) + Send + 'static,
    {
        poller::watch_job(Arc::clone(self), id, options, on_update)
    }

    fn record_active(&self) {
        metrics::gauge!("training_jobs_active").set(self.store.counts().active() as f64);
    }
}

impl Default for JobTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusSource for JobTracker {
    async fn status(&self, id: &str) -> Result<PublicStatus, SourceError> {
        JobTracker::status(self, id).map_err(|e| match e {
            TrackerError::NotFound(id) => SourceError::NotFound(id),
            other => SourceError::Unavailable(other.to_string()),
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Job not found: {0}")]
    NotFound(String),

    #[error("Invalid transition for job {id} from {from}: {reason}")]
    InvalidTransition {
        id: String,
        from: JobStatus,
        reason: String,
    },
}

impl From<StoreError> for TrackerError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(id) => TrackerError::NotFound(id),
            StoreError::InvalidTransition { id, from, reason } => {
                TrackerError::InvalidTransition { id, from, reason }
            }
        }
    }
}
