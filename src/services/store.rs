use chrono::Utc;
use std::collections::HashMap;
use std::sync::RwLock;

use crate::models::job::{Job, JobStatus, JobUpdate};
use crate::services::id_gen::JobIdGenerator;

/// In-memory job table.
///
/// All reads and writes go through one `RwLock`, so concurrent submissions and
/// backend updates never lose writes. Jobs are never evicted.
pub struct JobStore {
    ids: JobIdGenerator,
    jobs: RwLock<HashMap<String, Job>>,
}

/// Number of stored jobs per status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct StatusCounts {
    pub queued: usize,
    pub processing: usize,
    pub completed: usize,
    pub failed: usize,
}

impl StatusCounts {
    pub fn active(&self) -> usize {
        self.queued + self.processing
    }
}

impl JobStore {
    pub fn new() -> Self {
        Self {
            ids: JobIdGenerator::new(),
            jobs: RwLock::new(HashMap::new()),
        }
    }

    /// Insert a new Queued job holding `parameters`.
    pub fn create(&self, parameters: serde_json::Value) -> Job {
        let mut jobs = self.jobs.write().unwrap_or_else(|e| e.into_inner());

        let mut id = self.ids.next_id();
        while jobs.contains_key(&id) {
            id = self.ids.next_id();
        }

        let now = Utc::now();
        let job = Job {
            id: id.clone(),
            status: JobStatus::Queued,
            progress: 0.0,
            parameters,
            result: None,
            error: None,
            created_at: now,
            updated_at: now,
            completed_at: None,
        };
        jobs.insert(id, job.clone());
        job
    }

    pub fn get(&self, id: &str) -> Result<Job, StoreError> {
        let jobs = self.jobs.read().unwrap_or_else(|e| e.into_inner());
        jobs.get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    /// Apply a partial update. On error the stored job is left unchanged.
    pub fn update(&self, id: &str, update: JobUpdate) -> Result<Job, StoreError> {
        let mut jobs = self.jobs.write().unwrap_or_else(|e| e.into_inner());
        let current = jobs
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        let next = apply_update(current, update)?;
        *current = next.clone();
        Ok(next)
    }

    /// All jobs, oldest first.
    pub fn list(&self) -> Vec<Job> {
        let jobs = self.jobs.read().unwrap_or_else(|e| e.into_inner());
        let mut all: Vec<Job> = jobs.values().cloned().collect();
        all.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        all
    }

    pub fn counts(&self) -> StatusCounts {
        let jobs = self.jobs.read().unwrap_or_else(|e| e.into_inner());
        let mut counts = StatusCounts::default();
        for job in jobs.values() {
            match job.status {
                JobStatus::Queued => counts.queued += 1,
                JobStatus::Processing => counts.processing += 1,
                JobStatus::Completed => counts.completed += 1,
                JobStatus::Failed => counts.failed += 1,
            }
        }
        counts
    }
}

impl Default for JobStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Compute the job that results from `update`, or reject it.
fn apply_update(current: &Job, update: JobUpdate) -> Result<Job, StoreError> {
    let reject = |reason: String| StoreError::InvalidTransition {
        id: current.id.clone(),
        from: current.status,
        reason,
    };

    if current.status.is_terminal() {
        return Err(reject(format!("job is already {}", current.status)));
    }

    let status = update.status.unwrap_or(current.status);
    if status.rank() < current.status.rank() {
        return Err(reject(format!("cannot move back to {status}")));
    }

    if update.result.is_some() && status != JobStatus::Completed {
        return Err(reject(format!("result given with status {status}")));
    }
    if update.error.is_some() && status != JobStatus::Failed {
        return Err(reject(format!("error given with status {status}")));
    }
    if status == JobStatus::Completed && update.result.is_none() {
        return Err(reject("completed without a result".to_string()));
    }
    if status == JobStatus::Failed && update.error.is_none() {
        return Err(reject("failed without an error message".to_string()));
    }

    let progress = match update.progress {
        Some(p) if !p.is_finite() || !(0.0..=100.0).contains(&p) => {
            return Err(reject(format!("progress {p} outside 0..=100")));
        }
        Some(p) if p < current.progress => {
            return Err(reject(format!(
                "progress regressed from {} to {p}",
                current.progress
            )));
        }
        Some(p) => p,
        None if status == JobStatus::Completed => 100.0,
        None => current.progress,
    };

    if status == JobStatus::Completed && progress < 100.0 {
        return Err(reject(format!("completed with progress {progress}")));
    }
    if status != JobStatus::Completed && progress >= 100.0 {
        return Err(reject(format!("progress 100 requires completed, got {status}")));
    }

    let now = Utc::now();
    Ok(Job {
        status,
        progress,
        result: update.result,
        error: update.error,
        updated_at: now,
        completed_at: status.is_terminal().then_some(now),
        ..current.clone()
    })
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Job not found: {0}")]
    NotFound(String),

    #[error("Invalid transition for job {id} from {from}: {reason}")]
    InvalidTransition {
        id: String,
        from: JobStatus,
        reason: String,
    },
}
