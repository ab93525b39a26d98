use crate::models::job::{Job, JobStatus};
use crate::models::status::PublicStatus;

/// Map a stored job to its public view.
///
/// Parameters and timestamps stay internal; progress is rounded to a whole
/// percentage and only a completed job shows 100.
pub fn project(job: &Job) -> PublicStatus {
    PublicStatus {
        id: job.id.clone(),
        status: job.status,
        progress: round_progress(job.status, job.progress),
        result: job.result.clone(),
        error: job.error.clone(),
    }
}

fn round_progress(status: JobStatus, progress: f64) -> u8 {
    if !progress.is_finite() {
        return 0;
    }
    let ceiling = if status == JobStatus::Completed { 100.0 } else { 99.0 };
    progress.round().clamp(0.0, ceiling) as u8
}
