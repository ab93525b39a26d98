//! Test helper utilities

use ml_job_tracker::models::job::{JobStatus, JobUpdate};
use ml_job_tracker::services::tracker::JobTracker;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

/// Metrics a completed training run reports.
pub fn sample_results() -> serde_json::Value {
    json!({
        "accuracy": 0.92,
        "precision": 0.91,
        "recall": 0.9,
        "f1Score": 0.905,
        "auc": 0.93,
        "loss": 0.12,
        "trainingTime": 1800,
        "modelSize": "32MB"
    })
}

/// Stand-in for the processing backend: walks `id` through Processing in
/// `steps` increments, one every `step`, then completes it.
pub fn spawn_backend(
    tracker: Arc<JobTracker>,
    id: String,
    steps: u32,
    step: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        for i in 1..=steps {
            tokio::time::sleep(step).await;
            let progress = f64::from(i) * 100.0 / f64::from(steps + 1);
            tracker
                .update(&id, JobUpdate::processing(progress))
                .expect("backend progress update");
        }
        tokio::time::sleep(step).await;
        tracker
            .update(&id, JobUpdate::completed(sample_results()))
            .expect("backend completion update");
    })
}

/// Assert the completion invariant on a public snapshot.
pub fn assert_payload_matches_status(status: &ml_job_tracker::models::status::PublicStatus) {
    assert_eq!(
        status.result.is_some(),
        status.status == JobStatus::Completed,
        "result presence must match Completed for {}",
        status.id
    );
    assert_eq!(
        status.error.is_some(),
        status.status == JobStatus::Failed,
        "error presence must match Failed for {}",
        status.id
    );
}
