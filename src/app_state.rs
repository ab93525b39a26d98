use std::sync::Arc;
use std::time::Instant;

use crate::services::tracker::JobTracker;

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub tracker: Arc<JobTracker>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(tracker: JobTracker) -> Self {
        Self {
            tracker: Arc::new(tracker),
            started_at: Instant::now(),
        }
    }
}
