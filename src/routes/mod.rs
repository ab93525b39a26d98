use axum::extract::State;
use axum::routing::get;
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;

use crate::app_state::AppState;

pub mod health;
pub mod jobs;

/// API routes over shared tracker state.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/api/v1/jobs", get(jobs::list_jobs).post(jobs::submit_job))
        .route(
            "/api/v1/jobs/{id}",
            get(jobs::get_job_status).patch(jobs::update_job),
        )
        .with_state(state)
}

/// Prometheus scrape endpoint, mounted on its own state.
pub fn metrics_router(handle: Arc<PrometheusHandle>) -> Router {
    Router::new()
        .route("/metrics", get(render_metrics))
        .with_state(handle)
}

async fn render_metrics(State(handle): State<Arc<PrometheusHandle>>) -> String {
    handle.render()
}
