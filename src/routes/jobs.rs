use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::app_state::AppState;
use crate::models::job::JobUpdate;
use crate::models::status::{PublicStatus, SubmitResponse};
use crate::services::tracker::TrackerError;

/// POST /api/v1/jobs: Submit training parameters.
pub async fn submit_job(
    State(state): State<AppState>,
    Json(parameters): Json<serde_json::Value>,
) -> Result<(StatusCode, Json<SubmitResponse>), ApiError> {
    let submitted = state.tracker.submit(parameters)?;
    Ok((StatusCode::ACCEPTED, Json(submitted)))
}

/// GET /api/v1/jobs: All jobs, oldest first.
pub async fn list_jobs(State(state): State<AppState>) -> Json<Vec<PublicStatus>> {
    Json(state.tracker.list())
}

/// GET /api/v1/jobs/{id}: Point-in-time job status.
pub async fn get_job_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PublicStatus>, ApiError> {
    Ok(Json(state.tracker.status(&id)?))
}

/// PATCH /api/v1/jobs/{id}: Progress report from the processing backend.
pub async fn update_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(update): Json<JobUpdate>,
) -> Result<Json<PublicStatus>, ApiError> {
    Ok(Json(state.tracker.update(&id, update)?))
}

/// Tracker error rendered as a JSON response.
#[derive(Debug)]
pub struct ApiError(TrackerError);

impl From<TrackerError> for ApiError {
    fn from(e: TrackerError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = self.0.to_string();
        let (status, body) = match self.0 {
            TrackerError::Validation(v) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                json!({"error": "validation_failed", "message": message, "fields": v.violations}),
            ),
            TrackerError::NotFound(_) => (
                StatusCode::NOT_FOUND,
                json!({"error": "not_found", "message": message}),
            ),
            // Backends must never rewrite a finished job.
            TrackerError::InvalidTransition { .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({"error": "invalid_transition", "message": message}),
            ),
        };
        (status, Json(body)).into_response()
    }
}
