use serde::{Deserialize, Serialize};

use super::job::JobStatus;

/// Externally visible view of a job.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PublicStatus {
    pub id: String,
    pub status: JobStatus,
    /// Integer percentage, 0 to 100.
    pub progress: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Response after submitting a job.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SubmitResponse {
    pub id: String,
}
