use serde::{Deserialize, Serialize};

use crate::domain::{FeedbackRecord, ObservationId, PredictionStatus};

pub const PREDICT_PATH: &str = "/predict";
pub const PREDICTIONS_PATH: &str = "/predictions";
pub const FEEDBACK_PATH: &str = "/feedback";
pub const AGENT_STATUS_PATH: &str = "/agent/status";

pub const QUEUED_STATUS: &str = "queued";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueResponse {
    pub status: String,
    #[serde(default)]
    pub observation_id: Option<ObservationId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_wait_time_ms: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionResultResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observation_id: Option<ObservationId>,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub predicted_action: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processed_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processing_time_ms: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PredictionResultResponse {
    pub fn status(&self) -> PredictionStatus {
        PredictionStatus::from_wire(&self.status)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackRequest {
    pub obs_id: ObservationId,
    pub user_label: String,
    pub correct: bool,
    pub comment: Option<String>,
}

impl From<&FeedbackRecord> for FeedbackRequest {
    fn from(record: &FeedbackRecord) -> Self {
        Self {
            obs_id: record.observation_id,
            user_label: record.label.clone(),
            correct: record.correct,
            comment: record.comment.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentStatusResponse {
    pub is_running: bool,
    pub processed_count: u64,
    pub avg_processing_time_ms: f64,
    #[serde(default)]
    pub queue_size: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceInfo {
    pub message: String,
    #[serde(default)]
    pub version: Option<String>,
}
