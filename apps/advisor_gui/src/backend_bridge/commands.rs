//! Backend commands queued from UI to backend worker.

use shared::domain::{FeedbackRecord, Observation};

pub enum BackendCommand {
    Predict { observation: Observation },
    SendFeedback { record: FeedbackRecord },
}

impl BackendCommand {
    pub fn name(&self) -> &'static str {
        match self {
            BackendCommand::Predict { .. } => "predict",
            BackendCommand::SendFeedback { .. } => "send_feedback",
        }
    }
}
