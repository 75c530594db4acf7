//! UI/backend events and error modeling for the advisor form.

use client_core::{ClientError, PollProgress};
use shared::domain::{ObservationId, Prediction};

pub enum UiEvent {
    Info(String),
    Queued(ObservationId),
    PollAttempt(PollProgress),
    PredictionReady(Prediction),
    PredictionFailed(UiError),
    FeedbackSent,
    FeedbackFailed(UiError),
    Error(UiError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorCategory {
    Transport,
    Protocol,
    Prediction,
    Timeout,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorContext {
    BackendStartup,
    Predict,
    Feedback,
}

#[derive(Debug, Clone)]
pub struct UiError {
    category: UiErrorCategory,
    context: UiErrorContext,
    message: String,
}

impl UiError {
    pub fn from_client_error(context: UiErrorContext, err: &ClientError) -> Self {
        let category = match err {
            ClientError::Transport(_) | ClientError::Status { .. } => UiErrorCategory::Transport,
            ClientError::UnexpectedResponse(_) => UiErrorCategory::Protocol,
            ClientError::PredictionFailed(_) => UiErrorCategory::Prediction,
            ClientError::Timeout { .. } => UiErrorCategory::Timeout,
            ClientError::InvalidBaseUrl { .. } => UiErrorCategory::Unknown,
        };
        Self {
            category,
            context,
            message: err.to_string(),
        }
    }

    pub fn from_message(context: UiErrorContext, message: impl Into<String>) -> Self {
        let message = message.into();
        let lower = message.to_ascii_lowercase();
        let category = if lower.contains("connection")
            || lower.contains("disconnect")
            || lower.contains("unavailable")
            || lower.contains("queue is full")
        {
            UiErrorCategory::Transport
        } else {
            UiErrorCategory::Unknown
        };
        Self {
            category,
            context,
            message,
        }
    }

    pub fn category(&self) -> UiErrorCategory {
        self.category
    }

    pub fn context(&self) -> UiErrorContext {
        self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}
