//! Applies backend events to the form state.

use client_core::FormState;

use crate::controller::events::UiEvent;

pub const FEEDBACK_THANKS: &str = "Hvala! Model je naučio iz tvog feedbacka.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Status(String),
    /// Feedback was stored and the form went back to its defaults.
    FeedbackAccepted,
}

pub fn apply_event(state: &mut FormState, event: UiEvent) -> Option<Notice> {
    match event {
        UiEvent::Info(message) => return Some(Notice::Status(message)),
        UiEvent::Queued(observation_id) => state.mark_queued(observation_id),
        UiEvent::PollAttempt(progress) => state.record_poll_attempt(progress),
        UiEvent::PredictionReady(prediction) => state.complete_prediction(prediction),
        UiEvent::PredictionFailed(err) => state.fail_prediction(&err.message()),
        UiEvent::FeedbackSent => {
            state.reset_after_feedback();
            return Some(Notice::FeedbackAccepted);
        }
        UiEvent::FeedbackFailed(err) => {
            tracing::warn!(
                category = ?err.category(),
                context = ?err.context(),
                "feedback failed: {}",
                err.message()
            );
            state.fail_feedback();
        }
        UiEvent::Error(err) => {
            if state.is_processing() {
                state.fail_prediction(&err.message());
            } else {
                state.set_error(err.message());
            }
        }
    }
    None
}
