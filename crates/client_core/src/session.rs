//! One advisor cycle at a time: validate, submit, poll, then feedback.

use shared::domain::Prediction;
use tracing::{info, warn};

use crate::{
    error::CycleError,
    form::{FeedbackOutcome, FormState},
    PredictionBackend,
};

pub struct AdvisorSession<B: PredictionBackend> {
    backend: B,
    pub state: FormState,
}

impl<B: PredictionBackend> AdvisorSession<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            state: FormState::default(),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Runs a full prediction cycle. Progress and messages are written to
    /// `state` as the cycle advances.
    pub async fn predict(&mut self) -> Result<Prediction, CycleError> {
        let observation = self.state.begin_submission()?;

        let observation_id = match self.backend.submit(&observation).await {
            Ok(id) => id,
            Err(err) => {
                warn!("cycle: submission failed: {err:?}");
                self.state.fail_prediction(&err);
                return Err(err.into());
            }
        };
        self.state.mark_queued(observation_id);

        let state = &mut self.state;
        let result = self
            .backend
            .poll(observation_id, &mut |progress| {
                state.record_poll_attempt(progress)
            })
            .await;

        match result {
            Ok(prediction) => {
                info!(
                    observation_id = observation_id.0,
                    action = %prediction.action,
                    "cycle: prediction displayed"
                );
                self.state.complete_prediction(prediction.clone());
                Ok(prediction)
            }
            Err(err) => {
                self.state.fail_prediction(&err);
                Err(err.into())
            }
        }
    }

    /// Sends the verdict for the current prediction. Resolves to
    /// `Skipped` without any request when no label can be resolved.
    pub async fn send_feedback(
        &mut self,
        correct: bool,
        corrected_label: Option<&str>,
    ) -> Result<FeedbackOutcome, CycleError> {
        let record = match self.state.feedback_record(correct, corrected_label) {
            Ok(Some(record)) => record,
            Ok(None) => return Ok(FeedbackOutcome::Skipped),
            Err(err) => {
                self.state.set_error(err.to_string());
                return Err(err);
            }
        };

        match self.backend.send_feedback(&record).await {
            Ok(()) => {
                self.state.reset_after_feedback();
                Ok(FeedbackOutcome::Sent)
            }
            Err(err) => {
                warn!(
                    observation_id = record.observation_id.0,
                    "cycle: feedback failed: {err:?}"
                );
                self.state.fail_feedback();
                Err(err.into())
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
