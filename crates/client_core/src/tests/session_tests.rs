use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use shared::domain::{FeedbackRecord, Observation, ObservationId, Prediction};

use super::*;
use crate::{
    error::{ClientError, FieldError},
    form::FormInput,
    PollObserver, PollProgress,
};

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Submit(Observation),
    Poll(ObservationId),
    Feedback(FeedbackRecord),
}

#[derive(Clone)]
struct ScriptedBackend {
    calls: Arc<Mutex<Vec<Call>>>,
    observation_id: i64,
    action: &'static str,
    attempts_before_result: u32,
    fail_poll_with: Option<&'static str>,
    fail_feedback: bool,
}

impl ScriptedBackend {
    fn ok(observation_id: i64, action: &'static str) -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            observation_id,
            action,
            attempts_before_result: 3,
            fail_poll_with: None,
            fail_feedback: false,
        }
    }

    fn failing_poll(reason: &'static str) -> Self {
        Self {
            fail_poll_with: Some(reason),
            ..Self::ok(1, "nista")
        }
    }

    fn failing_feedback(observation_id: i64, action: &'static str) -> Self {
        Self {
            fail_feedback: true,
            ..Self::ok(observation_id, action)
        }
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().expect("calls lock").clone()
    }

    fn feedback_calls(&self) -> Vec<FeedbackRecord> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Feedback(record) => Some(record),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl PredictionBackend for ScriptedBackend {
    async fn submit(&self, observation: &Observation) -> Result<ObservationId, ClientError> {
        self.calls
            .lock()
            .expect("calls lock")
            .push(Call::Submit(*observation));
        Ok(ObservationId(self.observation_id))
    }

    async fn poll(
        &self,
        observation_id: ObservationId,
        on_attempt: &mut PollObserver<'_>,
    ) -> Result<Prediction, ClientError> {
        self.calls
            .lock()
            .expect("calls lock")
            .push(Call::Poll(observation_id));
        for attempt in 1..=self.attempts_before_result {
            on_attempt(PollProgress {
                attempt,
                max_attempts: 30,
            });
        }
        if let Some(reason) = self.fail_poll_with {
            return Err(ClientError::PredictionFailed(reason.to_string()));
        }
        Ok(Prediction {
            observation_id,
            action: self.action.to_string(),
            confidence: Some(0.91),
        })
    }

    async fn send_feedback(&self, feedback: &FeedbackRecord) -> Result<(), ClientError> {
        self.calls
            .lock()
            .expect("calls lock")
            .push(Call::Feedback(feedback.clone()));
        if self.fail_feedback {
            return Err(ClientError::Status {
                status: 500,
                detail: Some("Failed to save feedback".to_string()),
            });
        }
        Ok(())
    }
}

fn filled_form() -> FormInput {
    FormInput {
        temperature: Some(24.0),
        humidity: Some(61.0),
        frames: Some(12),
        strength: Some(8),
        varroa: Some(1),
    }
}

async fn session_with_prediction(backend: ScriptedBackend) -> AdvisorSession<ScriptedBackend> {
    let mut session = AdvisorSession::new(backend);
    session.state.form = filled_form();
    session.predict().await.expect("predict");
    session
}

#[tokio::test]
async fn predict_runs_submit_then_poll_and_stores_result() {
    let backend = ScriptedBackend::ok(42, "berba");
    let mut session = AdvisorSession::new(backend.clone());
    session.state.form = filled_form();

    let prediction = session.predict().await.expect("predict");

    assert_eq!(prediction.action, "berba");
    assert_eq!(prediction.label(), "Berba");
    assert_eq!(session.state.observation_id(), Some(ObservationId(42)));
    assert!(!session.state.is_processing());
    assert_eq!(session.state.progress(), 100.0);

    let calls = backend.calls();
    assert_eq!(calls.len(), 2);
    assert!(matches!(&calls[0], Call::Submit(obs) if obs.varroa && obs.frames == 12));
    assert_eq!(calls[1], Call::Poll(ObservationId(42)));
}

#[tokio::test]
async fn invalid_form_sends_nothing() {
    let backend = ScriptedBackend::ok(1, "nista");
    let mut session = AdvisorSession::new(backend.clone());
    session.state.form = FormInput {
        strength: Some(12),
        ..filled_form()
    };

    let err = session.predict().await.expect_err("invalid strength");

    assert!(matches!(err, CycleError::Validation(FieldError::Strength)));
    assert_eq!(
        session.state.error(),
        Some("Snaga zajednice mora biti između 1 i 10.")
    );
    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn poll_failure_is_surfaced_on_state() {
    let backend = ScriptedBackend::failing_poll("model crashed");
    let mut session = AdvisorSession::new(backend);
    session.state.form = filled_form();

    let err = session.predict().await.expect_err("poll fails");

    assert!(matches!(
        err,
        CycleError::Client(ClientError::PredictionFailed(_))
    ));
    assert_eq!(
        session.state.error(),
        Some("Greška: Predikcija nije uspjela: model crashed")
    );
    assert!(!session.state.is_processing());
    assert!(session.state.prediction().is_none());
}

#[tokio::test]
async fn accepting_sends_prediction_label_and_resets_form() {
    let backend = ScriptedBackend::ok(7, "prskanje");
    let mut session = session_with_prediction(backend.clone()).await;
    session.state.comment = "spot on".to_string();

    let outcome = session.send_feedback(true, None).await.expect("feedback");

    assert_eq!(outcome, FeedbackOutcome::Sent);
    assert_eq!(
        backend.feedback_calls(),
        vec![FeedbackRecord {
            observation_id: ObservationId(7),
            label: "prskanje".to_string(),
            correct: true,
            comment: Some("spot on".to_string()),
        }]
    );
    assert_eq!(session.state.form, FormInput::default());
    assert!(session.state.prediction().is_none());
    assert!(session.state.observation_id().is_none());
    assert!(session.state.comment.is_empty());
    assert!(session.state.error().is_none());
}

#[tokio::test]
async fn correcting_sends_chosen_label() {
    let backend = ScriptedBackend::ok(7, "prskanje");
    let mut session = session_with_prediction(backend.clone()).await;

    session
        .send_feedback(false, Some("provjera_varoe"))
        .await
        .expect("feedback");

    let sent = backend.feedback_calls();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].label, "provjera_varoe");
    assert!(!sent[0].correct);
    assert_eq!(sent[0].comment, None);
}

#[tokio::test]
async fn correction_without_label_is_a_no_op() {
    let backend = ScriptedBackend::ok(7, "prskanje");
    let mut session = session_with_prediction(backend.clone()).await;

    let outcome = session.send_feedback(false, None).await.expect("no-op");

    assert_eq!(outcome, FeedbackOutcome::Skipped);
    assert!(backend.feedback_calls().is_empty());
    assert!(session.state.prediction().is_some());
}

#[tokio::test]
async fn feedback_before_prediction_is_refused() {
    let backend = ScriptedBackend::ok(7, "prskanje");
    let mut session = AdvisorSession::new(backend.clone());

    let err = session
        .send_feedback(false, Some("berba"))
        .await
        .expect_err("no prediction yet");

    assert!(matches!(err, CycleError::NoPrediction));
    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn failed_feedback_leaves_cycle_in_place() {
    let backend = ScriptedBackend::failing_feedback(7, "berba");
    let mut session = session_with_prediction(backend.clone()).await;
    session.state.comment = "retry later".to_string();

    let err = session.send_feedback(true, None).await.expect_err("backend 500");

    assert!(matches!(err, CycleError::Client(ClientError::Status { status: 500, .. })));
    assert_eq!(
        session.state.error(),
        Some("Došlo je do greške pri slanju feedbacka.")
    );
    assert_eq!(session.state.observation_id(), Some(ObservationId(7)));
    assert!(session.state.prediction().is_some());
    assert_eq!(session.state.comment, "retry later");
    assert_eq!(backend.feedback_calls().len(), 1);
}
