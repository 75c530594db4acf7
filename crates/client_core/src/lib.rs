use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use shared::{
    domain::{FeedbackRecord, Observation, ObservationId, Prediction, PredictionStatus},
    error::ApiErrorBody,
    protocol::{
        AgentStatusResponse, FeedbackRequest, PredictionResultResponse, QueueResponse,
        ServiceInfo, AGENT_STATUS_PATH, FEEDBACK_PATH, PREDICTIONS_PATH, PREDICT_PATH,
        QUEUED_STATUS,
    },
};
use tracing::{debug, info, warn};

pub mod config;
pub mod error;
pub mod form;
pub mod session;

pub use config::Settings;
pub use error::{ClientError, ConfigError, CycleError, FieldError};
pub use form::{FeedbackOutcome, Field, FormInput, FormState};
pub use session::AdvisorSession;

const DEFAULT_MAX_POLL_ATTEMPTS: u32 = 30;
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);
const UNKNOWN_FAILURE: &str = "Nepoznata greška";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub max_attempts: u32,
    pub interval: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_POLL_ATTEMPTS,
            interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollProgress {
    pub attempt: u32,
    pub max_attempts: u32,
}

impl PollProgress {
    pub fn percent(&self) -> f32 {
        if self.max_attempts == 0 {
            return 0.0;
        }
        self.attempt as f32 / self.max_attempts as f32 * 100.0
    }
}

pub type PollObserver<'a> = dyn FnMut(PollProgress) + Send + 'a;

/// Remote side of an advisor cycle. `PredictionClient` is the HTTP
/// implementation; tests substitute scripted backends.
#[async_trait]
pub trait PredictionBackend: Send + Sync {
    async fn submit(&self, observation: &Observation) -> Result<ObservationId, ClientError>;
    async fn poll(
        &self,
        observation_id: ObservationId,
        on_attempt: &mut PollObserver<'_>,
    ) -> Result<Prediction, ClientError>;
    async fn send_feedback(&self, feedback: &FeedbackRecord) -> Result<(), ClientError>;
}

pub struct PredictionClient {
    http: Client,
    base_url: String,
    poll_policy: PollPolicy,
}

impl PredictionClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            poll_policy: PollPolicy::default(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, ClientError> {
        let base_url = config::normalize_base_url(&settings.api_base_url)?;
        let http = Client::builder()
            .timeout(settings.request_timeout())
            .build()?;
        Ok(Self {
            http,
            base_url,
            poll_policy: settings.poll_policy(),
        })
    }

    pub fn with_poll_policy(mut self, poll_policy: PollPolicy) -> Self {
        self.poll_policy = poll_policy;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn poll_policy(&self) -> PollPolicy {
        self.poll_policy
    }

    pub async fn submit(&self, observation: &Observation) -> Result<ObservationId, ClientError> {
        let response = self
            .http
            .post(format!("{}{PREDICT_PATH}", self.base_url))
            .json(observation)
            .send()
            .await?;
        let body: serde_json::Value = checked(response).await?.json().await?;

        let queued = serde_json::from_value::<QueueResponse>(body.clone())
            .ok()
            .filter(|queued| queued.status == QUEUED_STATUS)
            .and_then(|queued| queued.observation_id);
        let Some(observation_id) = queued else {
            warn!(body = %body, "predict: backend did not acknowledge the observation");
            return Err(ClientError::UnexpectedResponse(body.to_string()));
        };

        info!(observation_id = observation_id.0, "predict: observation queued");
        Ok(observation_id)
    }

    pub async fn fetch_status(
        &self,
        observation_id: ObservationId,
    ) -> Result<PredictionResultResponse, ClientError> {
        let response = self
            .http
            .get(format!("{}{PREDICTIONS_PATH}/{observation_id}", self.base_url))
            .send()
            .await?;
        Ok(checked(response).await?.json().await?)
    }

    /// Polls until the prediction is processed, the backend reports a
    /// terminal status, or the attempt budget runs out. Failed attempts
    /// still consume the budget.
    pub async fn poll(
        &self,
        observation_id: ObservationId,
        on_attempt: &mut PollObserver<'_>,
    ) -> Result<Prediction, ClientError> {
        let PollPolicy {
            max_attempts,
            interval,
        } = self.poll_policy;

        for attempt in 1..=max_attempts {
            on_attempt(PollProgress {
                attempt,
                max_attempts,
            });
            tokio::time::sleep(interval).await;

            let response = match self.fetch_status(observation_id).await {
                Ok(response) => response,
                Err(err) => {
                    warn!(
                        observation_id = observation_id.0,
                        attempt,
                        "poll: attempt failed, continuing: {err:?}"
                    );
                    continue;
                }
            };

            match response.status() {
                PredictionStatus::Processed => {
                    let prediction = processed_prediction(observation_id, response)?;
                    info!(
                        observation_id = observation_id.0,
                        attempt,
                        action = %prediction.action,
                        "poll: prediction ready"
                    );
                    return Ok(prediction);
                }
                status if status.is_pending() => {
                    debug!(observation_id = observation_id.0, attempt, ?status, "poll: pending");
                }
                status => {
                    warn!(
                        observation_id = observation_id.0,
                        attempt,
                        ?status,
                        "poll: terminal status"
                    );
                    let reason = response
                        .error
                        .filter(|reason| !reason.is_empty())
                        .unwrap_or_else(|| UNKNOWN_FAILURE.to_string());
                    return Err(ClientError::PredictionFailed(reason));
                }
            }
        }

        warn!(observation_id = observation_id.0, max_attempts, "poll: attempt budget exhausted");
        Err(ClientError::Timeout {
            attempts: max_attempts,
        })
    }

    pub async fn send_feedback(&self, feedback: &FeedbackRecord) -> Result<(), ClientError> {
        let response = self
            .http
            .post(format!("{}{FEEDBACK_PATH}", self.base_url))
            .json(&FeedbackRequest::from(feedback))
            .send()
            .await?;
        checked(response).await?;
        info!(
            observation_id = feedback.observation_id.0,
            correct = feedback.correct,
            label = %feedback.label,
            "feedback: stored"
        );
        Ok(())
    }

    pub async fn agent_status(&self) -> Result<AgentStatusResponse, ClientError> {
        let response = self
            .http
            .get(format!("{}{AGENT_STATUS_PATH}", self.base_url))
            .send()
            .await?;
        Ok(checked(response).await?.json().await?)
    }

    pub async fn service_info(&self) -> Result<ServiceInfo, ClientError> {
        let response = self.http.get(format!("{}/", self.base_url)).send().await?;
        Ok(checked(response).await?.json().await?)
    }
}

#[async_trait]
impl PredictionBackend for PredictionClient {
    async fn submit(&self, observation: &Observation) -> Result<ObservationId, ClientError> {
        PredictionClient::submit(self, observation).await
    }

    async fn poll(
        &self,
        observation_id: ObservationId,
        on_attempt: &mut PollObserver<'_>,
    ) -> Result<Prediction, ClientError> {
        PredictionClient::poll(self, observation_id, on_attempt).await
    }

    async fn send_feedback(&self, feedback: &FeedbackRecord) -> Result<(), ClientError> {
        PredictionClient::send_feedback(self, feedback).await
    }
}

/// Turns non-2xx responses into `ClientError::Status`, keeping the
/// backend's `detail` text when there is one.
async fn checked(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let url = response.url().to_string();
    let body = response.text().await.unwrap_or_default();
    let detail = ApiErrorBody::parse(&body).map(|body| body.message());
    warn!(%url, status = status.as_u16(), detail = ?detail, "backend returned error status");
    Err(ClientError::Status {
        status: status.as_u16(),
        detail,
    })
}

fn processed_prediction(
    observation_id: ObservationId,
    response: PredictionResultResponse,
) -> Result<Prediction, ClientError> {
    let action = response
        .predicted_action
        .filter(|action| !action.is_empty())
        .ok_or_else(|| {
            ClientError::PredictionFailed("obrađeno bez preporučene akcije".to_string())
        })?;
    Ok(Prediction {
        observation_id,
        action,
        confidence: response.confidence,
    })
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
