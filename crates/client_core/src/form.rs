//! Form state for one advisor cycle: inputs, validation, and the
//! transient UI flags (error, info, progress, correction modal).

use shared::domain::{
    find_action, FeedbackRecord, Observation, ObservationId, Prediction,
};

use crate::{
    error::{CycleError, FieldError},
    PollProgress,
};

pub const DEFAULT_TEMPERATURE: f64 = 15.0;
pub const DEFAULT_HUMIDITY: f64 = 50.0;
pub const DEFAULT_FRAMES: i64 = 8;
pub const DEFAULT_STRENGTH: i64 = 5;

pub const PROGRESS_SENDING: f32 = 10.0;
pub const PROGRESS_QUEUED: f32 = 30.0;
pub const PROGRESS_DONE: f32 = 100.0;

const TEMPERATURE_RANGE: (f64, f64) = (-50.0, 60.0);
const HUMIDITY_RANGE: (f64, f64) = (0.0, 100.0);
const FRAMES_RANGE: (i64, i64) = (1, 50);
const STRENGTH_RANGE: (i64, i64) = (1, 10);

pub const FEEDBACK_FAILED_MESSAGE: &str = "Došlo je do greške pri slanju feedbacka.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Temperature,
    Humidity,
    Frames,
    Strength,
    Varroa,
}

/// Editable form values. `None` means the field is empty or did not parse.
#[derive(Debug, Clone, PartialEq)]
pub struct FormInput {
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub frames: Option<i64>,
    pub strength: Option<i64>,
    pub varroa: Option<i64>,
}

impl Default for FormInput {
    fn default() -> Self {
        Self {
            temperature: Some(DEFAULT_TEMPERATURE),
            humidity: Some(DEFAULT_HUMIDITY),
            frames: Some(DEFAULT_FRAMES),
            strength: Some(DEFAULT_STRENGTH),
            varroa: None,
        }
    }
}

impl FormInput {
    pub fn set_field(&mut self, field: Field, raw: &str) {
        let raw = raw.trim();
        match field {
            Field::Temperature => self.temperature = parse_number(raw),
            Field::Humidity => self.humidity = parse_number(raw),
            Field::Frames => self.frames = raw.parse().ok(),
            Field::Strength => self.strength = raw.parse().ok(),
            Field::Varroa => self.varroa = raw.parse().ok(),
        }
    }

    pub fn display_value(&self, field: Field) -> String {
        fn show<T: ToString>(value: Option<T>) -> String {
            value.map(|v| v.to_string()).unwrap_or_default()
        }
        match field {
            Field::Temperature => show(self.temperature),
            Field::Humidity => show(self.humidity),
            Field::Frames => show(self.frames),
            Field::Strength => show(self.strength),
            Field::Varroa => show(self.varroa),
        }
    }

    /// Checks fields in display order and reports only the first failure.
    pub fn validate(&self) -> Result<(), FieldError> {
        if !in_range_f64(self.temperature, TEMPERATURE_RANGE) {
            return Err(FieldError::Temperature);
        }
        if !in_range_f64(self.humidity, HUMIDITY_RANGE) {
            return Err(FieldError::Humidity);
        }
        if !in_range_i64(self.frames, FRAMES_RANGE) {
            return Err(FieldError::Frames);
        }
        if !in_range_i64(self.strength, STRENGTH_RANGE) {
            return Err(FieldError::Strength);
        }
        if !matches!(self.varroa, Some(0 | 1)) {
            return Err(FieldError::Varroa);
        }
        Ok(())
    }

    pub fn to_observation(&self) -> Result<Observation, FieldError> {
        self.validate()?;
        match (
            self.temperature,
            self.humidity,
            self.frames,
            self.strength,
            self.varroa,
        ) {
            (Some(temperature), Some(humidity), Some(frames), Some(strength), Some(varroa)) => {
                Ok(Observation {
                    temperature,
                    humidity,
                    frames,
                    strength,
                    varroa: varroa == 1,
                })
            }
            // validate() has already rejected every empty field
            _ => Err(FieldError::Temperature),
        }
    }
}

fn parse_number(raw: &str) -> Option<f64> {
    raw.parse::<f64>().ok().filter(|value| value.is_finite())
}

fn in_range_f64(value: Option<f64>, (min, max): (f64, f64)) -> bool {
    value.is_some_and(|v| v.is_finite() && v >= min && v <= max)
}

fn in_range_i64(value: Option<i64>, (min, max): (i64, i64)) -> bool {
    value.is_some_and(|v| (min..=max).contains(&v))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackOutcome {
    Sent,
    Skipped,
}

/// Everything the form shows, threaded explicitly through a cycle.
#[derive(Debug, Clone, Default)]
pub struct FormState {
    pub form: FormInput,
    pub comment: String,
    error: Option<String>,
    info: Option<String>,
    processing: bool,
    progress: f32,
    observation_id: Option<ObservationId>,
    prediction: Option<Prediction>,
    correction_open: bool,
    correction_choice: Option<String>,
}

impl FormState {
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn info(&self) -> Option<&str> {
        self.info.as_deref()
    }

    pub fn is_processing(&self) -> bool {
        self.processing
    }

    pub fn inputs_enabled(&self) -> bool {
        !self.processing
    }

    /// Progress in the 0..=100 display range.
    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn observation_id(&self) -> Option<ObservationId> {
        self.observation_id
    }

    pub fn prediction(&self) -> Option<&Prediction> {
        self.prediction.as_ref()
    }

    pub fn correction_open(&self) -> bool {
        self.correction_open
    }

    pub fn correction_choice(&self) -> Option<&str> {
        self.correction_choice.as_deref()
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    /// Runs form validation, replacing the current error message.
    pub fn validate(&mut self) -> Result<Observation, FieldError> {
        match self.form.to_observation() {
            Ok(observation) => {
                self.error = None;
                Ok(observation)
            }
            Err(err) => {
                self.error = Some(err.to_string());
                Err(err)
            }
        }
    }

    pub fn begin_submission(&mut self) -> Result<Observation, CycleError> {
        if self.processing {
            return Err(CycleError::Busy);
        }
        let observation = self.validate()?;

        self.observation_id = None;
        self.prediction = None;
        self.correction_open = false;
        self.correction_choice = None;
        self.processing = true;
        self.info = Some("Šaljem podatke agentu...".to_string());
        self.progress = PROGRESS_SENDING;
        Ok(observation)
    }

    pub fn mark_queued(&mut self, observation_id: ObservationId) {
        self.observation_id = Some(observation_id);
        self.info = Some(format!(
            "Podaci poslani. ID: {observation_id}. Čekam agenta..."
        ));
        self.progress = PROGRESS_QUEUED;
    }

    pub fn record_poll_attempt(&mut self, progress: PollProgress) {
        self.progress = progress.percent();
        self.info = Some(format!(
            "Agent obrađuje... ({}/{})",
            progress.attempt, progress.max_attempts
        ));
    }

    pub fn complete_prediction(&mut self, prediction: Prediction) {
        self.observation_id = Some(prediction.observation_id);
        self.prediction = Some(prediction);
        self.info = None;
        self.progress = PROGRESS_DONE;
        self.processing = false;
    }

    pub fn fail_prediction(&mut self, err: &dyn std::fmt::Display) {
        self.error = Some(format!("Greška: {err}"));
        self.info = None;
        self.progress = 0.0;
        self.processing = false;
    }

    pub fn open_correction(&mut self) {
        if self.prediction.is_some() {
            self.correction_open = true;
        }
    }

    pub fn cancel_correction(&mut self) {
        self.correction_open = false;
        self.correction_choice = None;
    }

    /// Accepts only codes from the action catalog.
    pub fn choose_correction(&mut self, code: &str) -> Result<(), FieldError> {
        let option = find_action(code).ok_or(FieldError::Correction)?;
        self.correction_choice = Some(option.code.to_string());
        Ok(())
    }

    /// Resolves the verdict into a record. `Ok(None)` means no label could
    /// be resolved and nothing should be sent.
    pub fn feedback_record(
        &self,
        correct: bool,
        corrected_label: Option<&str>,
    ) -> Result<Option<FeedbackRecord>, CycleError> {
        let label = if correct {
            self.prediction.as_ref().map(|p| p.action.clone())
        } else {
            match corrected_label.filter(|label| !label.is_empty()) {
                Some(label) => Some(
                    find_action(label)
                        .ok_or(FieldError::Correction)?
                        .code
                        .to_string(),
                ),
                None => None,
            }
        };
        let Some(label) = label else {
            return Ok(None);
        };

        let observation_id = match (&self.prediction, self.observation_id) {
            (Some(prediction), Some(id)) if prediction.observation_id == id => id,
            _ => return Err(CycleError::NoPrediction),
        };

        let comment = self.comment.trim();
        Ok(Some(FeedbackRecord {
            observation_id,
            label,
            correct,
            comment: (!comment.is_empty()).then(|| comment.to_string()),
        }))
    }

    pub fn reset_after_feedback(&mut self) {
        self.form = FormInput::default();
        self.comment.clear();
        self.error = None;
        self.info = None;
        self.progress = 0.0;
        self.observation_id = None;
        self.prediction = None;
        self.correction_open = false;
        self.correction_choice = None;
    }

    pub fn fail_feedback(&mut self) {
        self.error = Some(FEEDBACK_FAILED_MESSAGE.to_string());
    }
}

#[cfg(test)]
#[path = "tests/form_tests.rs"]
mod tests;
