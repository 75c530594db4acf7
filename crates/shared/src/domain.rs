use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(ObservationId);

/// One set of apiary readings, already range-checked by the form.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub temperature: f64,
    pub humidity: f64,
    pub frames: i64,
    pub strength: i64,
    #[serde(rename = "varoa", with = "varroa_flag")]
    pub varroa: bool,
}

/// The backend stores varroa presence as an integer flag.
mod varroa_flag {
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(u8::from(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        match i64::deserialize(deserializer)? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(de::Error::custom(format!(
                "varroa flag must be 0 or 1, got {other}"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PredictionStatus {
    Queued,
    Processing,
    Processed,
    Failed,
    Other(String),
}

impl PredictionStatus {
    pub fn from_wire(raw: &str) -> Self {
        match raw {
            "queued" => Self::Queued,
            "processing" => Self::Processing,
            "processed" => Self::Processed,
            "failed" => Self::Failed,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Queued | Self::Processing)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub observation_id: ObservationId,
    pub action: String,
    pub confidence: Option<f64>,
}

impl Prediction {
    pub fn label(&self) -> &str {
        label_for(&self.action)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FeedbackRecord {
    pub observation_id: ObservationId,
    pub label: String,
    pub correct: bool,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionOption {
    pub code: &'static str,
    pub label: &'static str,
}

const fn action(code: &'static str, label: &'static str) -> ActionOption {
    ActionOption { code, label }
}

/// Every action the advisor can recommend, in display order.
pub const ACTION_CATALOG: [ActionOption; 15] = [
    action("nista", "Ništa"),
    action("priorihrana", "Prihrana"),
    action("provjera_varoe", "Provjera varoe"),
    action("preseljenje", "Preseljenje"),
    action("berba", "Berba"),
    action("zalivanje", "Zalivanje"),
    action("hranjivanje", "Hranjivanje"),
    action("prskanje", "Prskanje"),
    action("povecanje_ramova", "Povećanje ramova"),
    action("smanjenje_ramova", "Smanjenje ramova"),
    action("kontrola_stetocina", "Kontrola štetočina"),
    action("promjena_lokacije", "Promjena lokacije"),
    action("provjera_zdravlja", "Provjera zdravlja"),
    action("ciscenje_zajednice", "Čišćenje zajednice"),
    action("dodatna_inspekcija", "Dodatna inspekcija"),
];

pub fn find_action(code: &str) -> Option<&'static ActionOption> {
    ACTION_CATALOG.iter().find(|option| option.code == code)
}

/// Display label for an action code; unknown codes are shown as-is.
pub fn label_for(code: &str) -> &str {
    find_action(code).map_or(code, |option| option.label)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_for_known_code_uses_catalog_label() {
        assert_eq!(label_for("berba"), "Berba");
        assert_eq!(label_for("ciscenje_zajednice"), "Čišćenje zajednice");
    }

    #[test]
    fn label_for_unknown_code_falls_back_to_code() {
        assert_eq!(label_for("unknown_code"), "unknown_code");
        assert_eq!(label_for(""), "");
    }

    #[test]
    fn catalog_codes_are_unique() {
        for (idx, option) in ACTION_CATALOG.iter().enumerate() {
            assert!(
                ACTION_CATALOG[idx + 1..]
                    .iter()
                    .all(|other| other.code != option.code),
                "duplicate code {}",
                option.code
            );
        }
    }

    #[test]
    fn observation_serializes_varroa_as_integer_flag() {
        let observation = Observation {
            temperature: 21.5,
            humidity: 40.0,
            frames: 10,
            strength: 7,
            varroa: true,
        };
        let json = serde_json::to_value(observation).expect("serialize");
        assert_eq!(json["varoa"], 1);
        assert_eq!(json["frames"], 10);
        assert!(json.get("varroa").is_none());

        let parsed: Observation = serde_json::from_value(json).expect("deserialize");
        assert_eq!(parsed, observation);
    }

    #[test]
    fn observation_rejects_out_of_range_varroa_flag() {
        let raw = r#"{"temperature":1,"humidity":1,"frames":1,"strength":1,"varoa":2}"#;
        assert!(serde_json::from_str::<Observation>(raw).is_err());
    }

    #[test]
    fn prediction_status_keeps_unknown_wire_values() {
        assert_eq!(PredictionStatus::from_wire("queued"), PredictionStatus::Queued);
        assert!(PredictionStatus::from_wire("processing").is_pending());
        assert_eq!(
            PredictionStatus::from_wire("review_needed"),
            PredictionStatus::Other("review_needed".to_string())
        );
        assert!(!PredictionStatus::from_wire("failed").is_pending());
    }
}
