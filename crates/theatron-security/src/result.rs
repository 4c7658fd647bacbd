use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Typed result payloads for the known step shapes, with an open
/// extension map so server-side additions survive the round trip.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
#[non_exhaustive]
pub enum StepDetails {
    Device {
        device_id: String,
        trusted: bool,
        #[serde(flatten)]
        extra: Map<String, Value>,
    },
    Geo {
        country: String,
        allowed: bool,
        #[serde(flatten)]
        extra: Map<String, Value>,
    },
    Fraud {
        /// IP reputation sub-score, 0–100.
        ip_reputation: u8,
        /// Behavior classification sub-score, 0–100.
        behavior: u8,
        #[serde(flatten)]
        extra: Map<String, Value>,
    },
    ContentRating {
        required: String,
        actual: String,
        #[serde(flatten)]
        extra: Map<String, Value>,
    },
    /// Shape this client does not model; kept verbatim.
    Extra {
        #[serde(flatten)]
        extra: Map<String, Value>,
    },
    None,
}

impl Default for StepDetails {
    fn default() -> Self {
        Self::None
    }
}

impl StepDetails {
    /// Parse wire details leniently: a known tagged shape when the
    /// payload declares one, otherwise the raw map is kept as `Extra`.
    #[must_use]
    pub fn from_wire(value: Value) -> Self {
        match serde_json::from_value::<StepDetails>(value.clone()) {
            Ok(details) => details,
            Err(_) => match value {
                Value::Null => StepDetails::None,
                Value::Object(extra) => StepDetails::Extra { extra },
                other => {
                    let mut extra = Map::new();
                    extra.insert("value".to_string(), other);
                    StepDetails::Extra { extra }
                }
            },
        }
    }
}

/// Outcome of one executed validation step.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StepResult {
    pub valid: bool,
    pub message: String,
    #[serde(default)]
    pub details: StepDetails,
}

impl StepResult {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            valid: true,
            message: message.into(),
            details: StepDetails::None,
        }
    }

    pub fn rejected(message: impl Into<String>, details: StepDetails) -> Self {
        Self {
            valid: false,
            message: message.into(),
            details,
        }
    }

    pub fn with_details(mut self, details: StepDetails) -> Self {
        self.details = details;
        self
    }
}
