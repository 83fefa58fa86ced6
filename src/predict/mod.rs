//! Resistance prediction shapes.
//!
//! The backend model may name its fields differently from what the portal
//! expects (`confidence` instead of `probability`, booleans instead of 0/1).
//! [`normalize`] maps any of those shapes onto [`Prediction`]. When the
//! backend cannot answer, [`MockPredictor`] produces a placeholder.

mod mock;

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use mock::{MockPredictor, MOCK_PROBABILITY_MAX, MOCK_PROBABILITY_MIN, RESISTANCE_THRESHOLD};

/// Where a prediction came from. Reported in the `X-Prediction-Source` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredictionSource {
    Live,
    Mock,
}

impl PredictionSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            PredictionSource::Live => "live",
            PredictionSource::Mock => "mock",
        }
    }
}

/// Normalized prediction returned to the browser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// 1 if resistant, 0 otherwise
    pub resistant: u8,

    /// Model probability for the predicted class
    #[serde(skip_serializing_if = "Option::is_none")]
    pub probability: Option<f64>,
}

/// Normalize a backend prediction payload.
///
/// `resistant` is accepted as a boolean, a number or a numeric/boolean
/// string; anything else counts as not resistant. `probability` falls back
/// to `confidence`.
pub fn normalize(payload: &Value) -> Prediction {
    let resistant = payload.get("resistant").map(flag).unwrap_or(0);

    let probability = payload
        .get("probability")
        .and_then(number)
        .or_else(|| payload.get("confidence").and_then(number));

    Prediction {
        resistant,
        probability,
    }
}

fn flag(value: &Value) -> u8 {
    match value {
        Value::Bool(b) => u8::from(*b),
        Value::Number(n) => u8::from(n.as_f64().map(|f| f != 0.0).unwrap_or(false)),
        Value::String(s) => {
            let s = s.trim();
            if s.eq_ignore_ascii_case("true") {
                1
            } else {
                u8::from(s.parse::<f64>().map(|f| f != 0.0).unwrap_or(false))
            }
        }
        _ => 0,
    }
}

/// Read a numeric field that may arrive as a number or a numeric string.
pub(crate) fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
