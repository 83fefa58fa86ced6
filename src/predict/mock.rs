//! Placeholder predictor used when the model backend cannot answer.

use std::ops::Range;

use rand::Rng;
use serde_json::Value;

use super::{number, Prediction};

/// Scores strictly above this are reported as resistant.
pub const RESISTANCE_THRESHOLD: f64 = 0.5;

/// Lower bound (inclusive) of the mock probability.
pub const MOCK_PROBABILITY_MIN: f64 = 0.70;

/// Upper bound (exclusive) of the mock probability.
pub const MOCK_PROBABILITY_MAX: f64 = 0.95;

const AGE_WEIGHT: f64 = 0.4;
const DURATION_WEIGHT: f64 = 0.6;
const DURATION_SATURATION_DAYS: f64 = 30.0;

/// Deterministic scoring on `age` and `duration_days`, with a random
/// probability in `[0.70, 0.95)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockPredictor;

impl MockPredictor {
    pub fn new() -> Self {
        Self
    }

    /// `0.4 * age/100 + 0.6 * min(duration/30, 1)`
    pub fn score(age: f64, duration_days: f64) -> f64 {
        AGE_WEIGHT * (age / 100.0)
            + DURATION_WEIGHT * (duration_days / DURATION_SATURATION_DAYS).min(1.0)
    }

    /// Predict from a raw request body. Missing or non-numeric inputs count as 0.
    pub fn predict(&self, request: &Value) -> Prediction {
        self.predict_with_rng(request, &mut rand::thread_rng())
    }

    pub fn predict_with_rng<R: Rng>(&self, request: &Value, rng: &mut R) -> Prediction {
        let age = request.get("age").and_then(number).unwrap_or(0.0);
        let duration = request.get("duration_days").and_then(number).unwrap_or(0.0);

        let resistant = u8::from(Self::score(age, duration) > RESISTANCE_THRESHOLD);
        let probability = rng.gen_range(Self::probability_range());

        Prediction {
            resistant,
            probability: Some(probability),
        }
    }

    pub fn probability_range() -> Range<f64> {
        MOCK_PROBABILITY_MIN..MOCK_PROBABILITY_MAX
    }
}
