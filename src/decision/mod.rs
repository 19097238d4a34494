//! Turns a churn probability into a prediction against a fixed threshold.

use serde::{Deserialize, Serialize};

/// Probability at or above which a customer is predicted to churn.
pub const DECISION_THRESHOLD: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PredictionResult {
    pub churn: bool,
    pub probability: f64,
}

impl PredictionResult {
    pub fn from_probability(probability: f64) -> Self {
        let probability = probability.clamp(0.0, 1.0);
        Self {
            churn: probability >= DECISION_THRESHOLD,
            probability,
        }
    }
}

/// Serving response body on success.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub prediction: u8,
    pub churn_probability: f64,
}

impl From<PredictionResult> for PredictionResponse {
    fn from(r: PredictionResult) -> Self {
        Self {
            prediction: u8::from(r.churn),
            churn_probability: r.probability,
        }
    }
}

impl From<PredictionResponse> for PredictionResult {
    fn from(r: PredictionResponse) -> Self {
        Self {
            churn: r.prediction == 1,
            probability: r.churn_probability,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_is_inclusive() {
        assert!(PredictionResult::from_probability(0.5).churn);
        assert!(!PredictionResult::from_probability(0.4999).churn);
        assert!(PredictionResult::from_probability(0.93).churn);
    }

    #[test]
    fn wire_form() {
        let r = PredictionResult::from_probability(0.25);
        let body = serde_json::to_value(PredictionResponse::from(r)).unwrap();
        assert_eq!(body, serde_json::json!({"prediction": 0, "churn_probability": 0.25}));
    }
}
