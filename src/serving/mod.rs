//! Serving pipeline: one artifact loaded at startup, then Validate → Derive → Transform → Predict
//! per request.
//!
//! A [`ServingPipeline`] only exists once its artifact has loaded, so there is no uninitialized
//! or partially loaded state to serve from. It holds no interior mutability; share it through
//! an `Arc` across request handlers.

use crate::decision::{PredictionResponse, PredictionResult};
use crate::error::{ArtifactError, FieldErrorBody, ValidationError};
use crate::features::{FeatureExtractor, FeatureVector};
use crate::model::{Classifier, ModelArtifact};
use crate::schema::{self, RecordCandidate};
use ndarray::ArrayView1;
use serde::Serialize;
use serde_json::Value;
use std::path::Path;
use tracing::{debug, info};

pub struct ServingPipeline {
    artifact: ModelArtifact,
    extractor: FeatureExtractor,
}

impl ServingPipeline {
    /// Load the single artifact this process serves. Any failure is fatal to startup.
    pub fn load(path: &Path) -> Result<Self, ArtifactError> {
        let artifact = ModelArtifact::load(path)?;
        info!(
            path = %path.display(),
            artifact_id = %artifact.artifact_id,
            snapshot_date = %artifact.snapshot_date,
            columns = artifact.feature_columns.len(),
            "serving pipeline ready"
        );
        Ok(Self::from_artifact(artifact))
    }

    pub fn from_artifact(artifact: ModelArtifact) -> Self {
        Self {
            extractor: FeatureExtractor::new(artifact.snapshot_date),
            artifact,
        }
    }

    pub fn artifact(&self) -> &ModelArtifact {
        &self.artifact
    }

    /// Encoded model input for a candidate, exactly as the classifier sees it.
    pub fn features(&self, candidate: &RecordCandidate) -> Result<FeatureVector, ValidationError> {
        let record = schema::validate(candidate, self.extractor.snapshot())?;
        let row = self.extractor.serving_row(&record);
        Ok(self.artifact.transform.apply_one(&row))
    }

    pub fn predict(&self, candidate: &RecordCandidate) -> Result<PredictionResult, ValidationError> {
        let features = self.features(candidate)?;
        let probability = self
            .artifact
            .classifier
            .predict_proba(ArrayView1::from(features.as_slice()));
        Ok(PredictionResult::from_probability(probability))
    }

    /// Transport-independent request handler: JSON body in, status and JSON body out.
    pub fn handle_json(&self, body: &str) -> ServingResponse {
        let candidate = match serde_json::from_str::<Value>(body) {
            Ok(Value::Object(map)) => RecordCandidate::from(map),
            Ok(_) => return ServingResponse::bad_request("request body must be a JSON object"),
            Err(e) => return ServingResponse::bad_request(&format!("request body is not valid JSON: {}", e)),
        };
        match self.predict(&candidate) {
            Ok(result) => {
                debug!(probability = result.probability, churn = result.churn, "prediction served");
                ServingResponse::ok(PredictionResponse::from(result))
            }
            Err(e) => {
                debug!(field = e.field(), kind = e.kind(), "request rejected");
                ServingResponse::unprocessable(&e)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServingResponse {
    pub status: u16,
    pub body: Value,
}

#[derive(Serialize)]
struct ErrorEnvelope<T> {
    error: T,
}

#[derive(Serialize)]
struct MessageBody<'a> {
    kind: &'static str,
    message: &'a str,
}

impl ServingResponse {
    pub const OK: u16 = 200;
    pub const BAD_REQUEST: u16 = 400;
    pub const UNPROCESSABLE: u16 = 422;

    fn ok(response: PredictionResponse) -> Self {
        Self::with(Self::OK, &response)
    }

    fn bad_request(message: &str) -> Self {
        Self::with(
            Self::BAD_REQUEST,
            &ErrorEnvelope {
                error: MessageBody {
                    kind: "malformed_request",
                    message,
                },
            },
        )
    }

    fn unprocessable(e: &ValidationError) -> Self {
        let body: FieldErrorBody = e.to_body();
        Self::with(Self::UNPROCESSABLE, &ErrorEnvelope { error: body })
    }

    fn with(status: u16, body: &impl Serialize) -> Self {
        Self {
            status,
            body: serde_json::to_value(body).unwrap_or(Value::Null),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == Self::OK
    }
}
