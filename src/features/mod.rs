//! Feature engineering shared by training and serving.

mod derive;
mod pipeline;
mod transform;

pub use derive::{reference_date, DerivedFeatures};
pub use pipeline::{FeatureExtractor, FeatureRow, NUMERIC_COLUMNS, PASSTHROUGH_COLUMNS};
pub use transform::PreprocessingTransform;

use serde::{Deserialize, Serialize};

/// Encoded model input; width and column order fixed by the fitted transform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub values: Vec<f64>,
}

impl FeatureVector {
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
