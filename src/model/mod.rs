//! Classifier capability and the persisted model artifact.

mod artifact;
mod logistic;

pub use artifact::{ModelArtifact, TrainingSummary, FORMAT_VERSION};
pub use logistic::LogisticRegression;

use crate::decision::DECISION_THRESHOLD;
use ndarray::{Array1, ArrayView1, ArrayView2};

/// Opaque binary classifier: `fit(X, y)`, `predict_proba(x)`, `predict(x)`.
///
/// Implementations must be immutable after `fit` so a loaded model can be shared across
/// request handlers without locking.
pub trait Classifier: Send + Sync + Sized {
    type Params;

    /// `y` holds 0.0 / 1.0 labels, one per row of `x`.
    fn fit(params: &Self::Params, x: ArrayView2<f64>, y: ArrayView1<f64>) -> Self;

    /// Probability of the positive class, in [0, 1].
    fn predict_proba(&self, x: ArrayView1<f64>) -> f64;

    fn input_dim(&self) -> usize;

    fn predict(&self, x: ArrayView1<f64>) -> bool {
        self.predict_proba(x) >= DECISION_THRESHOLD
    }

    fn predict_proba_batch(&self, x: ArrayView2<f64>) -> Array1<f64> {
        x.rows().into_iter().map(|row| self.predict_proba(row)).collect()
    }
}
