//! L2-regularized logistic regression, trained by seeded mini-batch gradient descent.

use super::Classifier;
use crate::config::ClassifierConfig;
use ndarray::{Array1, ArrayView1, ArrayView2};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegression {
    weights: Vec<f64>,
    bias: f64,
}

fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

impl LogisticRegression {
    pub fn from_parameters(weights: Vec<f64>, bias: f64) -> Self {
        Self { weights, bias }
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn bias(&self) -> f64 {
        self.bias
    }
}

impl Classifier for LogisticRegression {
    type Params = ClassifierConfig;

    fn fit(params: &ClassifierConfig, x: ArrayView2<f64>, y: ArrayView1<f64>) -> Self {
        let (n, dim) = x.dim();
        let mut w = Array1::<f64>::zeros(dim);
        let mut b = 0.0;
        let mut order: Vec<usize> = (0..n).collect();
        let mut rng = StdRng::seed_from_u64(params.seed);
        let batch_size = params.batch_size.max(1);

        for _ in 0..params.epochs {
            order.shuffle(&mut rng);
            for batch in order.chunks(batch_size) {
                let mut grad_w = Array1::<f64>::zeros(dim);
                let mut grad_b = 0.0;
                for &i in batch {
                    let row = x.row(i);
                    let err = sigmoid(row.dot(&w) + b) - y[i];
                    grad_w.scaled_add(err, &row);
                    grad_b += err;
                }
                let m = batch.len() as f64;
                grad_w /= m;
                grad_w.scaled_add(params.l2, &w);
                w.scaled_add(-params.learning_rate, &grad_w);
                b -= params.learning_rate * grad_b / m;
            }
        }

        Self {
            weights: w.to_vec(),
            bias: b,
        }
    }

    fn predict_proba(&self, x: ArrayView1<f64>) -> f64 {
        let z = x.iter().zip(&self.weights).map(|(a, w)| a * w).sum::<f64>() + self.bias;
        sigmoid(z).clamp(0.0, 1.0)
    }

    fn input_dim(&self) -> usize {
        self.weights.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array2};

    fn params() -> ClassifierConfig {
        ClassifierConfig {
            learning_rate: 0.5,
            epochs: 300,
            batch_size: 4,
            l2: 0.0,
            seed: 7,
        }
    }

    fn separable() -> (Array2<f64>, Array1<f64>) {
        let x = array![[-2.0, 0.1], [-1.5, -0.2], [-1.0, 0.0], [-0.8, 0.3], [0.8, 0.1], [1.0, -0.3], [1.5, 0.2], [2.0, 0.0]];
        let y = array![0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0];
        (x, y)
    }

    #[test]
    fn learns_separable_data() {
        let (x, y) = separable();
        let model = LogisticRegression::fit(&params(), x.view(), y.view());
        assert_eq!(model.input_dim(), 2);
        for (row, label) in x.rows().into_iter().zip(y.iter()) {
            assert_eq!(model.predict(row), *label == 1.0);
        }
        assert!(model.weights()[0] > 0.0);
    }

    #[test]
    fn same_seed_same_parameters() {
        let (x, y) = separable();
        let a = LogisticRegression::fit(&params(), x.view(), y.view());
        let b = LogisticRegression::fit(&params(), x.view(), y.view());
        assert_eq!(a, b);
    }

    #[test]
    fn probability_bounds_and_threshold() {
        let model = LogisticRegression::from_parameters(vec![1.0], 0.0);
        assert_eq!(model.predict_proba(array![0.0].view()), 0.5);
        assert!(model.predict(array![0.0].view()));
        assert!(!model.predict(array![-0.01].view()));
        let p = model.predict_proba(array![1e6].view());
        assert!((0.0..=1.0).contains(&p));
        let p = model.predict_proba(array![-1e6].view());
        assert!((0.0..=1.0).contains(&p));
    }

    #[test]
    fn batch_scoring_matches_single() {
        let (x, y) = separable();
        let model = LogisticRegression::fit(&params(), x.view(), y.view());
        let batch = model.predict_proba_batch(x.view());
        for (i, row) in x.rows().into_iter().enumerate() {
            assert_eq!(batch[i], model.predict_proba(row));
        }
    }
}
