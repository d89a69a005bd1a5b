//! Linear margin-based classifier: one-vs-rest, trained by seeded SGD on the
//! regularized hinge loss.
//!
//! The raw output is a per-class signed margin (`decision_function`), not a
//! probability — calibration happens downstream.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::classify::{argmax, sparse_dot};
use crate::features::vectorizer::SparseVec;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SvmConfig {
    /// Inverse regularization strength.
    pub c: f64,
    pub epochs: usize,
    pub seed: u64,
}

impl Default for SvmConfig {
    fn default() -> Self {
        Self {
            c: 1.0,
            epochs: 30,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearSvm {
    /// One dense weight row per class, in label-codec index order.
    weights: Vec<Vec<f64>>,
    bias: Vec<f64>,
}

impl LinearSvm {
    /// Trains one binary hinge-loss separator per class. Classes fit in
    /// parallel; each gets its own deterministic RNG stream.
    pub fn train(
        rows: &[SparseVec],
        labels: &[usize],
        n_classes: usize,
        n_features: usize,
        config: &SvmConfig,
    ) -> Self {
        let fitted: Vec<(Vec<f64>, f64)> = (0..n_classes)
            .into_par_iter()
            .map(|class| train_binary(rows, labels, class, n_features, config))
            .collect();

        let mut weights = Vec::with_capacity(n_classes);
        let mut bias = Vec::with_capacity(n_classes);
        for (w, b) in fitted {
            weights.push(w);
            bias.push(b);
        }
        Self { weights, bias }
    }

    /// Per-class signed distances from the decision boundary.
    pub fn decision_function(&self, row: &SparseVec) -> Vec<f64> {
        self.weights
            .iter()
            .zip(&self.bias)
            .map(|(w, b)| sparse_dot(w, row) + b)
            .collect()
    }

    pub fn predict(&self, row: &SparseVec) -> Option<usize> {
        argmax(&self.decision_function(row))
    }

    pub fn n_classes(&self) -> usize {
        self.weights.len()
    }
}

/// Pegasos-style SGD for one one-vs-rest binary problem.
///
/// The weight vector is kept as `scale * w` so the per-step shrinkage is a
/// single multiply instead of a full dense pass.
fn train_binary(
    rows: &[SparseVec],
    labels: &[usize],
    class: usize,
    n_features: usize,
    config: &SvmConfig,
) -> (Vec<f64>, f64) {
    let n = rows.len();
    let mut w = vec![0.0_f64; n_features];
    let mut bias = 0.0_f64;
    if n == 0 || n_features == 0 {
        return (w, bias);
    }

    let lambda = 1.0 / (config.c * n as f64);
    let mut rng = StdRng::seed_from_u64(config.seed.wrapping_add(class as u64));
    let mut order: Vec<usize> = (0..n).collect();
    let mut scale = 1.0_f64;
    let mut step: u64 = 1;

    for _ in 0..config.epochs {
        order.shuffle(&mut rng);
        for &i in &order {
            step += 1;
            let eta = 1.0 / (lambda * step as f64);
            let y = if labels[i] == class { 1.0 } else { -1.0 };
            let margin = y * (scale * sparse_dot(&w, &rows[i]) + bias);

            scale *= 1.0 - eta * lambda;
            if scale < 1e-9 {
                for value in &mut w {
                    *value *= scale;
                }
                scale = 1.0;
            }
            if margin < 1.0 {
                let coeff = eta * y / scale;
                for &(index, value) in &rows[i] {
                    w[index] += coeff * value;
                }
                bias += eta * y;
            }
        }
    }

    for value in &mut w {
        *value *= scale;
    }
    (w, bias)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Two cleanly separated classes: class 0 lives on features {0, 1},
    /// class 1 on features {2, 3}.
    fn toy_data() -> (Vec<SparseVec>, Vec<usize>) {
        let rows = vec![
            vec![(0, 0.9), (1, 0.4)],
            vec![(0, 0.7), (1, 0.7)],
            vec![(0, 1.0)],
            vec![(1, 1.0)],
            vec![(2, 0.9), (3, 0.4)],
            vec![(2, 0.7), (3, 0.7)],
            vec![(2, 1.0)],
            vec![(3, 1.0)],
        ];
        let labels = vec![0, 0, 0, 0, 1, 1, 1, 1];
        (rows, labels)
    }

    #[test]
    fn test_separable_classes_are_learned() {
        let (rows, labels) = toy_data();
        let model = LinearSvm::train(&rows, &labels, 2, 4, &SvmConfig::default());
        for (row, &label) in rows.iter().zip(&labels) {
            assert_eq!(model.predict(row), Some(label));
        }
    }

    #[test]
    fn test_decision_function_has_one_margin_per_class() {
        let (rows, labels) = toy_data();
        let model = LinearSvm::train(&rows, &labels, 2, 4, &SvmConfig::default());
        let margins = model.decision_function(&rows[0]);
        assert_eq!(margins.len(), 2);
        assert!(margins[0] > margins[1]);
    }

    #[test]
    fn test_winning_margin_is_positive_on_training_data() {
        let (rows, labels) = toy_data();
        let model = LinearSvm::train(&rows, &labels, 2, 4, &SvmConfig::default());
        let margins = model.decision_function(&rows[0]);
        assert!(margins[0] > 0.0, "winner margin was {}", margins[0]);
    }

    #[test]
    fn test_training_is_deterministic() {
        let (rows, labels) = toy_data();
        let config = SvmConfig::default();
        let a = LinearSvm::train(&rows, &labels, 2, 4, &config);
        let b = LinearSvm::train(&rows, &labels, 2, 4, &config);
        assert_eq!(a.decision_function(&rows[0]), b.decision_function(&rows[0]));
    }

    #[test]
    fn test_empty_model_predicts_none() {
        let model = LinearSvm::train(&[], &[], 0, 0, &SvmConfig::default());
        assert_eq!(model.predict(&vec![(0, 1.0)]), None);
        assert_eq!(model.n_classes(), 0);
    }

    #[test]
    fn test_serde_roundtrip_preserves_decisions() {
        let (rows, labels) = toy_data();
        let model = LinearSvm::train(&rows, &labels, 2, 4, &SvmConfig::default());
        let json = serde_json::to_string(&model).unwrap();
        let back: LinearSvm = serde_json::from_str(&json).unwrap();
        assert_eq!(back.decision_function(&rows[3]), model.decision_function(&rows[3]));
    }
}
