//! Evaluation metrics, model selection, and the persisted training report.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::features::vectorizer::VectorizerConfig;

/// Weighted classification metrics over the held-out split.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetrics {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
}

/// Accuracy plus support-weighted precision/recall/F1. Classes with no
/// predicted (or no true) instances contribute zero instead of dividing by
/// zero.
pub fn evaluate(y_true: &[usize], y_pred: &[usize], n_classes: usize) -> ModelMetrics {
    let total = y_true.len();
    if total == 0 || y_pred.len() != total {
        return ModelMetrics {
            accuracy: 0.0,
            precision: 0.0,
            recall: 0.0,
            f1_score: 0.0,
        };
    }

    let mut true_positive = vec![0_usize; n_classes];
    let mut false_positive = vec![0_usize; n_classes];
    let mut false_negative = vec![0_usize; n_classes];
    let mut support = vec![0_usize; n_classes];
    let mut correct = 0_usize;

    for (&t, &p) in y_true.iter().zip(y_pred) {
        support[t] += 1;
        if t == p {
            correct += 1;
            true_positive[t] += 1;
        } else {
            false_negative[t] += 1;
            if p < n_classes {
                false_positive[p] += 1;
            }
        }
    }

    let mut precision = 0.0;
    let mut recall = 0.0;
    let mut f1_score = 0.0;
    for class in 0..n_classes {
        let weight = support[class] as f64 / total as f64;
        if weight == 0.0 {
            continue;
        }
        let tp = true_positive[class] as f64;
        let predicted = tp + false_positive[class] as f64;
        let actual = tp + false_negative[class] as f64;

        let p = if predicted > 0.0 { tp / predicted } else { 0.0 };
        let r = if actual > 0.0 { tp / actual } else { 0.0 };
        let f = if p + r > 0.0 { 2.0 * p * r / (p + r) } else { 0.0 };

        precision += weight * p;
        recall += weight * r;
        f1_score += weight * f;
    }

    ModelMetrics {
        accuracy: correct as f64 / total as f64,
        precision,
        recall,
        f1_score,
    }
}

/// The general-purpose "best" reference model recorded in the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BestModel {
    #[serde(rename = "SVM")]
    Svm,
    #[serde(rename = "Random Forest")]
    RandomForest,
}

/// Primary metric is accuracy; ties favor the SVM.
pub fn select_best(svm: &ModelMetrics, rf: &ModelMetrics) -> BestModel {
    if svm.accuracy >= rf.accuracy {
        BestModel::Svm
    } else {
        BestModel::RandomForest
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingInfo {
    pub total_records_after_normalization: usize,
    pub excluded_unmapped: usize,
    pub train_records: usize,
    pub test_records: usize,
    pub test_split: f64,
    pub ensemble_enabled: bool,
    pub models_saved: Vec<String>,
}

/// The JSON report persisted next to the model artifacts after every
/// training run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingReport {
    pub timestamp: DateTime<Utc>,
    pub best_model: BestModel,
    pub normalized_roles: Vec<String>,
    pub svm_metrics: ModelMetrics,
    pub rf_metrics: ModelMetrics,
    pub vectorizer_config: VectorizerConfig,
    pub training_info: TrainingInfo,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perfect_predictions_score_one() {
        let y = vec![0, 1, 2, 1, 0];
        let metrics = evaluate(&y, &y, 3);
        assert_eq!(metrics.accuracy, 1.0);
        assert!((metrics.precision - 1.0).abs() < 1e-12);
        assert!((metrics.recall - 1.0).abs() < 1e-12);
        assert!((metrics.f1_score - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_known_confusion_case() {
        // true:  0 0 1 1
        // pred:  0 1 1 1
        let metrics = evaluate(&[0, 0, 1, 1], &[0, 1, 1, 1], 2);
        assert_eq!(metrics.accuracy, 0.75);
        // class 0: p = 1/1, r = 1/2; class 1: p = 2/3, r = 2/2
        let expected_precision = 0.5 * 1.0 + 0.5 * (2.0 / 3.0);
        let expected_recall = 0.5 * 0.5 + 0.5 * 1.0;
        assert!((metrics.precision - expected_precision).abs() < 1e-12);
        assert!((metrics.recall - expected_recall).abs() < 1e-12);
    }

    #[test]
    fn test_unpredicted_class_contributes_zero() {
        // Class 2 exists in truth but is never predicted; no division by
        // zero, its precision/recall are 0.
        let metrics = evaluate(&[2, 2, 0], &[0, 0, 0], 3);
        assert!(metrics.precision.is_finite());
        assert!(metrics.recall.is_finite());
        assert!(metrics.f1_score.is_finite());
        assert!((metrics.accuracy - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_empty_input_scores_zero() {
        let metrics = evaluate(&[], &[], 4);
        assert_eq!(metrics.accuracy, 0.0);
        assert_eq!(metrics.f1_score, 0.0);
    }

    #[test]
    fn test_best_model_by_accuracy_ties_favor_svm() {
        let svm = ModelMetrics {
            accuracy: 0.9,
            precision: 0.9,
            recall: 0.9,
            f1_score: 0.9,
        };
        let mut rf = svm.clone();
        assert_eq!(select_best(&svm, &rf), BestModel::Svm);
        rf.accuracy = 0.95;
        assert_eq!(select_best(&svm, &rf), BestModel::RandomForest);
    }

    #[test]
    fn test_best_model_serializes_display_names() {
        assert_eq!(serde_json::to_string(&BestModel::Svm).unwrap(), "\"SVM\"");
        assert_eq!(
            serde_json::to_string(&BestModel::RandomForest).unwrap(),
            "\"Random Forest\""
        );
    }
}
