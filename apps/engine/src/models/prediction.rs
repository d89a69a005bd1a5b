//! Wire-shaped prediction types returned to the external web layer.

use serde::{Deserialize, Serialize};

/// Which resolution branch produced the final prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnsembleMethod {
    BothAgree,
    SvmHigherConfidence,
    RfHigherConfidence,
    SvmOnly,
    RfOnly,
    Fallback,
}

/// One ranked alternative role with its probability mass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopRole {
    pub role: String,
    pub confidence: f64,
}

/// Flat prediction record serialized back to the caller.
///
/// Invariant: `predicted_role` and every role in `top_roles` is a member of
/// the 8-role required set, restated to the client via `validation_passed`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionResult {
    pub predicted_role: String,
    pub confidence: f64,
    pub svm_role: Option<String>,
    pub svm_confidence: Option<f64>,
    pub rf_role: Option<String>,
    pub rf_confidence: Option<f64>,
    pub top_roles: Vec<TopRole>,
    pub ensemble_method: EnsembleMethod,
    pub is_uncertain: bool,
    pub uncertainty_message: Option<String>,
    pub message: String,
    pub required_roles_count: usize,
    pub validation_passed: bool,
}
