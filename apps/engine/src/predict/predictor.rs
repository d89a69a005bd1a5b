//! Inference entry point: free text in, `PredictionResult` out.
//!
//! Partial model unavailability never fails the call — it degrades through
//! the resolver's single-model and fallback rules. Only invalid input and a
//! missing feature space are errors.

use tracing::warn;

use crate::errors::EngineError;
use crate::features::vectorizer;
use crate::models::prediction::PredictionResult;
use crate::models::roles::{is_required_role, LabelCodec, ROLE_LABELS};
use crate::predict::{calibration, ensemble, top_k, uncertainty};
use crate::state::LoadedArtifacts;

/// Predicts one canonical role for the given resume/job text.
pub fn predict_role(
    artifacts: &LoadedArtifacts,
    text: &str,
) -> Result<PredictionResult, EngineError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(EngineError::InvalidInput("no text provided".to_string()));
    }

    let row = vectorizer::transform(text, &artifacts.feature_space);
    let codec = artifacts.codec.as_ref();

    // SVM contribution.
    let mut svm_role: Option<String> = None;
    let mut svm_confidence: Option<f64> = None;
    if let (Some(model), Some(codec)) = (artifacts.svm.ready(), codec) {
        if let Some(winner) = model.predict(&row) {
            let margins = model.decision_function(&row);
            let confidence = calibration::svm_confidence(Some(&margins), winner);
            match decode_validated(codec, winner) {
                Some(role) => {
                    svm_role = Some(role.to_string());
                    svm_confidence = Some(confidence);
                }
                None => warn!(index = winner, "svm prediction outside required set; discarded"),
            }
        }
    }

    // Forest contribution. The distribution is kept for top-k even when the
    // argmax decodes badly.
    let mut rf_role: Option<String> = None;
    let mut rf_confidence: Option<f64> = None;
    let mut rf_proba: Option<Vec<f64>> = None;
    if let (Some(model), Some(codec)) = (artifacts.forest.ready(), codec) {
        let proba = model.predict_proba(&row);
        if let Some(winner) = model.predict(&row) {
            let confidence = calibration::rf_confidence(Some(&proba));
            match decode_validated(codec, winner) {
                Some(role) => {
                    rf_role = Some(role.to_string());
                    rf_confidence = Some(confidence);
                }
                None => warn!(index = winner, "forest prediction outside required set; discarded"),
            }
        }
        rf_proba = Some(proba);
    }

    let svm_vote = svm_role.clone().zip(svm_confidence).map(|(role, confidence)| {
        ensemble::ModelVote { role, confidence }
    });
    let rf_vote = rf_role.clone().zip(rf_confidence).map(|(role, confidence)| {
        ensemble::ModelVote { role, confidence }
    });
    let resolution = ensemble::resolve(svm_vote, rf_vote);

    let top_roles = top_k::extract_top_roles(
        rf_proba.as_deref(),
        codec,
        &resolution.role,
        resolution.confidence,
    );

    let advisory = uncertainty::advisory(resolution.confidence);
    let message = match advisory {
        Some(note) => format!("Predicted role: {} ({note})", resolution.role),
        None => format!("Predicted role: {}", resolution.role),
    };

    Ok(PredictionResult {
        validation_passed: is_required_role(&resolution.role),
        predicted_role: resolution.role,
        confidence: resolution.confidence,
        svm_role,
        svm_confidence,
        rf_role,
        rf_confidence,
        top_roles,
        ensemble_method: resolution.method,
        is_uncertain: advisory.is_some(),
        uncertainty_message: advisory.map(str::to_string),
        message,
        required_roles_count: ROLE_LABELS.len(),
    })
}

fn decode_validated(codec: &LabelCodec, index: usize) -> Option<&str> {
    codec.decode(index).filter(|role| is_required_role(role))
}
