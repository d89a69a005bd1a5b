//! Ensemble resolution: combines two per-model votes into one final
//! (role, confidence, method) under the closed-vocabulary guarantee.

use tracing::warn;

use crate::models::prediction::EnsembleMethod;
use crate::models::roles::{is_required_role, DEFAULT_ROLE};

/// Confidence assigned when no classifier can contribute.
pub const FALLBACK_ROLE_CONFIDENCE: f64 = 0.5;

/// One classifier's validated contribution to a single prediction. A vote
/// only exists when the model loaded and its prediction decoded to a role
/// inside the required set.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelVote {
    pub role: String,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub role: String,
    pub confidence: f64,
    pub method: EnsembleMethod,
}

/// The resolution decision table, evaluated in order:
///
/// 1. both agree          → that role, mean confidence
/// 2. both, roles differ  → higher-confidence side (ties go to the SVM)
/// 3. forest only         → its vote
/// 4. SVM only            → its vote
/// 5. neither             → default role at fallback confidence
///
/// Post-condition, re-validated before returning: the final role is a member
/// of the required set. This second guard is independent of vote validation
/// upstream — any out-of-set role is forced back to the default.
pub fn resolve(svm: Option<ModelVote>, rf: Option<ModelVote>) -> Resolution {
    let mut resolution = match (svm, rf) {
        (Some(a), Some(b)) if a.role == b.role => Resolution {
            confidence: (a.confidence + b.confidence) / 2.0,
            role: a.role,
            method: EnsembleMethod::BothAgree,
        },
        (Some(a), Some(b)) => {
            if a.confidence >= b.confidence {
                Resolution {
                    role: a.role,
                    confidence: a.confidence,
                    method: EnsembleMethod::SvmHigherConfidence,
                }
            } else {
                Resolution {
                    role: b.role,
                    confidence: b.confidence,
                    method: EnsembleMethod::RfHigherConfidence,
                }
            }
        }
        (None, Some(b)) => Resolution {
            role: b.role,
            confidence: b.confidence,
            method: EnsembleMethod::RfOnly,
        },
        (Some(a), None) => Resolution {
            role: a.role,
            confidence: a.confidence,
            method: EnsembleMethod::SvmOnly,
        },
        (None, None) => {
            warn!("no classifier available; falling back to default role");
            Resolution {
                role: DEFAULT_ROLE.to_string(),
                confidence: FALLBACK_ROLE_CONFIDENCE,
                method: EnsembleMethod::Fallback,
            }
        }
    };

    if !is_required_role(&resolution.role) {
        warn!(role = %resolution.role, "resolved role outside required set; forcing default");
        resolution.role = DEFAULT_ROLE.to_string();
        resolution.confidence = FALLBACK_ROLE_CONFIDENCE;
    }
    resolution
}
