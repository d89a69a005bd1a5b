//! Ranked alternative roles from the probability-capable classifier.

use crate::models::prediction::TopRole;
use crate::models::roles::{is_required_role, LabelCodec};

pub const TOP_K: usize = 3;

/// Top-3 classes of the forest's distribution, decoded and filtered to the
/// required set. Entries whose decoded label falls outside the set are
/// dropped — a corrupted codec must never leak a label through here. When
/// the distribution is unavailable or everything filtered out, the final
/// resolution becomes the single entry.
pub fn extract_top_roles(
    proba: Option<&[f64]>,
    codec: Option<&LabelCodec>,
    final_role: &str,
    final_confidence: f64,
) -> Vec<TopRole> {
    let mut top = Vec::new();

    if let (Some(proba), Some(codec)) = (proba, codec) {
        let mut ranked: Vec<usize> = (0..proba.len()).collect();
        ranked.sort_by(|&a, &b| proba[b].total_cmp(&proba[a]).then(a.cmp(&b)));

        for index in ranked.into_iter().take(TOP_K) {
            if let Some(role) = codec.decode(index) {
                if is_required_role(role) {
                    top.push(TopRole {
                        role: role.to_string(),
                        confidence: proba[index],
                    });
                }
            }
        }
    }

    if top.is_empty() {
        top.push(TopRole {
            role: final_role.to_string(),
            confidence: final_confidence,
        });
    }
    top
}
