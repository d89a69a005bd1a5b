//! Confidence calibration: maps each classifier's raw output onto the same
//! [0, 1] belief scale so the resolver can compare them.
//!
//! The SVM emits signed margins, the forest emits probabilities — the two
//! are not comparable until squashed here.

/// Used whenever a raw score cannot be extracted for the winning class.
pub const FALLBACK_CONFIDENCE: f64 = 0.75;

/// Margin → confidence for the margin-based classifier: logistic squash of
/// the winning class's margin, floored at 0.5 (a margin winner sits at or
/// above the decision boundary) and capped at 1.0.
pub fn svm_confidence(margins: Option<&[f64]>, winner: usize) -> f64 {
    match margins.and_then(|m| m.get(winner)) {
        Some(&margin) if margin.is_finite() => sigmoid(margin).clamp(0.5, 1.0),
        _ => FALLBACK_CONFIDENCE,
    }
}

/// Probability → confidence for the forest: the maximum class probability.
pub fn rf_confidence(proba: Option<&[f64]>) -> f64 {
    let best = proba.and_then(|p| {
        p.iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold(None, |acc: Option<f64>, v| {
                Some(acc.map_or(v, |a| a.max(v)))
            })
    });
    match best {
        Some(value) if value > 0.0 => value.clamp(0.0, 1.0),
        _ => FALLBACK_CONFIDENCE,
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}
