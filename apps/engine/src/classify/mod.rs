pub mod forest;
pub mod svm;

use crate::features::vectorizer::SparseVec;

/// Dot product between a dense weight row and a sparse document row.
pub(crate) fn sparse_dot(weights: &[f64], row: &SparseVec) -> f64 {
    row.iter()
        .map(|&(index, value)| weights.get(index).copied().unwrap_or(0.0) * value)
        .sum()
}

/// Value of one feature in a sparse row (rows are sorted by index).
pub(crate) fn feature_value(row: &SparseVec, feature: usize) -> f64 {
    row.binary_search_by_key(&feature, |&(index, _)| index)
        .map(|pos| row[pos].1)
        .unwrap_or(0.0)
}

/// Index of the largest score; ties resolve to the lowest index.
pub(crate) fn argmax(scores: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (index, &score) in scores.iter().enumerate() {
        match best {
            Some((_, value)) if score <= value => {}
            _ => best = Some((index, score)),
        }
    }
    best.map(|(index, _)| index)
}
