//! Random forest classifier: bagged Gini decision trees with per-class
//! probability estimates averaged over the ensemble.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::classify::{argmax, feature_value};
use crate::features::vectorizer::SparseVec;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForestConfig {
    pub n_trees: usize,
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    pub seed: u64,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_depth: 20,
            min_samples_split: 5,
            min_samples_leaf: 2,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
enum Node {
    Leaf {
        /// Class distribution at the leaf; sums to 1.
        dist: Vec<f64>,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Tree {
    nodes: Vec<Node>,
    root: usize,
}

impl Tree {
    fn leaf_dist(&self, row: &SparseVec) -> &[f64] {
        let mut index = self.root;
        loop {
            match &self.nodes[index] {
                Node::Leaf { dist } => return dist,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    index = if feature_value(row, *feature) <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    trees: Vec<Tree>,
    n_classes: usize,
}

impl RandomForest {
    /// Fits `n_trees` trees on bootstrap samples, √F random feature
    /// candidates per split. Trees fit in parallel with per-tree seeds.
    pub fn train(
        rows: &[SparseVec],
        labels: &[usize],
        n_classes: usize,
        n_features: usize,
        config: &ForestConfig,
    ) -> Self {
        let trees: Vec<Tree> = (0..config.n_trees)
            .into_par_iter()
            .map(|tree_index| {
                let mut rng = StdRng::seed_from_u64(config.seed.wrapping_add(tree_index as u64));
                let samples: Vec<usize> = if rows.is_empty() {
                    Vec::new()
                } else {
                    (0..rows.len()).map(|_| rng.gen_range(0..rows.len())).collect()
                };
                let mut builder = TreeBuilder {
                    rows,
                    labels,
                    n_classes,
                    n_features,
                    config,
                    nodes: Vec::new(),
                };
                let root = builder.grow(samples, 0, &mut rng);
                Tree {
                    nodes: builder.nodes,
                    root,
                }
            })
            .collect();

        Self { trees, n_classes }
    }

    /// Class probability distribution: leaf distributions averaged across
    /// all trees. Sums to 1 whenever the forest is non-empty.
    pub fn predict_proba(&self, row: &SparseVec) -> Vec<f64> {
        let mut proba = vec![0.0; self.n_classes];
        if self.trees.is_empty() {
            return proba;
        }
        for tree in &self.trees {
            for (total, value) in proba.iter_mut().zip(tree.leaf_dist(row)) {
                *total += value;
            }
        }
        let n = self.trees.len() as f64;
        for value in &mut proba {
            *value /= n;
        }
        proba
    }

    pub fn predict(&self, row: &SparseVec) -> Option<usize> {
        if self.trees.is_empty() {
            return None;
        }
        argmax(&self.predict_proba(row))
    }

    pub fn n_classes(&self) -> usize {
        self.n_classes
    }
}

struct TreeBuilder<'a> {
    rows: &'a [SparseVec],
    labels: &'a [usize],
    n_classes: usize,
    n_features: usize,
    config: &'a ForestConfig,
    nodes: Vec<Node>,
}

impl TreeBuilder<'_> {
    /// Grows a subtree over `samples` and returns its node index.
    fn grow(&mut self, samples: Vec<usize>, depth: usize, rng: &mut StdRng) -> usize {
        let counts = self.class_counts(&samples);
        let total: usize = counts.iter().sum();
        let pure = counts.iter().any(|&c| c == total && total > 0);

        if depth >= self.config.max_depth
            || samples.len() < self.config.min_samples_split
            || pure
            || total == 0
        {
            return self.push_leaf(&counts, total);
        }

        match self.best_split(&samples, &counts, rng) {
            Some((feature, threshold)) => {
                let (left_samples, right_samples): (Vec<usize>, Vec<usize>) = samples
                    .into_iter()
                    .partition(|&i| feature_value(&self.rows[i], feature) <= threshold);
                let left = self.grow(left_samples, depth + 1, rng);
                let right = self.grow(right_samples, depth + 1, rng);
                self.nodes.push(Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                });
                self.nodes.len() - 1
            }
            None => self.push_leaf(&counts, total),
        }
    }

    fn class_counts(&self, samples: &[usize]) -> Vec<usize> {
        let mut counts = vec![0_usize; self.n_classes];
        for &i in samples {
            counts[self.labels[i]] += 1;
        }
        counts
    }

    fn push_leaf(&mut self, counts: &[usize], total: usize) -> usize {
        let dist = if total == 0 {
            // Degenerate bootstrap; fall back to a uniform distribution.
            vec![1.0 / self.n_classes.max(1) as f64; self.n_classes]
        } else {
            counts.iter().map(|&c| c as f64 / total as f64).collect()
        };
        self.nodes.push(Node::Leaf { dist });
        self.nodes.len() - 1
    }

    /// Best (feature, threshold) among √F random candidates by weighted Gini
    /// impurity. `None` when no split improves on the parent.
    fn best_split(
        &self,
        samples: &[usize],
        parent_counts: &[usize],
        rng: &mut StdRng,
    ) -> Option<(usize, f64)> {
        let n = samples.len();
        let parent_gini = gini(parent_counts, n);
        let n_candidates = (self.n_features as f64).sqrt().ceil() as usize;
        let candidates = rand::seq::index::sample(
            rng,
            self.n_features,
            n_candidates.min(self.n_features),
        );

        let mut best: Option<(usize, f64, f64)> = None;
        for feature in candidates {
            let mut values: Vec<(f64, usize)> = samples
                .iter()
                .map(|&i| (feature_value(&self.rows[i], feature), self.labels[i]))
                .collect();
            values.sort_by(|a, b| a.0.total_cmp(&b.0));
            if values[0].0 == values[n - 1].0 {
                continue;
            }

            let mut left_counts = vec![0_usize; self.n_classes];
            let mut right_counts = parent_counts.to_vec();
            for split_at in 1..n {
                let (value, label) = values[split_at - 1];
                left_counts[label] += 1;
                right_counts[label] -= 1;

                if value == values[split_at].0 {
                    continue;
                }
                if split_at < self.config.min_samples_leaf
                    || n - split_at < self.config.min_samples_leaf
                {
                    continue;
                }

                let impurity = (split_at as f64 * gini(&left_counts, split_at)
                    + (n - split_at) as f64 * gini(&right_counts, n - split_at))
                    / n as f64;
                if best.map_or(true, |(_, _, current)| impurity < current) {
                    let threshold = (value + values[split_at].0) / 2.0;
                    best = Some((feature, threshold, impurity));
                }
            }
        }

        best.and_then(|(feature, threshold, impurity)| {
            (impurity < parent_gini - 1e-12).then_some((feature, threshold))
        })
    }
}

fn gini(counts: &[usize], total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let sum_sq: f64 = counts
        .iter()
        .map(|&c| {
            let p = c as f64 / total as f64;
            p * p
        })
        .sum();
    1.0 - sum_sq
}
