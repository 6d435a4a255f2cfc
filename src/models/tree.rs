//! Depth-limited CART regression tree.
//!
//! Splits minimize the within-node sum of squared errors. Every node stores
//! its mean label, which makes decision-path attributions available: walking
//! from root to leaf, the change in node mean at each split is credited to
//! the split feature. The root mean is the tree's expected value.

use crate::error::{Result, ShapcastError};
use crate::models::estimator::{Estimator, EstimatorFamily, PathContributions};

#[derive(Debug, Clone)]
enum Node {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        value: f64,
        left: usize,
        right: usize,
    },
}

/// Single decision tree regressor with native path contributions.
#[derive(Debug, Clone)]
pub struct RegressionTree {
    max_depth: usize,
    min_samples_split: usize,
    nodes: Vec<Node>,
    n_features: usize,
}

impl RegressionTree {
    /// Create a tree with the given maximum depth.
    pub fn new(max_depth: usize) -> Self {
        Self {
            max_depth,
            min_samples_split: 2,
            nodes: Vec::new(),
            n_features: 0,
        }
    }

    /// Set the minimum number of samples required to attempt a split.
    pub fn with_min_samples_split(mut self, min_samples_split: usize) -> Self {
        self.min_samples_split = min_samples_split.max(2);
        self
    }

    fn is_fitted(&self) -> bool {
        !self.nodes.is_empty()
    }

    fn build(
        &mut self,
        x: &[Vec<f64>],
        y: &[f64],
        indices: &[usize],
        depth: usize,
    ) -> usize {
        let mean = indices.iter().map(|&i| y[i]).sum::<f64>() / indices.len() as f64;

        if depth >= self.max_depth || indices.len() < self.min_samples_split {
            self.nodes.push(Node::Leaf { value: mean });
            return self.nodes.len() - 1;
        }

        let Some((feature, threshold)) = best_split(x, y, indices) else {
            self.nodes.push(Node::Leaf { value: mean });
            return self.nodes.len() - 1;
        };

        let (left_idx, right_idx): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .partition(|&&i| x[i][feature] <= threshold);

        let left = self.build(x, y, &left_idx, depth + 1);
        let right = self.build(x, y, &right_idx, depth + 1);
        self.nodes.push(Node::Split {
            feature,
            threshold,
            value: mean,
            left,
            right,
        });
        self.nodes.len() - 1
    }

    fn root(&self) -> usize {
        // The root is pushed last by the recursive build.
        self.nodes.len() - 1
    }

    fn predict_row(&self, row: &[f64]) -> f64 {
        let mut node = self.root();
        loop {
            match &self.nodes[node] {
                Node::Leaf { value } => return *value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                    ..
                } => {
                    node = if row[*feature] <= *threshold { *left } else { *right };
                }
            }
        }
    }

    fn contributions_row(&self, row: &[f64]) -> Vec<f64> {
        let mut phi = vec![0.0; self.n_features];
        let mut node = self.root();
        let mut current = match &self.nodes[node] {
            Node::Leaf { value } => *value,
            Node::Split { value, .. } => *value,
        };
        loop {
            match &self.nodes[node] {
                Node::Leaf { .. } => return phi,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                    ..
                } => {
                    let next = if row[*feature] <= *threshold { *left } else { *right };
                    let next_value = match &self.nodes[next] {
                        Node::Leaf { value } => *value,
                        Node::Split { value, .. } => *value,
                    };
                    phi[*feature] += next_value - current;
                    current = next_value;
                    node = next;
                }
            }
        }
    }
}

/// Find the (feature, threshold) pair with the lowest post-split SSE.
/// Returns `None` when no split separates the data.
fn best_split(x: &[Vec<f64>], y: &[f64], indices: &[usize]) -> Option<(usize, f64)> {
    let n_features = x[indices[0]].len();
    let mut best: Option<(usize, f64, f64)> = None;

    for feature in 0..n_features {
        let mut order: Vec<usize> = indices.to_vec();
        order.sort_by(|&a, &b| {
            x[a][feature]
                .partial_cmp(&x[b][feature])
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let total_sum: f64 = order.iter().map(|&i| y[i]).sum();
        let total_sq: f64 = order.iter().map(|&i| y[i] * y[i]).sum();
        let n = order.len() as f64;

        let mut left_sum = 0.0;
        let mut left_sq = 0.0;
        for split in 1..order.len() {
            let prev = order[split - 1];
            let curr = order[split];
            left_sum += y[prev];
            left_sq += y[prev] * y[prev];

            if x[prev][feature] == x[curr][feature] {
                continue;
            }
            let n_left = split as f64;
            let n_right = n - n_left;
            let right_sum = total_sum - left_sum;
            let right_sq = total_sq - left_sq;
            let sse = (left_sq - left_sum * left_sum / n_left)
                + (right_sq - right_sum * right_sum / n_right);

            if best.map_or(true, |(_, _, best_sse)| sse < best_sse) {
                let threshold = 0.5 * (x[prev][feature] + x[curr][feature]);
                best = Some((feature, threshold, sse));
            }
        }
    }

    best.map(|(feature, threshold, _)| (feature, threshold))
}

impl Estimator for RegressionTree {
    fn fit(&mut self, x: &[Vec<f64>], y: &[f64]) -> Result<()> {
        if x.is_empty() {
            return Err(ShapcastError::EmptyData);
        }
        if x.len() != y.len() {
            return Err(ShapcastError::DimensionMismatch {
                expected: x.len(),
                got: y.len(),
            });
        }
        self.nodes.clear();
        self.n_features = x[0].len();
        let indices: Vec<usize> = (0..x.len()).collect();
        self.build(x, y, &indices, 0);
        Ok(())
    }

    fn predict(&self, x: &[Vec<f64>]) -> Result<Vec<f64>> {
        if !self.is_fitted() {
            return Err(ShapcastError::FitRequired);
        }
        Ok(x.iter().map(|row| self.predict_row(row)).collect())
    }

    fn name(&self) -> &str {
        "RegressionTree"
    }

    fn family(&self) -> EstimatorFamily {
        EstimatorFamily::DecisionTree
    }

    fn path_contributions(&self, x: &[Vec<f64>]) -> Option<Result<PathContributions>> {
        if !self.is_fitted() {
            return Some(Err(ShapcastError::FitRequired));
        }
        let expected_value = match &self.nodes[self.root()] {
            Node::Leaf { value } => *value,
            Node::Split { value, .. } => *value,
        };
        let values = x.iter().map(|row| self.contributions_row(row)).collect();
        Some(Ok(PathContributions {
            values,
            expected_value,
        }))
    }
}
