//! Explanation engines and the per-estimator builder.
//!
//! One [`ExplainerHandle`] is built per concrete estimator (or one for a
//! joint multi-output estimator), parameterized by the resolved
//! [`ShapMethod`] and shared engine options. Handles are built once at
//! orchestrator construction and reused, read-only, across explain calls.

use crate::error::{Result, ShapcastError};
use crate::explain::matrix::FeatureMatrix;
use crate::explain::method::ShapMethod;
use crate::models::{Estimator, JointEstimator, LinearCoefficients};
use rand::prelude::*;
use rand::rngs::StdRng;
use std::fmt;
use tracing::{debug, warn};

/// Perturbation semantics for the tree engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FeaturePerturbation {
    /// Use the estimator's own internal expectation as baseline.
    #[default]
    TreePathDependent,
    /// Marginalize over the background dataset.
    Interventional,
}

/// Options forwarded to the underlying explanation engines.
#[derive(Debug, Clone)]
pub struct EngineOptions {
    /// Tree engine perturbation semantics.
    pub feature_perturbation: FeaturePerturbation,
    /// Number of feature orderings per permutation walk (each is also
    /// traversed in reverse).
    pub n_permutations: usize,
    /// Coalition budget for the kernel engine.
    pub n_coalitions: usize,
    /// Seed for the stochastic engines and for sub-sampling.
    pub seed: Option<u64>,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            feature_perturbation: FeaturePerturbation::default(),
            n_permutations: 4,
            n_coalitions: 1024,
            seed: None,
        }
    }
}

impl EngineOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_feature_perturbation(mut self, perturbation: FeaturePerturbation) -> Self {
        self.feature_perturbation = perturbation;
        self
    }

    pub fn with_n_permutations(mut self, n_permutations: usize) -> Self {
        self.n_permutations = n_permutations.max(1);
        self
    }

    pub fn with_n_coalitions(mut self, n_coalitions: usize) -> Self {
        self.n_coalitions = n_coalitions.max(2);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

/// The estimator a handle is bound to: one per-slot estimator slice, or
/// the joint multi-output estimator.
pub(crate) enum TargetModel<'a> {
    Single(&'a dyn Estimator),
    Joint(&'a dyn JointEstimator),
}

impl TargetModel<'_> {
    fn n_outputs(&self) -> usize {
        match self {
            TargetModel::Single(_) => 1,
            TargetModel::Joint(estimator) => estimator.n_outputs(),
        }
    }

    /// Predict all outputs per row: `result[row][output]`.
    fn predict(&self, x: &[Vec<f64>]) -> Result<Vec<Vec<f64>>> {
        match self {
            TargetModel::Single(estimator) => Ok(estimator
                .predict(x)?
                .into_iter()
                .map(|v| vec![v])
                .collect()),
            TargetModel::Joint(estimator) => estimator.predict(x),
        }
    }

    fn coefficients(&self, output: usize) -> Option<LinearCoefficients> {
        match self {
            TargetModel::Single(estimator) => {
                if output == 0 {
                    estimator.coefficients()
                } else {
                    None
                }
            }
            TargetModel::Joint(estimator) => estimator.coefficients(output),
        }
    }
}

/// Raw explanation arrays produced by an engine:
/// `values[row][output][feature]`, `base_values[row][output]`.
#[derive(Debug, Clone)]
pub(crate) struct RawExplanation {
    pub values: Vec<Vec<Vec<f64>>>,
    pub base_values: Vec<Vec<f64>>,
}

/// Concrete engine kind resolved from a [`ShapMethod`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EngineKind {
    Tree,
    Linear,
    Kernel,
    Permutation,
    Additive,
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EngineKind::Tree => "TreeExplainer",
            EngineKind::Linear => "LinearExplainer",
            EngineKind::Kernel => "KernelExplainer",
            EngineKind::Permutation => "PermutationExplainer",
            EngineKind::Additive => "AdditiveExplainer",
        };
        f.write_str(name)
    }
}

/// One instantiated explanation engine bound to one estimator.
#[derive(Debug)]
pub(crate) struct ExplainerHandle {
    kind: EngineKind,
    options: EngineOptions,
}

impl ExplainerHandle {
    /// Dispatch on the resolved method and instantiate the engine.
    ///
    /// `gradient` and `sampling` have no engine and fail here; `partition`
    /// routes to the permutation engine; `deep` routes to the linear engine
    /// until a dedicated deep engine exists.
    pub(crate) fn build(
        method: ShapMethod,
        estimator_name: &str,
        options: &EngineOptions,
    ) -> Result<Self> {
        let kind = match method {
            ShapMethod::Tree => EngineKind::Tree,
            ShapMethod::Permutation | ShapMethod::Partition => EngineKind::Permutation,
            ShapMethod::Kernel => EngineKind::Kernel,
            ShapMethod::Linear => EngineKind::Linear,
            ShapMethod::Deep => {
                warn!(
                    estimator = estimator_name,
                    "no dedicated deep engine available; falling back to the linear engine"
                );
                EngineKind::Linear
            }
            ShapMethod::Additive => EngineKind::Additive,
            ShapMethod::Gradient | ShapMethod::Sampling => {
                return Err(ShapcastError::UnsupportedMethod(format!(
                    "no engine for method `{method}`; supported methods: tree, permutation, \
                     partition, kernel, linear, deep, additive"
                )));
            }
        };
        debug!(engine = %kind, estimator = estimator_name, "instantiated shap engine");
        Ok(Self {
            kind,
            options: options.clone(),
        })
    }

    #[cfg(test)]
    pub(crate) fn kind(&self) -> EngineKind {
        self.kind
    }

    /// Compute raw explanations for the foreground matrix.
    pub(crate) fn explain(
        &self,
        model: &TargetModel<'_>,
        background: &FeatureMatrix,
        foreground: &FeatureMatrix,
    ) -> Result<RawExplanation> {
        match self.kind {
            EngineKind::Tree => tree_explain(model, background, foreground, &self.options),
            EngineKind::Linear => linear_explain(model, background, foreground),
            EngineKind::Permutation => {
                permutation_explain(model, background, foreground, &self.options)
            }
            EngineKind::Kernel => kernel_explain(model, background, foreground, &self.options),
            EngineKind::Additive => additive_explain(model, background, foreground),
        }
    }
}

/// Mean prediction over the background rows, per output.
fn background_expectation(
    model: &TargetModel<'_>,
    background: &FeatureMatrix,
) -> Result<Vec<f64>> {
    if background.rows.is_empty() {
        return Err(ShapcastError::EmptyData);
    }
    let preds = model.predict(&background.rows)?;
    let n_outputs = model.n_outputs();
    let mut mean = vec![0.0; n_outputs];
    for row in &preds {
        for (m, v) in mean.iter_mut().zip(row.iter()) {
            *m += v;
        }
    }
    for m in &mut mean {
        *m /= preds.len() as f64;
    }
    Ok(mean)
}

fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    }
}

/// Tree engine: native decision-path attributions. The background matrix
/// is consulted only under interventional perturbation semantics; the
/// path-dependent default uses the estimator's own expected value.
fn tree_explain(
    model: &TargetModel<'_>,
    background: &FeatureMatrix,
    foreground: &FeatureMatrix,
    options: &EngineOptions,
) -> Result<RawExplanation> {
    let TargetModel::Single(estimator) = model else {
        return Err(ShapcastError::InvalidConfiguration(
            "tree engine requires a single-output estimator slice".to_string(),
        ));
    };
    let contributions = estimator
        .path_contributions(&foreground.rows)
        .ok_or_else(|| {
            ShapcastError::InvalidConfiguration(format!(
                "tree method requires native path contributions, which `{}` does not provide",
                estimator.name()
            ))
        })??;

    let base = match options.feature_perturbation {
        FeaturePerturbation::Interventional => background_expectation(model, background)?[0],
        FeaturePerturbation::TreePathDependent => contributions.expected_value,
    };
    // Under the interventional baseline, shift the per-row attribution mass
    // so that base + sum(contributions) still reproduces the prediction.
    let shift = contributions.expected_value - base;

    let n_rows = foreground.rows.len();
    let n_features = foreground.n_columns();
    let values = contributions
        .values
        .into_iter()
        .map(|mut row| {
            if shift != 0.0 && n_features > 0 {
                let per_feature = shift / n_features as f64;
                for v in &mut row {
                    *v += per_feature;
                }
            }
            vec![row]
        })
        .collect();
    Ok(RawExplanation {
        values,
        base_values: vec![vec![base]; n_rows],
    })
}

/// Linear engine: `phi_j = w_j (x_j - mean_bg_j)` per output, with the
/// prediction at the background mean as base value.
fn linear_explain(
    model: &TargetModel<'_>,
    background: &FeatureMatrix,
    foreground: &FeatureMatrix,
) -> Result<RawExplanation> {
    let n_outputs = model.n_outputs();
    let mu = background.column_means();

    let mut per_output: Vec<LinearCoefficients> = Vec::with_capacity(n_outputs);
    for k in 0..n_outputs {
        per_output.push(model.coefficients(k).ok_or_else(|| {
            ShapcastError::InvalidConfiguration(
                "linear engine requires an estimator exposing linear coefficients".to_string(),
            )
        })?);
    }

    let base: Vec<f64> = per_output
        .iter()
        .map(|c| {
            c.intercept
                + c.weights
                    .iter()
                    .zip(mu.iter())
                    .map(|(w, m)| w * m)
                    .sum::<f64>()
        })
        .collect();

    let values = foreground
        .rows
        .iter()
        .map(|row| {
            per_output
                .iter()
                .map(|c| {
                    c.weights
                        .iter()
                        .zip(row.iter().zip(mu.iter()))
                        .map(|(w, (x, m))| w * (x - m))
                        .collect()
                })
                .collect()
        })
        .collect();

    Ok(RawExplanation {
        base_values: vec![base; foreground.rows.len()],
        values,
    })
}

/// Permutation engine: average marginal contributions over random feature
/// orderings (each walked forward and in reverse) against every background
/// row. Exact Shapley values in expectation.
fn permutation_explain(
    model: &TargetModel<'_>,
    background: &FeatureMatrix,
    foreground: &FeatureMatrix,
    options: &EngineOptions,
) -> Result<RawExplanation> {
    let n_outputs = model.n_outputs();
    let n_features = foreground.n_columns();
    let base = background_expectation(model, background)?;
    let mut rng = make_rng(options.seed);

    let mut values = Vec::with_capacity(foreground.rows.len());
    for x in &foreground.rows {
        // phi[output][feature]
        let mut phi = vec![vec![0.0; n_features]; n_outputs];
        let mut walks = 0usize;

        for _ in 0..options.n_permutations {
            let mut order: Vec<usize> = (0..n_features).collect();
            order.shuffle(&mut rng);
            let reversed: Vec<usize> = order.iter().rev().copied().collect();

            for ordering in [&order, &reversed] {
                for b in &background.rows {
                    let mut batch = Vec::with_capacity(n_features + 1);
                    let mut current = b.clone();
                    batch.push(current.clone());
                    for &j in ordering.iter() {
                        current[j] = x[j];
                        batch.push(current.clone());
                    }
                    let preds = model.predict(&batch)?;
                    for (step, &j) in ordering.iter().enumerate() {
                        for k in 0..n_outputs {
                            phi[k][j] += preds[step + 1][k] - preds[step][k];
                        }
                    }
                }
                walks += background.rows.len();
            }
        }

        for output in &mut phi {
            for v in output.iter_mut() {
                *v /= walks as f64;
            }
        }
        values.push(phi);
    }

    Ok(RawExplanation {
        base_values: vec![base; foreground.rows.len()],
        values,
    })
}

/// Shapley kernel weight for a coalition of size `s` out of `p` features.
fn kernel_weight(p: usize, s: usize) -> f64 {
    // (p - 1) / (C(p, s) * s * (p - s))
    let mut binom = 1.0;
    for i in 0..s {
        binom *= (p - i) as f64 / (i + 1) as f64;
    }
    (p as f64 - 1.0) / (binom * s as f64 * (p - s) as f64)
}

/// Mean prediction over the background with coalition features taken from
/// the foreground row.
fn coalition_value(
    model: &TargetModel<'_>,
    background: &FeatureMatrix,
    x: &[f64],
    mask: &[bool],
) -> Result<Vec<f64>> {
    let batch: Vec<Vec<f64>> = background
        .rows
        .iter()
        .map(|b| {
            b.iter()
                .zip(x.iter().zip(mask.iter()))
                .map(|(&bv, (&xv, &m))| if m { xv } else { bv })
                .collect()
        })
        .collect();
    let preds = model.predict(&batch)?;
    let n_outputs = model.n_outputs();
    let mut mean = vec![0.0; n_outputs];
    for row in &preds {
        for (m, v) in mean.iter_mut().zip(row.iter()) {
            *m += v;
        }
    }
    for m in &mut mean {
        *m /= preds.len() as f64;
    }
    Ok(mean)
}

/// Kernel engine: Kernel SHAP. Coalitions are enumerated exhaustively when
/// the budget allows, sampled otherwise; attributions solve the
/// kernel-weighted least squares problem with the efficiency constraint
/// eliminated into the last feature.
fn kernel_explain(
    model: &TargetModel<'_>,
    background: &FeatureMatrix,
    foreground: &FeatureMatrix,
    options: &EngineOptions,
) -> Result<RawExplanation> {
    let n_outputs = model.n_outputs();
    let p = foreground.n_columns();
    let base = background_expectation(model, background)?;

    let mut rng = make_rng(options.seed);
    let mut values = Vec::with_capacity(foreground.rows.len());

    for x in &foreground.rows {
        let fx = model
            .predict(std::slice::from_ref(x))?
            .into_iter()
            .next()
            .ok_or(ShapcastError::EmptyData)?;

        if p == 1 {
            let phi: Vec<Vec<f64>> = (0..n_outputs).map(|k| vec![fx[k] - base[k]]).collect();
            values.push(phi);
            continue;
        }

        // Collect coalition masks, excluding the empty and full sets whose
        // values are pinned by the base value and the prediction.
        let masks: Vec<Vec<bool>> = if p < usize::BITS as usize && (1usize << p) - 2 <= options.n_coalitions
        {
            (1..(1usize << p) - 1)
                .map(|bits| (0..p).map(|j| bits & (1 << j) != 0).collect())
                .collect()
        } else {
            let mut sampled = Vec::with_capacity(options.n_coalitions);
            while sampled.len() < options.n_coalitions {
                let mask: Vec<bool> = (0..p).map(|_| rng.gen_bool(0.5)).collect();
                let size = mask.iter().filter(|&&m| m).count();
                if size > 0 && size < p {
                    sampled.push(mask);
                }
            }
            sampled
        };

        let mut design = Vec::with_capacity(masks.len());
        let mut weights = Vec::with_capacity(masks.len());
        let mut coalition_values = Vec::with_capacity(masks.len());
        for mask in &masks {
            let size = mask.iter().filter(|&&m| m).count();
            weights.push(kernel_weight(p, size));
            coalition_values.push(coalition_value(model, background, x, mask)?);
            // Eliminate phi_{p-1}: regress on z_j - z_{p-1} for j < p-1.
            let z_last = mask[p - 1] as u8 as f64;
            design.push(
                (0..p - 1)
                    .map(|j| mask[j] as u8 as f64 - z_last)
                    .collect::<Vec<f64>>(),
            );
        }

        let mut phi = vec![vec![0.0; p]; n_outputs];
        for k in 0..n_outputs {
            let total = fx[k] - base[k];
            let y: Vec<f64> = masks
                .iter()
                .zip(coalition_values.iter())
                .map(|(mask, value)| {
                    let z_last = mask[p - 1] as u8 as f64;
                    value[k] - base[k] - z_last * total
                })
                .collect();
            let head = crate::utils::linalg::weighted_least_squares(&design, &y, &weights)?;
            let head_sum: f64 = head.iter().sum();
            phi[k][..p - 1].copy_from_slice(&head);
            phi[k][p - 1] = total - head_sum;
        }
        values.push(phi);
    }

    Ok(RawExplanation {
        base_values: vec![base; foreground.rows.len()],
        values,
    })
}

/// Additive engine: toggle one feature at a time against every background
/// row. Exact for models without feature interactions.
fn additive_explain(
    model: &TargetModel<'_>,
    background: &FeatureMatrix,
    foreground: &FeatureMatrix,
) -> Result<RawExplanation> {
    let n_outputs = model.n_outputs();
    let n_features = foreground.n_columns();
    let base = background_expectation(model, background)?;

    let mut values = Vec::with_capacity(foreground.rows.len());
    for x in &foreground.rows {
        let mut phi = vec![vec![0.0; n_features]; n_outputs];
        for j in 0..n_features {
            let mask: Vec<bool> = (0..n_features).map(|f| f == j).collect();
            let toggled = coalition_value(model, background, x, &mask)?;
            for k in 0..n_outputs {
                phi[k][j] = toggled[k] - base[k];
            }
        }
        values.push(phi);
    }

    Ok(RawExplanation {
        base_values: vec![base; foreground.rows.len()],
        values,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LinearRegressor, RegressionTree};
    use approx::assert_relative_eq;
    use chrono::{Duration, TimeZone, Utc};

    fn make_matrix(rows: Vec<Vec<f64>>, n_columns: usize) -> FeatureMatrix {
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let time_index = (0..rows.len())
            .map(|i| base + Duration::hours(i as i64))
            .collect();
        FeatureMatrix {
            rows,
            columns: (0..n_columns).map(|i| format!("f{i}")).collect(),
            time_index,
        }
    }

    /// y = 1 + 2 x0 - 3 x1
    fn fitted_linear() -> LinearRegressor {
        let x: Vec<Vec<f64>> = (0..30)
            .map(|i| vec![(i % 5) as f64, (i % 4) as f64])
            .collect();
        let y: Vec<f64> = x.iter().map(|r| 1.0 + 2.0 * r[0] - 3.0 * r[1]).collect();
        let mut est = LinearRegressor::new();
        est.fit(&x, &y).unwrap();
        est
    }

    fn backgrounds() -> FeatureMatrix {
        make_matrix(
            (0..12).map(|i| vec![(i % 5) as f64, (i % 4) as f64]).collect(),
            2,
        )
    }

    #[test]
    fn builder_dispatch_matches_policy() {
        let options = EngineOptions::default();
        let cases = [
            (ShapMethod::Tree, EngineKind::Tree),
            (ShapMethod::Permutation, EngineKind::Permutation),
            (ShapMethod::Partition, EngineKind::Permutation),
            (ShapMethod::Kernel, EngineKind::Kernel),
            (ShapMethod::Linear, EngineKind::Linear),
            (ShapMethod::Deep, EngineKind::Linear),
            (ShapMethod::Additive, EngineKind::Additive),
        ];
        for (method, expected) in cases {
            let handle = ExplainerHandle::build(method, "test", &options).unwrap();
            assert_eq!(handle.kind(), expected, "method {method}");
        }
    }

    #[test]
    fn builder_rejects_methods_without_engines() {
        let options = EngineOptions::default();
        for method in [ShapMethod::Gradient, ShapMethod::Sampling] {
            let err = ExplainerHandle::build(method, "test", &options).unwrap_err();
            match err {
                ShapcastError::UnsupportedMethod(message) => {
                    assert!(message.contains("tree"));
                    assert!(message.contains("kernel"));
                }
                other => panic!("unexpected error: {other:?}"),
            }
        }
    }

    #[test]
    fn linear_engine_is_exact_for_linear_models() {
        let est = fitted_linear();
        let model = TargetModel::Single(&est);
        let background = backgrounds();
        let foreground = make_matrix(vec![vec![4.0, 0.0]], 2);

        let raw = linear_explain(&model, &background, &foreground).unwrap();
        let mu = background.column_means();

        assert_relative_eq!(raw.values[0][0][0], 2.0 * (4.0 - mu[0]), epsilon = 1e-4);
        assert_relative_eq!(raw.values[0][0][1], -3.0 * (0.0 - mu[1]), epsilon = 1e-4);
        // base + contributions reproduce the prediction
        let pred = est.predict(&foreground.rows).unwrap()[0];
        let total: f64 = raw.values[0][0].iter().sum();
        assert_relative_eq!(raw.base_values[0][0] + total, pred, epsilon = 1e-4);
    }

    #[test]
    fn permutation_engine_matches_linear_engine_on_linear_model() {
        let est = fitted_linear();
        let model = TargetModel::Single(&est);
        let background = backgrounds();
        let foreground = make_matrix(vec![vec![3.0, 2.0]], 2);

        let exact = linear_explain(&model, &background, &foreground).unwrap();
        let options = EngineOptions::default().with_n_permutations(2).with_seed(11);
        let approx_ = permutation_explain(&model, &background, &foreground, &options).unwrap();

        // For additive models every ordering gives the same marginal, so
        // even few permutations are exact.
        assert_relative_eq!(approx_.values[0][0][0], exact.values[0][0][0], epsilon = 1e-6);
        assert_relative_eq!(approx_.values[0][0][1], exact.values[0][0][1], epsilon = 1e-6);
        assert_relative_eq!(approx_.base_values[0][0], exact.base_values[0][0], epsilon = 1e-6);
    }

    #[test]
    fn kernel_engine_matches_linear_engine_on_linear_model() {
        let est = fitted_linear();
        let model = TargetModel::Single(&est);
        let background = backgrounds();
        let foreground = make_matrix(vec![vec![1.0, 3.0]], 2);

        let exact = linear_explain(&model, &background, &foreground).unwrap();
        let options = EngineOptions::default().with_seed(5);
        let kernel = kernel_explain(&model, &background, &foreground, &options).unwrap();

        assert_relative_eq!(kernel.values[0][0][0], exact.values[0][0][0], epsilon = 1e-5);
        assert_relative_eq!(kernel.values[0][0][1], exact.values[0][0][1], epsilon = 1e-5);
    }

    #[test]
    fn additive_engine_matches_linear_engine_on_linear_model() {
        let est = fitted_linear();
        let model = TargetModel::Single(&est);
        let background = backgrounds();
        let foreground = make_matrix(vec![vec![2.0, 1.0]], 2);

        let exact = linear_explain(&model, &background, &foreground).unwrap();
        let additive = additive_explain(&model, &background, &foreground).unwrap();

        assert_relative_eq!(additive.values[0][0][0], exact.values[0][0][0], epsilon = 1e-5);
        assert_relative_eq!(additive.values[0][0][1], exact.values[0][0][1], epsilon = 1e-5);
    }

    #[test]
    fn tree_engine_additivity_holds_for_both_perturbations() {
        let x: Vec<Vec<f64>> = (0..40).map(|i| vec![i as f64, (i % 3) as f64]).collect();
        let y: Vec<f64> = x.iter().map(|r| if r[0] < 20.0 { 1.0 } else { 5.0 }).collect();
        let mut tree = RegressionTree::new(3);
        tree.fit(&x, &y).unwrap();

        let model = TargetModel::Single(&tree);
        let background = make_matrix(x[..15].to_vec(), 2);
        let foreground = make_matrix(vec![vec![30.0, 1.0]], 2);
        let pred = tree.predict(&foreground.rows).unwrap()[0];

        for perturbation in [
            FeaturePerturbation::TreePathDependent,
            FeaturePerturbation::Interventional,
        ] {
            let options = EngineOptions::default().with_feature_perturbation(perturbation);
            let raw = tree_explain(&model, &background, &foreground, &options).unwrap();
            let total: f64 = raw.values[0][0].iter().sum();
            assert_relative_eq!(raw.base_values[0][0] + total, pred, epsilon = 1e-9);
        }
    }

    #[test]
    fn tree_engine_requires_path_contributions() {
        let est = fitted_linear();
        let model = TargetModel::Single(&est);
        let background = backgrounds();
        let foreground = make_matrix(vec![vec![1.0, 1.0]], 2);

        let options = EngineOptions::default();
        let result = tree_explain(&model, &background, &foreground, &options);
        assert!(matches!(
            result,
            Err(ShapcastError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn kernel_weight_is_symmetric() {
        assert_relative_eq!(kernel_weight(5, 1), kernel_weight(5, 4), epsilon = 1e-12);
        assert_relative_eq!(kernel_weight(5, 2), kernel_weight(5, 3), epsilon = 1e-12);
        assert!(kernel_weight(5, 1) > kernel_weight(5, 2));
    }
}
