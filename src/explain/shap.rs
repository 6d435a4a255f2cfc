//! SHAP explanation orchestrator for fitted regression models.
//!
//! Owns the background dataset, validates horizon and target arguments,
//! and converts raw explanation arrays back into [`TimeSeries`] keyed by
//! horizon then target component.

use crate::core::TimeSeries;
use crate::error::{Result, ShapcastError};
use crate::explain::dispatch::RegressionExplainers;
use crate::explain::engine::EngineOptions;
use crate::explain::matrix::{build_feature_matrix, FeatureMatrix};
use crate::explain::method::ShapMethod;
use crate::models::RegressionModel;
use std::collections::BTreeMap;
use tracing::debug;

/// A foreground to explain: target series plus whatever covariates the
/// model was trained with.
#[derive(Clone, Copy)]
pub struct Foreground<'a> {
    pub target: &'a TimeSeries,
    pub past_covariates: Option<&'a TimeSeries>,
    pub future_covariates: Option<&'a TimeSeries>,
}

impl<'a> Foreground<'a> {
    pub fn new(target: &'a TimeSeries) -> Self {
        Self {
            target,
            past_covariates: None,
            future_covariates: None,
        }
    }

    pub fn with_past_covariates(mut self, past: &'a TimeSeries) -> Self {
        self.past_covariates = Some(past);
        self
    }

    pub fn with_future_covariates(mut self, future: &'a TimeSeries) -> Self {
        self.future_covariates = Some(future);
        self
    }
}

/// Configuration for [`ShapExplainer`] construction.
///
/// Background series default to the model's training data; an explicit
/// method name overrides the family-based selection policy.
#[derive(Debug, Clone, Default)]
pub struct ShapConfig {
    background: Option<TimeSeries>,
    background_past: Option<TimeSeries>,
    background_future: Option<TimeSeries>,
    background_nb_samples: Option<usize>,
    shap_method: Option<String>,
    engine: EngineOptions,
}

impl ShapConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Explicit background target series instead of the training series.
    pub fn with_background(mut self, background: TimeSeries) -> Self {
        self.background = Some(background);
        self
    }

    pub fn with_background_past_covariates(mut self, past: TimeSeries) -> Self {
        self.background_past = Some(past);
        self
    }

    pub fn with_background_future_covariates(mut self, future: TimeSeries) -> Self {
        self.background_future = Some(future);
        self
    }

    /// Sub-sample the background matrix down to `count` rows.
    pub fn with_background_nb_samples(mut self, count: usize) -> Self {
        self.background_nb_samples = Some(count);
        self
    }

    /// Explicit method name, resolved case-insensitively at construction.
    pub fn with_shap_method(mut self, method: &str) -> Self {
        self.shap_method = Some(method.to_string());
        self
    }

    pub fn with_engine(mut self, engine: EngineOptions) -> Self {
        self.engine = engine;
        self
    }
}

/// SHAP values for one (horizon, target component) pair.
#[derive(Debug, Clone)]
pub struct TargetExplanation {
    /// Per-timestamp feature contributions; components are feature names.
    pub contributions: TimeSeries,
    /// One base value per explained timestamp.
    pub base_values: Vec<f64>,
}

/// Explanations keyed by horizon (0-based), then by target component name.
#[derive(Debug, Clone, Default)]
pub struct ShapExplanation {
    entries: BTreeMap<usize, BTreeMap<String, TargetExplanation>>,
}

impl ShapExplanation {
    /// The explanation for one (horizon, target) pair, if requested.
    pub fn get(&self, horizon: usize, target: &str) -> Option<&TargetExplanation> {
        self.entries.get(&horizon).and_then(|m| m.get(target))
    }

    /// Explained horizons, ascending.
    pub fn horizons(&self) -> Vec<usize> {
        self.entries.keys().copied().collect()
    }

    /// Target names explained at one horizon.
    pub fn targets(&self, horizon: usize) -> Vec<&str> {
        self.entries
            .get(&horizon)
            .map(|m| m.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Iterate over all (horizon, target, explanation) entries.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &str, &TargetExplanation)> {
        self.entries.iter().flat_map(|(&h, targets)| {
            targets.iter().map(move |(name, e)| (h, name.as_str(), e))
        })
    }
}

/// Mean absolute SHAP value of one feature.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureImportance {
    pub feature: String,
    pub importance: f64,
}

/// Per-timestamp additive decomposition of predictions.
#[derive(Debug, Clone)]
pub struct ForceValues {
    /// One base value per timestamp.
    pub base_values: Vec<f64>,
    /// Per-timestamp feature contributions; components are feature names.
    pub contributions: TimeSeries,
    /// Reconstructed predictions: base plus summed contributions.
    pub predictions: Vec<f64>,
}

/// SHAP explanation orchestrator over a fitted [`RegressionModel`].
pub struct ShapExplainer<'m> {
    model: &'m RegressionModel,
    explainers: RegressionExplainers<'m>,
    background_target: TimeSeries,
    background_past: Option<TimeSeries>,
    background_future: Option<TimeSeries>,
    seed: Option<u64>,
}

impl<'m> ShapExplainer<'m> {
    /// Build an explainer for a fitted model. Fails with an invalid-model
    /// error on unfitted models and an invalid-configuration error on
    /// unrecognized method names; background construction enforces the
    /// minimum background row count.
    pub fn new(model: &'m RegressionModel, config: ShapConfig) -> Result<Self> {
        if !model.is_fitted() {
            return Err(ShapcastError::InvalidModel(
                "model must be fitted before it can be explained".to_string(),
            ));
        }
        let method = config
            .shap_method
            .as_deref()
            .map(str::parse::<ShapMethod>)
            .transpose()?;

        let background_target = config
            .background
            .clone()
            .or_else(|| model.training_target().cloned())
            .ok_or(ShapcastError::FitRequired)?;
        let background_past = config
            .background_past
            .clone()
            .or_else(|| model.training_past().cloned());
        let background_future = config
            .background_future
            .clone()
            .or_else(|| model.training_future().cloned());

        let background = build_feature_matrix(
            model,
            &background_target,
            background_past.as_ref(),
            background_future.as_ref(),
            true,
            config.background_nb_samples,
            config.engine.seed,
        )?;
        debug!(
            rows = background.n_rows(),
            columns = background.n_columns(),
            "built shap background matrix"
        );

        let seed = config.engine.seed;
        let explainers = RegressionExplainers::new(model, background, method, &config.engine)?;
        Ok(Self {
            model,
            explainers,
            background_target,
            background_past,
            background_future,
            seed,
        })
    }

    /// Explain the background series itself over the requested horizons
    /// and target components (all of them when omitted). The foreground is
    /// the full background series; background sub-sampling only shrinks
    /// the baseline matrix.
    pub fn explain(
        &self,
        horizons: Option<&[usize]>,
        target_components: Option<&[&str]>,
    ) -> Result<ShapExplanation> {
        let foreground = build_feature_matrix(
            self.model,
            &self.background_target,
            self.background_past.as_ref(),
            self.background_future.as_ref(),
            false,
            None,
            None,
        )?;
        self.explain_matrix(&foreground, horizons, target_components)
    }

    /// Explain one foreground series.
    pub fn explain_foreground(
        &self,
        foreground: Foreground<'_>,
        horizons: Option<&[usize]>,
        target_components: Option<&[&str]>,
    ) -> Result<ShapExplanation> {
        let matrix = self.foreground_matrix(foreground)?;
        self.explain_matrix(&matrix, horizons, target_components)
    }

    /// Explain several foreground series, one explanation per series.
    pub fn explain_all(
        &self,
        foregrounds: &[Foreground<'_>],
        horizons: Option<&[usize]>,
        target_components: Option<&[&str]>,
    ) -> Result<Vec<ShapExplanation>> {
        foregrounds
            .iter()
            .map(|fg| self.explain_foreground(*fg, horizons, target_components))
            .collect()
    }

    /// Mean absolute SHAP value per feature for one (horizon, target) pair
    /// over the background (optionally sub-sampled), sorted descending.
    pub fn summary_values(
        &self,
        horizon: usize,
        target_component: &str,
        nb_samples: Option<usize>,
    ) -> Result<Vec<FeatureImportance>> {
        let horizons = self.resolve_horizons(Some(&[horizon]))?;
        let (indices, _) = self.resolve_targets(Some(&[target_component]))?;

        let foreground = match nb_samples {
            Some(count) => self.explainers.background.sample(count, self.seed),
            None => self.explainers.background.clone(),
        };
        let entries = self
            .explainers
            .shap_explanations(&foreground, &horizons, &indices)?;
        let (_, _, explanation) = entries
            .into_iter()
            .next()
            .ok_or(ShapcastError::EmptyData)?;

        let n_rows = explanation.values.len().max(1);
        let mut importances: Vec<FeatureImportance> = explanation
            .feature_names
            .iter()
            .enumerate()
            .map(|(j, feature)| FeatureImportance {
                feature: feature.clone(),
                importance: explanation
                    .values
                    .iter()
                    .map(|row| row[j].abs())
                    .sum::<f64>()
                    / n_rows as f64,
            })
            .collect();
        importances.sort_by(|a, b| {
            b.importance
                .partial_cmp(&a.importance)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        Ok(importances)
    }

    /// Per-timestamp additive decomposition for one (horizon, target) pair:
    /// base values, contributions, and the reconstructed predictions.
    pub fn force_values(
        &self,
        foreground: Foreground<'_>,
        horizon: usize,
        target_component: &str,
    ) -> Result<ForceValues> {
        let horizons = self.resolve_horizons(Some(&[horizon]))?;
        let (indices, _) = self.resolve_targets(Some(&[target_component]))?;

        let matrix = self.foreground_matrix(foreground)?;
        let entries = self
            .explainers
            .shap_explanations(&matrix, &horizons, &indices)?;
        let (_, _, explanation) = entries
            .into_iter()
            .next()
            .ok_or(ShapcastError::EmptyData)?;

        let predictions: Vec<f64> = explanation
            .values
            .iter()
            .zip(explanation.base_values.iter())
            .map(|(row, base)| base + row.iter().sum::<f64>())
            .collect();
        let contributions = TimeSeries::from_times_and_values(
            explanation.time_index.clone(),
            &explanation.values,
            explanation.feature_names.clone(),
        )?;
        Ok(ForceValues {
            base_values: explanation.base_values,
            contributions,
            predictions,
        })
    }

    fn foreground_matrix(&self, foreground: Foreground<'_>) -> Result<FeatureMatrix> {
        build_feature_matrix(
            self.model,
            foreground.target,
            foreground.past_covariates,
            foreground.future_covariates,
            false,
            None,
            None,
        )
    }

    fn explain_matrix(
        &self,
        foreground: &FeatureMatrix,
        horizons: Option<&[usize]>,
        target_components: Option<&[&str]>,
    ) -> Result<ShapExplanation> {
        let horizons = self.resolve_horizons(horizons)?;
        let (indices, names) = self.resolve_targets(target_components)?;

        let entries = self
            .explainers
            .shap_explanations(foreground, &horizons, &indices)?;

        let mut result = ShapExplanation::default();
        for (h, t, explanation) in entries {
            let name = names
                .iter()
                .zip(indices.iter())
                .find(|(_, &idx)| idx == t)
                .map(|(name, _)| name.clone())
                .ok_or(ShapcastError::IndexOutOfBounds {
                    index: t,
                    size: names.len(),
                })?;
            let contributions = TimeSeries::from_times_and_values(
                explanation.time_index.clone(),
                &explanation.values,
                explanation.feature_names.clone(),
            )?;
            result.entries.entry(h).or_default().insert(
                name,
                TargetExplanation {
                    contributions,
                    base_values: explanation.base_values,
                },
            );
        }
        Ok(result)
    }

    /// Validate requested horizons against `[0, output_chunk_length - 1]`,
    /// defaulting to all horizons.
    fn resolve_horizons(&self, horizons: Option<&[usize]>) -> Result<Vec<usize>> {
        let n = self.model.output_chunk_length();
        match horizons {
            None => Ok((0..n).collect()),
            Some(requested) => {
                for &h in requested {
                    if h >= n {
                        return Err(ShapcastError::InvalidArgument(format!(
                            "horizon {h} outside [0, {}]",
                            n - 1
                        )));
                    }
                }
                Ok(requested.to_vec())
            }
        }
    }

    /// Validate requested target names against the model's components,
    /// defaulting to all of them. Returns component indices and names.
    fn resolve_targets(
        &self,
        target_components: Option<&[&str]>,
    ) -> Result<(Vec<usize>, Vec<String>)> {
        let known = self.model.target_components();
        match target_components {
            None => Ok((
                (0..known.len()).collect(),
                known.to_vec(),
            )),
            Some(requested) => {
                let mut indices = Vec::with_capacity(requested.len());
                let mut names = Vec::with_capacity(requested.len());
                for &name in requested {
                    let idx = known.iter().position(|c| c == name).ok_or_else(|| {
                        ShapcastError::InvalidArgument(format!(
                            "unknown target component `{name}`; known components: {}",
                            known.join(", ")
                        ))
                    })?;
                    indices.push(idx);
                    names.push(name.to_string());
                }
                Ok((indices, names))
            }
        }
    }
}
