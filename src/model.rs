//! Target model (asset → weight) validation.

use log::{error, info};
use rustc_hash::FxHashSet;

use crate::config::Tolerances;
use crate::error::{Error, Result};

/// A validated target allocation in insertion order.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetModel {
    weights: Vec<(String, f64)>,
    total_weight: f64,
}

impl TargetModel {
    /// Validate `(asset, weight)` pairs against `tolerance.weight_sum`.
    ///
    /// Order is preserved. Weights may be negative as long as they are
    /// finite and the total lands on 1.
    pub fn new<I, S>(weights: I, tolerance: &Tolerances) -> Result<Self>
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        let weights: Vec<(String, f64)> = weights
            .into_iter()
            .map(|(asset, weight)| (asset.into(), weight))
            .collect();

        if weights.is_empty() {
            return Err(log_err(Error::InvalidModelType(
                "model should be a non-empty mapping of asset to weight".into(),
            )));
        }

        let mut seen = FxHashSet::default();
        for (asset, weight) in &weights {
            if asset.is_empty() {
                return Err(log_err(Error::InvalidModelType("empty asset id".into())));
            }
            if !seen.insert(asset.as_str()) {
                return Err(log_err(Error::InvalidModelType(format!(
                    "duplicate asset: {asset}"
                ))));
            }
            if !weight.is_finite() {
                return Err(log_err(Error::InvalidModelValue {
                    asset: asset.clone(),
                }));
            }
        }

        info!("Model weights:");
        for (asset, weight) in &weights {
            info!("  {asset}: {weight}");
        }

        let total_weight: f64 = weights.iter().map(|(_, w)| w).sum();
        info!("Sum of weights: {total_weight}");

        if !weight_sum_ok(total_weight, tolerance.weight_sum) {
            return Err(log_err(Error::WeightSumMismatch {
                total: total_weight,
            }));
        }

        Ok(Self {
            weights,
            total_weight,
        })
    }

    pub fn weights(&self) -> &[(String, f64)] {
        &self.weights
    }

    pub fn total_weight(&self) -> f64 {
        self.total_weight
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    pub fn assets(&self) -> impl Iterator<Item = &str> {
        self.weights.iter().map(|(a, _)| a.as_str())
    }
}

/// Exceeding either the absolute or the relative bound is a mismatch.
fn weight_sum_ok(total: f64, tol: f64) -> bool {
    let diff = (total - 1.0).abs();
    diff <= tol && diff <= tol * total.abs().max(1.0)
}

fn log_err(e: Error) -> Error {
    error!("{e}");
    e
}
