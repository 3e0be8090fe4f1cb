//! Engine configuration: tolerance thresholds and the debug flag.

use serde::Deserialize;

use crate::error::{Error, Result};

/// Settings passed explicitly into each engine instance.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub tolerance: Tolerances,
    /// Log the full record table after each run.
    #[serde(default)]
    pub debug: bool,
}

/// Tolerance thresholds for the consistency checks.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Tolerances {
    /// Absolute and relative tolerance on the model's weight sum.
    #[serde(default = "default_weight_sum")]
    pub weight_sum: f64,
    /// Relative tolerance on the CurrentMix and FinalMix sums.
    #[serde(default = "default_mix_sum")]
    pub mix_sum: f64,
    /// Max per-asset distance between FinalMix and target weight.
    #[serde(default = "default_drift")]
    pub drift: f64,
}

fn default_weight_sum() -> f64 {
    1e-9
}
fn default_mix_sum() -> f64 {
    0.01
}
fn default_drift() -> f64 {
    0.01
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            weight_sum: default_weight_sum(),
            mix_sum: default_mix_sum(),
            drift: default_drift(),
        }
    }
}

impl EngineConfig {
    /// Validate config invariants.
    pub fn validate(&self) -> Result<()> {
        let t = &self.tolerance;
        for (name, value) in [
            ("weight_sum", t.weight_sum),
            ("mix_sum", t.mix_sum),
            ("drift", t.drift),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(Error::InvalidConfig(format!(
                    "tolerance.{name} must be finite and > 0, got {value}"
                )));
            }
        }
        Ok(())
    }
}

/// `|a - b| <= max(rel_tol * max(|a|, |b|), abs_tol)`
pub(crate) fn is_close(a: f64, b: f64, rel_tol: f64, abs_tol: f64) -> bool {
    if a == b {
        return true;
    }
    if !a.is_finite() || !b.is_finite() {
        return false;
    }
    let diff = (a - b).abs();
    diff <= (rel_tol * a.abs().max(b.abs())).max(abs_tol)
}
