//! Core types: Action, AssetRecord

use std::fmt;

use serde::Serialize;

/// Direction of the cash movement required for an asset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Action {
    Buy,
    Sell,
}

impl Action {
    /// `Buy` only for a strictly positive total. A total of exactly zero
    /// is labelled `Sell`.
    pub fn from_total(total: f64) -> Self {
        if total > 0.0 { Action::Buy } else { Action::Sell }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Buy => write!(f, "Buy"),
            Action::Sell => write!(f, "Sell"),
        }
    }
}

/// One row of the rebalancing table.
///
/// `asset` and `weight` come from the model and `current_value` from the
/// caller. Every other field is derived from portfolio-wide sums and stays
/// `None` until its stage has run.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct AssetRecord {
    pub asset: String,
    pub weight: f64,
    pub current_value: Option<f64>,
    pub current_mix: Option<f64>,
    pub delta_to_target: Option<f64>,
    pub abs_delta_to_target: Option<f64>,
    pub new_money_allocation: Option<f64>,
    pub total: Option<f64>,
    pub final_value: Option<f64>,
    pub final_mix: Option<f64>,
    pub action: Option<Action>,
}

impl AssetRecord {
    pub(crate) fn new(asset: impl Into<String>, weight: f64) -> Self {
        Self {
            asset: asset.into(),
            weight,
            current_value: None,
            current_mix: None,
            delta_to_target: None,
            abs_delta_to_target: None,
            new_money_allocation: None,
            total: None,
            final_value: None,
            final_mix: None,
            action: None,
        }
    }

    /// True once every derivation stage has filled this row.
    pub fn is_complete(&self) -> bool {
        self.current_value.is_some()
            && self.current_mix.is_some()
            && self.total.is_some()
            && self.final_mix.is_some()
            && self.action.is_some()
    }

    /// Absolute dollar amount to trade, regardless of direction.
    pub fn trade_amount(&self) -> Option<f64> {
        self.total.map(f64::abs)
    }
}
