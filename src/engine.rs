//! The rebalancing engine.
//!
//! A [`Portfolio`] is built from a validated model and then driven through
//! its derivation stages in order:
//!
//! 1. current values ([`Portfolio::set_current_values`] or
//!    [`Portfolio::prompt_current_values`])
//! 2. [`Portfolio::calc_current_mix`]
//! 3. [`Portfolio::calc_delta_to_target`], which runs
//!    [`Portfolio::calc_final_mix`] before labelling actions
//!
//! Each stage computes its columns on the side and only writes them back
//! once its consistency check has passed.

use log::{debug, error, info, warn};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::Serialize;

use crate::config::{EngineConfig, is_close};
use crate::error::{Error, Result, Warning};
use crate::model::TargetModel;
use crate::prompt::ValuePrompt;
use crate::report::{ActionsReport, FullReport};
use crate::request::{Amount, RebalanceRequest};
use crate::types::{Action, AssetRecord};

/// Per-invocation record table plus portfolio-wide aggregates.
#[derive(Debug, Clone)]
pub struct Portfolio {
    config: EngineConfig,
    records: Vec<AssetRecord>,
    total_weight: f64,
    portfolio_value: Option<f64>,
    final_portfolio_value: Option<f64>,
    new_money: Option<f64>,
    warnings: Vec<Warning>,
}

impl Portfolio {
    /// Validate `weights` and build the record table in input order.
    pub fn new<I, S>(weights: I, config: EngineConfig) -> Result<Self>
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        config.validate()?;
        let model = TargetModel::new(weights, &config.tolerance)?;
        Ok(Self::from_model(&model, config))
    }

    /// Build from an already validated model.
    pub fn from_model(model: &TargetModel, config: EngineConfig) -> Self {
        let records = model
            .weights()
            .iter()
            .map(|(asset, weight)| AssetRecord::new(asset.clone(), *weight))
            .collect();
        Self {
            config,
            records,
            total_weight: model.total_weight(),
            portfolio_value: None,
            final_portfolio_value: None,
            new_money: None,
            warnings: Vec::new(),
        }
    }

    // === Queries ===

    pub fn records(&self) -> &[AssetRecord] {
        &self.records
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Validated sum of the model weights.
    pub fn total_weight(&self) -> f64 {
        self.total_weight
    }

    /// Sum of current values, once they are set.
    pub fn portfolio_value(&self) -> Option<f64> {
        self.portfolio_value
    }

    /// Sum of final values, once the final mix is computed.
    pub fn final_portfolio_value(&self) -> Option<f64> {
        self.final_portfolio_value
    }

    /// New money used by the delta stage (0 when none was given).
    pub fn new_money(&self) -> Option<f64> {
        self.new_money
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    // === Current values ===

    /// Take current values from a caller-supplied mapping.
    ///
    /// Assets the mapping does not mention are valued at $0 and a
    /// [`Warning::MissingValues`] is recorded; keys that are not in the
    /// model are ignored, whatever their type, and listed in the same warning.
    pub fn set_current_values<I, K, V>(&mut self, values: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Amount>,
    {
        let given: FxHashMap<String, Amount> = values
            .into_iter()
            .map(|(k, v)| (k.as_ref().to_string(), v.into()))
            .collect();

        let known: FxHashSet<&str> = self.records.iter().map(|r| r.asset.as_str()).collect();
        let missing: Vec<String> = self
            .records
            .iter()
            .filter(|r| !given.contains_key(&r.asset))
            .map(|r| r.asset.clone())
            .collect();
        let mut unknown: Vec<String> = given
            .keys()
            .filter(|k| !known.contains(k.as_str()))
            .cloned()
            .collect();
        unknown.sort();

        if given.len() != self.records.len() || !missing.is_empty() {
            let warning = Warning::MissingValues { missing, unknown };
            warn!("{warning}");
            self.warnings.push(warning);
        }

        let mut resolved = Vec::with_capacity(self.records.len());
        for record in &self.records {
            let value = match given.get(&record.asset) {
                None => 0.0,
                Some(Amount::Number(v)) if v.is_finite() => *v,
                Some(_) => {
                    return Err(fail(Error::InvalidCurrentValueType {
                        asset: record.asset.clone(),
                    }));
                }
            };
            resolved.push(value);
        }
        self.apply_current_values(resolved)
    }

    /// Ask `prompt` for one value per asset, in model order.
    pub fn prompt_current_values(&mut self, prompt: &mut dyn ValuePrompt) -> Result<()> {
        let mut resolved = Vec::with_capacity(self.records.len());
        for record in &self.records {
            let value = prompt
                .current_value(&record.asset)
                .map_err(|reason| Error::InvalidCurrentValue {
                    asset: record.asset.clone(),
                    reason,
                })
                .map_err(fail)?;
            if !value.is_finite() {
                return Err(fail(Error::InvalidCurrentValue {
                    asset: record.asset.clone(),
                    reason: format!("{value} is not a finite number"),
                }));
            }
            resolved.push(value);
        }
        self.apply_current_values(resolved)
    }

    fn apply_current_values(&mut self, resolved: Vec<f64>) -> Result<()> {
        if let Some((record, value)) = self
            .records
            .iter()
            .zip(&resolved)
            .find(|(_, v)| **v < 0.0)
        {
            return Err(fail(Error::NegativeCurrentValue {
                asset: record.asset.clone(),
                value: *value,
            }));
        }

        let mut portfolio_value: f64 = 0.0;
        for (record, value) in self.records.iter().zip(&resolved) {
            portfolio_value += *value;
            if !portfolio_value.is_finite() {
                return Err(fail(Error::InvalidCurrentValue {
                    asset: record.asset.clone(),
                    reason: "portfolio value overflows".into(),
                }));
            }
        }

        for (record, value) in self.records.iter_mut().zip(&resolved) {
            record.current_value = Some(*value);
        }
        debug!("Portfolio value: {portfolio_value}");
        self.portfolio_value = Some(portfolio_value);
        Ok(())
    }

    // === Derivations ===

    /// `CurrentMix = CurrentValue / PortfolioValue`.
    pub fn calc_current_mix(&mut self) -> Result<()> {
        let portfolio_value = self.portfolio_value.ok_or(Error::StageOrder(
            "current values must be set before computing the current mix",
        ))?;
        if portfolio_value == 0.0 {
            return Err(fail(Error::ZeroPortfolioValue {
                stage: "current mix",
            }));
        }

        let mixes: Vec<f64> = self
            .records
            .iter()
            .map(|r| r.current_value.unwrap_or(0.0) / portfolio_value)
            .collect();

        let sum: f64 = mixes.iter().sum();
        if !is_close(sum, 1.0, self.config.tolerance.mix_sum, 0.0) {
            return Err(fail(Error::CurrentMixSumMismatch { sum }));
        }

        for (record, mix) in self.records.iter_mut().zip(mixes) {
            record.current_mix = Some(mix);
        }
        Ok(())
    }

    /// Derive delta, dollar delta, new-money allocation and total per asset,
    /// then the final mix, then the Buy/Sell label.
    ///
    /// `new_money` of `None` means 0.
    pub fn calc_delta_to_target(&mut self, new_money: Option<f64>) -> Result<()> {
        let new_money = check_new_money(new_money.unwrap_or(0.0))?;

        let portfolio_value = self.portfolio_value.ok_or(Error::StageOrder(
            "current values must be set before computing the delta to target",
        ))?;
        if self.records.iter().any(|r| r.current_mix.is_none()) {
            return Err(Error::StageOrder(
                "current mix must be computed before the delta to target",
            ));
        }

        let mut staged = self.records.clone();
        for record in &mut staged {
            let current_mix = record.current_mix.unwrap_or(0.0);
            let delta = record.weight - current_mix;
            let abs_delta = delta * portfolio_value;
            let allocation = record.weight * new_money;
            record.delta_to_target = Some(delta);
            record.abs_delta_to_target = Some(abs_delta);
            record.new_money_allocation = Some(allocation);
            record.total = Some(abs_delta + allocation);
        }

        let (staged, final_portfolio_value) = self.derive_final_mix(staged)?;
        self.records = staged;
        self.final_portfolio_value = Some(final_portfolio_value);
        self.new_money = Some(new_money);

        for record in &mut self.records {
            record.action = record.total.map(Action::from_total);
        }
        Ok(())
    }

    /// `FinalValue = CurrentValue + Total`, `FinalMix = FinalValue / Σ FinalValue`,
    /// checked against the mix-sum and per-asset drift tolerances.
    pub fn calc_final_mix(&mut self) -> Result<()> {
        let (staged, final_portfolio_value) = self.derive_final_mix(self.records.clone())?;
        self.records = staged;
        self.final_portfolio_value = Some(final_portfolio_value);
        Ok(())
    }

    fn derive_final_mix(
        &self,
        mut staged: Vec<AssetRecord>,
    ) -> Result<(Vec<AssetRecord>, f64)> {
        if staged
            .iter()
            .any(|r| r.current_value.is_none() || r.total.is_none())
        {
            return Err(Error::StageOrder(
                "totals must be computed before the final mix",
            ));
        }

        for record in &mut staged {
            let current = record.current_value.unwrap_or(0.0);
            record.final_value = record.total.map(|total| current + total);
        }
        let final_portfolio_value: f64 = staged.iter().filter_map(|r| r.final_value).sum();
        if final_portfolio_value == 0.0 || !final_portfolio_value.is_finite() {
            return Err(fail(Error::ZeroPortfolioValue { stage: "final mix" }));
        }

        for record in &mut staged {
            record.final_mix = record.final_value.map(|v| v / final_portfolio_value);
        }

        let tol = &self.config.tolerance;
        let sum: f64 = staged.iter().filter_map(|r| r.final_mix).sum();
        if !is_close(sum, 1.0, tol.mix_sum, 0.0) {
            return Err(fail(Error::FinalMixSumMismatch { sum }));
        }

        for record in &staged {
            let final_mix = record.final_mix.unwrap_or(0.0);
            if (final_mix - record.weight).abs() > tol.drift {
                return Err(fail(Error::TargetDriftExceeded {
                    asset: record.asset.clone(),
                    final_mix,
                    weight: record.weight,
                    tolerance: tol.drift,
                }));
            }
        }

        Ok((staged, final_portfolio_value))
    }

    /// Consume the engine into its output.
    pub fn into_rebalance(self) -> Rebalance {
        Rebalance {
            records: self.records,
            warnings: self.warnings,
            portfolio_value: self.portfolio_value.unwrap_or(0.0),
            new_money: self.new_money.unwrap_or(0.0),
            final_portfolio_value: self.final_portfolio_value.unwrap_or(0.0),
        }
    }
}

/// Resolve an optional new-money amount: `None` is 0, anything else must be
/// a finite, non-negative number.
pub fn validate_new_money(new_money: Option<&Amount>) -> Result<f64> {
    match new_money {
        None => Ok(0.0),
        Some(Amount::Number(amount)) => check_new_money(*amount),
        Some(Amount::Invalid(raw)) => Err(fail(Error::InvalidNewMoneyType(raw.clone()))),
    }
}

fn check_new_money(amount: f64) -> Result<f64> {
    if !amount.is_finite() {
        return Err(fail(Error::InvalidNewMoneyType(amount.to_string())));
    }
    if amount < 0.0 {
        return Err(fail(Error::NegativeNewMoney(amount)));
    }
    Ok(amount)
}

fn fail(e: Error) -> Error {
    error!("{e}");
    e
}

/// Finished output of one rebalancing run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rebalance {
    pub records: Vec<AssetRecord>,
    pub warnings: Vec<Warning>,
    pub portfolio_value: f64,
    pub new_money: f64,
    pub final_portfolio_value: f64,
}

impl Rebalance {
    /// Records whose action is `Buy`.
    pub fn buys(&self) -> impl Iterator<Item = &AssetRecord> {
        self.records
            .iter()
            .filter(|r| r.action == Some(Action::Buy))
    }

    /// Records whose action is `Sell`.
    pub fn sells(&self) -> impl Iterator<Item = &AssetRecord> {
        self.records
            .iter()
            .filter(|r| r.action == Some(Action::Sell))
    }

    pub fn record(&self, asset: &str) -> Option<&AssetRecord> {
        self.records.iter().find(|r| r.asset == asset)
    }

    /// The record table as a JSON array, one object per asset.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.records)
    }
}

/// Run the whole pipeline for one request.
///
/// When the request carries no current values, `prompt` is asked for each
/// asset; without a prompt the run fails on the first asset.
pub fn rebalance(
    request: &RebalanceRequest,
    config: EngineConfig,
    prompt: Option<&mut dyn ValuePrompt>,
) -> Result<Rebalance> {
    let debug_table = config.debug;
    let mut portfolio = Portfolio::new(request.model.iter().map(|(a, w)| (a.as_str(), *w)), config)?;

    match (&request.values, prompt) {
        (Some(values), _) => {
            portfolio.set_current_values(values.iter().map(|(a, v)| (a.as_str(), v.clone())))?
        }
        (None, Some(prompt)) => portfolio.prompt_current_values(prompt)?,
        (None, None) => {
            let asset = portfolio
                .records()
                .first()
                .map(|r| r.asset.clone())
                .unwrap_or_default();
            return Err(fail(Error::InvalidCurrentValue {
                asset,
                reason: "no current values given and no prompt available".into(),
            }));
        }
    }

    portfolio.calc_current_mix()?;
    let new_money = validate_new_money(request.new_money.as_ref())?;
    portfolio.calc_delta_to_target(Some(new_money))?;

    info!("\n{}", ActionsReport(portfolio.records()));
    if debug_table {
        debug!("\n{}", FullReport(portfolio.records()));
    }

    Ok(portfolio.into_rebalance())
}
