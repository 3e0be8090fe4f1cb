//! Plain-text renderings of the record table.

use std::fmt;

use crate::types::AssetRecord;

/// The operator view: what to buy or sell and how much.
pub struct ActionsReport<'a>(pub &'a [AssetRecord]);

/// Every column, for debugging a run.
pub struct FullReport<'a>(pub &'a [AssetRecord]);

fn money(v: Option<f64>) -> String {
    v.map(|v| format!("{v:.2}")).unwrap_or_else(|| "-".into())
}

fn ratio(v: Option<f64>) -> String {
    v.map(|v| format!("{v:.4}")).unwrap_or_else(|| "-".into())
}

fn asset_width(records: &[AssetRecord]) -> usize {
    records
        .iter()
        .map(|r| r.asset.len())
        .max()
        .unwrap_or(0)
        .max("Asset".len())
}

impl fmt::Display for ActionsReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let w = asset_width(self.0);
        writeln!(
            f,
            "{:<w$}  {:>8} {:>14} {:>10} {:>14}  {}",
            "Asset", "Weight", "CurrentValue", "CurrentMix", "Total", "Action"
        )?;
        for r in self.0 {
            writeln!(
                f,
                "{:<w$}  {:>8.4} {:>14} {:>10} {:>14}  {}",
                r.asset,
                r.weight,
                money(r.current_value),
                ratio(r.current_mix),
                money(r.total),
                r.action.map(|a| a.to_string()).unwrap_or_else(|| "-".into()),
            )?;
        }
        Ok(())
    }
}

impl fmt::Display for FullReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let w = asset_width(self.0);
        writeln!(
            f,
            "{:<w$}  {:>8} {:>14} {:>10} {:>13} {:>16} {:>18} {:>14} {:>14} {:>8}  {}",
            "Asset",
            "Weight",
            "CurrentValue",
            "CurrentMix",
            "DeltaToTarget",
            "AbsDeltaToTarget",
            "NewMoneyAllocation",
            "Total",
            "FinalValue",
            "FinalMix",
            "Action",
        )?;
        for r in self.0 {
            writeln!(
                f,
                "{:<w$}  {:>8.4} {:>14} {:>10} {:>13} {:>16} {:>18} {:>14} {:>14} {:>8}  {}",
                r.asset,
                r.weight,
                money(r.current_value),
                ratio(r.current_mix),
                ratio(r.delta_to_target),
                money(r.abs_delta_to_target),
                money(r.new_money_allocation),
                money(r.total),
                money(r.final_value),
                ratio(r.final_mix),
                r.action.map(|a| a.to_string()).unwrap_or_else(|| "-".into()),
            )?;
        }
        Ok(())
    }
}
