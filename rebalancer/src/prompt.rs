//! Terminal prompt for current values, backed by dialoguer.

use allocbook::ValuePrompt;

/// Asks on the terminal for each asset's current dollar value.
///
/// Input is re-requested until it parses as a finite, non-negative number;
/// a terminal error (e.g. closed stdin) is returned to the engine as an
/// unanswered asset.
#[derive(Debug, Default)]
pub struct TerminalPrompt;

impl ValuePrompt for TerminalPrompt {
    fn current_value(&mut self, asset: &str) -> Result<f64, String> {
        dialoguer::Input::<f64>::new()
            .with_prompt(format!("Enter the current value for asset '{asset}'"))
            .validate_with(|v: &f64| validate_amount(*v))
            .interact_text()
            .map_err(|e| e.to_string())
    }
}

fn validate_amount(v: f64) -> Result<(), String> {
    if !v.is_finite() {
        return Err("value must be a finite number".into());
    }
    if v < 0.0 {
        return Err("value must be 0 or more".into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amount_validation() {
        assert!(validate_amount(0.0).is_ok());
        assert!(validate_amount(1234.5).is_ok());
        assert!(validate_amount(-1.0).is_err());
        assert!(validate_amount(f64::INFINITY).is_err());
        assert!(validate_amount(f64::NAN).is_err());
    }
}
