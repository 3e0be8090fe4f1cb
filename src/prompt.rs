//! Injectable source of current values for the interactive path.
//!
//! The engine never touches stdin itself: when the caller has no value
//! mapping it hands in a [`ValuePrompt`], and the engine asks it once per
//! asset, in model order.

use std::collections::VecDeque;

/// Supplies "the current value for asset X".
///
/// Returning `Err` with a reason means the asset could not be answered.
/// The engine rejects non-finite answers itself.
pub trait ValuePrompt {
    fn current_value(&mut self, asset: &str) -> std::result::Result<f64, String>;
}

impl<F> ValuePrompt for F
where
    F: FnMut(&str) -> std::result::Result<f64, String>,
{
    fn current_value(&mut self, asset: &str) -> std::result::Result<f64, String> {
        self(asset)
    }
}

/// Pre-recorded answers, handed out in order. Useful for tests and for
/// replaying a session non-interactively.
#[derive(Debug, Clone, Default)]
pub struct ScriptedValues {
    answers: VecDeque<f64>,
    asked: Vec<String>,
}

impl ScriptedValues {
    pub fn new(answers: impl IntoIterator<Item = f64>) -> Self {
        Self {
            answers: answers.into_iter().collect(),
            asked: Vec::new(),
        }
    }

    /// Assets asked for so far.
    pub fn asked(&self) -> &[String] {
        &self.asked
    }
}

impl ValuePrompt for ScriptedValues {
    fn current_value(&mut self, asset: &str) -> std::result::Result<f64, String> {
        self.asked.push(asset.to_string());
        self.answers
            .pop_front()
            .ok_or_else(|| "no answer left".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scripted_values_in_order() {
        let mut p = ScriptedValues::new([1.0, 2.0]);
        assert_eq!(p.current_value("A"), Ok(1.0));
        assert_eq!(p.current_value("B"), Ok(2.0));
        assert!(p.current_value("C").is_err());
        assert_eq!(p.asked(), ["A", "B", "C"]);
    }

    #[test]
    fn closure_is_a_prompt() {
        let mut p = |asset: &str| -> std::result::Result<f64, String> {
            if asset == "A" { Ok(10.0) } else { Err("unknown".into()) }
        };
        assert_eq!(p.current_value("A"), Ok(10.0));
        assert!(p.current_value("B").is_err());
    }
}
