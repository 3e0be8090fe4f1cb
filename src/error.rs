//! Validation and consistency errors raised by the rebalancing engine.

use std::fmt;

use serde::Serialize;

/// All failures the engine can surface. Every one aborts the remaining stages.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("invalid model: {0}")]
    InvalidModelType(String),

    #[error("invalid model: weight for '{asset}' should be a finite number")]
    InvalidModelValue { asset: String },

    #[error("sum of weights in the model not equal to 1. Total weight: {total}")]
    WeightSumMismatch { total: f64 },

    #[error("invalid current value for '{asset}': {reason}")]
    InvalidCurrentValue { asset: String, reason: String },

    #[error("invalid current values: value for '{asset}' should be a finite number")]
    InvalidCurrentValueType { asset: String },

    #[error("invalid current values: value for '{asset}' is {value}, all values should be 0 or more")]
    NegativeCurrentValue { asset: String, value: f64 },

    #[error("portfolio value is zero, cannot compute {stage}")]
    ZeroPortfolioValue { stage: &'static str },

    #[error("sum of CurrentMix is not close to 1 (within tolerance): {sum}")]
    CurrentMixSumMismatch { sum: f64 },

    #[error("sum of FinalMix is not close to 1 (within tolerance): {sum}")]
    FinalMixSumMismatch { sum: f64 },

    #[error("invalid type: new money should be a numeric type, got {0}")]
    InvalidNewMoneyType(String),

    #[error("invalid value: new money should be 0 or more, got {0}")]
    NegativeNewMoney(f64),

    #[error(
        "final mix for '{asset}' ({final_mix}) misses target weight {weight} by more than {tolerance}"
    )]
    TargetDriftExceeded {
        asset: String,
        final_mix: f64,
        weight: f64,
        tolerance: f64,
    },

    #[error("{0}")]
    StageOrder(&'static str),

    #[error("invalid engine config: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Machine-readable error category, stable across message wording changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    InvalidModelType,
    InvalidModelValue,
    WeightSumMismatch,
    InvalidCurrentValue,
    InvalidCurrentValueType,
    NegativeCurrentValue,
    ZeroPortfolioValue,
    CurrentMixSumMismatch,
    FinalMixSumMismatch,
    InvalidNewMoneyType,
    NegativeNewMoney,
    TargetDriftExceeded,
    StageOrder,
    InvalidConfig,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidModelType => "InvalidModelType",
            ErrorKind::InvalidModelValue => "InvalidModelValue",
            ErrorKind::WeightSumMismatch => "WeightSumMismatch",
            ErrorKind::InvalidCurrentValue => "InvalidCurrentValue",
            ErrorKind::InvalidCurrentValueType => "InvalidCurrentValueType",
            ErrorKind::NegativeCurrentValue => "NegativeCurrentValue",
            ErrorKind::ZeroPortfolioValue => "ZeroPortfolioValue",
            ErrorKind::CurrentMixSumMismatch => "CurrentMixSumMismatch",
            ErrorKind::FinalMixSumMismatch => "FinalMixSumMismatch",
            ErrorKind::InvalidNewMoneyType => "InvalidNewMoneyType",
            ErrorKind::NegativeNewMoney => "NegativeNewMoney",
            ErrorKind::TargetDriftExceeded => "TargetDriftExceeded",
            ErrorKind::StageOrder => "StageOrder",
            ErrorKind::InvalidConfig => "InvalidConfig",
        }
    }

    /// Caller-input problems, as opposed to internal consistency failures.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            ErrorKind::InvalidModelType
                | ErrorKind::InvalidModelValue
                | ErrorKind::WeightSumMismatch
                | ErrorKind::InvalidCurrentValue
                | ErrorKind::InvalidCurrentValueType
                | ErrorKind::NegativeCurrentValue
                | ErrorKind::ZeroPortfolioValue
                | ErrorKind::InvalidNewMoneyType
                | ErrorKind::NegativeNewMoney
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidModelType(_) => ErrorKind::InvalidModelType,
            Error::InvalidModelValue { .. } => ErrorKind::InvalidModelValue,
            Error::WeightSumMismatch { .. } => ErrorKind::WeightSumMismatch,
            Error::InvalidCurrentValue { .. } => ErrorKind::InvalidCurrentValue,
            Error::InvalidCurrentValueType { .. } => ErrorKind::InvalidCurrentValueType,
            Error::NegativeCurrentValue { .. } => ErrorKind::NegativeCurrentValue,
            Error::ZeroPortfolioValue { .. } => ErrorKind::ZeroPortfolioValue,
            Error::CurrentMixSumMismatch { .. } => ErrorKind::CurrentMixSumMismatch,
            Error::FinalMixSumMismatch { .. } => ErrorKind::FinalMixSumMismatch,
            Error::InvalidNewMoneyType(_) => ErrorKind::InvalidNewMoneyType,
            Error::NegativeNewMoney(_) => ErrorKind::NegativeNewMoney,
            Error::TargetDriftExceeded { .. } => ErrorKind::TargetDriftExceeded,
            Error::StageOrder(_) => ErrorKind::StageOrder,
            Error::InvalidConfig(_) => ErrorKind::InvalidConfig,
        }
    }
}

/// Non-fatal conditions noticed during a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind")]
pub enum Warning {
    /// The current-value mapping did not line up with the model. Missing
    /// assets were valued at $0; unknown assets were ignored.
    MissingValues {
        missing: Vec<String>,
        unknown: Vec<String>,
    },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::MissingValues { missing, unknown } => {
                write!(f, "some current values were not provided, assuming $0")?;
                if !missing.is_empty() {
                    write!(f, " (missing: {})", missing.join(", "))?;
                }
                if !unknown.is_empty() {
                    write!(f, " (ignored: {})", unknown.join(", "))?;
                }
                Ok(())
            }
        }
    }
}
