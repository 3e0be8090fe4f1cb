//! # allocbook
//!
//! A deterministic proportional rebalancing engine.
//!
//! Given a target allocation ("model"), the current dollar value of each
//! asset and an optional amount of new money, it derives how much of each
//! asset to buy or sell so the portfolio lands on its target weights.
//!
//! ## Quick Start
//!
//! ```
//! use allocbook::{Action, EngineConfig, Portfolio};
//!
//! let mut portfolio = Portfolio::new(
//!     [("Asset1", 0.20), ("Asset2", 0.15), ("Asset3", 0.15), ("Asset4", 0.50)],
//!     EngineConfig::default(),
//! )
//! .unwrap();
//!
//! portfolio
//!     .set_current_values([
//!         ("Asset1", 1000.0),
//!         ("Asset2", 1000.0),
//!         ("Asset3", 1000.0),
//!         ("Asset4", 1000.0),
//!     ])
//!     .unwrap();
//! portfolio.calc_current_mix().unwrap();
//! portfolio.calc_delta_to_target(Some(2000.0)).unwrap();
//!
//! let asset4 = &portfolio.records()[3];
//! assert_eq!(asset4.total, Some(2000.0));
//! assert_eq!(asset4.action, Some(Action::Buy));
//! ```
//!
//! ## Derivations
//!
//! | Column | Formula |
//! |--------|---------|
//! | CurrentMix | CurrentValue / Σ CurrentValue |
//! | DeltaToTarget | Weight − CurrentMix |
//! | AbsDeltaToTarget | DeltaToTarget × Σ CurrentValue |
//! | NewMoneyAllocation | Weight × new money |
//! | Total | AbsDeltaToTarget + NewMoneyAllocation |
//! | FinalValue | CurrentValue + Total |
//! | FinalMix | FinalValue / Σ FinalValue |
//! | Action | Buy if Total > 0, else Sell |
//!
//! Each stage is gated by a tolerance check (see [`Tolerances`]); a failed
//! check aborts the run with a typed [`Error`].
//!
//! ## JSON requests
//!
//! ```
//! use allocbook::{EngineConfig, RebalanceRequest, rebalance};
//!
//! let request = RebalanceRequest::from_json_str(
//!     r#"{"model": {"A": 0.6, "B": 0.4}, "new_money": 100, "values": {"A": 50, "B": 50}}"#,
//! )
//! .unwrap();
//! let out = rebalance(&request, EngineConfig::default(), None).unwrap();
//! assert_eq!(out.records.len(), 2);
//! assert!(out.to_json().unwrap().starts_with(r#"[{"Asset":"A""#));
//! ```

mod config;
mod engine;
mod error;
mod model;
pub mod prompt;
pub mod report;
mod request;
mod types;

// Re-export public API
pub use config::{EngineConfig, Tolerances};
pub use engine::{Portfolio, Rebalance, rebalance, validate_new_money};
pub use error::{Error, ErrorKind, Result, Warning};
pub use model::TargetModel;
pub use prompt::{ScriptedValues, ValuePrompt};
pub use request::{Amount, RebalanceRequest, parse_model, parse_new_money, parse_values};
pub use types::{Action, AssetRecord};
