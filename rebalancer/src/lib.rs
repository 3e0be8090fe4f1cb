//! allocbook-rebalancer: command-line front end for the allocbook engine.
//!
//! Reads a rebalance request (model, new money, current values) from a JSON
//! file, prompts on the terminal for any current values it lacks, runs the
//! engine, and prints the buy/sell plan as a table, JSON records, or a
//! status-coded response envelope.

pub mod config;
pub mod error;
pub mod execution;
pub mod prompt;
pub mod request;
pub mod response;
