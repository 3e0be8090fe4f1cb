//! Rebalance request (request.json) loading.
//!
//! The file carries the same body the engine's request boundary accepts:
//!
//! ```json
//! {
//!   "model": { "Asset1": 0.20, "Asset2": 0.15, "Asset3": 0.15, "Asset4": 0.5 },
//!   "new_money": 2000,
//!   "values": { "Asset1": 1000, "Asset2": 1000, "Asset3": 1000, "Asset4": 1000 }
//! }
//! ```

use std::path::Path;

use allocbook::RebalanceRequest;

use crate::error::{Error, Result};

/// Load a request file. Malformed JSON is a parse error; well-formed JSON
/// with the wrong shape is reported through the engine's error kinds.
pub fn load(path: &Path) -> Result<RebalanceRequest> {
    let contents = std::fs::read_to_string(path).map_err(|e| Error::RequestRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    from_json(&contents)
}

/// Parse a request body (useful for testing).
pub fn from_json(json: &str) -> Result<RebalanceRequest> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    Ok(RebalanceRequest::from_json(&value)?)
}
