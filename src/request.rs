//! Loosely typed request boundary.
//!
//! Requests arrive as JSON (`{"model": {...}, "new_money": n, "values": {...}}`).
//! This module turns them into typed inputs and maps every shape problem
//! onto the engine's error taxonomy, so callers never see a raw
//! deserialization failure for a bad weight or amount.
//!
//! Model problems fail here. New money and current values are carried as
//! [`Amount`]s and only type-checked by the engine stage that consumes them,
//! so an earlier stage's failure always wins.

use serde_json::Value;

use crate::error::{Error, Result};

/// A dollar amount as supplied by the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum Amount {
    Number(f64),
    /// Not a JSON number; holds the offending JSON text.
    Invalid(String),
}

impl Amount {
    pub fn from_json(value: &Value) -> Self {
        match value.as_f64() {
            Some(n) => Amount::Number(n),
            None => Amount::Invalid(value.to_string()),
        }
    }

    /// The numeric value, if the input was a number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Amount::Number(n) => Some(*n),
            Amount::Invalid(_) => None,
        }
    }
}

impl From<f64> for Amount {
    fn from(n: f64) -> Self {
        Amount::Number(n)
    }
}

/// Inputs for one rebalancing run. Pairs keep the caller's key order.
#[derive(Debug, Clone, PartialEq)]
pub struct RebalanceRequest {
    pub model: Vec<(String, f64)>,
    pub new_money: Option<Amount>,
    /// `None` selects the interactive acquisition path.
    pub values: Option<Vec<(String, Amount)>>,
}

impl RebalanceRequest {
    /// Parse a JSON request body.
    pub fn from_json_str(body: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(body)
            .map_err(|e| Error::InvalidModelType(format!("request is not valid JSON: {e}")))?;
        Self::from_json(&value)
    }

    /// Parse an already decoded JSON request.
    ///
    /// A missing or `null` `new_money` means 0; a missing or `null`
    /// `values` means "ask for them".
    pub fn from_json(body: &Value) -> Result<Self> {
        let object = body
            .as_object()
            .ok_or_else(|| Error::InvalidModelType("request should be a JSON object".into()))?;

        let model = parse_model(object.get("model"))?;
        let new_money = parse_new_money(object.get("new_money"));
        let values = parse_values(object.get("values"))?;

        Ok(Self {
            model,
            new_money,
            values,
        })
    }
}

/// The model must be a non-empty object of numeric weights.
pub fn parse_model(model: Option<&Value>) -> Result<Vec<(String, f64)>> {
    let map = match model {
        Some(Value::Object(map)) if !map.is_empty() => map,
        Some(Value::Object(_)) => {
            return Err(Error::InvalidModelType("model should not be empty".into()));
        }
        Some(Value::Null) | None => {
            return Err(Error::InvalidModelType("model should be a dict".into()));
        }
        Some(other) => {
            return Err(Error::InvalidModelType(format!(
                "model should be a dict, got {}",
                type_name(other)
            )));
        }
    };

    map.iter()
        .map(|(asset, weight)| match weight.as_f64() {
            Some(w) => Ok((asset.clone(), w)),
            None => Err(Error::InvalidModelValue {
                asset: asset.clone(),
            }),
        })
        .collect()
}

/// Missing or `null` is `None`; anything else is kept for the delta stage.
pub fn parse_new_money(new_money: Option<&Value>) -> Option<Amount> {
    match new_money {
        None | Some(Value::Null) => None,
        Some(value) => Some(Amount::from_json(value)),
    }
}

/// The mapping itself must be an object; its entries are checked per asset
/// when the values are applied.
pub fn parse_values(values: Option<&Value>) -> Result<Option<Vec<(String, Amount)>>> {
    match values {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Object(map)) => Ok(Some(
            map.iter()
                .map(|(asset, value)| (asset.clone(), Amount::from_json(value)))
                .collect(),
        )),
        Some(other) => Err(Error::InvalidCurrentValueType {
            asset: format!("<{}>", type_name(other)),
        }),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
