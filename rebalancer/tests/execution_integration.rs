//! Integration tests for rebalancer execution helpers.

use allocbook::{Action, ErrorKind, ScriptedValues, ValuePrompt};
use allocbook_rebalancer::config::{Config, OutputFormat};
use allocbook_rebalancer::error::Error;
use allocbook_rebalancer::execution::{check, execute, exit_code, render};
use allocbook_rebalancer::request;
use allocbook_rebalancer::response::Response;

fn valid_request_json() -> &'static str {
    r#"{
        "model": { "Asset1": 0.20, "Asset2": 0.15, "Asset3": 0.15, "Asset4": 0.5 },
        "new_money": 2000,
        "values": { "Asset1": 1000, "Asset2": 1000, "Asset3": 1000, "Asset4": 1000 }
    }"#
}

fn no_values_json() -> &'static str {
    r#"{
        "model": { "Asset1": 0.20, "Asset2": 0.15, "Asset3": 0.15, "Asset4": 0.5 },
        "new_money": 2000
    }"#
}

// ============================================================================
// execute
// ============================================================================

#[test]
fn execute_with_values() {
    let req = request::from_json(valid_request_json()).unwrap();
    let out = execute(&Config::default(), &req, None, false).unwrap();
    let actions: Vec<Action> = out.records.iter().map(|r| r.action.unwrap()).collect();
    assert_eq!(
        actions,
        [Action::Buy, Action::Sell, Action::Sell, Action::Buy]
    );
}

#[test]
fn execute_prompts_when_values_missing() {
    let req = request::from_json(no_values_json()).unwrap();
    let mut prompt = ScriptedValues::new([1000.0, 1000.0, 1000.0, 1000.0]);
    let out = execute(
        &Config::default(),
        &req,
        Some(&mut prompt as &mut dyn ValuePrompt),
        false,
    )
    .unwrap();
    assert_eq!(prompt.asked(), ["Asset1", "Asset2", "Asset3", "Asset4"]);
    assert!((out.final_portfolio_value - 6000.0).abs() < 1e-9);
}

#[test]
fn execute_force_prompt_ignores_given_values() {
    let req = request::from_json(valid_request_json()).unwrap();
    let mut prompt = ScriptedValues::new([0.0, 0.0, 0.0, 4000.0]);
    let out = execute(
        &Config::default(),
        &req,
        Some(&mut prompt as &mut dyn ValuePrompt),
        true,
    )
    .unwrap();
    assert_eq!(out.records[0].current_value, Some(0.0));
    assert_eq!(out.records[3].current_value, Some(4000.0));
}

#[test]
fn execute_force_prompt_without_prompt_fails() {
    let req = request::from_json(valid_request_json()).unwrap();
    let err = execute(&Config::default(), &req, None, true).unwrap_err();
    assert!(matches!(err, Error::Prompt(_)));
    assert_eq!(exit_code(&err), 1);
}

#[test]
fn execute_propagates_engine_error() {
    let json = valid_request_json().replace("\"new_money\": 2000", "\"new_money\": -2000");
    let req = request::from_json(&json).unwrap();
    let err = execute(&Config::default(), &req, None, false).unwrap_err();
    assert_eq!(err.engine_kind(), Some(ErrorKind::NegativeNewMoney));
    assert_eq!(exit_code(&err), 2);
}

#[test]
fn execute_uses_configured_tolerance() {
    let json = valid_request_json().replace("\"Asset4\": 0.5 }", "\"Asset4\": 0.55 }");
    let req = request::from_json(&json).unwrap();

    let err = execute(&Config::default(), &req, None, false).unwrap_err();
    assert_eq!(err.engine_kind(), Some(ErrorKind::WeightSumMismatch));

    // Weights sum to 1.05: a loose weight bound admits the model, but each
    // final mix is weight / 1.05, so Asset4 drifts past the default 0.01.
    let config = Config::from_toml("[engine.tolerance]\nweight_sum = 0.1\n").unwrap();
    let err = execute(&config, &req, None, false).unwrap_err();
    assert_eq!(err.engine_kind(), Some(ErrorKind::TargetDriftExceeded));

    let loose = Config::from_toml("[engine.tolerance]\nweight_sum = 0.1\ndrift = 0.1\n").unwrap();
    assert!(execute(&loose, &req, None, false).is_ok());
}

// ============================================================================
// render
// ============================================================================

#[test]
fn render_table() {
    let req = request::from_json(valid_request_json()).unwrap();
    let out = execute(&Config::default(), &req, None, false).unwrap();
    let text = render(&out, OutputFormat::Table, false).unwrap();
    assert!(text.starts_with("REBALANCING ACTIONS:"));
    assert!(text.contains("Asset4"));
    assert!(text.contains("Portfolio $4000.00 + new money $2000.00 = $6000.00"));
    assert!(!text.contains("FULL TABLE"));

    let full = render(&out, OutputFormat::Table, true).unwrap();
    assert!(full.contains("FULL TABLE"));
    assert!(full.contains("NewMoneyAllocation"));
}

#[test]
fn render_json_records() {
    let req = request::from_json(valid_request_json()).unwrap();
    let out = execute(&Config::default(), &req, None, false).unwrap();
    let text = render(&out, OutputFormat::Json, false).unwrap();
    let rows: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(rows.as_array().unwrap().len(), 4);
    assert_eq!(rows[3]["Action"], "Buy");
}

#[test]
fn render_warning_lines() {
    let json = r#"{
        "model": {"A": 0.2, "B": 0.15, "C": 0.15, "D": 0.5},
        "values": {"B": 1000, "C": 1000, "D": 1000}
    }"#;
    let req = request::from_json(json).unwrap();
    let out = execute(&Config::default(), &req, None, false).unwrap();
    let text = render(&out, OutputFormat::Table, false).unwrap();
    assert!(text.contains("WARNING: some current values were not provided"));
}

// ============================================================================
// response envelope
// ============================================================================

#[test]
fn envelope_success() {
    let req = request::from_json(valid_request_json()).unwrap();
    let result = execute(&Config::default(), &req, None, false);
    let resp = Response::from_result(&result);
    assert_eq!(resp.status_code, 200);
    let rows: serde_json::Value = serde_json::from_str(&resp.body).unwrap();
    assert_eq!(rows[0]["Asset"], "Asset1");
}

#[test]
fn envelope_validation_failure() {
    let json = valid_request_json().replace("\"new_money\": 2000", "\"new_money\": \"abc\"");
    let result = request::from_json(&json).and_then(|req| {
        execute(&Config::default(), &req, None, false)
    });
    let resp = Response::from_result(&result);
    assert_eq!(resp.status_code, 400);
    let body: serde_json::Value = serde_json::from_str(&resp.body).unwrap();
    assert_eq!(body["error"], "InvalidNewMoneyType");
}

// ============================================================================
// check
// ============================================================================

#[test]
fn check_reports_model_and_values() {
    let req = request::from_json(valid_request_json()).unwrap();
    let report = check(&Config::default(), &req).unwrap();
    assert_eq!(report.assets, 4);
    assert_eq!(report.portfolio_value, Some(4000.0));
    assert!(report.warnings.is_empty());
    assert!(report.to_string().starts_with("Model OK: 4 assets"));
}

#[test]
fn check_without_values() {
    let req = request::from_json(no_values_json()).unwrap();
    let report = check(&Config::default(), &req).unwrap();
    assert_eq!(report.portfolio_value, None);
    assert!(report.to_string().contains("prompted"));
}

#[test]
fn check_rejects_negative_value() {
    let json = valid_request_json().replace("\"Asset1\": 1000", "\"Asset1\": -1000");
    let req = request::from_json(&json).unwrap();
    let err = check(&Config::default(), &req).unwrap_err();
    assert_eq!(err.engine_kind(), Some(ErrorKind::NegativeCurrentValue));
}

#[test]
fn load_request_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("request.json");
    std::fs::write(&path, valid_request_json()).unwrap();
    let req = request::load(&path).unwrap();
    assert_eq!(req.model.len(), 4);
}
