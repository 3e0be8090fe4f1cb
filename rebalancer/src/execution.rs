//! Run orchestrator: request → current values → engine → rendered output.

use allocbook::report::{ActionsReport, FullReport};
use allocbook::{Portfolio, Rebalance, RebalanceRequest, ValuePrompt, Warning};
use log::info;

use crate::config::{Config, OutputFormat};
use crate::error::{Error, Result};
use crate::prompt::TerminalPrompt;
use crate::response::Response;

/// Options for a rebalance run.
pub struct RunOptions {
    /// Overrides `output.format` from the config.
    pub format: Option<OutputFormat>,
    /// Ask for current values even if the request carries some.
    pub prompt: bool,
    pub request_file: String,
}

/// Run the engine for one request. `prompt` is consulted when the request
/// has no values (or when `force_prompt` is set).
pub fn execute(
    config: &Config,
    request: &RebalanceRequest,
    prompt: Option<&mut dyn ValuePrompt>,
    force_prompt: bool,
) -> Result<Rebalance> {
    if force_prompt && prompt.is_none() {
        return Err(Error::Prompt("no prompt available".into()));
    }
    let request = if force_prompt {
        RebalanceRequest {
            values: None,
            ..request.clone()
        }
    } else {
        request.clone()
    };
    Ok(allocbook::rebalance(&request, config.engine.clone(), prompt)?)
}

/// Execute a rebalance run from the command line and print the result.
pub fn run(config: &Config, request: &RebalanceRequest, opts: &RunOptions) -> Result<()> {
    info!("Rebalancing {} ({} assets)", opts.request_file, request.model.len());

    let mut terminal = TerminalPrompt;
    let needs_prompt = opts.prompt || request.values.is_none();
    let prompt: Option<&mut dyn ValuePrompt> = if needs_prompt {
        Some(&mut terminal as &mut dyn ValuePrompt)
    } else {
        None
    };

    let format = opts.format.unwrap_or(config.output.format);
    let result = execute(config, request, prompt, opts.prompt);

    if format == OutputFormat::Envelope {
        let response = Response::from_result(&result);
        let json = serde_json::to_string_pretty(&response).map_err(output_err)?;
        println!("{json}");
        return result.map(|_| ());
    }

    let rebalance = result?;
    print!("{}", render(&rebalance, format, config.engine.debug)?);
    Ok(())
}

/// Render a finished run in the given format.
pub fn render(rebalance: &Rebalance, format: OutputFormat, full: bool) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(format!("{}\n", rebalance.to_json().map_err(output_err)?)),
        OutputFormat::Envelope => {
            let response = Response::ok(rebalance);
            let json = serde_json::to_string_pretty(&response).map_err(output_err)?;
            Ok(format!("{json}\n"))
        }
        OutputFormat::Table => {
            let mut out = String::new();
            out.push_str("REBALANCING ACTIONS:\n");
            out.push_str(&ActionsReport(&rebalance.records).to_string());
            if full {
                out.push_str("\nFULL TABLE:\n");
                out.push_str(&FullReport(&rebalance.records).to_string());
            }
            out.push_str(&format!(
                "\nPortfolio ${:.2} + new money ${:.2} = ${:.2}\n",
                rebalance.portfolio_value, rebalance.new_money, rebalance.final_portfolio_value,
            ));
            for w in &rebalance.warnings {
                out.push_str(&format!("WARNING: {w}\n"));
            }
            Ok(out)
        }
    }
}

fn output_err(e: serde_json::Error) -> Error {
    Error::Output(e.to_string())
}

/// Result of validating a request without running the derivations.
#[derive(Debug, Clone)]
pub struct CheckReport {
    pub assets: usize,
    pub total_weight: f64,
    pub portfolio_value: Option<f64>,
    pub warnings: Vec<Warning>,
}

impl std::fmt::Display for CheckReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "Model OK: {} assets, total weight {}",
            self.assets, self.total_weight
        )?;
        match self.portfolio_value {
            Some(v) => writeln!(f, "Current values OK: portfolio value ${v:.2}")?,
            None => writeln!(f, "No current values given; they will be prompted for")?,
        }
        for w in &self.warnings {
            writeln!(f, "WARNING: {w}")?;
        }
        Ok(())
    }
}

/// Validate the model and (if present) the current values and new money.
pub fn check(config: &Config, request: &RebalanceRequest) -> Result<CheckReport> {
    let mut portfolio = Portfolio::new(
        request.model.iter().map(|(a, w)| (a.as_str(), *w)),
        config.engine.clone(),
    )?;

    if let Some(values) = &request.values {
        portfolio.set_current_values(values.iter().map(|(a, v)| (a.as_str(), v.clone())))?;
    }
    allocbook::validate_new_money(request.new_money.as_ref())?;

    Ok(CheckReport {
        assets: portfolio.records().len(),
        total_weight: portfolio.total_weight(),
        portfolio_value: portfolio.portfolio_value(),
        warnings: portfolio.warnings().to_vec(),
    })
}

/// Process exit code for a failed run: 2 for engine rejections, 1 otherwise.
pub fn exit_code(err: &Error) -> i32 {
    match err {
        Error::Engine(_) => 2,
        _ => 1,
    }
}
