//! Evaluate every valuation request in a CSV file
//!
//! Outputs one summary row per request for spreadsheet comparison.
//! Accepts config via environment variables:
//!   VALUATION_INPUT (default valuation_inputs.csv)
//!   VALUATION_OUTPUT (default valuation_summary.csv)
//! Pass --json to print the full results as JSON on stdout instead.

use anyhow::{Context, Result};
use chrono::Utc;
use equity_valuation::{inputs::load_requests, Metric, ValuationResult, ValuationRunner};
use serde::Serialize;
use std::env;
use std::time::Instant;

#[derive(Serialize)]
struct SummaryRow<'a> {
    #[serde(rename = "Id")]
    id: &'a str,
    #[serde(rename = "StockName")]
    stock_name: &'a str,
    #[serde(rename = "Method")]
    method: &'a str,
    #[serde(rename = "Scenarios")]
    scenarios: bool,
    #[serde(rename = "CurrentPrice")]
    current_price: f64,
    #[serde(rename = "FairValue")]
    fair_value: Option<f64>,
    #[serde(rename = "SafetyMarginPct")]
    safety_margin_pct: Option<f64>,
    #[serde(rename = "TerminalMetric")]
    terminal_metric: Option<f64>,
    #[serde(rename = "Note")]
    note: String,
}

impl<'a> SummaryRow<'a> {
    fn from_result(result: &'a ValuationResult) -> Self {
        let note = match (result.fair_value, result.safety_margin_pct) {
            (Metric::Undefined(reason), _) | (_, Metric::Undefined(reason)) => reason.to_string(),
            _ => String::new(),
        };
        Self {
            id: &result.id,
            stock_name: result.stock_name(),
            method: result.method.code(),
            scenarios: result.scenario_results.is_some(),
            current_price: result.current_price,
            fair_value: result.fair_value.value(),
            safety_margin_pct: result.safety_margin_pct.value(),
            terminal_metric: result.projected_series.last().copied(),
            note,
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let json_output = env::args().any(|arg| arg == "--json");
    let input_path = env::var("VALUATION_INPUT").unwrap_or_else(|_| "valuation_inputs.csv".to_string());
    let output_path = env::var("VALUATION_OUTPUT").unwrap_or_else(|_| "valuation_summary.csv".to_string());

    let start = Instant::now();
    if !json_output {
        println!("Loading requests from {}...", input_path);
    }
    let requests = load_requests(&input_path).with_context(|| format!("Failed to load {}", input_path))?;
    if !json_output {
        println!("Loaded {} requests in {:?}", requests.len(), start.elapsed());
    }

    let runner = ValuationRunner::from_env();
    let eval_start = Instant::now();
    let results = runner.run_batch(&requests, Utc::now());

    if json_output {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }
    println!("Evaluations complete in {:?}", eval_start.elapsed());

    let mut wtr = csv::Writer::from_path(&output_path)
        .with_context(|| format!("Failed to create {}", output_path))?;
    for result in &results {
        wtr.serialize(SummaryRow::from_result(result))?;
    }
    wtr.flush()?;

    let undefined = results.iter().filter(|r| r.has_undefined()).count();
    println!("\nSummary:");
    println!("  Requests:          {}", results.len());
    println!("  Undefined results: {}", undefined);
    println!("  Output:            {}", output_path);
    println!("  Total time:        {:?}", start.elapsed());

    Ok(())
}
