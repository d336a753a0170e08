//! Load valuation requests from CSV or JSON
//!
//! CSV layout (one request per row):
//! `StockName,Method,CurrentPrice,MetricValue,YearsToProject,Currency,Growth,DesiredReturn,TerminalMultiple`
//! optionally followed by the nine scenario columns
//! `PessGrowth,PessReturn,PessMultiple,NeutralGrowth,...,OptMultiple`.
//! Rows with any scenario column filled are multi-scenario requests and must fill all nine.

use csv::Reader;
use std::fs::File;
use std::path::Path;

use super::ValuationRequest;
use crate::error::InputError;
use crate::valuation::{Currency, NamedScenarios, ScenarioAssumptions, ValuationInputs};

/// Raw CSV row
#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    #[serde(rename = "StockName")]
    stock_name: String,
    #[serde(rename = "Method")]
    method: String,
    #[serde(rename = "CurrentPrice")]
    current_price: f64,
    #[serde(rename = "MetricValue")]
    metric_value: f64,
    #[serde(rename = "YearsToProject")]
    years_to_project: u32,
    #[serde(rename = "Currency", default)]
    currency: Option<String>,
    #[serde(rename = "Growth")]
    growth: f64,
    #[serde(rename = "DesiredReturn")]
    desired_return: f64,
    #[serde(rename = "TerminalMultiple")]
    terminal_multiple: f64,
    #[serde(rename = "PessGrowth", default)]
    pess_growth: Option<f64>,
    #[serde(rename = "PessReturn", default)]
    pess_return: Option<f64>,
    #[serde(rename = "PessMultiple", default)]
    pess_multiple: Option<f64>,
    #[serde(rename = "NeutralGrowth", default)]
    neutral_growth: Option<f64>,
    #[serde(rename = "NeutralReturn", default)]
    neutral_return: Option<f64>,
    #[serde(rename = "NeutralMultiple", default)]
    neutral_multiple: Option<f64>,
    #[serde(rename = "OptGrowth", default)]
    opt_growth: Option<f64>,
    #[serde(rename = "OptReturn", default)]
    opt_return: Option<f64>,
    #[serde(rename = "OptMultiple", default)]
    opt_multiple: Option<f64>,
}

impl CsvRow {
    fn scenario_columns(&self) -> [Option<f64>; 9] {
        [
            self.pess_growth,
            self.pess_return,
            self.pess_multiple,
            self.neutral_growth,
            self.neutral_return,
            self.neutral_multiple,
            self.opt_growth,
            self.opt_return,
            self.opt_multiple,
        ]
    }

    fn to_request(self, row: usize) -> Result<ValuationRequest, InputError> {
        let invalid = |message: String| InputError::InvalidRow { row, message };

        let method = self.method.parse().map_err(invalid)?;

        let currency = match self.currency.as_deref().map(str::trim) {
            None | Some("") => Currency::default(),
            Some(code) => Currency::by_code(code)
                .ok_or_else(|| invalid(format!("Unknown Currency: {}", code)))?,
        };

        let columns = self.scenario_columns();
        let scenarios = if columns.iter().all(Option::is_none) {
            None
        } else {
            let values: Vec<f64> = columns.iter().flatten().copied().collect();
            if values.len() != columns.len() {
                return Err(invalid("scenario columns must be all filled or all empty".to_string()));
            }
            Some(NamedScenarios {
                pessimistic: ScenarioAssumptions::new(values[0], values[1], values[2]),
                neutral: ScenarioAssumptions::new(values[3], values[4], values[5]),
                optimistic: ScenarioAssumptions::new(values[6], values[7], values[8]),
            })
        };

        Ok(ValuationRequest {
            method,
            inputs: ValuationInputs {
                stock_name: self.stock_name,
                current_price: self.current_price,
                metric_value: self.metric_value,
                years_to_project: self.years_to_project,
                currency,
                base: ScenarioAssumptions::new(self.growth, self.desired_return, self.terminal_multiple),
                scenarios,
            },
        })
    }
}

/// Load all requests from a CSV file
pub fn load_requests<P: AsRef<Path>>(path: P) -> Result<Vec<ValuationRequest>, InputError> {
    load_requests_from_reader(File::open(path)?)
}

/// Load requests from any reader (e.g., string buffer, network stream)
pub fn load_requests_from_reader<R: std::io::Read>(reader: R) -> Result<Vec<ValuationRequest>, InputError> {
    let mut csv_reader = Reader::from_reader(reader);
    let mut requests = Vec::new();

    for (index, result) in csv_reader.deserialize().enumerate() {
        let row: CsvRow = result?;
        // 1-based data row number, header excluded
        requests.push(row.to_request(index + 1)?);
    }

    Ok(requests)
}

/// Load a single request or an array of requests from a JSON file
pub fn load_requests_json<P: AsRef<Path>>(path: P) -> Result<Vec<ValuationRequest>, InputError> {
    let text = std::fs::read_to_string(path)?;
    parse_requests_json(&text)
}

pub fn parse_requests_json(text: &str) -> Result<Vec<ValuationRequest>, InputError> {
    let value: serde_json::Value = serde_json::from_str(text)?;
    if value.is_array() {
        Ok(serde_json::from_value(value)?)
    } else {
        Ok(vec![serde_json::from_value(value)?])
    }
}
