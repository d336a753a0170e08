//! Runner for single and batch valuations
//!
//! Holds the calculator defaults once and evaluates any number of requests.
//! Evaluation is pure, so batches run in parallel without coordination.

use chrono::{DateTime, Utc};
use log::info;
use rayon::prelude::*;

use crate::config::CalculatorConfig;
use crate::inputs::ValuationRequest;
use crate::valuation::{evaluate, MethodResults, ValuationMethod, ValuationResult};

/// Pre-configured valuation runner
///
/// # Example
/// ```ignore
/// let runner = ValuationRunner::from_env();
/// let results = runner.run_batch(&requests, Utc::now());
/// ```
#[derive(Debug, Clone)]
pub struct ValuationRunner {
    config: CalculatorConfig,
}

impl ValuationRunner {
    /// Runner with built-in defaults
    pub fn new() -> Self {
        Self {
            config: CalculatorConfig::default(),
        }
    }

    /// Runner with defaults overridden from the environment
    pub fn from_env() -> Self {
        Self {
            config: CalculatorConfig::from_env(),
        }
    }

    pub fn with_config(config: CalculatorConfig) -> Self {
        Self { config }
    }

    /// Evaluate one request
    pub fn run(&self, request: &ValuationRequest, created_at: DateTime<Utc>) -> ValuationResult {
        evaluate(request.method, request.inputs.clone(), created_at)
    }

    /// Evaluate many requests in parallel; output order matches input order
    pub fn run_batch(&self, requests: &[ValuationRequest], created_at: DateTime<Utc>) -> Vec<ValuationResult> {
        info!("Evaluating {} valuation requests", requests.len());
        requests
            .par_iter()
            .map(|request| self.run(request, created_at))
            .collect()
    }

    /// Evaluate one stock under each supplied metric with the configured defaults.
    /// A later entry for the same method supersedes an earlier one.
    pub fn run_methods(
        &self,
        stock_name: &str,
        current_price: f64,
        metrics: &[(ValuationMethod, f64)],
        multi_scenario: bool,
        created_at: DateTime<Utc>,
    ) -> MethodResults {
        let mut table = MethodResults::new();
        for &(method, metric_value) in metrics {
            let inputs = if multi_scenario {
                self.config.scenario_inputs_for(stock_name, current_price, metric_value)
            } else {
                self.config.inputs_for(stock_name, current_price, metric_value)
            };
            table.insert(evaluate(method, inputs, created_at));
        }
        table
    }

    pub fn config(&self) -> &CalculatorConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut CalculatorConfig {
        &mut self.config
    }
}

impl Default for ValuationRunner {
    fn default() -> Self {
        Self::new()
    }
}
