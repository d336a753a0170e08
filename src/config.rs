//! Calculator defaults and environment overrides

use std::env;
use std::time::Duration;

use crate::valuation::{Currency, NamedScenarios, ScenarioAssumptions, ValuationInputs};

/// Default projection horizon in years
pub const DEFAULT_YEARS_TO_PROJECT: u32 = 5;

/// Default base growth / desired return / terminal multiple
pub const DEFAULT_GROWTH_PCT: f64 = 15.0;
pub const DEFAULT_DESIRED_RETURN_PCT: f64 = 12.0;
pub const DEFAULT_TERMINAL_MULTIPLE: f64 = 15.0;

/// How long a market-data response is reused
pub const DEFAULT_MARKET_CACHE_TTL: Duration = Duration::from_secs(5 * 60);

/// Calculator-wide defaults
#[derive(Debug, Clone)]
pub struct CalculatorConfig {
    pub years_to_project: u32,
    pub base: ScenarioAssumptions,
    pub scenarios: NamedScenarios,
    pub currency: Currency,
    pub market_cache_ttl: Duration,
    pub alpha_vantage_api_key: Option<String>,
}

impl Default for CalculatorConfig {
    fn default() -> Self {
        Self {
            years_to_project: DEFAULT_YEARS_TO_PROJECT,
            base: ScenarioAssumptions::new(
                DEFAULT_GROWTH_PCT,
                DEFAULT_DESIRED_RETURN_PCT,
                DEFAULT_TERMINAL_MULTIPLE,
            ),
            scenarios: default_scenarios(),
            currency: Currency::default(),
            market_cache_ttl: DEFAULT_MARKET_CACHE_TTL,
            alpha_vantage_api_key: None,
        }
    }
}

/// Pessimistic 10/12/12x, neutral 15/12/15x, optimistic 20/12/18x
pub fn default_scenarios() -> NamedScenarios {
    NamedScenarios {
        pessimistic: ScenarioAssumptions::new(10.0, 12.0, 12.0),
        neutral: ScenarioAssumptions::new(15.0, 12.0, 15.0),
        optimistic: ScenarioAssumptions::new(20.0, 12.0, 18.0),
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|s| s.trim().parse().ok())
}

impl CalculatorConfig {
    /// Defaults overridden by environment variables:
    ///   VALUATION_YEARS, VALUATION_GROWTH, VALUATION_RETURN, VALUATION_MULTIPLE,
    ///   VALUATION_CURRENCY, MARKET_CACHE_SECS, ALPHA_VANTAGE_API_KEY
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let years_to_project = env_parse("VALUATION_YEARS").unwrap_or(defaults.years_to_project);

        let base = ScenarioAssumptions::new(
            env_parse("VALUATION_GROWTH").unwrap_or(defaults.base.estimated_growth_pct),
            env_parse("VALUATION_RETURN").unwrap_or(defaults.base.desired_return_pct),
            env_parse("VALUATION_MULTIPLE").unwrap_or(defaults.base.terminal_multiple),
        );

        let currency = env::var("VALUATION_CURRENCY")
            .ok()
            .and_then(|code| Currency::by_code(&code))
            .unwrap_or(defaults.currency);

        let market_cache_ttl = env_parse::<u64>("MARKET_CACHE_SECS")
            .map(Duration::from_secs)
            .unwrap_or(defaults.market_cache_ttl);

        let alpha_vantage_api_key = env::var("ALPHA_VANTAGE_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty());

        Self {
            years_to_project,
            base,
            scenarios: defaults.scenarios,
            currency,
            market_cache_ttl,
            alpha_vantage_api_key,
        }
    }

    /// Blank single-scenario inputs prefilled with the configured defaults
    pub fn inputs_for(&self, stock_name: &str, current_price: f64, metric_value: f64) -> ValuationInputs {
        ValuationInputs {
            stock_name: stock_name.to_string(),
            current_price,
            metric_value,
            years_to_project: self.years_to_project,
            currency: self.currency.clone(),
            base: self.base,
            scenarios: None,
        }
    }

    /// Same as `inputs_for`, switched to multi-scenario mode with the presets
    pub fn scenario_inputs_for(&self, stock_name: &str, current_price: f64, metric_value: f64) -> ValuationInputs {
        ValuationInputs {
            scenarios: Some(self.scenarios),
            ..self.inputs_for(stock_name, current_price, metric_value)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CalculatorConfig::default();
        assert_eq!(config.years_to_project, 5);
        assert_eq!(config.base, ScenarioAssumptions::new(15.0, 12.0, 15.0));
        assert_eq!(config.scenarios.optimistic.terminal_multiple, 18.0);
        assert_eq!(config.market_cache_ttl, Duration::from_secs(300));
        assert_eq!(config.currency.code, "EUR");
    }

    #[test]
    fn test_inputs_prefill() {
        let config = CalculatorConfig::default();
        let single = config.inputs_for("ACME", 100.0, 5.0);
        assert!(!single.is_multi_scenario());

        let multi = config.scenario_inputs_for("ACME", 100.0, 5.0);
        assert_eq!(multi.scenarios, Some(default_scenarios()));
        assert_eq!(multi.base, single.base);
    }
}
