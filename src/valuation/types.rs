//! Input types for valuation calculations

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::currency::Currency;

/// Per-share metric the projection starts from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValuationMethod {
    /// Earnings per share
    Eps,
    /// Operating cash flow per share
    Ocf,
    /// Free cash flow per share
    Fcf,
}

impl ValuationMethod {
    pub const ALL: [ValuationMethod; 3] = [ValuationMethod::Eps, ValuationMethod::Ocf, ValuationMethod::Fcf];

    /// Short identifier used in result ids and CSV files
    pub fn code(&self) -> &'static str {
        match self {
            ValuationMethod::Eps => "eps",
            ValuationMethod::Ocf => "ocf",
            ValuationMethod::Fcf => "fcf",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ValuationMethod::Eps => "EPS",
            ValuationMethod::Ocf => "OCF/Share",
            ValuationMethod::Fcf => "FCF/Share",
        }
    }
}

impl fmt::Display for ValuationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for ValuationMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "eps" => Ok(ValuationMethod::Eps),
            "ocf" => Ok(ValuationMethod::Ocf),
            "fcf" => Ok(ValuationMethod::Fcf),
            other => Err(format!("Unknown valuation method: {}", other)),
        }
    }
}

/// Named scenario bracket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scenario {
    Pessimistic,
    Neutral,
    Optimistic,
}

impl Scenario {
    /// Display and iteration order
    pub const ORDER: [Scenario; 3] = [Scenario::Pessimistic, Scenario::Neutral, Scenario::Optimistic];

    pub fn label(&self) -> &'static str {
        match self {
            Scenario::Pessimistic => "Pessimistic",
            Scenario::Neutral => "Neutral",
            Scenario::Optimistic => "Optimistic",
        }
    }
}

/// Growth / discount / multiple triple driving one projection
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioAssumptions {
    /// Annual growth of the per-share metric, in percent
    #[serde(alias = "estimatedGrowth")]
    pub estimated_growth_pct: f64,

    /// Desired annual return, used as the discount rate, in percent
    #[serde(alias = "desiredCagr")]
    pub desired_return_pct: f64,

    /// Multiple applied to the terminal-year metric
    pub terminal_multiple: f64,
}

impl ScenarioAssumptions {
    pub fn new(estimated_growth_pct: f64, desired_return_pct: f64, terminal_multiple: f64) -> Self {
        Self {
            estimated_growth_pct,
            desired_return_pct,
            terminal_multiple,
        }
    }

    /// Annual growth factor `1 + g/100`
    pub fn growth_factor(&self) -> f64 {
        1.0 + self.estimated_growth_pct / 100.0
    }
}

/// Assumptions for all three named scenarios
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NamedScenarios {
    pub pessimistic: ScenarioAssumptions,
    pub neutral: ScenarioAssumptions,
    pub optimistic: ScenarioAssumptions,
}

impl NamedScenarios {
    pub fn get(&self, scenario: Scenario) -> &ScenarioAssumptions {
        match scenario {
            Scenario::Pessimistic => &self.pessimistic,
            Scenario::Neutral => &self.neutral,
            Scenario::Optimistic => &self.optimistic,
        }
    }

    /// Scenarios in pessimistic → neutral → optimistic order
    pub fn iter(&self) -> impl Iterator<Item = (Scenario, &ScenarioAssumptions)> {
        Scenario::ORDER.into_iter().map(move |s| (s, self.get(s)))
    }
}

/// Everything the user submits for one calculation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValuationInputs {
    pub stock_name: String,

    /// Unchecked; may be zero or negative
    pub current_price: f64,

    /// Starting per-share metric (EPS, OCF or FCF); unchecked
    pub metric_value: f64,

    /// 0 degenerates the projection to the starting metric
    pub years_to_project: u32,

    #[serde(default)]
    pub currency: Currency,

    /// Single-scenario assumptions; ignored for fair value when `scenarios` is set
    #[serde(flatten)]
    pub base: ScenarioAssumptions,

    /// Presence switches the calculation to multi-scenario mode
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scenarios: Option<NamedScenarios>,
}

impl ValuationInputs {
    pub fn is_multi_scenario(&self) -> bool {
        self.scenarios.is_some()
    }
}
