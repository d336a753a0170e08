//! Single vs multi-scenario aggregation

use serde::{Deserialize, Serialize};

use super::formulas::safety_margin;
use super::metric::Metric;
use super::projector::{project, ProjectionOutcome};
use super::types::{NamedScenarios, Scenario, ScenarioAssumptions};

/// Per-scenario outcomes, present only in multi-scenario mode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioResultSet {
    pub pessimistic: ProjectionOutcome,
    pub neutral: ProjectionOutcome,
    pub optimistic: ProjectionOutcome,
}

impl ScenarioResultSet {
    pub fn get(&self, scenario: Scenario) -> &ProjectionOutcome {
        match scenario {
            Scenario::Pessimistic => &self.pessimistic,
            Scenario::Neutral => &self.neutral,
            Scenario::Optimistic => &self.optimistic,
        }
    }

    /// Outcomes in pessimistic → neutral → optimistic order
    pub fn iter(&self) -> impl Iterator<Item = (Scenario, &ProjectionOutcome)> {
        Scenario::ORDER.into_iter().map(move |s| (s, self.get(s)))
    }

    /// Unweighted mean of the three fair values; undefined if any is undefined
    pub fn mean_fair_value(&self) -> Metric {
        let mut sum = 0.0;
        for (_, outcome) in self.iter() {
            match outcome.fair_value {
                Metric::Value(v) => sum += v,
                undefined => return undefined,
            }
        }
        Metric::from_f64(sum / 3.0)
    }
}

/// Reportable outcome of one calculation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateOutcome {
    pub fair_value: Metric,
    pub safety_margin_pct: Metric,

    /// Base series in single mode, neutral series in multi mode
    pub projected_series: Vec<f64>,

    pub scenario_results: Option<ScenarioResultSet>,
}

/// Run the projector for the active scenario(s) and combine the results
pub fn aggregate(
    metric_value: f64,
    current_price: f64,
    years: u32,
    base: &ScenarioAssumptions,
    scenarios: Option<&NamedScenarios>,
) -> AggregateOutcome {
    match scenarios {
        None => {
            let outcome = project(metric_value, base, years, current_price);
            AggregateOutcome {
                fair_value: outcome.fair_value,
                safety_margin_pct: outcome.safety_margin_pct,
                projected_series: outcome.projected_series,
                scenario_results: None,
            }
        }
        Some(named) => {
            let run = |scenario: Scenario| project(metric_value, named.get(scenario), years, current_price);
            let results = ScenarioResultSet {
                pessimistic: run(Scenario::Pessimistic),
                neutral: run(Scenario::Neutral),
                optimistic: run(Scenario::Optimistic),
            };

            let fair_value = results.mean_fair_value();
            // Margin of the mean, not mean of the margins
            let safety_margin_pct = safety_margin(fair_value, current_price);

            AggregateOutcome {
                fair_value,
                safety_margin_pct,
                projected_series: results.neutral.projected_series.clone(),
                scenario_results: Some(results),
            }
        }
    }
}
