//! Valuation core: projection, scenario aggregation and result records
//!
//! Everything in this module is pure. No clock, cache, network or storage
//! access happens here; callers pass the creation instant explicitly.

mod aggregate;
mod currency;
mod formulas;
mod metric;
mod projector;
mod result;
mod types;

pub use aggregate::{aggregate, AggregateOutcome, ScenarioResultSet};
pub use currency::Currency;
pub use formulas::{compound, discount, potential_cagr, safety_margin, scenario_cagr, terminal_price};
pub use metric::{Metric, UndefinedReason};
pub use projector::{project, ProjectionOutcome};
pub use result::{build, calendar_years, group_by_stock, result_id, MethodResults, ValuationResult};
pub use types::{NamedScenarios, Scenario, ScenarioAssumptions, ValuationInputs, ValuationMethod};

use chrono::{DateTime, Utc};
use log::{debug, warn};

/// Aggregate the inputs and build the result record in one step
pub fn evaluate(method: ValuationMethod, inputs: ValuationInputs, created_at: DateTime<Utc>) -> ValuationResult {
    let outcome = aggregate(
        inputs.metric_value,
        inputs.current_price,
        inputs.years_to_project,
        &inputs.base,
        inputs.scenarios.as_ref(),
    );

    debug!(
        "{} {}: fair value {:.4}, margin {:.4} ({} years, multi-scenario: {})",
        inputs.stock_name,
        method,
        outcome.fair_value,
        outcome.safety_margin_pct,
        inputs.years_to_project,
        inputs.is_multi_scenario(),
    );

    let result = build(method, inputs, outcome, created_at);
    if result.has_undefined() {
        warn!(
            "{}: undefined figure (fair value: {:?}, margin: {:?})",
            result.id,
            result.fair_value.reason(),
            result.safety_margin_pct.reason(),
        );
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_evaluate_multi_scenario_end_to_end() {
        let inputs = ValuationInputs {
            stock_name: "ACME".to_string(),
            current_price: 150.0,
            metric_value: 10.0,
            years_to_project: 5,
            currency: Currency::default(),
            base: ScenarioAssumptions::new(15.0, 12.0, 15.0),
            scenarios: Some(NamedScenarios {
                pessimistic: ScenarioAssumptions::new(10.0, 12.0, 12.0),
                neutral: ScenarioAssumptions::new(15.0, 12.0, 15.0),
                optimistic: ScenarioAssumptions::new(20.0, 12.0, 18.0),
            }),
        };
        let at = Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap();
        let result = evaluate(ValuationMethod::Ocf, inputs, at);

        let scenarios = result.scenario_results.as_ref().unwrap();
        assert_eq!(result.projected_series, scenarios.neutral.projected_series);
        assert_eq!(result.years.first(), Some(&2026));
        assert!(!result.has_undefined());
    }
}
