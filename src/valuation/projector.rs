//! Single-scenario projection of a per-share metric to a discounted fair value

use serde::{Deserialize, Serialize};

use super::formulas::{discount, pow_years, safety_margin};
use super::metric::Metric;
use super::types::ScenarioAssumptions;

/// Result of projecting one scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionOutcome {
    /// Metric per year, index 0 = starting metric; length = years + 1
    #[serde(alias = "projectedValues")]
    pub projected_series: Vec<f64>,

    /// Terminal-year metric times the multiple, discounted back at the desired return
    pub fair_value: Metric,

    #[serde(alias = "safetyMargin")]
    pub safety_margin_pct: Metric,
}

impl ProjectionOutcome {
    /// Last projected metric value
    pub fn terminal_metric(&self) -> f64 {
        self.projected_series.last().copied().unwrap_or(0.0)
    }
}

/// Project `metric_value` over `years` under `assumptions`
///
/// 1. `series[i] = metric × (1 + g/100)^i` for `i = 0..=years`
/// 2. `terminal = series[years] × multiple`
/// 3. `fair = terminal / (1 + r/100)^years`
/// 4. `margin = (fair − price) / price × 100`
pub fn project(
    metric_value: f64,
    assumptions: &ScenarioAssumptions,
    years: u32,
    current_price: f64,
) -> ProjectionOutcome {
    let growth = assumptions.growth_factor();

    let mut projected_series = Vec::with_capacity(years as usize + 1);
    let mut value = metric_value;
    projected_series.push(value);
    for year in 1..=years {
        // Recompute from the base each year so series[years] matches the closed form exactly
        value = metric_value * pow_years(growth, year);
        projected_series.push(value);
    }

    let terminal_value = Metric::from_f64(value * assumptions.terminal_multiple);
    let fair_value = terminal_value.and_then(|tv| discount(tv, assumptions.desired_return_pct, years));
    let safety_margin_pct = safety_margin(fair_value, current_price);

    ProjectionOutcome {
        projected_series,
        fair_value,
        safety_margin_pct,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::valuation::formulas::{potential_cagr, terminal_price};
    use crate::valuation::metric::UndefinedReason;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    #[test]
    fn test_zero_growth_zero_discount() {
        let a = ScenarioAssumptions::new(0.0, 0.0, 10.0);
        let out = project(100.0, &a, 5, 1000.0);

        assert_eq!(out.projected_series, vec![100.0; 6]);
        assert_abs_diff_eq!(out.fair_value.value().unwrap(), 1000.0, epsilon = 1e-9);
        assert_abs_diff_eq!(out.safety_margin_pct.value().unwrap(), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_worked_example() {
        let a = ScenarioAssumptions::new(15.0, 12.0, 15.0);
        let out = project(10.0, &a, 5, 150.0);

        assert_eq!(out.projected_series.len(), 6);
        assert_abs_diff_eq!(out.projected_series[5], 20.1136, epsilon = 1e-3);
        assert_abs_diff_eq!(out.terminal_metric() * 15.0, 301.7036, epsilon = 1e-3);
        assert_abs_diff_eq!(out.fair_value.value().unwrap(), 171.1947, epsilon = 1e-3);
        assert_abs_diff_eq!(out.safety_margin_pct.value().unwrap(), 14.1298, epsilon = 1e-3);
    }

    #[test]
    fn test_agrees_with_standalone_formulas() {
        let a = ScenarioAssumptions::new(15.0, 12.0, 15.0);
        let out = project(10.0, &a, 5, 150.0);

        let tp = terminal_price(10.0, 15.0, 15.0, 5).value().unwrap();
        assert_relative_eq!(tp, out.terminal_metric() * a.terminal_multiple, max_relative = 1e-12);

        // Discounting the terminal price at r for n years is the price whose CAGR to the terminal price is r
        let fair = out.fair_value.value().unwrap();
        let cagr = potential_cagr(fair, tp, 5).value().unwrap();
        assert_abs_diff_eq!(cagr, 12.0, epsilon = 1e-9);
    }

    #[test]
    fn test_zero_years_single_point() {
        let a = ScenarioAssumptions::new(25.0, 40.0, 12.0);
        let out = project(8.0, &a, 0, 50.0);

        assert_eq!(out.projected_series, vec![8.0]);
        assert_eq!(out.fair_value, Metric::Value(96.0));
    }

    #[test]
    fn test_series_endpoints_and_monotonicity() {
        for &(growth, years) in &[(7.5, 10u32), (-20.0, 8), (0.0, 3), (-100.0, 4)] {
            let a = ScenarioAssumptions::new(growth, 10.0, 12.0);
            let out = project(4.2, &a, years, 30.0);

            assert_eq!(out.projected_series[0], 4.2);
            let expected_last = 4.2 * (1.0 + growth / 100.0).powi(years as i32);
            assert_relative_eq!(out.projected_series[years as usize], expected_last, max_relative = 1e-12);

            let increasing = out.projected_series.windows(2).all(|w| w[1] > w[0]);
            assert_eq!(increasing, growth > 0.0, "growth {}", growth);
        }
    }

    #[test]
    fn test_zero_price_margin_is_undefined() {
        let a = ScenarioAssumptions::new(10.0, 10.0, 10.0);
        let out = project(5.0, &a, 5, 0.0);

        assert!(out.fair_value.is_defined());
        assert_eq!(out.safety_margin_pct.reason(), Some(UndefinedReason::NonPositivePrice));
    }

    #[test]
    fn test_negative_metric_is_accepted() {
        let a = ScenarioAssumptions::new(10.0, 10.0, 10.0);
        let out = project(-2.0, &a, 3, 40.0);

        assert!(out.fair_value.value().unwrap() < 0.0);
        assert!(out.safety_margin_pct.value().unwrap() < -100.0);
    }

    #[test]
    fn test_total_loss_discount_rate_is_undefined() {
        let a = ScenarioAssumptions::new(10.0, -100.0, 10.0);
        let out = project(5.0, &a, 5, 40.0);

        assert_eq!(out.fair_value.reason(), Some(UndefinedReason::NonFinite));
        assert_eq!(out.safety_margin_pct.reason(), Some(UndefinedReason::NonFinite));
    }
}
