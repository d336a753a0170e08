//! Standalone valuation formulas
//!
//! These are used both by the projector and independently by reports
//! (projected price per scenario, potential CAGR from today's price).

use super::metric::{Metric, UndefinedReason};
use super::types::ScenarioAssumptions;

/// `base^years` for any `u32` horizon
///
/// `powi` takes an `i32`; horizons beyond `i32::MAX` go through `powf`.
pub(crate) fn pow_years(base: f64, years: u32) -> f64 {
    match i32::try_from(years) {
        Ok(n) => base.powi(n),
        Err(_) => base.powf(f64::from(years)),
    }
}

/// Projected metric after `years` of compound growth
pub fn compound(metric_value: f64, growth_pct: f64, years: u32) -> f64 {
    metric_value * pow_years(1.0 + growth_pct / 100.0, years)
}

/// Future price implied by growing the metric and applying the terminal multiple
///
/// `metric × (1 + g/100)^years × multiple`
pub fn terminal_price(metric_value: f64, growth_pct: f64, terminal_multiple: f64, years: u32) -> Metric {
    Metric::from_f64(compound(metric_value, growth_pct, years) * terminal_multiple)
}

/// Present value of `future_value` discounted at `discount_pct` per year
pub fn discount(future_value: f64, discount_pct: f64, years: u32) -> Metric {
    if years == 0 {
        return Metric::from_f64(future_value);
    }
    Metric::from_f64(future_value / pow_years(1.0 + discount_pct / 100.0, years))
}

/// Percentage by which `fair_value` exceeds `current_price`
///
/// Positive means undervalued. Undefined for a zero or negative price.
pub fn safety_margin(fair_value: Metric, current_price: f64) -> Metric {
    if !(current_price > 0.0) {
        return Metric::undefined(UndefinedReason::NonPositivePrice);
    }
    fair_value.map(|fair| (fair - current_price) / current_price * 100.0)
}

/// Annualized return needed to go from `current_price` to `future_price`
///
/// `((future / current)^(1/years) − 1) × 100`
pub fn potential_cagr(current_price: f64, future_price: f64, years: u32) -> Metric {
    if !(current_price > 0.0) {
        return Metric::undefined(UndefinedReason::NonPositivePrice);
    }
    if years == 0 {
        return Metric::undefined(UndefinedReason::ZeroYears);
    }
    let ratio = future_price / current_price;
    if ratio < 0.0 {
        return Metric::undefined(UndefinedReason::NegativePriceRatio);
    }
    Metric::from_f64((ratio.powf(1.0 / years as f64) - 1.0) * 100.0)
}

/// Potential CAGR from today's price to the terminal price of one scenario
pub fn scenario_cagr(
    current_price: f64,
    metric_value: f64,
    assumptions: &ScenarioAssumptions,
    years: u32,
) -> Metric {
    terminal_price(
        metric_value,
        assumptions.estimated_growth_pct,
        assumptions.terminal_multiple,
        years,
    )
    .and_then(|future| potential_cagr(current_price, future, years))
}
