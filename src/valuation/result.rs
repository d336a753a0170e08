//! Immutable valuation result records

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

use super::aggregate::{AggregateOutcome, ScenarioResultSet};
use super::formulas::safety_margin;
use super::metric::Metric;
use super::types::{ValuationInputs, ValuationMethod};

/// Report-ready result of one calculation for one method
///
/// Never mutated after construction; a recompute produces a new result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValuationResult {
    /// `{stock_name}-{method}-{creation micros}`; advisory, not a storage key
    pub id: String,

    /// Creation instant (build time, not persist time)
    pub timestamp: DateTime<Utc>,

    pub method: ValuationMethod,
    pub inputs: ValuationInputs,
    pub fair_value: Metric,
    pub current_price: f64,

    #[serde(alias = "safetyMargin")]
    pub safety_margin_pct: Metric,

    #[serde(alias = "projectedValues")]
    pub projected_series: Vec<f64>,

    /// Calendar years matching `projected_series`, starting at the creation year
    pub years: Vec<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scenario_results: Option<ScenarioResultSet>,

    /// Set by the document store when saved, never by the engine
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

impl ValuationResult {
    pub fn stock_name(&self) -> &str {
        &self.inputs.stock_name
    }

    /// Copy of this result stamped with its owner
    pub fn owned_by(&self, user_id: &str) -> Self {
        Self {
            user_id: Some(user_id.to_string()),
            ..self.clone()
        }
    }

    /// Whether any reported figure is undefined
    pub fn has_undefined(&self) -> bool {
        !self.fair_value.is_defined() || !self.safety_margin_pct.is_defined()
    }
}

/// Advisory result id for a stock/method at a creation instant
pub fn result_id(stock_name: &str, method: ValuationMethod, created_at: DateTime<Utc>) -> String {
    format!("{}-{}-{}", stock_name, method.code(), created_at.timestamp_micros())
}

/// `years + 1` consecutive calendar years starting at `start_year`
///
/// Saturates at `i32::MAX` instead of wrapping.
pub fn calendar_years(start_year: i32, years: u32) -> Vec<i32> {
    (0..=years)
        .map(|i| {
            let year = i64::from(start_year) + i64::from(i);
            i32::try_from(year).unwrap_or(i32::MAX)
        })
        .collect()
}

/// Assemble the immutable result of a calculation
///
/// `created_at` is supplied by the caller; the engine never reads the clock.
pub fn build(
    method: ValuationMethod,
    inputs: ValuationInputs,
    outcome: AggregateOutcome,
    created_at: DateTime<Utc>,
) -> ValuationResult {
    ValuationResult {
        id: result_id(&inputs.stock_name, method, created_at),
        timestamp: created_at,
        method,
        fair_value: outcome.fair_value,
        current_price: inputs.current_price,
        safety_margin_pct: outcome.safety_margin_pct,
        projected_series: outcome.projected_series,
        years: calendar_years(created_at.year(), inputs.years_to_project),
        scenario_results: outcome.scenario_results,
        user_id: None,
        inputs,
    }
}

/// Latest result per method for one company
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MethodResults {
    pub eps: Option<ValuationResult>,
    pub ocf: Option<ValuationResult>,
    pub fcf: Option<ValuationResult>,
}

impl MethodResults {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, method: ValuationMethod) -> Option<&ValuationResult> {
        self.slot(method).as_ref()
    }

    fn slot(&self, method: ValuationMethod) -> &Option<ValuationResult> {
        match method {
            ValuationMethod::Eps => &self.eps,
            ValuationMethod::Ocf => &self.ocf,
            ValuationMethod::Fcf => &self.fcf,
        }
    }

    fn slot_mut(&mut self, method: ValuationMethod) -> &mut Option<ValuationResult> {
        match method {
            ValuationMethod::Eps => &mut self.eps,
            ValuationMethod::Ocf => &mut self.ocf,
            ValuationMethod::Fcf => &mut self.fcf,
        }
    }

    /// Store a result under its method, returning the superseded one
    pub fn insert(&mut self, result: ValuationResult) -> Option<ValuationResult> {
        self.slot_mut(result.method).replace(result)
    }

    pub fn remove(&mut self, method: ValuationMethod) -> Option<ValuationResult> {
        self.slot_mut(method).take()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Present results in eps → ocf → fcf order
    pub fn iter(&self) -> impl Iterator<Item = &ValuationResult> {
        ValuationMethod::ALL.into_iter().filter_map(move |m| self.get(m))
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Stamp every present result with its owner
    pub fn owned_by(&self, user_id: &str) -> Self {
        let mut owned = Self::default();
        for result in self.iter() {
            owned.insert(result.owned_by(user_id));
        }
        owned
    }

    /// Mean fair value across methods that have a result
    ///
    /// `None` when no method has been calculated; undefined when any present
    /// result has an undefined fair value.
    pub fn average_fair_value(&self) -> Option<Metric> {
        if self.is_empty() {
            return None;
        }
        let mut sum = 0.0;
        for result in self.iter() {
            match result.fair_value {
                Metric::Value(v) => sum += v,
                undefined => return Some(undefined),
            }
        }
        Some(Metric::from_f64(sum / self.len() as f64))
    }

    /// Safety margin of the cross-method average against `current_price`
    pub fn average_safety_margin(&self, current_price: f64) -> Option<Metric> {
        self.average_fair_value().map(|avg| safety_margin(avg, current_price))
    }
}

/// Split results into one method table per company, in order of first appearance
///
/// Each table is paired with the method first seen for that company. Within a
/// company a later result for the same method supersedes the earlier one.
pub fn group_by_stock<'a, I>(results: I) -> Vec<(ValuationMethod, MethodResults)>
where
    I: IntoIterator<Item = &'a ValuationResult>,
{
    let mut groups: Vec<(ValuationMethod, MethodResults)> = Vec::new();
    for result in results {
        let existing = groups
            .iter_mut()
            .find(|(_, table)| table.iter().any(|r| r.stock_name() == result.stock_name()));
        match existing {
            Some((_, table)) => {
                table.insert(result.clone());
            }
            None => {
                let mut table = MethodResults::new();
                table.insert(result.clone());
                groups.push((result.method, table));
            }
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::valuation::aggregate::aggregate;
    use crate::valuation::currency::Currency;
    use crate::valuation::types::ScenarioAssumptions;
    use approx::assert_abs_diff_eq;
    use chrono::TimeZone;

    fn inputs(stock: &str, metric: f64) -> ValuationInputs {
        ValuationInputs {
            stock_name: stock.to_string(),
            current_price: 150.0,
            metric_value: metric,
            years_to_project: 5,
            currency: Currency::usd(),
            base: ScenarioAssumptions::new(15.0, 12.0, 15.0),
            scenarios: None,
        }
    }

    fn make(method: ValuationMethod, metric: f64, at: DateTime<Utc>) -> ValuationResult {
        let inp = inputs("ACME", metric);
        let outcome = aggregate(inp.metric_value, inp.current_price, inp.years_to_project, &inp.base, None);
        build(method, inp, outcome, at)
    }

    #[test]
    fn test_build_stamps_identity_and_years() {
        let at = Utc.with_ymd_and_hms(2026, 3, 14, 9, 30, 0).unwrap();
        let result = make(ValuationMethod::Eps, 10.0, at);

        assert!(result.id.starts_with("ACME-eps-"));
        assert_eq!(result.timestamp, at);
        assert_eq!(result.years, vec![2026, 2027, 2028, 2029, 2030, 2031]);
        assert_eq!(result.years.len(), result.projected_series.len());
        assert_eq!(result.current_price, 150.0);
        assert!(result.user_id.is_none());
    }

    #[test]
    fn test_calendar_years_saturate() {
        assert_eq!(calendar_years(2026, 2), vec![2026, 2027, 2028]);
        assert_eq!(calendar_years(i32::MAX - 1, 3), vec![i32::MAX - 1, i32::MAX, i32::MAX, i32::MAX]);
    }

    #[test]
    fn test_ids_differ_across_instants() {
        let t1 = Utc.with_ymd_and_hms(2026, 3, 14, 9, 30, 0).unwrap();
        let t2 = t1 + chrono::Duration::milliseconds(1);

        let a = make(ValuationMethod::Fcf, 10.0, t1);
        let b = make(ValuationMethod::Fcf, 10.0, t2);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_method_table_supersedes_and_averages() {
        let at = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let mut table = MethodResults::new();
        assert!(table.average_fair_value().is_none());

        table.insert(make(ValuationMethod::Eps, 10.0, at));
        table.insert(make(ValuationMethod::Ocf, 20.0, at));
        assert_eq!(table.len(), 2);

        let eps = table.get(ValuationMethod::Eps).unwrap().fair_value.value().unwrap();
        let ocf = table.get(ValuationMethod::Ocf).unwrap().fair_value.value().unwrap();
        assert_abs_diff_eq!(table.average_fair_value().unwrap().value().unwrap(), (eps + ocf) / 2.0, epsilon = 1e-9);

        let replaced = table.insert(make(ValuationMethod::Eps, 12.0, at));
        assert!(replaced.is_some());
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(ValuationMethod::Eps).unwrap().inputs.metric_value, 12.0);

        let margin = table.average_safety_margin(0.0).unwrap();
        assert!(!margin.is_defined());
    }

    #[test]
    fn test_group_by_stock_keeps_companies_apart() {
        let at = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let acme = make(ValuationMethod::Eps, 10.0, at);
        let mut globex = make(ValuationMethod::Eps, 2.0, at);
        globex.inputs.stock_name = "GLOBEX".to_string();
        let mut initech = make(ValuationMethod::Ocf, 3.0, at);
        initech.inputs.stock_name = "INITECH".to_string();
        let acme_fcf = make(ValuationMethod::Fcf, 8.0, at);

        let groups = group_by_stock([&acme, &globex, &initech, &acme_fcf]);
        assert_eq!(groups.len(), 3);

        let names: Vec<&str> = groups
            .iter()
            .map(|(_, table)| table.iter().next().unwrap().stock_name())
            .collect();
        assert_eq!(names, vec!["ACME", "GLOBEX", "INITECH"]);

        let (active, acme_table) = &groups[0];
        assert_eq!(*active, ValuationMethod::Eps);
        assert_eq!(acme_table.len(), 2);
        assert_eq!(acme_table.get(ValuationMethod::Eps), Some(&acme));
        assert_eq!(groups[2].0, ValuationMethod::Ocf);
        assert_eq!(groups[1].1.len(), 1);
    }

    #[test]
    fn test_owned_by_stamps_all_results() {
        let at = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let mut table = MethodResults::new();
        table.insert(make(ValuationMethod::Eps, 10.0, at));
        table.insert(make(ValuationMethod::Fcf, 8.0, at));

        let owned = table.owned_by("user-1");
        assert!(owned.iter().all(|r| r.user_id.as_deref() == Some("user-1")));
        assert!(table.iter().all(|r| r.user_id.is_none()));
    }
}
