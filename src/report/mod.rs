//! Plain-text and CSV valuation reports

use std::fmt::{self, Write as _};
use std::io::{self, Write};

use crate::valuation::{
    group_by_stock, scenario_cagr, terminal_price, Currency, Metric, MethodResults, UndefinedReason,
    ValuationMethod, ValuationResult,
};

/// Two decimals with the currency symbol; undefined renders as `—`
pub fn format_currency(value: Metric, currency: &Currency) -> String {
    match value {
        Metric::Value(v) if v < 0.0 => format!("-{}{:.2}", currency.symbol, -v),
        Metric::Value(v) => format!("{}{:.2}", currency.symbol, v),
        Metric::Undefined(_) => "—".to_string(),
    }
}

/// Signed percentage with two decimals; undefined renders as `—`
pub fn format_percentage(value: Metric) -> String {
    match value {
        Metric::Value(v) => format!("{:+.2}%", v),
        Metric::Undefined(_) => "—".to_string(),
    }
}

/// Plain-text report for one company
///
/// The active method gets the detailed block (summary, projection table and
/// per-scenario figures); every calculated method appears in the comparison.
pub fn render_summary(results: &MethodResults, active_method: ValuationMethod) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail
    if write_summary(&mut out, results, active_method).is_err() {
        out.clear();
    }
    out
}

/// One report per company in `results`, in order of first appearance
///
/// Each company's first method is its active method. Results for different
/// companies are never compared or averaged together.
pub fn render_reports(results: &[ValuationResult]) -> Vec<String> {
    group_by_stock(results)
        .into_iter()
        .map(|(active_method, table)| render_summary(&table, active_method))
        .collect()
}

fn write_summary(out: &mut String, results: &MethodResults, active_method: ValuationMethod) -> fmt::Result {
    let active = match results.get(active_method).or_else(|| results.iter().next()) {
        Some(result) => result,
        None => return writeln!(out, "No valuation calculated."),
    };
    let currency = &active.inputs.currency;

    writeln!(out, "Valuation Report: {}", active.stock_name())?;
    writeln!(out, "{}", "=".repeat(60))?;
    writeln!(out, "Date: {}", active.timestamp.format("%Y-%m-%d %H:%M UTC"))?;
    writeln!(out, "Method: {}", active.method.label())?;
    writeln!(out)?;

    writeln!(out, "Summary:")?;
    writeln!(out, "  Current Price:  {}", format_currency(Metric::from_f64(active.current_price), currency))?;
    writeln!(out, "  Fair Value:     {}", format_currency(active.fair_value, currency))?;
    writeln!(out, "  Safety Margin:  {}", format_percentage(active.safety_margin_pct))?;
    if let Some(reason) = active.fair_value.reason().or_else(|| active.safety_margin_pct.reason()) {
        writeln!(out, "  Note: {}", reason)?;
    }
    writeln!(out)?;

    writeln!(out, "Projected {}:", active.method.label())?;
    writeln!(out, "{:>6} {:>14}", "Year", "Value")?;
    writeln!(out, "{}", "-".repeat(21))?;
    for (year, value) in active.years.iter().zip(&active.projected_series) {
        writeln!(out, "{:>6} {:>14.2}", year, value)?;
    }
    writeln!(out)?;

    if let Some(scenarios) = &active.inputs.scenarios {
        let years = active.inputs.years_to_project;
        let metric = active.inputs.metric_value;
        let price = active.current_price;

        writeln!(out, "Scenarios:")?;
        writeln!(
            out,
            "{:<12} {:>8} {:>8} {:>8} {:>14} {:>14} {:>10}",
            "Scenario", "Growth", "Return", "Multiple", "Fair Value", "Proj. Price", "CAGR"
        )?;
        writeln!(out, "{}", "-".repeat(80))?;
        for (scenario, assumptions) in scenarios.iter() {
            let fair = active
                .scenario_results
                .as_ref()
                .map(|set| set.get(scenario).fair_value)
                .unwrap_or(Metric::Undefined(UndefinedReason::NonFinite));
            let projected = terminal_price(
                metric,
                assumptions.estimated_growth_pct,
                assumptions.terminal_multiple,
                years,
            );
            writeln!(
                out,
                "{:<12} {:>7.1}% {:>7.1}% {:>7.1}x {:>14} {:>14} {:>10}",
                scenario.label(),
                assumptions.estimated_growth_pct,
                assumptions.desired_return_pct,
                assumptions.terminal_multiple,
                format_currency(fair, currency),
                format_currency(projected, currency),
                format_percentage(scenario_cagr(price, metric, assumptions, years)),
            )?;
        }
        writeln!(out)?;
    }

    if results.len() > 1 {
        writeln!(out, "Method Comparison:")?;
        writeln!(out, "{:<10} {:>14} {:>14}", "Method", "Fair Value", "Margin")?;
        writeln!(out, "{}", "-".repeat(40))?;
        for result in results.iter() {
            writeln!(
                out,
                "{:<10} {:>14} {:>14}",
                result.method.label(),
                format_currency(result.fair_value, currency),
                format_percentage(result.safety_margin_pct),
            )?;
        }
        if let (Some(avg), Some(margin)) = (
            results.average_fair_value(),
            results.average_safety_margin(active.current_price),
        ) {
            writeln!(
                out,
                "{:<10} {:>14} {:>14}",
                "Average",
                format_currency(avg, currency),
                format_percentage(margin),
            )?;
        }
    }

    Ok(())
}

/// Write the projection table of one result as CSV
pub fn write_projection_csv<W: Write>(writer: W, result: &ValuationResult) -> io::Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);

    let mut header = vec!["Year".to_string(), result.method.label().to_string()];
    if let Some(set) = &result.scenario_results {
        header.extend(set.iter().map(|(scenario, _)| scenario.label().to_string()));
    }
    wtr.write_record(&header)?;

    for (i, year) in result.years.iter().enumerate() {
        let mut row = vec![
            year.to_string(),
            result.projected_series.get(i).map(|v| format!("{:.6}", v)).unwrap_or_default(),
        ];
        if let Some(set) = &result.scenario_results {
            row.extend(
                set.iter()
                    .map(|(_, outcome)| outcome.projected_series.get(i).map(|v| format!("{:.6}", v)).unwrap_or_default()),
            );
        }
        wtr.write_record(&row)?;
    }

    wtr.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_scenarios;
    use crate::valuation::{evaluate, ScenarioAssumptions, ValuationInputs};
    use chrono::{TimeZone, Utc};

    fn inputs(price: f64, scenarios: bool) -> ValuationInputs {
        ValuationInputs {
            stock_name: "ACME".to_string(),
            current_price: price,
            metric_value: 10.0,
            years_to_project: 5,
            currency: Currency::eur(),
            base: ScenarioAssumptions::new(15.0, 12.0, 15.0),
            scenarios: if scenarios { Some(default_scenarios()) } else { None },
        }
    }

    fn created() -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, 9, 30, 0).unwrap()
    }

    #[test]
    fn test_formatting() {
        let eur = Currency::eur();
        assert_eq!(format_currency(Metric::Value(171.1947), &eur), "€171.19");
        assert_eq!(format_currency(Metric::Value(-2.5), &eur), "-€2.50");
        assert_eq!(format_currency(Metric::undefined(UndefinedReason::NonFinite), &eur), "—");

        assert_eq!(format_percentage(Metric::Value(14.1298)), "+14.13%");
        assert_eq!(format_percentage(Metric::Value(-3.0)), "-3.00%");
        assert_eq!(format_percentage(Metric::undefined(UndefinedReason::NonPositivePrice)), "—");
    }

    #[test]
    fn test_summary_single_method() {
        let mut results = MethodResults::new();
        results.insert(evaluate(ValuationMethod::Eps, inputs(150.0, false), created()));

        let text = render_summary(&results, ValuationMethod::Eps);
        assert!(text.contains("Valuation Report: ACME"));
        assert!(text.contains("Fair Value:     €171.19"));
        assert!(text.contains("Safety Margin:  +14.13%"));
        assert!(text.contains("  2031"));
        assert!(!text.contains("Method Comparison"));
    }

    #[test]
    fn test_summary_undefined_margin() {
        let mut results = MethodResults::new();
        results.insert(evaluate(ValuationMethod::Fcf, inputs(0.0, false), created()));

        let text = render_summary(&results, ValuationMethod::Fcf);
        assert!(text.contains("Safety Margin:  —"));
        assert!(text.contains("current price is zero or negative"));
    }

    #[test]
    fn test_summary_scenarios_and_comparison() {
        let mut results = MethodResults::new();
        results.insert(evaluate(ValuationMethod::Eps, inputs(150.0, true), created()));
        results.insert(evaluate(ValuationMethod::Ocf, inputs(150.0, false), created()));

        let text = render_summary(&results, ValuationMethod::Eps);
        assert!(text.contains("Scenarios:"));
        for label in ["Pessimistic", "Neutral", "Optimistic"] {
            assert!(text.contains(label), "missing {}", label);
        }
        assert!(text.contains("Method Comparison:"));
        assert!(text.contains("OCF/Share"));
        assert!(text.contains("Average"));
    }

    #[test]
    fn test_reports_are_per_company() {
        let company = |name: &str, method: ValuationMethod, price: f64, metric: f64| {
            let mut inp = inputs(price, false);
            inp.stock_name = name.to_string();
            inp.metric_value = metric;
            evaluate(method, inp, created())
        };
        let batch = vec![
            company("ACME", ValuationMethod::Eps, 150.0, 10.0),
            company("GLOBEX", ValuationMethod::Eps, 20.0, 2.0),
            company("INITECH", ValuationMethod::Ocf, 30.0, 3.0),
        ];

        let reports = render_reports(&batch);
        assert_eq!(reports.len(), 3);
        assert!(reports[0].starts_with("Valuation Report: ACME"));
        assert!(reports[1].starts_with("Valuation Report: GLOBEX"));
        assert!(reports[2].starts_with("Valuation Report: INITECH"));
        assert!(reports[2].contains("Method: OCF/Share"));

        // No cross-company comparison or average
        assert!(reports.iter().all(|r| !r.contains("Method Comparison") && !r.contains("Average")));
    }

    #[test]
    fn test_reports_combine_methods_of_one_company() {
        let batch = vec![
            evaluate(ValuationMethod::Fcf, inputs(150.0, false), created()),
            evaluate(ValuationMethod::Eps, inputs(150.0, false), created()),
        ];

        let reports = render_reports(&batch);
        assert_eq!(reports.len(), 1);
        assert!(reports[0].contains("Method: FCF/Share"));
        assert!(reports[0].contains("Method Comparison:"));
    }

    #[test]
    fn test_empty_summary() {
        assert_eq!(render_summary(&MethodResults::new(), ValuationMethod::Eps), "No valuation calculated.\n");
    }

    #[test]
    fn test_projection_csv() {
        let result = evaluate(ValuationMethod::Eps, inputs(150.0, true), created());
        let mut buf = Vec::new();
        write_projection_csv(&mut buf, &result).unwrap();

        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 7);
        assert_eq!(lines[0], "Year,EPS,Pessimistic,Neutral,Optimistic");
        assert!(lines[1].starts_with("2026,10.000000,10.000000,10.000000,10.000000"));
    }
}
