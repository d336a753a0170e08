//! Equity Valuation CLI
//!
//! Command-line interface for single valuations: from flags, from a JSON
//! request file, or seeded from a market-data lookup by ticker symbol.

use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use clap::Parser;
use equity_valuation::{
    inputs::load_requests_json,
    market::AlphaVantageClient,
    report::{format_currency, format_percentage, render_summary, write_projection_csv},
    group_by_stock, CalculatorConfig, Currency, MethodResults, Metric, ScenarioAssumptions, ValuationMethod,
    ValuationRequest, ValuationResult, ValuationRunner,
};
use std::fs::File;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "equity_valuation", version, about = "Project a per-share metric to a fair value and safety margin")]
struct Args {
    /// Company name
    #[arg(long, default_value = "Unnamed")]
    name: String,

    /// Current share price
    #[arg(long)]
    price: Option<f64>,

    /// Current per-share metric (EPS, OCF or FCF per share)
    #[arg(long)]
    metric: Option<f64>,

    /// Which metric --metric describes: eps, ocf or fcf
    #[arg(long, default_value = "eps")]
    method: ValuationMethod,

    /// Projection horizon in years
    #[arg(long)]
    years: Option<u32>,

    /// Estimated annual growth (%)
    #[arg(long)]
    growth: Option<f64>,

    /// Desired annual return (%)
    #[arg(long = "return")]
    desired_return: Option<f64>,

    /// Terminal multiple applied to the final-year metric
    #[arg(long)]
    multiple: Option<f64>,

    /// Currency code (EUR, USD, GBP, CHF, JPY)
    #[arg(long)]
    currency: Option<String>,

    /// Average the pessimistic / neutral / optimistic presets
    #[arg(long)]
    scenarios: bool,

    /// JSON file with one request or an array of requests
    #[arg(long, conflicts_with_all = ["price", "metric", "symbol"])]
    input: Option<PathBuf>,

    /// Look up price and latest annual EPS for a ticker symbol
    #[arg(long, conflicts_with = "price")]
    symbol: Option<String>,

    /// Search for ticker symbols matching a company name and exit
    #[arg(long)]
    search: Option<String>,

    /// Write the projection table of the active result to this CSV file
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Print results as JSON instead of text
    #[arg(long)]
    json: bool,
}

fn apply_overrides(config: &mut CalculatorConfig, args: &Args) -> Result<()> {
    if let Some(years) = args.years {
        config.years_to_project = years;
    }
    config.base = ScenarioAssumptions::new(
        args.growth.unwrap_or(config.base.estimated_growth_pct),
        args.desired_return.unwrap_or(config.base.desired_return_pct),
        args.multiple.unwrap_or(config.base.terminal_multiple),
    );
    if let Some(code) = &args.currency {
        config.currency = Currency::by_code(code).ok_or_else(|| anyhow!("Unknown currency: {}", code))?;
    }
    Ok(())
}

fn market_client(config: &CalculatorConfig) -> Result<AlphaVantageClient> {
    let api_key = config
        .alpha_vantage_api_key
        .clone()
        .ok_or_else(|| anyhow!("ALPHA_VANTAGE_API_KEY is not set"))?;
    Ok(AlphaVantageClient::new(api_key, config.market_cache_ttl))
}

fn print_projection(result: &ValuationResult) {
    let currency = &result.inputs.currency;

    println!("Projection Results ({} years):", result.inputs.years_to_project);
    println!("{:>6} {:>14} {:>14}", "Year", result.method.label(), "Growth");
    println!("{}", "-".repeat(36));

    let mut previous: Option<f64> = None;
    for (year, value) in result.years.iter().zip(&result.projected_series) {
        let growth = match previous {
            Some(p) if p != 0.0 => format_percentage(Metric::from_f64((value - p) / p.abs() * 100.0)),
            _ => String::new(),
        };
        println!("{:>6} {:>14.4} {:>14}", year, value, growth);
        previous = Some(*value);
    }

    println!("\nSummary:");
    println!("  Current Price: {}", format_currency(Metric::from_f64(result.current_price), currency));
    println!("  Fair Value:    {}", format_currency(result.fair_value, currency));
    println!("  Safety Margin: {}", format_percentage(result.safety_margin_pct));
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();
    let mut config = CalculatorConfig::from_env();
    apply_overrides(&mut config, &args)?;

    if let Some(query) = &args.search {
        let client = market_client(&config)?;
        let matches = client.search(query).await?;
        println!("{:<12} {:<40} {:<10} {:<20} {:<5}", "Symbol", "Name", "Type", "Region", "Ccy");
        println!("{}", "-".repeat(91));
        for m in &matches {
            println!("{:<12} {:<40} {:<10} {:<20} {:<5}", m.symbol, m.name, m.kind, m.region, m.currency);
        }
        return Ok(());
    }

    let runner = ValuationRunner::with_config(config);
    let created_at = Utc::now();

    // One (active method, method table) pair per company
    let groups: Vec<(ValuationMethod, MethodResults)> = if let Some(path) = &args.input {
        let requests = load_requests_json(path)
            .with_context(|| format!("Failed to load requests from {}", path.display()))?;
        if requests.is_empty() {
            return Err(anyhow!("{} contains no requests", path.display()));
        }
        group_by_stock(&runner.run_batch(&requests, created_at))
    } else {
        let (stock_name, price, metric, currency) = match &args.symbol {
            Some(symbol) => {
                let client = market_client(runner.config())?;
                let quote = client.quote(symbol).await?;
                println!("{} ({}): {} {:.2}", quote.name, quote.symbol, quote.currency.code, quote.price);
                if let Some(sector) = &quote.sector {
                    println!("  Sector: {}", sector);
                }
                let metric = args.metric.unwrap_or(quote.metric_value);
                (quote.name, quote.price, metric, quote.currency)
            }
            None => {
                let price = args.price.ok_or_else(|| anyhow!("--price is required without --symbol or --input"))?;
                let metric = args.metric.ok_or_else(|| anyhow!("--metric is required without --symbol or --input"))?;
                (args.name.clone(), price, metric, runner.config().currency.clone())
            }
        };

        let config = runner.config();
        let mut inputs = if args.scenarios {
            config.scenario_inputs_for(&stock_name, price, metric)
        } else {
            config.inputs_for(&stock_name, price, metric)
        };
        inputs.currency = currency;

        let request = ValuationRequest { method: args.method, inputs };
        let mut table = MethodResults::new();
        table.insert(runner.run(&request, created_at));
        vec![(args.method, table)]
    };

    if args.csv.is_some() && groups.len() > 1 {
        return Err(anyhow!(
            "--csv writes a single projection but the input covers {} companies",
            groups.len()
        ));
    }

    if args.json {
        let tables: Vec<&MethodResults> = groups.iter().map(|(_, table)| table).collect();
        if let [table] = tables.as_slice() {
            println!("{}", serde_json::to_string_pretty(table)?);
        } else {
            println!("{}", serde_json::to_string_pretty(&tables)?);
        }
    } else {
        for (i, (active_method, table)) in groups.iter().enumerate() {
            if i > 0 {
                println!();
            }
            if let Some(result) = table.get(*active_method) {
                print_projection(result);
                println!();
            }
            print!("{}", render_summary(table, *active_method));
        }
    }

    if let (Some(path), Some((active_method, table))) = (&args.csv, groups.first()) {
        let result = table
            .get(*active_method)
            .ok_or_else(|| anyhow!("No {} result to write", active_method.label()))?;
        let file = File::create(path).with_context(|| format!("Unable to create {}", path.display()))?;
        write_projection_csv(file, result)?;
        println!("\nProjection written to: {}", path.display());
    }

    Ok(())
}
