//! Market-data lookup collaborator
//!
//! Produces the numbers a valuation starts from (price, currency, latest EPS).
//! The valuation core accepts whatever this returns without revalidating it.

mod alpha_vantage;
mod cache;

pub use alpha_vantage::{
    check_api_errors, parse_global_quote, parse_latest_eps, parse_overview, parse_search,
    AlphaVantageClient, Overview, DEFAULT_BASE_URL, MIN_SEARCH_CHARS,
};
pub use cache::{Clock, ManualClock, ResponseCache, SystemClock};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::valuation::{Currency, ScenarioAssumptions, ValuationInputs};

#[derive(Debug, Error)]
pub enum MarketDataError {
    #[error("a ticker symbol is required")]
    EmptySymbol,

    #[error("no market data for symbol {0}")]
    NotFound(String),

    #[error("API request limit reached, retry in a minute")]
    RateLimited,

    #[error("market data API error: {0}")]
    Api(String),

    #[error("invalid request URL: {0}")]
    InvalidUrl(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// One symbol-search candidate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolMatch {
    pub symbol: String,
    pub name: String,
    pub kind: String,
    pub region: String,
    pub currency: String,
}

/// Market snapshot for one symbol
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketQuote {
    pub symbol: String,
    pub name: String,
    pub price: f64,
    pub currency: Currency,
    /// Latest annual EPS (0 when the service has none)
    pub metric_value: f64,
    pub sector: Option<String>,
    pub industry: Option<String>,
    pub description: Option<String>,
}

impl MarketQuote {
    /// Single-scenario inputs seeded from this quote
    pub fn to_inputs(&self, years_to_project: u32, base: ScenarioAssumptions) -> ValuationInputs {
        ValuationInputs {
            stock_name: self.name.clone(),
            current_price: self.price,
            metric_value: self.metric_value,
            years_to_project,
            currency: self.currency.clone(),
            base,
            scenarios: None,
        }
    }
}
