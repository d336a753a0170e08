//! Alpha Vantage market-data client
//!
//! Response parsing is kept separate from HTTP so it can be tested against
//! captured payloads. All requests read through a `ResponseCache` keyed by URL.

use log::{debug, info, warn};
use reqwest::{Client, Url};
use serde_json::Value;
use std::sync::Mutex;
use std::time::Duration;

use super::cache::{Clock, ResponseCache, SystemClock};
use super::{MarketDataError, MarketQuote, SymbolMatch};
use crate::valuation::Currency;

pub const DEFAULT_BASE_URL: &str = "https://www.alphavantage.co/query";

/// Minimum query length before a symbol search is sent
pub const MIN_SEARCH_CHARS: usize = 2;

/// Reject payloads that carry an API-level error instead of data
pub fn check_api_errors(payload: &Value) -> Result<(), MarketDataError> {
    // "Note" and "Information" are how the API reports throttling
    if payload.get("Note").is_some() || payload.get("Information").is_some() {
        return Err(MarketDataError::RateLimited);
    }
    if let Some(message) = payload.get("Error Message") {
        let message = message.as_str().unwrap_or("unknown error").to_string();
        return Err(MarketDataError::Api(message));
    }
    Ok(())
}

fn str_field<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    value.get(key).and_then(Value::as_str).map(str::trim).filter(|s| !s.is_empty())
}

fn number_field(value: &Value, key: &str) -> Option<f64> {
    str_field(value, key).and_then(|s| s.parse().ok())
}

/// Candidates from a SYMBOL_SEARCH payload; missing matches mean no results
pub fn parse_search(payload: &Value) -> Vec<SymbolMatch> {
    let matches = match payload.get("bestMatches").and_then(Value::as_array) {
        Some(matches) => matches,
        None => return Vec::new(),
    };

    matches
        .iter()
        .filter_map(|m| {
            Some(SymbolMatch {
                symbol: str_field(m, "1. symbol")?.to_string(),
                name: str_field(m, "2. name").unwrap_or_default().to_string(),
                kind: str_field(m, "3. type").unwrap_or_default().to_string(),
                region: str_field(m, "4. region").unwrap_or_default().to_string(),
                currency: str_field(m, "8. currency").unwrap_or("USD").to_string(),
            })
        })
        .collect()
}

/// Latest price from a GLOBAL_QUOTE payload
pub fn parse_global_quote(payload: &Value, symbol: &str) -> Result<f64, MarketDataError> {
    payload
        .get("Global Quote")
        .and_then(|quote| number_field(quote, "05. price"))
        .ok_or_else(|| MarketDataError::NotFound(symbol.to_string()))
}

/// Company descriptors from an OVERVIEW payload
#[derive(Debug, Clone, PartialEq)]
pub struct Overview {
    pub name: String,
    pub currency: Currency,
    pub sector: Option<String>,
    pub industry: Option<String>,
    pub description: Option<String>,
}

pub fn parse_overview(payload: &Value, symbol: &str) -> Result<Overview, MarketDataError> {
    if str_field(payload, "Symbol").is_none() {
        return Err(MarketDataError::NotFound(symbol.to_string()));
    }
    let currency = str_field(payload, "Currency")
        .map(Currency::from_market_code)
        .unwrap_or_else(Currency::usd);

    Ok(Overview {
        name: str_field(payload, "Name").unwrap_or(symbol).to_string(),
        currency,
        sector: str_field(payload, "Sector").map(str::to_string),
        industry: str_field(payload, "Industry").map(str::to_string),
        description: str_field(payload, "Description").map(str::to_string),
    })
}

/// Most recent annual EPS from an INCOME_STATEMENT payload, 0 when absent
pub fn parse_latest_eps(payload: &Value) -> f64 {
    payload
        .get("annualReports")
        .and_then(Value::as_array)
        .and_then(|reports| reports.first())
        .and_then(|latest| number_field(latest, "eps"))
        .unwrap_or(0.0)
}

/// HTTP client with a shared response cache
pub struct AlphaVantageClient<C: Clock = SystemClock> {
    http: Client,
    api_key: String,
    base_url: String,
    cache: Mutex<ResponseCache<Value, C>>,
}

impl AlphaVantageClient<SystemClock> {
    pub fn new(api_key: impl Into<String>, cache_ttl: Duration) -> Self {
        Self::with_clock(api_key, cache_ttl, SystemClock)
    }
}

impl<C: Clock> AlphaVantageClient<C> {
    pub fn with_clock(api_key: impl Into<String>, cache_ttl: Duration, clock: C) -> Self {
        Self {
            http: Client::new(),
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            cache: Mutex::new(ResponseCache::with_clock(cache_ttl, clock)),
        }
    }

    /// Point the client at another endpoint (e.g., a local mock)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn url(&self, params: &[(&str, &str)]) -> Result<Url, MarketDataError> {
        let mut all: Vec<(&str, &str)> = params.to_vec();
        all.push(("apikey", self.api_key.as_str()));
        Url::parse_with_params(&self.base_url, &all).map_err(|e| MarketDataError::InvalidUrl(e.to_string()))
    }

    fn cached(&self, key: &str) -> Option<Value> {
        self.cache
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(key)
    }

    async fn fetch_with_cache(&self, url: Url) -> Result<Value, MarketDataError> {
        let key = url.to_string();
        if let Some(payload) = self.cached(&key) {
            debug!("market data cache hit: {}", url.path());
            return Ok(payload);
        }

        let payload: Value = self
            .http
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if let Err(e) = check_api_errors(&payload) {
            warn!("market data request rejected: {}", e);
            return Err(e);
        }

        self.cache
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(key, payload.clone());
        Ok(payload)
    }

    /// Candidate symbols for a partial query; short queries return nothing
    pub async fn search(&self, query: &str) -> Result<Vec<SymbolMatch>, MarketDataError> {
        let query = query.trim();
        if query.chars().count() < MIN_SEARCH_CHARS {
            return Ok(Vec::new());
        }
        let url = self.url(&[("function", "SYMBOL_SEARCH"), ("keywords", query)])?;
        let payload = self.fetch_with_cache(url).await?;
        Ok(parse_search(&payload))
    }

    /// Price, descriptors and latest annual EPS for a symbol
    pub async fn quote(&self, symbol: &str) -> Result<MarketQuote, MarketDataError> {
        let symbol = symbol.trim();
        if symbol.is_empty() {
            return Err(MarketDataError::EmptySymbol);
        }

        let quote = self
            .fetch_with_cache(self.url(&[("function", "GLOBAL_QUOTE"), ("symbol", symbol)])?)
            .await?;
        let price = parse_global_quote(&quote, symbol)?;

        let overview = self
            .fetch_with_cache(self.url(&[("function", "OVERVIEW"), ("symbol", symbol)])?)
            .await?;
        let overview = parse_overview(&overview, symbol)?;

        let income = self
            .fetch_with_cache(self.url(&[("function", "INCOME_STATEMENT"), ("symbol", symbol)])?)
            .await?;
        let metric_value = parse_latest_eps(&income);

        info!("Fetched {} ({}) at {} {}", symbol, overview.name, price, overview.currency.code);

        Ok(MarketQuote {
            symbol: symbol.to_string(),
            name: overview.name,
            price,
            currency: overview.currency,
            metric_value,
            sector: overview.sector,
            industry: overview.industry,
            description: overview.description,
        })
    }

    /// (hits, misses) of the response cache
    pub fn cache_stats(&self) -> (u64, u64) {
        let cache = self.cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        (cache.hits, cache.misses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_rate_limit_and_error_detection() {
        let note = json!({"Note": "Thank you for using Alpha Vantage! Our standard API call frequency is 5 calls per minute."});
        assert!(matches!(check_api_errors(&note), Err(MarketDataError::RateLimited)));

        let error = json!({"Error Message": "Invalid API call."});
        match check_api_errors(&error) {
            Err(MarketDataError::Api(message)) => assert_eq!(message, "Invalid API call."),
            other => panic!("unexpected: {:?}", other),
        }

        assert!(check_api_errors(&json!({"Global Quote": {}})).is_ok());
    }

    #[test]
    fn test_parse_search() {
        let payload = json!({
            "bestMatches": [
                {"1. symbol": "AIR.PA", "2. name": "Airbus SE", "3. type": "Equity", "4. region": "Paris", "8. currency": "EUR"},
                {"1. symbol": "AIR", "2. name": "AAR Corp", "3. type": "Equity", "4. region": "United States"},
                {"2. name": "no symbol"}
            ]
        });
        let matches = parse_search(&payload);
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].symbol, "AIR.PA");
        assert_eq!(matches[0].currency, "EUR");
        assert_eq!(matches[1].currency, "USD");

        assert!(parse_search(&json!({})).is_empty());
    }

    #[test]
    fn test_parse_quote_and_overview() {
        let quote = json!({"Global Quote": {"01. symbol": "IBM", "05. price": "182.5200"}});
        assert_eq!(parse_global_quote(&quote, "IBM").unwrap(), 182.52);
        assert!(matches!(
            parse_global_quote(&json!({"Global Quote": {}}), "XXX"),
            Err(MarketDataError::NotFound(_))
        ));

        let overview = json!({"Symbol": "MC.PA", "Name": "LVMH", "Currency": "EUR", "Sector": "CONSUMER CYCLICAL"});
        let parsed = parse_overview(&overview, "MC.PA").unwrap();
        assert_eq!(parsed.name, "LVMH");
        assert_eq!(parsed.currency.symbol, "€");
        assert!(parsed.industry.is_none());
        assert!(parse_overview(&json!({}), "MC.PA").is_err());
    }

    #[test]
    fn test_parse_latest_eps() {
        let income = json!({"annualReports": [{"eps": "6.13"}, {"eps": "5.61"}]});
        assert_eq!(parse_latest_eps(&income), 6.13);
        assert_eq!(parse_latest_eps(&json!({"annualReports": []})), 0.0);
        assert_eq!(parse_latest_eps(&json!({"annualReports": [{"eps": "None"}]})), 0.0);
    }

    #[tokio::test]
    async fn test_short_query_skips_network() {
        let client = AlphaVantageClient::new("demo", Duration::from_secs(300))
            .with_base_url("http://127.0.0.1:9/unreachable");
        assert!(client.search("a").await.unwrap().is_empty());
        assert!(matches!(client.quote("  ").await, Err(MarketDataError::EmptySymbol)));
        assert_eq!(client.cache_stats(), (0, 0));
    }
}
