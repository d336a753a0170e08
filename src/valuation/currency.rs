//! Currencies a valuation can be denominated in

use serde::{Deserialize, Serialize};

/// Currency descriptor carried with the inputs for display only
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Currency {
    pub code: String,
    pub symbol: String,
    pub name: String,
}

/// (code, symbol, name)
const BUILT_IN: [(&str, &str, &str); 5] = [
    ("EUR", "€", "Euro"),
    ("USD", "$", "US Dollar"),
    ("GBP", "£", "Pound Sterling"),
    ("CHF", "CHF", "Swiss Franc"),
    ("JPY", "¥", "Japanese Yen"),
];

impl Currency {
    pub fn new(code: &str, symbol: &str, name: &str) -> Self {
        Self {
            code: code.to_string(),
            symbol: symbol.to_string(),
            name: name.to_string(),
        }
    }

    /// All built-in currencies, EUR first
    pub fn all() -> Vec<Currency> {
        BUILT_IN
            .iter()
            .map(|(code, symbol, name)| Currency::new(code, symbol, name))
            .collect()
    }

    /// Look up a built-in currency by ISO code (case-insensitive)
    pub fn by_code(code: &str) -> Option<Currency> {
        BUILT_IN
            .iter()
            .find(|(c, _, _)| c.eq_ignore_ascii_case(code.trim()))
            .map(|(code, symbol, name)| Currency::new(code, symbol, name))
    }

    /// Currency for a code reported by the market-data service.
    /// Unknown codes keep their code as symbol.
    pub fn from_market_code(code: &str) -> Currency {
        Self::by_code(code).unwrap_or_else(|| {
            let code = code.trim().to_ascii_uppercase();
            Currency::new(&code, &code, &code)
        })
    }

    pub fn eur() -> Currency {
        Currency::new("EUR", "€", "Euro")
    }

    pub fn usd() -> Currency {
        Currency::new("USD", "$", "US Dollar")
    }
}

impl Default for Currency {
    fn default() -> Self {
        Self::eur()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_by_code() {
        assert_eq!(Currency::by_code("gbp").map(|c| c.symbol), Some("£".to_string()));
        assert!(Currency::by_code("XYZ").is_none());
        assert_eq!(Currency::all().len(), 5);
        assert_eq!(Currency::default().code, "EUR");
    }

    #[test]
    fn test_unknown_market_code() {
        let cad = Currency::from_market_code(" cad");
        assert_eq!(cad.code, "CAD");
        assert_eq!(cad.symbol, "CAD");
        assert_eq!(Currency::from_market_code("USD"), Currency::usd());
    }
}
