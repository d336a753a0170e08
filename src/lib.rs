//! Equity Valuation - Projection and scenario-aggregation engine for per-share metrics
//!
//! This library provides:
//! - Metric projection to a discounted fair value and safety margin
//! - Pessimistic / neutral / optimistic scenario aggregation
//! - Immutable valuation result records, one per method (EPS, OCF, FCF)
//! - CSV/JSON batch inputs and parallel batch evaluation
//! - Market-data lookup with a TTL response cache
//! - Saved-valuation store with per-user ownership
//! - Plain-text and CSV reports

pub mod valuation;
pub mod inputs;
pub mod config;
pub mod error;
pub mod runner;
pub mod market;
pub mod store;
pub mod report;

// Re-export commonly used types
pub use valuation::{
    evaluate, group_by_stock, Currency, Metric, MethodResults, NamedScenarios, Scenario,
    ScenarioAssumptions, UndefinedReason, ValuationInputs, ValuationMethod, ValuationResult,
};
pub use inputs::ValuationRequest;
pub use config::CalculatorConfig;
pub use error::InputError;
pub use runner::ValuationRunner;
pub use market::{AlphaVantageClient, MarketDataError, MarketQuote};
pub use store::{InMemoryStore, Session, StoreError, ValuationStore};
