//! Valuation requests and their file loaders

pub mod loader;

pub use loader::{load_requests, load_requests_from_reader, load_requests_json, parse_requests_json};

use serde::{Deserialize, Serialize};

use crate::valuation::{ValuationInputs, ValuationMethod};

/// One calculation to run: which metric the inputs describe, and the inputs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuationRequest {
    pub method: ValuationMethod,
    pub inputs: ValuationInputs,
}
