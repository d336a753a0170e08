//! Error types for the boundaries around the valuation core
//!
//! The core itself never fails: undefined figures are `Metric::Undefined`.

use thiserror::Error;

/// Failure reading or decoding valuation inputs
#[derive(Debug, Error)]
pub enum InputError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("row {row}: {message}")]
    InvalidRow { row: usize, message: String },
}
