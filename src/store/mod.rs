//! Saved-valuation collaborator: sessions, records and the document store
//!
//! The valuation core never calls into this module; it only produces
//! `ValuationResult`s that the store persists as opaque bundles.

mod memory;
mod record;
mod session;

pub use memory::InMemoryStore;
pub use record::{CompanyValuationRecord, StoredTimestamp};
pub use session::{AuthErrorKind, Session};

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::valuation::MethodResults;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("you must be signed in")]
    NotAuthenticated,

    #[error("valuation {0} not found")]
    NotFound(String),

    #[error("valuation {0} belongs to another user")]
    NotOwner(String),

    #[error("nothing to save: no valuation has been calculated")]
    EmptyResults,

    #[error("invalid stored document: {0}")]
    InvalidDocument(String),
}

/// Document store for saved valuation bundles
pub trait ValuationStore {
    /// Write a new bundle owned by the session's user; returns the storage key
    fn save(
        &self,
        session: &Session,
        stock_name: &str,
        current_price: f64,
        results: &MethodResults,
        saved_at: DateTime<Utc>,
    ) -> Result<String, StoreError>;

    /// The session user's bundles, newest first
    fn list(&self, session: &Session) -> Result<Vec<CompanyValuationRecord>, StoreError>;

    /// Remove a bundle the session user owns
    fn delete(&self, session: &Session, id: &str) -> Result<(), StoreError>;
}
