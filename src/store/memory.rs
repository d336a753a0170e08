//! In-process document store

use chrono::{DateTime, Utc};
use log::{info, warn};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use super::record::CompanyValuationRecord;
use super::session::Session;
use super::{StoreError, ValuationStore};
use crate::valuation::MethodResults;

/// Documents kept in memory in their stored JSON form
///
/// Records go through `to_document` / `from_document` on every write and
/// read, so the store exercises the same boundary conversion a remote one would.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    documents: RwLock<HashMap<String, Value>>,
    next_id: AtomicU64,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a raw document under `id`, e.g. one exported by another store
    pub fn import_document(&self, id: &str, document: Value) -> Result<(), StoreError> {
        // Validate before accepting
        CompanyValuationRecord::from_document(id, document.clone())?;
        self.write().insert(id.to_string(), document);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<String, Value>> {
        self.documents.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<String, Value>> {
        self.documents.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn allocate_id(&self) -> String {
        let n = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        format!("val-{:08}", n)
    }
}

impl ValuationStore for InMemoryStore {
    fn save(
        &self,
        session: &Session,
        stock_name: &str,
        current_price: f64,
        results: &MethodResults,
        saved_at: DateTime<Utc>,
    ) -> Result<String, StoreError> {
        let user_id = session.require_user()?;
        if results.is_empty() {
            return Err(StoreError::EmptyResults);
        }

        let id = self.allocate_id();
        let record = CompanyValuationRecord {
            id: id.clone(),
            saved_at,
            stock_name: stock_name.to_string(),
            current_price,
            valuations: results.owned_by(user_id),
            user_id: user_id.to_string(),
        };

        let document = record.to_document()?;
        self.write().insert(id.clone(), document);
        info!("Saved {} valuation(s) for {} as {}", results.len(), stock_name, id);
        Ok(id)
    }

    fn list(&self, session: &Session) -> Result<Vec<CompanyValuationRecord>, StoreError> {
        let user_id = session.require_user()?;

        let documents = self.read();
        let mut records = Vec::new();
        for (id, document) in documents.iter() {
            // One unreadable document must not hide the rest
            let record = match CompanyValuationRecord::from_document(id, document.clone()) {
                Ok(record) => record,
                Err(e) => {
                    warn!("Skipping stored valuation: {}", e);
                    continue;
                }
            };
            if record.is_owned_by(user_id) {
                records.push(record);
            }
        }

        // Newest first; id breaks ties so equal timestamps list deterministically
        records.sort_by(|a, b| b.saved_at.cmp(&a.saved_at).then_with(|| b.id.cmp(&a.id)));
        Ok(records)
    }

    fn delete(&self, session: &Session, id: &str) -> Result<(), StoreError> {
        let user_id = session.require_user()?;

        let mut documents = self.write();
        let document = documents
            .get(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        let record = CompanyValuationRecord::from_document(id, document.clone())?;
        if !record.is_owned_by(user_id) {
            return Err(StoreError::NotOwner(id.to_string()));
        }

        documents.remove(id);
        info!("Deleted valuation {}", id);
        Ok(())
    }
}
