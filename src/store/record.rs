//! Saved company valuation bundles and the storage-boundary timestamp conversion

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::StoreError;
use crate::valuation::{MethodResults, ValuationMethod};

/// Up to three method results for one company, owned by one user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyValuationRecord {
    /// Storage-assigned key
    pub id: String,

    /// When the bundle was saved
    #[serde(rename = "timestamp")]
    pub saved_at: DateTime<Utc>,

    pub stock_name: String,
    pub current_price: f64,
    pub valuations: MethodResults,
    pub user_id: String,
}

impl CompanyValuationRecord {
    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.user_id == user_id
    }

    /// Decode a stored document, converting every timestamp shape the store
    /// has produced into `DateTime<Utc>` exactly once, here
    pub fn from_document(id: &str, mut document: Value) -> Result<Self, StoreError> {
        let object = document
            .as_object_mut()
            .ok_or_else(|| StoreError::InvalidDocument(format!("{}: not an object", id)))?;

        object.insert("id".to_string(), Value::String(id.to_string()));
        if let Some(ts) = object.get_mut("timestamp") {
            normalize_timestamp(ts)?;
        }
        if let Some(valuations) = object.get_mut("valuations").and_then(Value::as_object_mut) {
            for method in ValuationMethod::ALL {
                if let Some(ts) = valuations
                    .get_mut(method.code())
                    .and_then(Value::as_object_mut)
                    .and_then(|result| result.get_mut("timestamp"))
                {
                    normalize_timestamp(ts)?;
                }
            }
        }

        serde_json::from_value(document).map_err(|e| StoreError::InvalidDocument(format!("{}: {}", id, e)))
    }

    /// Encode for storage; `id` is left out because the store owns the key
    pub fn to_document(&self) -> Result<Value, StoreError> {
        let mut value = serde_json::to_value(self).map_err(|e| StoreError::InvalidDocument(e.to_string()))?;
        if let Some(object) = value.as_object_mut() {
            object.remove("id");
        }
        Ok(value)
    }
}

/// Every timestamp shape found in stored documents
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum StoredTimestamp {
    /// Milliseconds since the Unix epoch
    Millis(i64),
    /// Server-side timestamp object
    Server {
        #[serde(alias = "_seconds")]
        seconds: i64,
        #[serde(default, alias = "_nanoseconds")]
        nanoseconds: u32,
    },
    /// RFC 3339 string, as written by this crate
    Rfc3339(DateTime<Utc>),
}

impl StoredTimestamp {
    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        match self {
            StoredTimestamp::Millis(ms) => DateTime::from_timestamp_millis(*ms),
            StoredTimestamp::Server { seconds, nanoseconds } => DateTime::from_timestamp(*seconds, *nanoseconds),
            StoredTimestamp::Rfc3339(dt) => Some(*dt),
        }
    }
}

fn normalize_timestamp(value: &mut Value) -> Result<(), StoreError> {
    let parsed: StoredTimestamp = serde_json::from_value(value.clone())
        .map_err(|_| StoreError::InvalidDocument(format!("unrecognized timestamp: {}", value)))?;
    let datetime = parsed
        .to_datetime()
        .ok_or_else(|| StoreError::InvalidDocument(format!("timestamp out of range: {}", value)))?;
    *value = Value::String(datetime.to_rfc3339());
    Ok(())
}
