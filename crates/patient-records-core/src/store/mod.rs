//! Document storage for patient records and credentials.
//!
//! Each store holds one named [`Document`]: an insertion-ordered JSON object
//! mapping identifiers to record bodies. Stores are loaded and saved
//! wholesale; callers serialize writers (see [`crate::PatientRegistry`]).

mod json_file;
mod memory;
mod sqlite;

pub use json_file::*;
pub use memory::*;
pub use sqlite::*;

use std::path::PathBuf;
use std::sync::Arc;

use serde_json::{Map, Value};
use thiserror::Error;

/// Identifier → record body, in insertion order.
pub type Document = Map<String, Value>;

/// Storage errors.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Malformed document '{name}': {reason}")]
    Malformed { name: String, reason: String },

    #[error("Corrupt record '{id}' in '{name}': {reason}")]
    Corrupt {
        name: String,
        id: String,
        reason: String,
    },

    #[error("Lock poisoned: {0}")]
    Poisoned(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence collaborator for one document.
pub trait DocumentStore: Send + Sync {
    /// Document name, used in logs and errors.
    fn name(&self) -> &str;

    /// Load the whole document. A missing document is empty, not an error.
    fn load(&self) -> StoreResult<Document>;

    /// Replace the whole document. Readers never observe a partial write.
    fn save(&self, document: &Document) -> StoreResult<()>;
}

impl<T: DocumentStore + ?Sized> DocumentStore for Arc<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn load(&self) -> StoreResult<Document> {
        (**self).load()
    }

    fn save(&self, document: &Document) -> StoreResult<()> {
        (**self).save(document)
    }
}

/// Load for read-only use: any failure is logged and treated as an empty document.
///
/// Write paths must call [`DocumentStore::load`] directly so failures propagate.
pub fn load_or_empty(store: &dyn DocumentStore) -> Document {
    match store.load() {
        Ok(document) => document,
        Err(e) => {
            tracing::warn!(document = store.name(), "treating unreadable document as empty: {e}");
            Document::new()
        }
    }
}

/// Parse document text; anything but a JSON object is malformed.
pub(crate) fn parse_document(name: &str, text: &str) -> StoreResult<Document> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(StoreError::Malformed {
            name: name.to_string(),
            reason: format!("expected a JSON object, found {}", json_type(&other)),
        }),
        Err(e) => Err(StoreError::Malformed {
            name: name.to_string(),
            reason: e.to_string(),
        }),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
