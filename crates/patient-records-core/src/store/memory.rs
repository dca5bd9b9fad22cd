//! In-memory document store for testing.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

use super::{Document, DocumentStore, StoreError, StoreResult};

/// In-memory document with switchable failure injection.
#[derive(Debug, Default)]
pub struct MemoryStore {
    name: String,
    document: RwLock<Document>,
    fail_loads: AtomicBool,
    fail_saves: AtomicBool,
}

impl MemoryStore {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_document(name: impl Into<String>, document: Document) -> Self {
        Self {
            name: name.into(),
            document: RwLock::new(document),
            ..Self::default()
        }
    }

    /// Make subsequent loads fail as if the document were malformed.
    pub fn fail_loads(&self, fail: bool) {
        self.fail_loads.store(fail, Ordering::SeqCst);
    }

    /// Make subsequent saves fail without touching the document.
    pub fn fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    /// Current document, bypassing failure injection.
    pub fn snapshot(&self) -> StoreResult<Document> {
        self.document
            .read()
            .map(|d| d.clone())
            .map_err(|e| StoreError::Poisoned(e.to_string()))
    }
}

impl DocumentStore for MemoryStore {
    fn name(&self) -> &str {
        &self.name
    }

    fn load(&self) -> StoreResult<Document> {
        if self.fail_loads.load(Ordering::SeqCst) {
            return Err(StoreError::Malformed {
                name: self.name.clone(),
                reason: "injected load failure".into(),
            });
        }
        self.snapshot()
    }

    fn save(&self, document: &Document) -> StoreResult<()> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(StoreError::Io {
                path: self.name.clone().into(),
                source: std::io::Error::new(std::io::ErrorKind::Other, "injected save failure"),
            });
        }
        let mut current = self
            .document
            .write()
            .map_err(|e| StoreError::Poisoned(e.to_string()))?;
        *current = document.clone();
        Ok(())
    }
}
