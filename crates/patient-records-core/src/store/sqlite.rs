//! SQLite document store.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::{params, Connection, OptionalExtension};

use super::{parse_document, Document, DocumentStore, StoreError, StoreResult};

/// Schema for the document table.
pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS documents (
    name TEXT PRIMARY KEY,
    body TEXT NOT NULL,                          -- JSON object: id -> record
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#;

/// A named document stored as one row of the `documents` table.
///
/// Several stores may share a connection (one database file, many documents).
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
    name: String,
}

impl SqliteStore {
    /// Open database at path, creating if needed.
    pub fn open<P: AsRef<Path>>(path: P, name: impl Into<String>) -> StoreResult<Self> {
        Self::initialize(Connection::open(path)?, name.into())
    }

    /// Create in-memory database (for testing).
    pub fn open_in_memory(name: impl Into<String>) -> StoreResult<Self> {
        Self::initialize(Connection::open_in_memory()?, name.into())
    }

    /// Another document in the same database.
    pub fn sibling(&self, name: impl Into<String>) -> Self {
        Self {
            conn: Arc::clone(&self.conn),
            name: name.into(),
        }
    }

    fn initialize(conn: Connection, name: String) -> StoreResult<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            name,
        })
    }

    fn conn(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| StoreError::Poisoned(e.to_string()))
    }
}

impl DocumentStore for SqliteStore {
    fn name(&self) -> &str {
        &self.name
    }

    fn load(&self) -> StoreResult<Document> {
        let body: Option<String> = self
            .conn()?
            .query_row(
                "SELECT body FROM documents WHERE name = ?",
                [&self.name],
                |row| row.get(0),
            )
            .optional()?;

        match body {
            Some(text) => parse_document(&self.name, &text),
            None => Ok(Document::new()),
        }
    }

    fn save(&self, document: &Document) -> StoreResult<()> {
        let body = serde_json::to_string(document)?;
        self.conn()?.execute(
            r#"
            INSERT INTO documents (name, body, updated_at)
            VALUES (?1, ?2, datetime('now'))
            ON CONFLICT(name) DO UPDATE SET
                body = excluded.body,
                updated_at = excluded.updated_at
            "#,
            params![self.name, body],
        )?;
        Ok(())
    }
}
