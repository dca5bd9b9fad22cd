//! JSON file document store.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};

use super::{parse_document, Document, DocumentStore, StoreError, StoreResult};

/// One document per file, pretty-printed with 4-space indentation.
///
/// Saves go to a sibling temporary file which is then renamed over the
/// target, so a concurrent reader sees either the old or the new document.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    name: String,
}

impl JsonFileStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self { path, name }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn temp_path(&self) -> PathBuf {
        self.path.with_file_name(format!(
            ".{}.{}.tmp",
            self.name,
            uuid::Uuid::new_v4().simple()
        ))
    }
}

impl DocumentStore for JsonFileStore {
    fn name(&self) -> &str {
        &self.name
    }

    fn load(&self) -> StoreResult<Document> {
        match fs::read_to_string(&self.path) {
            Ok(text) => parse_document(&self.name, &text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Document::new()),
            Err(e) => Err(self.io_error(e)),
        }
    }

    fn save(&self, document: &Document) -> StoreResult<()> {
        let mut buf = Vec::new();
        let mut serializer =
            Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
        document.serialize(&mut serializer)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }

        let temp = self.temp_path();
        let written = fs::File::create(&temp)
            .and_then(|mut file| {
                file.write_all(&buf)?;
                file.sync_all()
            })
            .and_then(|_| fs::rename(&temp, &self.path));

        if let Err(e) = written {
            let _ = fs::remove_file(&temp);
            return Err(self.io_error(e));
        }
        Ok(())
    }
}
