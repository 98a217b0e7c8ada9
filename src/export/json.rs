//! JSON snapshot document: the export format and the on-disk format.
//! Provides encoding, strict decoding, and file helpers.

use crate::error::{Error, PersistenceError, Result};
use crate::models::{GlobalStats, ItemId, ReviewRecord};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Documents carrying any other version are rejected.
pub const DOCUMENT_VERSION: &str = "1.0";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Document {
    pub version: String,
    pub records: BTreeMap<ItemId, ReviewRecord>,
    pub stats: GlobalStats,
    pub exported_at: DateTime<Utc>,
}

/// Only the version, read first so a mismatch is reported as such
/// rather than as a shape error.
#[derive(Deserialize)]
struct VersionHeader {
    version: Option<serde_json::Value>,
}

impl Document {
    pub fn new(
        records: BTreeMap<ItemId, ReviewRecord>,
        stats: GlobalStats,
        exported_at: DateTime<Utc>,
    ) -> Self {
        Self {
            version: DOCUMENT_VERSION.to_string(),
            records,
            stats,
            exported_at,
        }
    }

    /// Checks the version and every record before anything is handed to the store.
    pub fn validate(&self) -> Result<()> {
        if self.version != DOCUMENT_VERSION {
            return Err(Error::validation(format!(
                "document version '{}' does not match '{DOCUMENT_VERSION}'",
                self.version
            )));
        }
        for (key, record) in &self.records {
            if *key != record.item_id {
                return Err(Error::validation(format!(
                    "record keyed {key} carries item id {}",
                    record.item_id
                )));
            }
            record.check_invariants().map_err(Error::Validation)?;
        }
        self.stats.check_invariants().map_err(Error::Validation)?;
        Ok(())
    }

    pub fn to_bytes(&self) -> std::result::Result<Vec<u8>, PersistenceError> {
        Ok(serde_json::to_vec_pretty(self)?)
    }

    /// Parses and validates. Any failure is a validation error.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let header: VersionHeader = serde_json::from_slice(bytes)
            .map_err(|e| Error::validation(format!("malformed document: {e}")))?;
        match header.version {
            Some(serde_json::Value::String(v)) if v == DOCUMENT_VERSION => {}
            Some(other) => {
                return Err(Error::validation(format!(
                    "document version {other} does not match '{DOCUMENT_VERSION}'"
                )));
            }
            None => return Err(Error::validation("document has no version")),
        }

        let doc: Document = serde_json::from_slice(bytes)
            .map_err(|e| Error::validation(format!("malformed document: {e}")))?;
        doc.validate()?;
        Ok(doc)
    }
}

/// Writes a document to `path` as pretty JSON.
pub fn export_to_path(doc: &Document, path: impl AsRef<Path>) -> Result<()> {
    let bytes = doc.to_bytes()?;
    fs::write(path, bytes).map_err(PersistenceError::from)?;
    Ok(())
}

/// Reads and validates a document from `path`.
pub fn import_from_path(path: impl AsRef<Path>) -> Result<Document> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(PersistenceError::from)?;
    let doc = Document::from_bytes(&bytes)?;
    log::info!(
        "read snapshot with {} records from '{}'",
        doc.records.len(),
        path.display()
    );
    Ok(doc)
}
