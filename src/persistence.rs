//! Durable storage for the store's serialized document.
//!
//! Adapters must replace the stored document atomically: a reader sees either
//! the previous bytes or the new ones, never a mix.

use crate::error::PersistenceError;
use std::fs;
use std::io::Write;
use std::path::PathBuf;

pub trait PersistenceAdapter {
    /// Returns `None` when nothing was ever saved.
    fn load(&self) -> Result<Option<Vec<u8>>, PersistenceError>;

    fn save(&mut self, bytes: &[u8]) -> Result<(), PersistenceError>;
}

/// Keeps the document in memory. Can be armed to reject saves.
#[derive(Debug, Default, Clone)]
pub struct MemoryAdapter {
    bytes: Option<Vec<u8>>,
    fail_saves: usize,
    saves: usize,
}

impl MemoryAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bytes(bytes: Vec<u8>) -> Self {
        Self {
            bytes: Some(bytes),
            ..Self::default()
        }
    }

    /// The next `count` saves fail with `PersistenceError::Rejected`.
    pub fn fail_next_saves(&mut self, count: usize) {
        self.fail_saves = count;
    }

    pub fn bytes(&self) -> Option<&[u8]> {
        self.bytes.as_deref()
    }

    /// Number of successful saves.
    pub fn save_count(&self) -> usize {
        self.saves
    }
}

impl PersistenceAdapter for MemoryAdapter {
    fn load(&self) -> Result<Option<Vec<u8>>, PersistenceError> {
        Ok(self.bytes.clone())
    }

    fn save(&mut self, bytes: &[u8]) -> Result<(), PersistenceError> {
        if self.fail_saves > 0 {
            self.fail_saves -= 1;
            return Err(PersistenceError::Rejected("memory adapter armed to fail".into()));
        }
        self.bytes = Some(bytes.to_vec());
        self.saves += 1;
        Ok(())
    }
}

/// Stores the document in a single file.
/// Writes go to a sibling temp file which is then renamed over the target.
#[derive(Debug, Clone)]
pub struct FileAdapter {
    path: PathBuf,
}

impl FileAdapter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl PersistenceAdapter for FileAdapter {
    fn load(&self) -> Result<Option<Vec<u8>>, PersistenceError> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&mut self, bytes: &[u8]) -> Result<(), PersistenceError> {
        let tmp = self.temp_path();
        let mut file = fs::File::create(&tmp)?;
        file.write_all(bytes)?;
        file.sync_all()?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_adapter_roundtrip() {
        let mut adapter = MemoryAdapter::new();
        assert!(adapter.load().unwrap().is_none());
        adapter.save(b"{}").unwrap();
        assert_eq!(adapter.load().unwrap().as_deref(), Some(&b"{}"[..]));
        assert_eq!(adapter.save_count(), 1);
    }

    #[test]
    fn test_memory_adapter_armed_failure() {
        let mut adapter = MemoryAdapter::with_bytes(b"old".to_vec());
        adapter.fail_next_saves(1);
        assert!(adapter.save(b"new").is_err());
        assert_eq!(adapter.bytes(), Some(&b"old"[..]));
        adapter.save(b"new").unwrap();
        assert_eq!(adapter.bytes(), Some(&b"new"[..]));
    }

    #[test]
    fn test_file_adapter_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let adapter = FileAdapter::new(dir.path().join("state.json"));
        assert!(adapter.load().unwrap().is_none());
    }

    #[test]
    fn test_file_adapter_replaces_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        let mut adapter = FileAdapter::new(&path);

        adapter.save(b"first").unwrap();
        adapter.save(b"second").unwrap();

        assert_eq!(adapter.load().unwrap().as_deref(), Some(&b"second"[..]));
        assert!(!dir.path().join("state.json.tmp").exists());
    }

    #[test]
    fn test_file_adapter_reports_io_errors() {
        let dir = tempfile::tempdir().unwrap();
        let mut adapter = FileAdapter::new(dir.path().join("missing").join("state.json"));
        assert!(matches!(
            adapter.save(b"x"),
            Err(PersistenceError::Io(_))
        ));
    }
}
