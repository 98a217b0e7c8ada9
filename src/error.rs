//! Error types for the review engine.
//!
//! Validation failures are always detected before any state is touched.
//! Persistence failures come straight from the adapter and are never retried here.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Bad quality grade, or a malformed / version-mismatched document
    #[error("validation error: {0}")]
    Validation(String),

    #[error("persistence error: {0}")]
    Persistence(#[from] PersistenceError),
}

impl Error {
    pub fn validation(msg: impl Into<String>) -> Self {
        Error::Validation(msg.into())
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation(_))
    }
}

/// Failures at the load/save boundary
#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("encoding error: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("save rejected: {0}")]
    Rejected(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_message() {
        let err = Error::validation("quality 7 is outside 0..=5");
        assert!(err.is_validation());
        assert_eq!(
            err.to_string(),
            "validation error: quality 7 is outside 0..=5"
        );
    }

    #[test]
    fn test_persistence_from_io() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only");
        let err: Error = PersistenceError::from(io).into();
        assert!(!err.is_validation());
        assert!(err.to_string().starts_with("persistence error: IO error"));
    }
}
