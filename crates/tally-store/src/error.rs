//! # Store Error Types
//!
//! Error types for flat-file store operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  std::io::Error (open / read / write / rename)                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  StoreError (this module) ← Adds the file path                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  EngineError (tally-engine) ← ErrorKind::PersistenceFailure            │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Malformed *records* are not errors: loads skip them and log a count.

use std::io;
use std::path::{Path, PathBuf};

use tally_core::ValidationError;
use thiserror::Error;

/// Store operation errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading, writing or renaming a store file failed.
    ///
    /// ## When This Occurs
    /// - Directory not writable, disk full
    /// - The path exists but is a directory
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A record looked up by key does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// A unique key is already taken.
    #[error("Duplicate {field}: '{value}' already exists")]
    Duplicate { field: String, value: String },

    /// The record handed to the store is invalid.
    #[error("Invalid record: {0}")]
    Validation(#[from] ValidationError),
}

impl StoreError {
    /// Wraps an I/O error with the path it happened on.
    pub fn io(path: impl AsRef<Path>, source: io::Error) -> Self {
        StoreError::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        StoreError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        StoreError::Duplicate {
            field: field.into(),
            value: value.into(),
        }
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_names_the_file() {
        let err = StoreError::io(
            "/data/catalog.txt",
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        assert_eq!(err.to_string(), "I/O error on /data/catalog.txt: denied");
    }

    #[test]
    fn test_helpers() {
        assert_eq!(
            StoreError::not_found("Product", "Rice").to_string(),
            "Product not found: Rice"
        );
        assert_eq!(
            StoreError::duplicate("phone", "0170").to_string(),
            "Duplicate phone: '0170' already exists"
        );
    }
}
