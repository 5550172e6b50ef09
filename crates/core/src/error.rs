//! Error types for Galaxy
//!
//! This module defines the error type shared by the record model, the patch
//! engine and the document store. We use `thiserror` for automatic `Display`
//! and `Error` trait implementations.

use crate::id::RecordId;
use crate::limits::LimitError;
use crate::patch::PatchError;
use crate::schema::ValidationReport;
use thiserror::Error;

/// Result type alias for Galaxy operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for Galaxy
#[derive(Debug, Error)]
pub enum Error {
    /// The requested record does not exist
    #[error("record not found: {collection}/{id}")]
    NotFound {
        /// Collection that was searched
        collection: String,
        /// Identifier that has no record
        id: RecordId,
    },

    /// A payload failed the collection schema rules
    #[error("{0}")]
    Validation(#[from] ValidationReport),

    /// A patch set could not be applied, or its result was rejected
    #[error("{0}")]
    Patch(#[from] PatchError),

    /// The record changed between fetch and write (compare-and-swap failure)
    #[error("revision conflict: expected {expected}, found {actual}")]
    Conflict {
        /// Revision the writer read
        expected: u64,
        /// Revision currently stored
        actual: u64,
    },

    /// A document exceeded a configured limit
    #[error("{0}")]
    Limit(#[from] LimitError),

    /// Storage layer error
    #[error("store error: {0}")]
    Store(String),

    /// Serialization/deserialization error
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Password hashing failure
    #[error("credential error: {0}")]
    Credential(String),
}

impl Error {
    /// Build a `NotFound` error
    pub fn not_found(collection: impl Into<String>, id: RecordId) -> Self {
        Error::NotFound {
            collection: collection.into(),
            id,
        }
    }

    /// Build a `Store` error
    pub fn store(reason: impl Into<String>) -> Self {
        Error::Store(reason.into())
    }

    /// True if the caller can correct this error by changing its request
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Error::NotFound { .. }
                | Error::Validation(_)
                | Error::Patch(_)
                | Error::Conflict { .. }
                | Error::Limit(_)
        )
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
