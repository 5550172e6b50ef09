//! Error types for command execution.
//!
//! All errors from command execution are represented by the [`Error`] enum.
//! These errors are:
//! - **Structured**: Each variant has typed fields for error details
//! - **Serializable**: Can be converted to/from JSON
//! - **Mapped**: Each variant has exactly one status code (see [`Error::status`])

use galaxy_core::ValidationReport;
use http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Command execution errors.
///
/// # Categories
///
/// | Category | Variants | Status |
/// |----------|----------|--------|
/// | Not Found | `RecordNotFound`, `CollectionNotFound` | 404 |
/// | Client | `Validation`, `Patch`, `InvalidInput`, `LimitExceeded` | 400 (500 in legacy mode) |
/// | Concurrency | `VersionConflict` | 409 |
/// | System | `Store`, `Serialization`, `Internal` | 500 |
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
pub enum Error {
    // ==================== Not Found ====================
    /// No record with this identifier
    #[error("record not found: {collection}/{id}")]
    RecordNotFound { collection: String, id: String },

    /// No controller for this collection
    #[error("collection not found: {collection}")]
    CollectionNotFound { collection: String },

    // ==================== Client Errors ====================
    /// Payload failed the collection schema
    #[error("{report}")]
    Validation { report: ValidationReport },

    /// Patch could not be applied or produced an invalid record
    #[error("{reason}")]
    Patch { reason: String, details: Value },

    /// Malformed command or payload
    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },

    /// Document exceeds a configured limit
    #[error("limit exceeded: {reason}")]
    LimitExceeded { reason: String },

    // ==================== Concurrency Errors ====================
    /// Record changed between fetch and write
    #[error("version conflict: expected {expected}, got {actual}")]
    VersionConflict { expected: u64, actual: u64 },

    // ==================== System Errors ====================
    /// Store failure
    #[error("store error: {reason}")]
    Store { reason: String },

    /// Serialization error
    #[error("serialization error: {reason}")]
    Serialization { reason: String },

    /// Internal error (bug or invariant violation)
    #[error("internal error: {reason}")]
    Internal { reason: String },
}

impl Error {
    /// Short machine-readable kind used in error bodies
    pub fn kind(&self) -> &'static str {
        match self {
            Error::RecordNotFound { .. } => "not_found",
            Error::CollectionNotFound { .. } => "collection_not_found",
            Error::Validation { .. } => "validation",
            Error::Patch { .. } => "patch",
            Error::InvalidInput { .. } => "invalid_input",
            Error::LimitExceeded { .. } => "limit_exceeded",
            Error::VersionConflict { .. } => "conflict",
            Error::Store { .. } => "store",
            Error::Serialization { .. } => "serialization",
            Error::Internal { .. } => "internal",
        }
    }

    /// True if the caller can fix the request and retry
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Error::Validation { .. }
                | Error::Patch { .. }
                | Error::InvalidInput { .. }
                | Error::LimitExceeded { .. }
        )
    }

    /// Status code for this error
    ///
    /// `legacy_validation_status` reports client errors as 500, matching
    /// deployments that predate the 400 mapping.
    pub fn status(&self, legacy_validation_status: bool) -> StatusCode {
        match self {
            Error::RecordNotFound { .. } | Error::CollectionNotFound { .. } => {
                StatusCode::NOT_FOUND
            }
            Error::VersionConflict { .. } => StatusCode::CONFLICT,
            e if e.is_client_error() => {
                if legacy_validation_status {
                    StatusCode::INTERNAL_SERVER_ERROR
                } else {
                    StatusCode::BAD_REQUEST
                }
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Response body for this error
    ///
    /// A missing record answers with an empty body.
    pub fn body(&self) -> Option<Value> {
        let details = match self {
            Error::RecordNotFound { .. } => return None,
            Error::Validation { report } => serde_json::to_value(report).unwrap_or(Value::Null),
            Error::Patch { details, .. } => details.clone(),
            Error::VersionConflict { expected, actual } => {
                json!({"expected": expected, "actual": actual})
            }
            _ => Value::Null,
        };
        Some(json!({
            "error": self.kind(),
            "message": self.to_string(),
            "details": details,
        }))
    }
}

impl From<galaxy_core::Error> for Error {
    fn from(e: galaxy_core::Error) -> Self {
        use galaxy_core::Error as Core;
        match e {
            Core::NotFound { collection, id } => Error::RecordNotFound {
                collection,
                id: id.into_string(),
            },
            Core::Validation(report) => Error::Validation { report },
            Core::Patch(err) => Error::from(err),
            Core::Conflict { expected, actual } => Error::VersionConflict { expected, actual },
            Core::Limit(err) => Error::LimitExceeded {
                reason: err.to_string(),
            },
            Core::Store(reason) => Error::Store { reason },
            Core::Serialization(reason) => Error::Serialization { reason },
            Core::Credential(reason) => Error::Internal { reason },
        }
    }
}

impl From<galaxy_core::PatchError> for Error {
    fn from(e: galaxy_core::PatchError) -> Self {
        Error::Patch {
            reason: e.to_string(),
            details: serde_json::to_value(&e).unwrap_or(Value::Null),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization {
            reason: e.to_string(),
        }
    }
}
