//! Document size limits
//!
//! Limits are checked before any write reaches the store, on create, upsert
//! and on the result of a patch.
//!
//! | Limit | Default |
//! |-------|---------|
//! | Max document size | 16 MB |
//! | Max nesting depth | 100 levels |
//! | Max pointer length | 256 tokens |
//! | Max array size | 1M elements |

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Maximum document size in bytes (16 MB)
pub const MAX_DOCUMENT_SIZE: usize = 16 * 1024 * 1024;

/// Maximum nesting depth in a document (100 levels)
pub const MAX_NESTING_DEPTH: usize = 100;

/// Maximum pointer length in tokens (256 tokens)
pub const MAX_PATH_LENGTH: usize = 256;

/// Maximum array size in elements (1 million elements)
pub const MAX_ARRAY_SIZE: usize = 1_000_000;

/// Error type for document limit violations
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LimitError {
    /// Document exceeds maximum size
    #[error("document size {size} exceeds maximum of {max} bytes")]
    DocumentTooLarge {
        /// Actual document size
        size: usize,
        /// Maximum allowed size
        max: usize,
    },

    /// Document nesting exceeds maximum depth
    #[error("document nesting depth {depth} exceeds maximum of {max} levels")]
    NestingTooDeep {
        /// Actual nesting depth
        depth: usize,
        /// Maximum allowed depth
        max: usize,
    },

    /// Pointer exceeds maximum length
    #[error("path length {length} exceeds maximum of {max} tokens")]
    PathTooLong {
        /// Actual path length
        length: usize,
        /// Maximum allowed length
        max: usize,
    },

    /// Array exceeds maximum element count
    #[error("array size {size} exceeds maximum of {max} elements")]
    ArrayTooLarge {
        /// Actual array size
        size: usize,
        /// Maximum allowed size
        max: usize,
    },
}

/// Configurable document limits
///
/// Persisted in `galaxy.toml` under the `[limits]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentLimits {
    /// Maximum serialized document size in bytes
    pub max_document_bytes: usize,
    /// Maximum nesting depth
    pub max_nesting_depth: usize,
    /// Maximum number of tokens in a patch path
    pub max_path_length: usize,
    /// Maximum number of elements in any array
    pub max_array_len: usize,
}

impl Default for DocumentLimits {
    fn default() -> Self {
        DocumentLimits {
            max_document_bytes: MAX_DOCUMENT_SIZE,
            max_nesting_depth: MAX_NESTING_DEPTH,
            max_path_length: MAX_PATH_LENGTH,
            max_array_len: MAX_ARRAY_SIZE,
        }
    }
}

impl DocumentLimits {
    /// Create limits with small values for testing
    pub fn with_small_limits() -> Self {
        DocumentLimits {
            max_document_bytes: 1000,
            max_nesting_depth: 5,
            max_path_length: 8,
            max_array_len: 10,
        }
    }

    /// Check a document against every limit
    pub fn check(&self, value: &Value) -> Result<(), LimitError> {
        let size = serde_json::to_vec(value).map(|v| v.len()).unwrap_or(0);
        self.check_measured(nesting_depth(value), max_array_size(value), size)
    }

    /// Check the fields of a record as if they were one document
    pub fn check_fields(&self, fields: &Map<String, Value>) -> Result<(), LimitError> {
        let depth = 1 + fields.values().map(nesting_depth).max().unwrap_or(0);
        let largest = fields.values().map(max_array_size).max().unwrap_or(0);
        let size = serde_json::to_vec(fields).map(|v| v.len()).unwrap_or(0);
        self.check_measured(depth, largest, size)
    }

    fn check_measured(&self, depth: usize, largest: usize, size: usize) -> Result<(), LimitError> {
        if depth > self.max_nesting_depth {
            return Err(LimitError::NestingTooDeep {
                depth,
                max: self.max_nesting_depth,
            });
        }
        if largest > self.max_array_len {
            return Err(LimitError::ArrayTooLarge {
                size: largest,
                max: self.max_array_len,
            });
        }
        if size > self.max_document_bytes {
            return Err(LimitError::DocumentTooLarge {
                size,
                max: self.max_document_bytes,
            });
        }
        Ok(())
    }

    /// Check a pointer length
    pub fn check_path_len(&self, length: usize) -> Result<(), LimitError> {
        if length > self.max_path_length {
            Err(LimitError::PathTooLong {
                length,
                max: self.max_path_length,
            })
        } else {
            Ok(())
        }
    }
}

/// Nesting depth of a value (scalars have depth 0)
pub fn nesting_depth(value: &Value) -> usize {
    match value {
        Value::Array(arr) => 1 + arr.iter().map(nesting_depth).max().unwrap_or(0),
        Value::Object(obj) => 1 + obj.values().map(nesting_depth).max().unwrap_or(0),
        _ => 0,
    }
}

/// Largest array anywhere in the value
pub fn max_array_size(value: &Value) -> usize {
    match value {
        Value::Array(arr) => arr
            .iter()
            .map(max_array_size)
            .max()
            .unwrap_or(0)
            .max(arr.len()),
        Value::Object(obj) => obj.values().map(max_array_size).max().unwrap_or(0),
        _ => 0,
    }
}
