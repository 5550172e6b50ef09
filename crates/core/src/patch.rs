//! JSON Patch (RFC 6902)
//!
//! A [`PatchSet`] is an ordered list of [`PatchOperation`]s. Later operations
//! observe the effects of earlier ones. [`apply_patch`] works on a copy of the
//! target document and only returns it when every operation succeeded, so a
//! failing patch never leaves a half-edited document behind.
//!
//! ## Supported Operations
//!
//! | Operation | Effect |
//! |-----------|--------|
//! | `add` | Insert into an object or array (`-` appends); replaces an existing object member |
//! | `remove` | Remove an existing member or element |
//! | `replace` | Replace an existing member or element |
//! | `move` | Remove at `from`, add at `path` |
//! | `copy` | Add a copy of `from` at `path` |
//! | `test` | Fail the whole patch unless the value at `path` equals `value` |
//!
//! # Examples
//!
//! ```
//! use galaxy_core::patch::{apply_patch, PatchSet};
//! use serde_json::json;
//!
//! let doc = json!({"title": "Old", "info": "I"});
//! let patch = PatchSet::from_value(json!([
//!     {"op": "replace", "path": "/title", "value": "New"}
//! ])).unwrap();
//!
//! assert_eq!(apply_patch(&doc, &patch).unwrap(), json!({"title": "New", "info": "I"}));
//! ```

use crate::limits::LimitError;
use crate::pointer::{parse_index, resolve, resolve_mut, value_kind, JsonPointer};
use crate::schema::ValidationReport;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

// =============================================================================
// Operations
// =============================================================================

/// A single patch operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum PatchOperation {
    /// Insert a value
    Add {
        /// Target location
        path: JsonPointer,
        /// Value to insert
        value: Value,
    },
    /// Remove a value
    Remove {
        /// Target location
        path: JsonPointer,
    },
    /// Replace an existing value
    Replace {
        /// Target location
        path: JsonPointer,
        /// Replacement value
        value: Value,
    },
    /// Move a value
    Move {
        /// Source location
        from: JsonPointer,
        /// Target location
        path: JsonPointer,
    },
    /// Copy a value
    Copy {
        /// Source location
        from: JsonPointer,
        /// Target location
        path: JsonPointer,
    },
    /// Assert a value
    Test {
        /// Location to compare
        path: JsonPointer,
        /// Expected value
        value: Value,
    },
}

impl PatchOperation {
    /// Operation name as it appears in the `op` member
    pub fn name(&self) -> &'static str {
        match self {
            PatchOperation::Add { .. } => "add",
            PatchOperation::Remove { .. } => "remove",
            PatchOperation::Replace { .. } => "replace",
            PatchOperation::Move { .. } => "move",
            PatchOperation::Copy { .. } => "copy",
            PatchOperation::Test { .. } => "test",
        }
    }

    /// Target location
    pub fn path(&self) -> &JsonPointer {
        match self {
            PatchOperation::Add { path, .. }
            | PatchOperation::Remove { path }
            | PatchOperation::Replace { path, .. }
            | PatchOperation::Move { path, .. }
            | PatchOperation::Copy { path, .. }
            | PatchOperation::Test { path, .. } => path,
        }
    }

    /// Source location for `move` and `copy`
    pub fn from(&self) -> Option<&JsonPointer> {
        match self {
            PatchOperation::Move { from, .. } | PatchOperation::Copy { from, .. } => Some(from),
            _ => None,
        }
    }

    /// True if this operation can change the document
    pub fn is_mutation(&self) -> bool {
        !matches!(self, PatchOperation::Test { .. })
    }

    /// Locations this operation writes: `path` for every mutation, plus
    /// `from` for `move`. A `copy` only reads its source.
    pub fn written_paths(&self) -> impl Iterator<Item = &JsonPointer> {
        let (target, source) = match self {
            PatchOperation::Test { .. } => (None, None),
            PatchOperation::Move { from, path } => (Some(path), Some(from)),
            PatchOperation::Add { path, .. }
            | PatchOperation::Remove { path }
            | PatchOperation::Replace { path, .. }
            | PatchOperation::Copy { path, .. } => (Some(path), None),
        };
        target.into_iter().chain(source)
    }
}

/// An ordered list of patch operations
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PatchSet(Vec<PatchOperation>);

impl PatchSet {
    /// Create a patch set from operations
    pub fn new(ops: Vec<PatchOperation>) -> Self {
        PatchSet(ops)
    }

    /// Decode an untrusted request body
    ///
    /// The body must be an array. Each element is decoded on its own so the
    /// error names the index of the first malformed operation.
    pub fn from_value(body: Value) -> Result<Self, PatchError> {
        let items = match body {
            Value::Array(items) => items,
            other => {
                return Err(PatchError::NotAnArray {
                    found: value_kind(&other).to_string(),
                })
            }
        };

        let mut ops = Vec::with_capacity(items.len());
        for (index, item) in items.into_iter().enumerate() {
            let op = serde_json::from_value(item).map_err(|e| PatchError::Malformed {
                index,
                reason: e.to_string(),
            })?;
            ops.push(op);
        }
        Ok(PatchSet(ops))
    }

    /// The operations in order
    pub fn ops(&self) -> &[PatchOperation] {
        &self.0
    }

    /// Number of operations
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True if there are no operations
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over the operations
    pub fn iter(&self) -> std::slice::Iter<'_, PatchOperation> {
        self.0.iter()
    }

    /// Longest pointer used by any operation
    pub fn max_path_len(&self) -> usize {
        self.0
            .iter()
            .flat_map(|op| std::iter::once(op.path()).chain(op.from()))
            .map(JsonPointer::len)
            .max()
            .unwrap_or(0)
    }
}

impl From<Vec<PatchOperation>> for PatchSet {
    fn from(ops: Vec<PatchOperation>) -> Self {
        PatchSet(ops)
    }
}

impl FromIterator<PatchOperation> for PatchSet {
    fn from_iter<I: IntoIterator<Item = PatchOperation>>(iter: I) -> Self {
        PatchSet(iter.into_iter().collect())
    }
}

impl IntoIterator for PatchSet {
    type Item = PatchOperation;
    type IntoIter = std::vec::IntoIter<PatchOperation>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a PatchSet {
    type Item = &'a PatchOperation;
    type IntoIter = std::slice::Iter<'a, PatchOperation>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

// =============================================================================
// Errors
// =============================================================================

/// Why a single operation could not be applied
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[serde(tag = "fault", rename_all = "snake_case")]
pub enum OpFault {
    /// Nothing exists at the pointer
    #[error("path {path} does not exist")]
    PathNotFound {
        /// Missing location
        path: String,
    },
    /// An array token is not a valid index
    #[error("'{token}' is not a valid array index at {path}")]
    InvalidIndex {
        /// Array location
        path: String,
        /// Offending token
        token: String,
    },
    /// An array index is past the end
    #[error("index {index} is out of bounds for array of length {len} at {path}")]
    IndexOutOfBounds {
        /// Array location
        path: String,
        /// Requested index
        index: usize,
        /// Array length
        len: usize,
    },
    /// The parent is a scalar and cannot hold members
    #[error("cannot address into a {found} at {path}")]
    InvalidTarget {
        /// Parent location
        path: String,
        /// Kind of value found there
        found: &'static str,
    },
    /// The whole document cannot be removed
    #[error("cannot remove the document root")]
    RootRemoval,
    /// `move` into a descendant of its own source
    #[error("cannot move {from} into its own child {path}")]
    MoveIntoChild {
        /// Source location
        from: String,
        /// Target location
        path: String,
    },
    /// `test` found a different value
    #[error("value at {path} does not match")]
    TestFailed {
        /// Compared location
        path: String,
        /// Expected value
        expected: Value,
        /// Value found (None if absent)
        actual: Option<Value>,
    },
}

/// Error applying a patch set
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PatchError {
    /// The request body is not an array
    #[error("patch body must be an array of operations, found {found}")]
    NotAnArray {
        /// Kind of value received
        found: String,
    },
    /// An element could not be decoded as an operation
    #[error("operation {index} is malformed: {reason}")]
    Malformed {
        /// Index of the element
        index: usize,
        /// Decoder message
        reason: String,
    },
    /// An operation failed to apply
    #[error("operation {index} ({op}) failed: {fault}")]
    Operation {
        /// Index of the failing operation
        index: usize,
        /// Operation name
        op: &'static str,
        /// Cause
        fault: OpFault,
    },
    /// The patched document is no longer an object
    #[error("patched document must be an object, found {found}")]
    NotAnObject {
        /// Kind of value the patch produced
        found: String,
    },
    /// The patched document failed schema validation
    #[error("patched document is invalid: {0}")]
    Schema(ValidationReport),
    /// The patched document exceeded a limit
    #[error("patched document exceeds limits: {0}")]
    Limit(LimitError),
}

// =============================================================================
// Application
// =============================================================================

/// Apply a patch set to a copy of `doc`
///
/// Returns the patched document. On failure `doc` is untouched and the error
/// names the index of the failing operation.
pub fn apply_patch(doc: &Value, patch: &PatchSet) -> Result<Value, PatchError> {
    let mut working = doc.clone();
    for (index, op) in patch.iter().enumerate() {
        apply_operation(&mut working, op).map_err(|fault| PatchError::Operation {
            index,
            op: op.name(),
            fault,
        })?;
    }
    Ok(working)
}

/// Apply a single operation in place
///
/// On error `doc` may be partially modified; use [`apply_patch`] for
/// all-or-nothing semantics.
pub fn apply_operation(doc: &mut Value, op: &PatchOperation) -> Result<(), OpFault> {
    match op {
        PatchOperation::Add { path, value } => add(doc, path, value.clone()),
        PatchOperation::Remove { path } => remove(doc, path).map(|_| ()),
        PatchOperation::Replace { path, value } => replace(doc, path, value.clone()),
        PatchOperation::Move { from, path } => {
            if from == path {
                return resolve(doc, from).map(|_| ()).ok_or_else(|| OpFault::PathNotFound {
                    path: from.to_string(),
                });
            }
            if from.is_proper_prefix_of(path) {
                return Err(OpFault::MoveIntoChild {
                    from: from.to_string(),
                    path: path.to_string(),
                });
            }
            let value = remove(doc, from)?;
            add(doc, path, value)
        }
        PatchOperation::Copy { from, path } => {
            let value = resolve(doc, from)
                .cloned()
                .ok_or_else(|| OpFault::PathNotFound {
                    path: from.to_string(),
                })?;
            add(doc, path, value)
        }
        PatchOperation::Test { path, value } => {
            let actual = resolve(doc, path);
            match actual {
                Some(actual) if json_equal(actual, value) => Ok(()),
                _ => Err(OpFault::TestFailed {
                    path: path.to_string(),
                    expected: value.clone(),
                    actual: actual.cloned(),
                }),
            }
        }
    }
}

/// Locate the container that holds the last token of `path`
fn parent_of<'a>(doc: &'a mut Value, parent: &JsonPointer) -> Result<&'a mut Value, OpFault> {
    resolve_mut(doc, parent).ok_or_else(|| OpFault::PathNotFound {
        path: parent.to_string(),
    })
}

fn array_index(parent: &JsonPointer, token: &str) -> Result<usize, OpFault> {
    parse_index(token).ok_or_else(|| OpFault::InvalidIndex {
        path: parent.to_string(),
        token: token.to_string(),
    })
}

fn add(doc: &mut Value, path: &JsonPointer, value: Value) -> Result<(), OpFault> {
    let Some((parent_ptr, last)) = path.split_last() else {
        *doc = value;
        return Ok(());
    };

    match parent_of(doc, &parent_ptr)? {
        Value::Object(map) => {
            map.insert(last.to_string(), value);
            Ok(())
        }
        Value::Array(arr) => {
            if last == "-" {
                arr.push(value);
                return Ok(());
            }
            let index = array_index(&parent_ptr, last)?;
            if index > arr.len() {
                return Err(OpFault::IndexOutOfBounds {
                    path: path.to_string(),
                    index,
                    len: arr.len(),
                });
            }
            arr.insert(index, value);
            Ok(())
        }
        other => Err(OpFault::InvalidTarget {
            path: parent_ptr.to_string(),
            found: value_kind(other),
        }),
    }
}

fn remove(doc: &mut Value, path: &JsonPointer) -> Result<Value, OpFault> {
    let (parent_ptr, last) = path.split_last().ok_or(OpFault::RootRemoval)?;

    match parent_of(doc, &parent_ptr)? {
        Value::Object(map) => map.remove(last).ok_or_else(|| OpFault::PathNotFound {
            path: path.to_string(),
        }),
        Value::Array(arr) => {
            let index = array_index(&parent_ptr, last)?;
            if index >= arr.len() {
                return Err(OpFault::IndexOutOfBounds {
                    path: path.to_string(),
                    index,
                    len: arr.len(),
                });
            }
            Ok(arr.remove(index))
        }
        other => Err(OpFault::InvalidTarget {
            path: parent_ptr.to_string(),
            found: value_kind(other),
        }),
    }
}

fn replace(doc: &mut Value, path: &JsonPointer, value: Value) -> Result<(), OpFault> {
    let target = resolve_mut(doc, path).ok_or_else(|| OpFault::PathNotFound {
        path: path.to_string(),
    })?;
    *target = value;
    Ok(())
}

/// JSON equality with numbers compared by value (`1` equals `1.0`)
pub fn json_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_i64(), y.as_i64()) {
            (Some(i), Some(j)) => i == j,
            _ => match (x.as_u64(), y.as_u64()) {
                (Some(i), Some(j)) => i == j,
                _ => x.as_f64() == y.as_f64(),
            },
        },
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| json_equal(x, y))
        }
        (Value::Object(xs), Value::Object(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .all(|(k, x)| ys.get(k).map_or(false, |y| json_equal(x, y)))
        }
        _ => a == b,
    }
}
