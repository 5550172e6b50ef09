//! The document store seam
//!
//! Controllers never hold records across calls; every operation is one call
//! into a [`DocumentStore`]. Single-record writes are atomic. The store never
//! applies schema rules except uniqueness, which needs the whole collection
//! and is checked under the write lock.

use galaxy_core::{Record, RecordId, Result};
use serde_json::{Map, Value};

/// A field whose values must be distinct within a collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniqueField {
    /// Top-level field name
    pub field: String,
    /// Message reported on collision (a generic one if None)
    pub message: Option<String>,
}

impl UniqueField {
    /// Constraint with the generic message
    pub fn new(field: impl Into<String>) -> Self {
        UniqueField {
            field: field.into(),
            message: None,
        }
    }

    /// Message reported on collision
    pub fn message(&self) -> String {
        self.message
            .clone()
            .unwrap_or_else(|| format!("Path `{}` must be unique.", self.field))
    }
}

/// Storage backend for named collections of records
///
/// Collections come into existence on first use. Every method is safe to
/// call concurrently.
pub trait DocumentStore: Send + Sync {
    /// Declare the uniqueness constraints of a collection
    ///
    /// Replaces any earlier declaration.
    fn define_collection(&self, collection: &str, unique: Vec<UniqueField>) -> Result<()>;

    /// Every record, in insertion order
    fn find_all(&self, collection: &str) -> Result<Vec<Record>>;

    /// Record by identifier
    fn find_by_id(&self, collection: &str, id: &RecordId) -> Result<Option<Record>>;

    /// Insert a new record under a freshly assigned identifier (revision 0)
    fn insert(&self, collection: &str, fields: Map<String, Value>) -> Result<Record>;

    /// Replace the fields of the record at `id`, or insert one with that id
    ///
    /// Returns the stored record and true if it was inserted.
    fn replace_or_insert(
        &self,
        collection: &str,
        id: &RecordId,
        fields: Map<String, Value>,
    ) -> Result<(Record, bool)>;

    /// Replace the fields of the record at `id` if it is still at `expected`
    ///
    /// Fails with `NotFound` if the record is gone and with `Conflict` if
    /// another write bumped its revision.
    fn replace_if_revision(
        &self,
        collection: &str,
        id: &RecordId,
        expected: u64,
        fields: Map<String, Value>,
    ) -> Result<Record>;

    /// Delete a record, returning it if it existed
    fn remove(&self, collection: &str, id: &RecordId) -> Result<Option<Record>>;

    /// Number of records in a collection
    fn count(&self, collection: &str) -> Result<usize>;
}
