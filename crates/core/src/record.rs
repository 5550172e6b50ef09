//! Stored records
//!
//! A [`Record`] is one document of a collection: the schema-defined `fields`
//! plus the bookkeeping the store owns (identifier, revision, timestamps).
//! Bookkeeping is never taken from a client payload; it is rendered into the
//! outbound document under reserved names.

use crate::id::RecordId;
use crate::pointer::JsonPointer;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Rendered name of the identifier
pub const ID_FIELD: &str = "_id";

/// Alternate identifier name some clients send
pub const ID_ALIAS_FIELD: &str = "id";

/// Rendered name of the revision counter
pub const VERSION_FIELD: &str = "__v";

/// Rendered name of the creation timestamp
pub const CREATED_AT_FIELD: &str = "createdAt";

/// Rendered name of the last-modified timestamp
pub const UPDATED_AT_FIELD: &str = "updatedAt";

/// Every top-level name owned by the store
pub const RESERVED_FIELDS: [&str; 5] = [
    ID_FIELD,
    ID_ALIAS_FIELD,
    VERSION_FIELD,
    CREATED_AT_FIELD,
    UPDATED_AT_FIELD,
];

/// A record with its bookkeeping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Identifier, immutable after insert
    pub id: RecordId,
    /// Revision (0 on insert, +1 on every write)
    pub revision: u64,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last write time
    pub updated_at: DateTime<Utc>,
    /// Schema-defined fields
    pub fields: Map<String, Value>,
}

impl Record {
    /// Create a record at revision 0 with both timestamps set to now
    pub fn new(id: RecordId, fields: Map<String, Value>) -> Self {
        let now = Utc::now();
        Record {
            id,
            revision: 0,
            created_at: now,
            updated_at: now,
            fields,
        }
    }

    /// Field by name
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Bump the revision and the modification time
    ///
    /// Call this after any modification to the record.
    pub fn touch(&mut self) {
        self.revision += 1;
        self.updated_at = Utc::now();
    }

    /// Successor of this record holding `fields`
    ///
    /// Keeps the identifier and creation time; the revision is bumped.
    pub fn with_fields(&self, fields: Map<String, Value>) -> Record {
        let mut next = Record {
            id: self.id.clone(),
            revision: self.revision,
            created_at: self.created_at,
            updated_at: self.updated_at,
            fields,
        };
        next.touch();
        next
    }

    /// Render the record as a JSON document
    ///
    /// The identifier comes first, then the fields in stored order, then the
    /// timestamps (when `timestamps` is set) and the revision.
    pub fn to_document(&self, timestamps: bool) -> Value {
        let mut doc = Map::with_capacity(self.fields.len() + 4);
        doc.insert(ID_FIELD.to_string(), Value::String(self.id.to_string()));
        for (name, value) in &self.fields {
            doc.insert(name.clone(), value.clone());
        }
        if timestamps {
            doc.insert(CREATED_AT_FIELD.to_string(), render_time(&self.created_at));
            doc.insert(UPDATED_AT_FIELD.to_string(), render_time(&self.updated_at));
        }
        doc.insert(VERSION_FIELD.to_string(), Value::from(self.revision));
        Value::Object(doc)
    }
}

fn render_time(at: &DateTime<Utc>) -> Value {
    Value::String(at.to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// Remove store-owned names from a payload
///
/// Returns the names that were present, for logging.
pub fn strip_reserved_fields(fields: &mut Map<String, Value>) -> Vec<&'static str> {
    RESERVED_FIELDS
        .iter()
        .copied()
        .filter(|name| fields.remove(*name).is_some())
        .collect()
}

/// True if a pointer addresses the identifier or anything inside it
pub fn targets_identifier(pointer: &JsonPointer) -> bool {
    matches!(pointer.first(), Some(ID_FIELD) | Some(ID_ALIAS_FIELD))
}
