//! Command enum defining all Galaxy operations.
//!
//! Commands are the "instruction set" of Galaxy. Every request the transport
//! layer can make against a collection is represented as a variant of this
//! enum.
//!
//! Commands are:
//! - **Self-contained**: All parameters needed for execution are in the variant
//! - **Serializable**: Can be converted to/from JSON, one command per line
//! - **Pure data**: No closures or executable code

use galaxy_core::RecordId;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A command is a self-contained, serializable operation on one collection.
///
/// # Wire Form
///
/// Externally tagged, e.g.
///
/// ```text
/// {"List":    {"collection": "resources"}}
/// {"Get":     {"collection": "resources", "id": "a1"}}
/// {"Create":  {"collection": "resources", "payload": {"title": "T1", "url": "http://x"}}}
/// {"Upsert":  {"collection": "resources", "id": "a1", "payload": {...}}}
/// {"Patch":   {"collection": "resources", "id": "a1", "patch": [{"op": "replace", ...}]}}
/// {"Destroy": {"collection": "resources", "id": "a1"}}
/// ```
///
/// Payloads and patch bodies stay raw JSON here; the controller decodes them
/// so malformed bodies surface as validation or patch errors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub enum Command {
    /// Every record of a collection.
    /// Returns: `Output::Records`
    List { collection: String },

    /// One record.
    /// Returns: `Output::Record`
    Get { collection: String, id: RecordId },

    /// Insert a record under a store-assigned identifier.
    /// Returns: `Output::Created`
    Create { collection: String, payload: Value },

    /// Replace the record at `id`, or insert one with that identifier.
    /// Returns: `Output::Record`
    Upsert {
        collection: String,
        id: RecordId,
        payload: Value,
    },

    /// Apply a JSON Patch to the record at `id`.
    /// Returns: `Output::Record`
    Patch {
        collection: String,
        id: RecordId,
        patch: Value,
    },

    /// Remove the record at `id`.
    /// Returns: `Output::Deleted`
    Destroy { collection: String, id: RecordId },
}

impl Command {
    /// Collection the command targets
    pub fn collection(&self) -> &str {
        match self {
            Command::List { collection }
            | Command::Get { collection, .. }
            | Command::Create { collection, .. }
            | Command::Upsert { collection, .. }
            | Command::Patch { collection, .. }
            | Command::Destroy { collection, .. } => collection,
        }
    }

    /// Record the command targets, if any
    pub fn id(&self) -> Option<&RecordId> {
        match self {
            Command::Get { id, .. }
            | Command::Upsert { id, .. }
            | Command::Patch { id, .. }
            | Command::Destroy { id, .. } => Some(id),
            Command::List { .. } | Command::Create { .. } => None,
        }
    }

    /// Returns `true` if this command can write to the store.
    pub fn is_write(&self) -> bool {
        matches!(
            self,
            Command::Create { .. }
                | Command::Upsert { .. }
                | Command::Patch { .. }
                | Command::Destroy { .. }
        )
    }

    /// Returns the variant name as a static string.
    pub fn name(&self) -> &'static str {
        match self {
            Command::List { .. } => "List",
            Command::Get { .. } => "Get",
            Command::Create { .. } => "Create",
            Command::Upsert { .. } => "Upsert",
            Command::Patch { .. } => "Patch",
            Command::Destroy { .. } => "Destroy",
        }
    }
}
