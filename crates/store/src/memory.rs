//! In-memory document store
//!
//! # Design
//!
//! - One `Collection` per name, each behind its own `parking_lot::RwLock`
//!   so collections never contend with each other
//! - FxHashMap from identifier to slot for O(1) lookups
//! - BTreeMap from insertion sequence to identifier for ordered listing
//! - Replacing a record keeps its slot, so it keeps its place in the listing
//!
//! The outer map only takes its write lock when a collection is created.

use crate::document::{DocumentStore, UniqueField};
use galaxy_core::patch::json_equal;
use galaxy_core::schema::FieldErrorKind;
use galaxy_core::{Error, Record, RecordId, Result, ValidationReport};
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Debug, Clone)]
struct Slot {
    seq: u64,
    record: Record,
}

#[derive(Debug, Default)]
struct Collection {
    slots: FxHashMap<RecordId, Slot>,
    order: BTreeMap<u64, RecordId>,
    next_seq: u64,
    unique: Vec<UniqueField>,
}

impl Collection {
    fn push(&mut self, record: Record) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.order.insert(seq, record.id.clone());
        self.slots.insert(record.id.clone(), Slot { seq, record });
    }

    /// Reject `fields` if a unique value is held by a record other than `id`
    fn check_unique(
        &self,
        collection: &str,
        id: Option<&RecordId>,
        fields: &Map<String, Value>,
    ) -> Result<()> {
        let mut report = ValidationReport::new(collection);
        for constraint in &self.unique {
            let value = match fields.get(&constraint.field) {
                None | Some(Value::Null) => continue,
                Some(v) => v,
            };
            let taken = self.slots.values().any(|slot| {
                Some(&slot.record.id) != id
                    && slot
                        .record
                        .get(&constraint.field)
                        .map_or(false, |other| json_equal(other, value))
            });
            if taken {
                report.push(
                    constraint.field.clone(),
                    FieldErrorKind::Unique,
                    constraint.message(),
                );
            }
        }
        report.into_result().map_err(Error::from)
    }
}

/// Serializable image of a whole store
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreSnapshot {
    /// Records per collection, in insertion order
    pub collections: BTreeMap<String, Vec<Record>>,
}

/// Thread-safe in-memory [`DocumentStore`]
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<FxHashMap<String, Arc<RwLock<Collection>>>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        MemoryStore::default()
    }

    fn collection(&self, name: &str) -> Arc<RwLock<Collection>> {
        if let Some(c) = self.collections.read().get(name) {
            return Arc::clone(c);
        }
        let mut map = self.collections.write();
        Arc::clone(map.entry(name.to_string()).or_default())
    }

    /// Copy every record out of the store
    pub fn snapshot(&self) -> StoreSnapshot {
        let handles: Vec<(String, Arc<RwLock<Collection>>)> = self
            .collections
            .read()
            .iter()
            .map(|(name, c)| (name.clone(), Arc::clone(c)))
            .collect();

        let mut collections = BTreeMap::new();
        for (name, handle) in handles {
            let c = handle.read();
            let records = c
                .order
                .values()
                .filter_map(|id| c.slots.get(id))
                .map(|slot| slot.record.clone())
                .collect();
            collections.insert(name, records);
        }
        StoreSnapshot { collections }
    }

    /// Build a store holding the records of a snapshot
    ///
    /// A repeated id keeps its first record; later copies are skipped.
    pub fn from_snapshot(snapshot: StoreSnapshot) -> Self {
        let store = MemoryStore::new();
        {
            let mut map = store.collections.write();
            for (name, records) in snapshot.collections {
                let mut c = Collection::default();
                for record in records {
                    if c.slots.contains_key(&record.id) {
                        warn!(target: "galaxy::store", collection = %name, id = %record.id, "duplicate id in snapshot skipped");
                        continue;
                    }
                    c.push(record);
                }
                map.insert(name, Arc::new(RwLock::new(c)));
            }
        }
        store
    }

    /// Load a store from a JSON snapshot file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::store(format!("cannot read {}: {}", path.display(), e)))?;
        let snapshot: StoreSnapshot = serde_json::from_str(&content)?;
        debug!(target: "galaxy::store", path = %path.display(), "loaded snapshot");
        Ok(MemoryStore::from_snapshot(snapshot))
    }

    /// Write the store to a JSON snapshot file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = serde_json::to_string_pretty(&self.snapshot())?;
        std::fs::write(path, content)
            .map_err(|e| Error::store(format!("cannot write {}: {}", path.display(), e)))?;
        debug!(target: "galaxy::store", path = %path.display(), "saved snapshot");
        Ok(())
    }
}

impl DocumentStore for MemoryStore {
    fn define_collection(&self, collection: &str, unique: Vec<UniqueField>) -> Result<()> {
        self.collection(collection).write().unique = unique;
        Ok(())
    }

    fn find_all(&self, collection: &str) -> Result<Vec<Record>> {
        let handle = self.collection(collection);
        let c = handle.read();
        Ok(c.order
            .values()
            .filter_map(|id| c.slots.get(id))
            .map(|slot| slot.record.clone())
            .collect())
    }

    fn find_by_id(&self, collection: &str, id: &RecordId) -> Result<Option<Record>> {
        let handle = self.collection(collection);
        let c = handle.read();
        Ok(c.slots.get(id).map(|slot| slot.record.clone()))
    }

    fn insert(&self, collection: &str, fields: Map<String, Value>) -> Result<Record> {
        let handle = self.collection(collection);
        let mut c = handle.write();
        c.check_unique(collection, None, &fields)?;

        let mut id = RecordId::generate();
        while c.slots.contains_key(&id) {
            id = RecordId::generate();
        }
        let record = Record::new(id, fields);
        c.push(record.clone());
        debug!(target: "galaxy::store", collection, id = %record.id, "inserted");
        Ok(record)
    }

    fn replace_or_insert(
        &self,
        collection: &str,
        id: &RecordId,
        fields: Map<String, Value>,
    ) -> Result<(Record, bool)> {
        let handle = self.collection(collection);
        let mut c = handle.write();
        c.check_unique(collection, Some(id), &fields)?;

        if let Some(slot) = c.slots.get_mut(id) {
            slot.record = slot.record.with_fields(fields);
            debug!(target: "galaxy::store", collection, id = %id, revision = slot.record.revision, "replaced");
            return Ok((slot.record.clone(), false));
        }

        let record = Record::new(id.clone(), fields);
        c.push(record.clone());
        debug!(target: "galaxy::store", collection, id = %id, "inserted by upsert");
        Ok((record, true))
    }

    fn replace_if_revision(
        &self,
        collection: &str,
        id: &RecordId,
        expected: u64,
        fields: Map<String, Value>,
    ) -> Result<Record> {
        let handle = self.collection(collection);
        let mut c = handle.write();

        let actual = match c.slots.get(id) {
            Some(slot) => slot.record.revision,
            None => return Err(Error::not_found(collection, id.clone())),
        };
        if actual != expected {
            return Err(Error::Conflict { expected, actual });
        }
        c.check_unique(collection, Some(id), &fields)?;

        let slot = c
            .slots
            .get_mut(id)
            .ok_or_else(|| Error::not_found(collection, id.clone()))?;
        slot.record = slot.record.with_fields(fields);
        debug!(target: "galaxy::store", collection, id = %id, revision = slot.record.revision, "replaced at revision");
        Ok(slot.record.clone())
    }

    fn remove(&self, collection: &str, id: &RecordId) -> Result<Option<Record>> {
        let handle = self.collection(collection);
        let mut c = handle.write();
        let Some(slot) = c.slots.remove(id) else {
            return Ok(None);
        };
        c.order.remove(&slot.seq);
        debug!(target: "galaxy::store", collection, id = %id, "removed");
        Ok(Some(slot.record))
    }

    fn count(&self, collection: &str) -> Result<usize> {
        Ok(self.collection(collection).read().slots.len())
    }
}
