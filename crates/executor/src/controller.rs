//! The resource controller
//!
//! One [`ResourceController`] serves one collection. Each operation is a
//! single fetch → transform → write → render step; nothing is held between
//! calls. Every write goes through the same preparation pipeline:
//!
//! 1. strip store-owned names (`_id`, `id`, `__v`, `createdAt`, `updatedAt`)
//! 2. drop fields the schema does not declare
//! 3. normalize (lowercasing, collapsing expanded references)
//! 4. hash or carry over credentials (account collections)
//! 5. apply defaults
//! 6. validate against the schema
//! 7. check document limits
//!
//! Only then does the payload reach the store.

use crate::output::Output;
use crate::populate::{populate, render};
use crate::{Error, Result};
use galaxy_core::credentials::prepare_credentials;
use galaxy_core::pointer::value_kind;
use galaxy_core::{
    apply_patch, normalize, strip_reserved_fields, targets_identifier, CollectionSchema,
    DocumentLimits, KdfParams, PatchError, PatchSet, Record, RecordId, SchemaRegistry,
};
use galaxy_store::DocumentStore;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, warn};

/// CRUD and JSON Patch over one collection
#[derive(Clone)]
pub struct ResourceController {
    schema: Arc<CollectionSchema>,
    registry: Arc<SchemaRegistry>,
    store: Arc<dyn DocumentStore>,
    kdf: KdfParams,
    limits: DocumentLimits,
}

impl std::fmt::Debug for ResourceController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceController")
            .field("collection", &self.schema.name())
            .finish()
    }
}

impl ResourceController {
    /// Controller for `schema`, reading references through `registry`
    pub fn new(
        schema: Arc<CollectionSchema>,
        registry: Arc<SchemaRegistry>,
        store: Arc<dyn DocumentStore>,
        kdf: KdfParams,
        limits: DocumentLimits,
    ) -> Self {
        ResourceController {
            schema,
            registry,
            store,
            kdf,
            limits,
        }
    }

    /// Collection name
    pub fn collection(&self) -> &str {
        self.schema.name()
    }

    /// Collection schema
    pub fn schema(&self) -> &CollectionSchema {
        &self.schema
    }

    fn not_found(&self, id: &RecordId) -> Error {
        Error::RecordNotFound {
            collection: self.collection().to_string(),
            id: id.to_string(),
        }
    }

    fn present(&self, record: &Record) -> Result<Value> {
        let mut doc = render(&self.schema, record);
        populate(&mut doc, &self.schema, self.store.as_ref(), &self.registry)?;
        Ok(doc)
    }

    fn payload_object(payload: Value) -> Result<Map<String, Value>> {
        match payload {
            Value::Object(map) => Ok(map),
            other => Err(Error::InvalidInput {
                reason: format!("payload must be an object, found {}", value_kind(&other)),
            }),
        }
    }

    /// Run the write pipeline on `fields`
    ///
    /// `previous` is the stored record being replaced, if any.
    fn prepare(
        &self,
        mut fields: Map<String, Value>,
        previous: Option<&Record>,
    ) -> galaxy_core::Result<Map<String, Value>> {
        let stripped = strip_reserved_fields(&mut fields);
        let dropped = self.schema.retain_known(&mut fields);
        if !stripped.is_empty() || !dropped.is_empty() {
            debug!(
                target: "galaxy::controller",
                collection = self.collection(),
                ?stripped,
                ?dropped,
                "discarded payload fields"
            );
        }

        normalize(&self.schema, &mut fields);
        if self.schema.has_credentials() {
            prepare_credentials(
                self.collection(),
                &mut fields,
                previous.map(|r| &r.fields),
                &self.kdf,
            )?;
        }
        self.schema.apply_defaults(&mut fields);
        self.schema.validate(&fields)?;
        self.limits.check_fields(&fields)?;
        Ok(fields)
    }

    /// Every record, rendered and expanded, in store order
    pub fn list(&self) -> Result<Output> {
        let records = self.store.find_all(self.collection())?;
        let docs = records
            .iter()
            .map(|r| self.present(r))
            .collect::<Result<Vec<_>>>()?;
        debug!(target: "galaxy::controller", collection = self.collection(), count = docs.len(), "list");
        Ok(Output::Records(docs))
    }

    /// One record
    pub fn get(&self, id: &RecordId) -> Result<Output> {
        let record = self
            .store
            .find_by_id(self.collection(), id)?
            .ok_or_else(|| self.not_found(id))?;
        Ok(Output::Record(self.present(&record)?))
    }

    /// Insert a record under a store-assigned identifier
    pub fn create(&self, payload: Value) -> Result<Output> {
        let fields = self.prepare(Self::payload_object(payload)?, None)?;
        let record = self.store.insert(self.collection(), fields)?;
        debug!(target: "galaxy::controller", collection = self.collection(), id = %record.id, "created");
        Ok(Output::Created(self.present(&record)?))
    }

    /// Replace the record at `id` with `payload`, or insert it
    ///
    /// Fields missing from `payload` fall back to their defaults.
    pub fn upsert(&self, id: &RecordId, payload: Value) -> Result<Output> {
        let fields = Self::payload_object(payload)?;
        let previous = self.store.find_by_id(self.collection(), id)?;
        let fields = self.prepare(fields, previous.as_ref())?;
        let (record, inserted) = self.store.replace_or_insert(self.collection(), id, fields)?;
        debug!(
            target: "galaxy::controller",
            collection = self.collection(),
            id = %id,
            inserted,
            revision = record.revision,
            "upserted"
        );
        Ok(Output::Record(self.present(&record)?))
    }

    /// Apply a JSON Patch to the record at `id`
    ///
    /// A missing record is NotFound whatever the body. Operations that would
    /// write the identifier are dropped; `test` and `copy` may still read it.
    /// The patch sees the stored document (bookkeeping included, so `test`
    /// can assert `__v`); the result goes through the write pipeline and is
    /// committed only if the record still has the revision it was read at.
    pub fn patch(&self, id: &RecordId, body: Value) -> Result<Output> {
        let current = self
            .store
            .find_by_id(self.collection(), id)?
            .ok_or_else(|| self.not_found(id))?;

        let patch: PatchSet = PatchSet::from_value(body)?
            .into_iter()
            .filter(|op| !op.written_paths().any(targets_identifier))
            .collect();
        self.limits
            .check_path_len(patch.max_path_len())
            .map_err(PatchError::Limit)?;

        let patched = apply_patch(&current.to_document(self.schema.has_timestamps()), &patch)?;
        let fields = match patched {
            Value::Object(map) => map,
            other => {
                return Err(PatchError::NotAnObject {
                    found: value_kind(&other).to_string(),
                }
                .into())
            }
        };

        let fields = self
            .prepare(fields, Some(&current))
            .map_err(into_patch_error)?;
        let record = self
            .store
            .replace_if_revision(self.collection(), id, current.revision, fields)
            .map_err(into_patch_error)?;
        debug!(
            target: "galaxy::controller",
            collection = self.collection(),
            id = %id,
            ops = patch.len(),
            revision = record.revision,
            "patched"
        );
        Ok(Output::Record(self.present(&record)?))
    }

    /// Remove the record at `id`
    pub fn destroy(&self, id: &RecordId) -> Result<Output> {
        if self.store.find_by_id(self.collection(), id)?.is_none() {
            return Err(self.not_found(id));
        }
        match self.store.remove(self.collection(), id)? {
            Some(_) => {
                debug!(target: "galaxy::controller", collection = self.collection(), id = %id, "destroyed");
                Ok(Output::Deleted)
            }
            None => {
                warn!(target: "galaxy::controller", collection = self.collection(), id = %id, "record vanished before delete");
                Err(self.not_found(id))
            }
        }
    }
}

/// Validation and limit failures of a patched document are patch failures
fn into_patch_error(e: galaxy_core::Error) -> Error {
    match e {
        galaxy_core::Error::Validation(report) => PatchError::Schema(report).into(),
        galaxy_core::Error::Limit(limit) => PatchError::Limit(limit).into(),
        other => other.into(),
    }
}
