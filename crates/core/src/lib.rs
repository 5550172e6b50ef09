//! Core types for Galaxy
//!
//! This crate defines the foundational types used throughout the system:
//! - RecordId: Store-assigned record identifier
//! - Record: A persisted document plus its store metadata
//! - JsonPointer: RFC 6901 path into a document
//! - PatchOperation / PatchSet: RFC 6902 edits and the engine that applies them
//! - CollectionSchema: Field rules, defaults and validation reports
//! - Normalization and reference expansion stages
//! - Password hashing and account credential handling
//! - Document limits
//! - Error: Error type hierarchy

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod credentials;
pub mod error;
pub mod expand;
pub mod id;
pub mod limits;
pub mod models;
pub mod normalize;
pub mod password;
pub mod patch;
pub mod pointer;
pub mod record;
pub mod schema;

pub use error::{Error, Result};
pub use expand::expand_references;
pub use id::RecordId;
pub use limits::{DocumentLimits, LimitError};
pub use normalize::normalize;
pub use password::KdfParams;
pub use patch::{apply_patch, OpFault, PatchError, PatchOperation, PatchSet};
pub use pointer::{JsonPointer, PointerError};
pub use models::builtin_registry;
pub use record::{
    strip_reserved_fields, targets_identifier, Record, CREATED_AT_FIELD, ID_FIELD,
    UPDATED_AT_FIELD, VERSION_FIELD,
};
pub use schema::{
    CollectionSchema, FieldError, FieldErrorKind, FieldKind, FieldSpec, SchemaRegistry,
    ValidationReport,
};
