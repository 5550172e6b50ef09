//! Galaxy - record management for a coding-bootcamp back office
//!
//! Students, cohorts, squads, homework, attendance, projects and curated
//! learning resources, served through one generic resource protocol: list,
//! get, create, upsert, JSON Patch and destroy over named collections.
//!
//! # Quick Start
//!
//! ```ignore
//! use galaxy::{Command, Executor, GalaxyConfig, MemoryStore};
//! use std::sync::Arc;
//!
//! let executor = Executor::with_builtin_collections(
//!     Arc::new(MemoryStore::new()),
//!     GalaxyConfig::default(),
//! )?;
//!
//! let created = executor.respond(Command::Create {
//!     collection: "resources".into(),
//!     payload: serde_json::json!({"title": "T1", "url": "http://x"}),
//! });
//! assert_eq!(created.status.as_u16(), 201);
//! ```
//!
//! # Architecture
//!
//! All operations go through the [`Executor`], which routes each [`Command`]
//! to the [`ResourceController`] of its collection. Records live in a
//! [`DocumentStore`]; [`MemoryStore`] is the bundled implementation.

// Re-export the public API from galaxy-executor
pub use galaxy_executor::*;

pub use galaxy_core::{
    builtin_registry, CollectionSchema, DocumentLimits, FieldSpec, KdfParams, PatchOperation,
    PatchSet, Record, RecordId, SchemaRegistry, ValidationReport,
};
pub use galaxy_store::{DocumentStore, MemoryStore, StoreSnapshot, UniqueField};
