//! Storage layer for Galaxy
//!
//! This crate implements the document store seam:
//! - DocumentStore: the trait the controllers talk to
//! - UniqueField: per-collection uniqueness constraints enforced at write time
//! - MemoryStore: FxHashMap-based collections, each behind its own RwLock,
//!   with insertion-order listing and JSON snapshots

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod document;
pub mod memory;

pub use document::{DocumentStore, UniqueField};
pub use memory::{MemoryStore, StoreSnapshot};
