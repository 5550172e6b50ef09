//! # Galaxy Executor
//!
//! The request layer of the Galaxy bootcamp back office.
//!
//! It provides:
//! - [`ResourceController`] - list, get, create, upsert, JSON Patch and
//!   destroy over one collection
//! - [`Executor`] - routes [`Command`]s to controllers and maps results to
//!   [`Response`]s with HTTP status codes
//! - [`GalaxyConfig`] - the `galaxy.toml` configuration
//!
//! ## Quick Start
//!
//! ```text
//! use galaxy_executor::{Command, Executor, GalaxyConfig};
//! use galaxy_store::MemoryStore;
//!
//! let executor = Executor::with_builtin_collections(
//!     Arc::new(MemoryStore::new()),
//!     GalaxyConfig::default(),
//! )?;
//!
//! let response = executor.respond_json(
//!     r#"{"Get": {"collection": "resources", "id": "a1"}}"#,
//! );
//! assert_eq!(response.status.as_u16(), 404);
//! ```
//!
//! ## Status Codes
//!
//! | Outcome | Status |
//! |---------|--------|
//! | list, get, upsert, patch | 200 |
//! | create | 201 |
//! | destroy | 204 |
//! | missing record or collection | 404 |
//! | validation, patch, malformed input | 400 (500 in legacy mode) |
//! | revision conflict | 409 |
//! | store failure | 500 |

#![warn(missing_docs)]

mod command;
mod config;
mod controller;
mod error;
mod executor;
mod output;
mod populate;


// =============================================================================
// Public API - Everything users need is re-exported here
// =============================================================================

pub use command::Command;
pub use config::{ErrorConfig, GalaxyConfig, CONFIG_FILE_NAME};
pub use controller::ResourceController;
pub use error::Error;
pub use executor::Executor;
pub use output::{Output, Response};
pub use populate::{populate, render};

/// Result type for executor operations
pub type Result<T> = std::result::Result<T, Error>;
