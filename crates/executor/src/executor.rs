//! The Executor - single entry point to Galaxy's collections.
//!
//! The Executor routes commands to the controller of the named collection and
//! converts results and errors into responses.

use std::sync::Arc;

use galaxy_core::{models, SchemaRegistry};
use galaxy_store::{DocumentStore, UniqueField};
use rustc_hash::FxHashMap;
use tracing::{debug, warn};

use crate::controller::ResourceController;
use crate::config::GalaxyConfig;
use crate::{Command, Error, Output, Response, Result};

/// The command executor - single entry point to Galaxy's collections.
///
/// The Executor holds one [`ResourceController`] per registered collection
/// and a handle to the store. It keeps no per-request state.
///
/// # Thread Safety
///
/// Executor is `Send + Sync` and can be shared across threads.
///
/// # Example
///
/// ```ignore
/// use galaxy_executor::{Command, Executor, GalaxyConfig};
/// use galaxy_store::MemoryStore;
/// use serde_json::json;
///
/// let executor = Executor::with_builtin_collections(
///     Arc::new(MemoryStore::new()),
///     GalaxyConfig::default(),
/// )?;
///
/// let response = executor.respond(Command::Create {
///     collection: "resources".into(),
///     payload: json!({"title": "T1", "url": "http://x"}),
/// });
/// assert_eq!(response.status.as_u16(), 201);
/// ```
pub struct Executor {
    store: Arc<dyn DocumentStore>,
    controllers: FxHashMap<String, ResourceController>,
    config: GalaxyConfig,
}

impl Executor {
    /// Create an executor serving every collection in `registry`.
    ///
    /// Declares each collection's uniqueness constraints to the store.
    pub fn new(
        store: Arc<dyn DocumentStore>,
        registry: SchemaRegistry,
        config: GalaxyConfig,
    ) -> Result<Self> {
        config.validate()?;
        let registry = Arc::new(registry);
        let mut controllers = FxHashMap::default();

        for schema in registry.iter() {
            let unique = schema
                .unique_fields()
                .into_iter()
                .map(|(field, message)| UniqueField { field, message })
                .collect();
            store.define_collection(schema.name(), unique)?;

            let controller = ResourceController::new(
                Arc::new(schema.clone()),
                Arc::clone(&registry),
                Arc::clone(&store),
                config.password,
                config.limits.clone(),
            );
            controllers.insert(schema.name().to_string(), controller);
        }

        debug!(
            target: "galaxy::executor",
            collections = controllers.len(),
            legacy_status = config.errors.legacy_validation_status,
            "executor ready"
        );
        Ok(Self {
            store,
            controllers,
            config,
        })
    }

    /// Create an executor serving the bootcamp collections.
    pub fn with_builtin_collections(
        store: Arc<dyn DocumentStore>,
        config: GalaxyConfig,
    ) -> Result<Self> {
        Self::new(store, models::builtin_registry(), config)
    }

    /// Controller for a collection
    pub fn controller(&self, collection: &str) -> Result<&ResourceController> {
        self.controllers
            .get(collection)
            .ok_or_else(|| Error::CollectionNotFound {
                collection: collection.to_string(),
            })
    }

    /// Names of the served collections, sorted
    pub fn collections(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.controllers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Execute a single command.
    ///
    /// Returns the command result or an error.
    pub fn execute(&self, cmd: Command) -> Result<Output> {
        let controller = self.controller(cmd.collection())?;
        match cmd {
            Command::List { .. } => controller.list(),
            Command::Get { id, .. } => controller.get(&id),
            Command::Create { payload, .. } => controller.create(payload),
            Command::Upsert { id, payload, .. } => controller.upsert(&id, payload),
            Command::Patch { id, patch, .. } => controller.patch(&id, patch),
            Command::Destroy { id, .. } => controller.destroy(&id),
        }
    }

    /// Execute a command and build the response the transport sends back.
    ///
    /// Never fails: errors become error responses.
    pub fn respond(&self, cmd: Command) -> Response {
        let name = cmd.name();
        let collection = cmd.collection().to_string();
        match self.execute(cmd) {
            Ok(output) => Response::from_output(output),
            Err(e) => self.error_response(name, &collection, e),
        }
    }

    /// Decode one JSON command and respond to it.
    ///
    /// A line that is not a valid command is answered with an invalid-input
    /// error.
    pub fn respond_json(&self, line: &str) -> Response {
        match serde_json::from_str::<Command>(line) {
            Ok(cmd) => self.respond(cmd),
            Err(e) => self.error_response(
                "Decode",
                "",
                Error::InvalidInput {
                    reason: format!("invalid command: {}", e),
                },
            ),
        }
    }

    /// Execute multiple commands sequentially, returning all results.
    ///
    /// Each command is executed independently; a failure does not stop the
    /// rest of the batch.
    pub fn execute_many(&self, cmds: Vec<Command>) -> Vec<Result<Output>> {
        cmds.into_iter().map(|cmd| self.execute(cmd)).collect()
    }

    /// Response for a failed command, logged at the appropriate level
    pub fn error_response(&self, command: &str, collection: &str, e: Error) -> Response {
        let status = e.status(self.config.errors.legacy_validation_status);
        if status.is_server_error() && !e.is_client_error() {
            warn!(target: "galaxy::executor", command, collection, error = %e, "command failed");
        } else {
            debug!(target: "galaxy::executor", command, collection, error = %e, status = status.as_u16(), "command rejected");
        }
        Response::new(status, e.body())
    }

    /// The active configuration
    pub fn config(&self) -> &GalaxyConfig {
        &self.config
    }

    /// Get a reference to the underlying store.
    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }
}
