//! Executor wrapper with snapshot persistence.
//!
//! Holds the executor and, when `--data` was given, the snapshot file the
//! in-memory store is written back to after every successful write.

use std::path::PathBuf;
use std::sync::Arc;

use galaxy_executor::{Command, Executor, GalaxyConfig, Response};
use galaxy_store::MemoryStore;
use tracing::info;

/// The executor plus where its store lives on disk.
pub struct SessionState {
    executor: Executor,
    store: Arc<MemoryStore>,
    data: Option<PathBuf>,
}

impl SessionState {
    /// Open the store (from `data` if it exists) and build the executor.
    pub fn open(config: GalaxyConfig, data: Option<PathBuf>) -> Result<Self, String> {
        let store = match &data {
            Some(path) if path.exists() => MemoryStore::load(path)
                .map_err(|e| format!("Failed to load '{}': {}", path.display(), e))?,
            _ => MemoryStore::new(),
        };
        let store = Arc::new(store);
        let executor = Executor::with_builtin_collections(store.clone(), config)
            .map_err(|e| format!("Failed to start executor: {}", e))?;
        Ok(Self {
            executor,
            store,
            data,
        })
    }

    /// Execute a command and persist the store if it changed.
    ///
    /// A write whose snapshot cannot be saved is answered with a store error.
    pub fn execute(&self, cmd: Command) -> Response {
        let write = cmd.is_write();
        let name = cmd.name();
        let collection = cmd.collection().to_string();
        let response = self.executor.respond(cmd);
        if write && response.is_success() {
            if let Err(e) = self.persist() {
                return self.executor.error_response(name, &collection, e.into());
            }
        }
        response
    }

    /// Execute one JSON-encoded command.
    pub fn execute_json(&self, line: &str) -> Response {
        match serde_json::from_str::<Command>(line) {
            Ok(cmd) => self.execute(cmd),
            // respond_json reports the decode failure
            Err(_) => self.executor.respond_json(line),
        }
    }

    /// The executor.
    pub fn executor(&self) -> &Executor {
        &self.executor
    }

    fn persist(&self) -> galaxy_core::Result<()> {
        if let Some(path) = &self.data {
            self.store.save(path)?;
            info!(target: "galaxy::cli", path = %path.display(), "store saved");
        }
        Ok(())
    }
}
