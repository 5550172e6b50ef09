//! Seed-data loading.
//!
//! A seed file maps collection names to arrays of records:
//!
//! ```json
//! {
//!   "cohorts": [{"_id": "c1", "name": "Spring"}],
//!   "squads":  [{"name": "Red", "cohort": "c1"}]
//! }
//! ```
//!
//! Collections load in file order. Entries carrying `_id` are upserted at that
//! identifier so later collections can reference them; the rest are created.
//! Every entry goes through the collection's controller, so the usual
//! validation applies.

use galaxy_core::{RecordId, ID_FIELD};
use galaxy_executor::Command;
use galaxy_store::DocumentStore;
use serde_json::Value;
use tracing::{info, warn};

use crate::state::SessionState;

/// Records loaded and rejected for one collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedCount {
    /// Collection the entries were written to
    pub collection: String,
    /// Entries written successfully
    pub loaded: usize,
    /// Entries the controller refused
    pub rejected: usize,
}

/// Load `seed` into the store.
///
/// With `reset`, every named collection is emptied first.
pub fn load_seed(state: &SessionState, seed: Value, reset: bool) -> Result<Vec<SeedCount>, String> {
    let collections = match seed {
        Value::Object(map) => map,
        _ => return Err("Seed file must be an object of collection arrays".to_string()),
    };

    let mut counts = Vec::with_capacity(collections.len());
    for (collection, records) in collections {
        let records = match records {
            Value::Array(records) => records,
            _ => return Err(format!("Seed entry '{}' must be an array", collection)),
        };
        if reset {
            remove_all(state, &collection)?;
        }

        let mut count = SeedCount {
            collection: collection.clone(),
            loaded: 0,
            rejected: 0,
        };
        for (index, record) in records.into_iter().enumerate() {
            let cmd = match record.get(ID_FIELD).and_then(Value::as_str) {
                Some(id) => Command::Upsert {
                    collection: collection.clone(),
                    id: RecordId::new(id),
                    payload: record.clone(),
                },
                None => Command::Create {
                    collection: collection.clone(),
                    payload: record,
                },
            };
            let response = state.execute(cmd);
            if response.is_success() {
                count.loaded += 1;
            } else {
                warn!(
                    target: "galaxy::cli",
                    collection = %collection,
                    index,
                    status = response.status.as_u16(),
                    body = %response.body_or_null(),
                    "seed record rejected"
                );
                count.rejected += 1;
            }
        }
        info!(target: "galaxy::cli", collection = %count.collection, loaded = count.loaded, "seeded");
        counts.push(count);
    }
    Ok(counts)
}

fn remove_all(state: &SessionState, collection: &str) -> Result<(), String> {
    let records = state
        .executor()
        .store()
        .find_all(collection)
        .map_err(|e| format!("Failed to read '{}': {}", collection, e))?;
    for record in records {
        state.execute(Command::Destroy {
            collection: collection.to_string(),
            id: record.id,
        });
    }
    Ok(())
}
