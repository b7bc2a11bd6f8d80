//! Machine collection persistence gateway.
//!
//! # Responsibility
//! - Read/write the JSON machine collection under a fixed key.
//! - Read/write the active machine id and resolve it against the collection.
//!
//! # Invariants
//! - `load` returns an owned collection; the built-in default is never
//!   handed out by reference.
//! - A corrupt or missing collection resets to defaults silently (logged only).
//! - `save` writes the whole collection in one `set`.

use crate::model::defaults::default_collection;
use crate::model::machine::{MachineCollection, MachineId};
use crate::store::{KeyValueStore, StoreResult};
use log::{debug, warn};

/// Store key holding the JSON machine collection.
pub const MACHINES_KEY: &str = "pm_machines";
/// Store key holding the plain active machine id.
pub const ACTIVE_MACHINE_KEY: &str = "pm_active_machine";

/// Gateway between the in-memory collection and a key-value store.
pub struct MachineRepository<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> MachineRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Loads the stored collection, or a fresh default copy when the key is
    /// missing, unreadable or not a valid collection.
    pub fn load(&self) -> MachineCollection {
        let raw = match self.store.get(MACHINES_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!("event=machines_load module=repo status=fallback reason=missing_key");
                return default_collection();
            }
            Err(err) => {
                warn!(
                    "event=machines_load module=repo status=fallback reason=store_error error={}",
                    err
                );
                return default_collection();
            }
        };

        match serde_json::from_str::<MachineCollection>(&raw) {
            Ok(collection) => {
                debug!(
                    "event=machines_load module=repo status=ok machines={}",
                    collection.len()
                );
                collection
            }
            Err(err) => {
                warn!(
                    "event=machines_load module=repo status=fallback reason=corrupt_json line={} column={}",
                    err.line(),
                    err.column()
                );
                default_collection()
            }
        }
    }

    /// Serializes and writes the whole collection.
    pub fn save(&self, collection: &MachineCollection) -> StoreResult<()> {
        let raw = serde_json::to_string(collection)?;
        self.store.set(MACHINES_KEY, &raw)?;
        debug!(
            "event=machines_save module=repo status=ok machines={} bytes={}",
            collection.len(),
            raw.len()
        );
        Ok(())
    }

    /// Reads the stored active machine id; unreadable or blank means none.
    pub fn load_active_id(&self) -> Option<MachineId> {
        match self.store.get(ACTIVE_MACHINE_KEY) {
            Ok(value) => value.filter(|id| !id.trim().is_empty()),
            Err(err) => {
                warn!(
                    "event=active_load module=repo status=fallback reason=store_error error={}",
                    err
                );
                None
            }
        }
    }

    /// Writes the active machine id, or clears it for `None`.
    pub fn save_active_id(&self, active_id: Option<&str>) -> StoreResult<()> {
        match active_id {
            Some(id) => self.store.set(ACTIVE_MACHINE_KEY, id),
            None => self.store.remove(ACTIVE_MACHINE_KEY),
        }
    }
}

/// Returns `stored_id` when it names a machine in `collection`, otherwise the
/// first machine id, or `None` for an empty collection.
pub fn resolve_active_id(collection: &MachineCollection, stored_id: Option<&str>) -> Option<MachineId> {
    match stored_id {
        Some(id) if collection.contains(id) => Some(id.to_string()),
        _ => collection.first_id().map(str::to_string),
    }
}
