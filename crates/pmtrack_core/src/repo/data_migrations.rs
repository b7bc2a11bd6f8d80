//! One-shot data migrations for loaded machine collections.
//!
//! # Responsibility
//! - Drop machines that are no longer supported.
//! - Insert machines every collection is required to carry.
//! - Repoint the active machine when its target was dropped.
//!
//! # Invariants
//! - Steps run in registry order; each is idempotent.
//! - The save callback runs at most once per run, and only on change.
//! - A migrated collection is never empty: the required machine is inserted
//!   after removals.

use crate::model::defaults::{required_machine, REQUIRED_MACHINE_ID};
use crate::model::machine::{MachineCollection, MachineId};
use log::info;

/// Machine id retired from the built-in set.
pub const DEPRECATED_MACHINE_ID: &str = "demo-machine";

/// What a migration run changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationReport {
    pub changed: bool,
    pub removed_ids: Vec<MachineId>,
    pub inserted_ids: Vec<MachineId>,
}

#[derive(Debug, Clone, Copy)]
struct DataMigration {
    name: &'static str,
    apply: fn(&mut MachineCollection, &mut MigrationReport),
}

const DATA_MIGRATIONS: &[DataMigration] = &[
    DataMigration {
        name: "remove_deprecated_machine",
        apply: remove_deprecated_machine,
    },
    DataMigration {
        name: "insert_required_machine",
        apply: insert_required_machine,
    },
];

fn remove_deprecated_machine(collection: &mut MachineCollection, report: &mut MigrationReport) {
    if collection.remove(DEPRECATED_MACHINE_ID).is_some() {
        report.changed = true;
        report.removed_ids.push(DEPRECATED_MACHINE_ID.to_string());
    }
}

fn insert_required_machine(collection: &mut MachineCollection, report: &mut MigrationReport) {
    if !collection.contains(REQUIRED_MACHINE_ID) {
        collection.insert(required_machine());
        report.changed = true;
        report.inserted_ids.push(REQUIRED_MACHINE_ID.to_string());
    }
}

/// Applies every registered step to `collection` without saving.
pub fn apply_data_migrations(collection: &mut MachineCollection) -> MigrationReport {
    let mut report = MigrationReport::default();
    for migration in DATA_MIGRATIONS {
        let was_changed = report.changed;
        report.changed = false;
        (migration.apply)(collection, &mut report);
        if report.changed {
            info!(
                "event=data_migration module=repo status=applied step={}",
                migration.name
            );
        }
        report.changed |= was_changed;
    }
    report
}

/// Migrates `collection` in place and returns the active id to use next.
///
/// `save` is invoked once with the migrated collection when anything changed.
/// When `active_id` named a removed machine the first remaining id is
/// returned; otherwise `active_id` comes back unchanged.
pub fn run_migrations<F>(
    collection: &mut MachineCollection,
    active_id: Option<&str>,
    save: F,
) -> Option<MachineId>
where
    F: FnOnce(&MachineCollection),
{
    let report = apply_data_migrations(collection);
    if report.changed {
        save(collection);
    }

    match active_id {
        Some(id) if report.removed_ids.iter().any(|removed| removed == id) => {
            collection.first_id().map(str::to_string)
        }
        other => other.map(str::to_string),
    }
}

#[cfg(test)]
mod tests {
    use super::{apply_data_migrations, DEPRECATED_MACHINE_ID};
    use crate::model::defaults::{default_collection, REQUIRED_MACHINE_ID};
    use crate::model::machine::{Machine, MachineCollection};

    #[test]
    fn default_collection_needs_no_migration() {
        let mut collection = default_collection();
        let report = apply_data_migrations(&mut collection);
        assert!(!report.changed);
        assert_eq!(collection, default_collection());
    }

    #[test]
    fn empty_collection_gains_required_machine() {
        let mut collection = MachineCollection::new();
        let report = apply_data_migrations(&mut collection);
        assert!(report.changed);
        assert_eq!(report.inserted_ids, vec![REQUIRED_MACHINE_ID.to_string()]);
        assert_eq!(collection.len(), 1);
    }

    #[test]
    fn collection_of_only_deprecated_machine_is_never_left_empty() {
        let mut collection =
            MachineCollection::from_machines([Machine::new(DEPRECATED_MACHINE_ID, "Demo")]);
        let report = apply_data_migrations(&mut collection);
        assert_eq!(report.removed_ids, vec![DEPRECATED_MACHINE_ID.to_string()]);
        assert_eq!(collection.first_id(), Some(REQUIRED_MACHINE_ID));
    }
}
