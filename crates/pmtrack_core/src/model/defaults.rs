//! Built-in machine set used on first start and after storage corruption.

use crate::model::machine::{Machine, MachineCollection, Task};
use once_cell::sync::Lazy;

/// Machine every collection must contain.
pub const REQUIRED_MACHINE_ID: &str = "generator-1";
const REQUIRED_MACHINE_NAME: &str = "Standby Generator";

static DEFAULT_COLLECTION: Lazy<MachineCollection> = Lazy::new(|| {
    MachineCollection::from_machines([
        Machine::new("compressor-1", "Air Compressor")
            .with_task(Task::new("drain-tank", "Drain receiver tank", "1w"))
            .with_task(Task::new("check-belts", "Inspect drive belts", "1m"))
            .with_task(Task::new("change-oil", "Change compressor oil", "3m"))
            .with_task(Task::new("intake-filter", "Replace intake filter", "6m"))
            .with_task(Task::new("relief-valve", "Test safety relief valve", "1y")),
        Machine::new("forklift-1", "Forklift")
            .with_task(Task::new("battery-water", "Top up battery water", "14d"))
            .with_task(Task::new("hydraulics", "Check hydraulic hoses", "2m"))
            .with_task(Task::new("annual-inspection", "Annual safety inspection", "1y")),
        required_machine(),
    ])
});

/// Canonical definition of the required machine: no tasks yet.
pub fn required_machine() -> Machine {
    Machine::new(REQUIRED_MACHINE_ID, REQUIRED_MACHINE_NAME)
}

/// Returns a fresh copy of the built-in collection.
///
/// Callers own the result; mutating it never affects later calls.
pub fn default_collection() -> MachineCollection {
    DEFAULT_COLLECTION.clone()
}
