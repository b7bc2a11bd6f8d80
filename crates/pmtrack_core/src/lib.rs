//! Core domain logic for the preventive-maintenance tracker.
//! This crate is the single source of truth for scheduling and persistence
//! invariants.

pub mod db;
pub mod ident;
pub mod logging;
pub mod model;
pub mod repo;
pub mod schedule;
pub mod service;
pub mod store;

pub use ident::{generate_device_id, generate_device_id_with, is_device_id};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::defaults::{default_collection, REQUIRED_MACHINE_ID};
pub use model::machine::{
    CompletionRecord, Machine, MachineCollection, MachineId, Task, TaskId, TaskState,
    TaskStateMap,
};
pub use repo::data_migrations::{
    apply_data_migrations, run_migrations, MigrationReport, DEPRECATED_MACHINE_ID,
};
pub use repo::machine_repo::{
    resolve_active_id, MachineRepository, ACTIVE_MACHINE_KEY, MACHINES_KEY,
};
pub use schedule::date::{
    days_diff, days_diff_from, format_as_key, format_display, parse_date, today,
};
pub use schedule::frequency::{
    advance_custom, describe_frequency, label_for, next_due_date, total_days, Frequency,
    FrequencyUnit, LegacyCode,
};
pub use schedule::status::{classify, soon_window, task_status, DueStatus};
pub use service::overview::{StatusCounts, TaskOverview};
pub use service::tracker_service::{Tracker, TrackerError, TrackerResult};
pub use service::transfer::{export_collection, parse_import, ExportEnvelope, ImportError};
pub use store::{KeyValueStore, MemoryStore, SqliteStore, StoreError, StoreResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
