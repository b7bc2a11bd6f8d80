//! Persistence gateway and data migrations over the key-value store.
//!
//! # Responsibility
//! - Load and save the machine collection and active machine id.
//! - Reconcile loaded data with the current default machine set.
//!
//! # Invariants
//! - Loading never fails; unreadable data falls back to defaults.
//! - Data migrations run once per load, before any other consumer.

pub mod data_migrations;
pub mod machine_repo;
