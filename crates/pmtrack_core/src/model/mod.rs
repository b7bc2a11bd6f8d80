//! Persisted domain model for machines and their maintenance tasks.
//!
//! # Responsibility
//! - Define the serialized shape of the machine collection.
//! - Provide the built-in default collection used on first start.
//!
//! # Invariants
//! - Every machine is keyed by its own stable `id`.
//! - Task state is keyed by task id inside the owning machine.
//! - Field names on the wire are camelCase (`nextDue`, `freqLabel`).

pub mod defaults;
pub mod machine;
