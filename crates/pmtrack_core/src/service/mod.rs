//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate persistence, migrations and scheduling into tracker APIs.
//! - Keep CLI/UI callers decoupled from storage details.

pub mod overview;
pub mod tracker_service;
pub mod transfer;
