//! Scheduling engine: calendar dates, recurrence frequencies and due status.
//!
//! # Responsibility
//! - Convert between `YYYY-MM-DD` keys and calendar dates.
//! - Advance due dates by frequency codes (legacy and custom families).
//! - Classify task urgency from the stored next-due date.
//!
//! # Invariants
//! - Every function here is total over its string inputs; unknown frequency
//!   codes and malformed dates degrade to documented fallbacks, never panics.
//! - No function reads ambient state except `date::today()`.

pub mod date;
pub mod frequency;
pub mod status;
