//! Due-status classification for maintenance tasks.
//!
//! # Invariants
//! - Status is recomputed on every call; nothing is cached or stored.
//! - Window boundaries are inclusive: `days_left == soon_window` is `DueSoon`.
//! - The task state map is always passed in by the caller.

use crate::model::machine::{Task, TaskStateMap};
use crate::schedule::date::days_diff_from;
use crate::schedule::frequency::total_days;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Urgency of one task at evaluation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DueStatus {
    /// Never completed; no due date yet.
    Pending,
    /// Due date is in the past.
    Overdue,
    /// Due today or within the warning window.
    DueSoon,
    /// Due beyond the warning window.
    Ok,
}

impl DueStatus {
    /// Stable tag used by render and export boundaries.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Overdue => "overdue",
            Self::DueSoon => "due-soon",
            Self::Ok => "ok",
        }
    }
}

/// Warning window in days for `freq`, tiered by its cycle length.
pub fn soon_window(freq: &str) -> i64 {
    match total_days(freq) {
        days if days <= 7 => 3,
        days if days <= 60 => 7,
        days if days <= 180 => 14,
        _ => 30,
    }
}

/// Classifies a stored next-due key against `today`.
///
/// A present but unparseable key has no day count to compare, so it falls
/// through every threshold and lands on `Ok`.
pub fn classify(next_due: Option<&str>, freq: &str, today: NaiveDate) -> DueStatus {
    let Some(next_due) = next_due else {
        return DueStatus::Pending;
    };
    match days_diff_from(next_due, today) {
        Some(days) if days < 0 => DueStatus::Overdue,
        Some(days) if days <= soon_window(freq) => DueStatus::DueSoon,
        _ => DueStatus::Ok,
    }
}

/// Status of `task` given its machine's state map.
pub fn task_status(task: &Task, states: &TaskStateMap, today: NaiveDate) -> DueStatus {
    let next_due = states
        .get(&task.id)
        .and_then(|state| state.next_due.as_deref());
    classify(next_due, &task.freq, today)
}
