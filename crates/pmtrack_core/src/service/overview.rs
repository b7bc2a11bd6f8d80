//! Read models handed to the render boundary.
//!
//! # Invariants
//! - Built fresh from a machine and an evaluation date; never persisted.
//! - Overview rows keep the machine's task order.

use crate::model::machine::Machine;
use crate::schedule::date::{days_diff_from, format_display};
use crate::schedule::status::{task_status, DueStatus};
use chrono::NaiveDate;
use serde::Serialize;

/// One task row as the UI shows it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskOverview {
    pub task_id: String,
    pub name: String,
    pub label: String,
    pub status: DueStatus,
    pub next_due: Option<String>,
    /// `Mon D, YYYY` form of `next_due`.
    pub next_due_display: Option<String>,
    /// Signed days until due; `None` when pending or unparseable.
    pub days_left: Option<i64>,
    pub completions: usize,
}

/// Task counts per status for one machine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCounts {
    pub pending: usize,
    pub overdue: usize,
    pub due_soon: usize,
    pub ok: usize,
}

impl StatusCounts {
    fn record(&mut self, status: DueStatus) {
        match status {
            DueStatus::Pending => self.pending += 1,
            DueStatus::Overdue => self.overdue += 1,
            DueStatus::DueSoon => self.due_soon += 1,
            DueStatus::Ok => self.ok += 1,
        }
    }

    /// Tasks that need attention now.
    pub fn attention(&self) -> usize {
        self.overdue + self.due_soon
    }

    pub fn total(&self) -> usize {
        self.pending + self.overdue + self.due_soon + self.ok
    }
}

/// Builds overview rows for every task of `machine`.
pub fn build_overview(machine: &Machine, today: NaiveDate) -> Vec<TaskOverview> {
    machine
        .tasks
        .iter()
        .map(|task| {
            let state = machine.task_state(&task.id);
            let next_due = state.and_then(|state| state.next_due.clone());
            TaskOverview {
                task_id: task.id.clone(),
                name: task.name.clone(),
                label: task.display_label(),
                status: task_status(task, &machine.state, today),
                next_due_display: next_due.as_deref().map(format_display),
                days_left: next_due
                    .as_deref()
                    .and_then(|due| days_diff_from(due, today)),
                next_due,
                completions: state.map_or(0, |state| state.history.len()),
            }
        })
        .collect()
}

/// Counts task statuses of `machine`.
pub fn summarize(machine: &Machine, today: NaiveDate) -> StatusCounts {
    let mut counts = StatusCounts::default();
    for task in &machine.tasks {
        counts.record(task_status(task, &machine.state, today));
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::{build_overview, summarize};
    use crate::model::machine::{Machine, Task, TaskState};
    use crate::schedule::status::DueStatus;
    use chrono::NaiveDate;

    fn machine_with_states() -> Machine {
        let mut machine = Machine::new("m1", "Mill")
            .with_task(Task::new("late", "Late", "1m"))
            .with_task(Task::new("soon", "Soon", "1w"))
            .with_task(Task::new("fine", "Fine", "1y"))
            .with_task(Task::new("new", "New", "14d"));
        for (task_id, due) in [("late", "2025-05-20"), ("soon", "2025-06-03"), ("fine", "2026-01-01")] {
            machine.state.insert(
                task_id.to_string(),
                TaskState {
                    next_due: Some(due.to_string()),
                    history: Vec::new(),
                },
            );
        }
        machine
    }

    #[test]
    fn overview_keeps_task_order_and_formats_due_dates() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let rows = build_overview(&machine_with_states(), today);

        let statuses: Vec<_> = rows.iter().map(|row| row.status).collect();
        assert_eq!(
            statuses,
            vec![
                DueStatus::Overdue,
                DueStatus::DueSoon,
                DueStatus::Ok,
                DueStatus::Pending
            ]
        );
        assert_eq!(rows[0].next_due_display.as_deref(), Some("May 20, 2025"));
        assert_eq!(rows[0].days_left, Some(-12));
        assert_eq!(rows[3].next_due, None);
        assert_eq!(rows[3].label, "14 Days");
    }

    #[test]
    fn summary_counts_each_status() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let counts = summarize(&machine_with_states(), today);
        assert_eq!(counts.overdue, 1);
        assert_eq!(counts.due_soon, 1);
        assert_eq!(counts.ok, 1);
        assert_eq!(counts.pending, 1);
        assert_eq!(counts.attention(), 2);
        assert_eq!(counts.total(), 4);
    }
}
