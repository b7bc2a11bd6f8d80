//! Machine, task and completion-state records.
//!
//! # Invariants
//! - A `Task` is replaced wholesale on edit; due state lives in `TaskState`.
//! - A missing `TaskState` entry means the task was never completed.
//! - `MachineCollection` iterates in insertion order; "first machine" is the
//!   first inserted one still present.

use crate::schedule::frequency::describe_frequency;
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Stable machine identifier.
pub type MachineId = String;
/// Stable task identifier, unique within one machine.
pub type TaskId = String;

/// One recurring maintenance task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub name: String,
    /// Frequency code, e.g. `3m` (legacy) or `14d` (custom).
    pub freq: String,
    /// Cached display label; older exports may omit it.
    #[serde(default)]
    pub freq_label: String,
}

impl Task {
    /// Creates a task and derives its display label from `freq`.
    pub fn new(id: impl Into<TaskId>, name: impl Into<String>, freq: impl Into<String>) -> Self {
        let freq = freq.into();
        Self {
            id: id.into(),
            name: name.into(),
            freq_label: describe_frequency(&freq),
            freq,
        }
    }

    /// Label to show for this task, derived when the cached one is blank.
    pub fn display_label(&self) -> String {
        if self.freq_label.trim().is_empty() {
            describe_frequency(&self.freq)
        } else {
            self.freq_label.clone()
        }
    }
}

/// One completion of a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionRecord {
    /// Completion day as `YYYY-MM-DD`.
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Completion state of one task.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskState {
    #[serde(default)]
    pub next_due: Option<String>,
    #[serde(default)]
    pub history: Vec<CompletionRecord>,
}

/// Task state map of one machine, keyed by task id.
pub type TaskStateMap = IndexMap<TaskId, TaskState>;

/// One piece of equipment with its task list and completion state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Machine {
    pub id: MachineId,
    pub name: String,
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub state: TaskStateMap,
    /// Free-form annotations owned by the UI.
    #[serde(default)]
    pub notes: IndexMap<String, serde_json::Value>,
}

impl Machine {
    /// Creates a machine with no tasks, state or notes.
    pub fn new(id: impl Into<MachineId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            tasks: Vec::new(),
            state: TaskStateMap::new(),
            notes: IndexMap::new(),
        }
    }

    /// Adds a task and returns `self` for builder-style construction.
    pub fn with_task(mut self, task: Task) -> Self {
        self.tasks.push(task);
        self
    }

    pub fn task(&self, task_id: &str) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == task_id)
    }

    pub fn task_position(&self, task_id: &str) -> Option<usize> {
        self.tasks.iter().position(|task| task.id == task_id)
    }

    pub fn task_state(&self, task_id: &str) -> Option<&TaskState> {
        self.state.get(task_id)
    }
}

/// Top-level persisted aggregate: machines keyed by id, in insertion order.
///
/// On the wire this is a plain JSON object. Deserializing takes each map key
/// as the machine's id, so keys and ids always agree in memory.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MachineCollection(IndexMap<MachineId, Machine>);

impl From<IndexMap<MachineId, Machine>> for MachineCollection {
    fn from(mut entries: IndexMap<MachineId, Machine>) -> Self {
        for (key, machine) in entries.iter_mut() {
            if machine.id != *key {
                machine.id.clone_from(key);
            }
        }
        Self(entries)
    }
}

impl Serialize for MachineCollection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for MachineCollection {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        IndexMap::<MachineId, Machine>::deserialize(deserializer).map(Self::from)
    }
}

impl MachineCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a collection keyed by each machine's own id.
    pub fn from_machines(machines: impl IntoIterator<Item = Machine>) -> Self {
        let mut collection = Self::new();
        for machine in machines {
            collection.insert(machine);
        }
        collection
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, machine_id: &str) -> bool {
        self.0.contains_key(machine_id)
    }

    pub fn get(&self, machine_id: &str) -> Option<&Machine> {
        self.0.get(machine_id)
    }

    pub fn get_mut(&mut self, machine_id: &str) -> Option<&mut Machine> {
        self.0.get_mut(machine_id)
    }

    /// Inserts or replaces a machine under its own id.
    ///
    /// Replacing keeps the original position; new ids are appended.
    pub fn insert(&mut self, machine: Machine) -> Option<Machine> {
        self.0.insert(machine.id.clone(), machine)
    }

    /// Removes a machine while keeping the order of the remaining ones.
    pub fn remove(&mut self, machine_id: &str) -> Option<Machine> {
        self.0.shift_remove(machine_id)
    }

    /// First machine id in iteration order.
    pub fn first_id(&self) -> Option<&str> {
        self.0.keys().next().map(String::as_str)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn machines(&self) -> impl Iterator<Item = &Machine> {
        self.0.values()
    }
}

#[cfg(test)]
mod tests {
    use super::{Machine, MachineCollection, Task, TaskState};

    #[test]
    fn task_new_caches_label_for_legacy_and_custom_codes() {
        assert_eq!(Task::new("t1", "Oil", "3m").freq_label, "3 Months");
        assert_eq!(Task::new("t2", "Belt", "14d").freq_label, "14 Days");
        assert_eq!(Task::new("t3", "Odd", "fortnightly").freq_label, "fortnightly");
    }

    #[test]
    fn collection_remove_keeps_insertion_order() {
        let mut collection = MachineCollection::from_machines([
            Machine::new("a", "A"),
            Machine::new("b", "B"),
            Machine::new("c", "C"),
        ]);
        collection.remove("a");
        assert_eq!(collection.ids().collect::<Vec<_>>(), vec!["b", "c"]);
        assert_eq!(collection.first_id(), Some("b"));
    }

    #[test]
    fn deserialize_takes_machine_id_from_map_key() {
        let value = serde_json::json!({
            "gen-main": { "id": "generator-1", "name": "Generator" },
            "press": { "id": "press", "name": "Press" }
        });
        let collection: MachineCollection = serde_json::from_value(value).unwrap();

        assert_eq!(collection.ids().collect::<Vec<_>>(), vec!["gen-main", "press"]);
        assert!(collection.machines().all(|machine| collection.get(&machine.id) == Some(machine)));
        assert!(!collection.contains("generator-1"));

        let json = serde_json::to_value(&collection).unwrap();
        assert_eq!(json["gen-main"]["id"], "gen-main");
    }

    #[test]
    fn machine_wire_shape_uses_camel_case_and_tolerates_missing_fields() {
        let value = serde_json::json!({
            "id": "m1",
            "name": "Mill",
            "tasks": [{ "id": "t1", "name": "Grease", "freq": "1m" }],
            "state": { "t1": { "nextDue": "2025-02-01" } }
        });
        let machine: Machine = serde_json::from_value(value).unwrap();
        assert_eq!(machine.tasks[0].freq_label, "");
        assert_eq!(machine.tasks[0].display_label(), "1 Month");
        assert_eq!(
            machine.task_state("t1"),
            Some(&TaskState {
                next_due: Some("2025-02-01".to_string()),
                history: Vec::new(),
            })
        );
        assert!(machine.notes.is_empty());

        let json = serde_json::to_value(&machine).unwrap();
        assert_eq!(json["tasks"][0]["freqLabel"], "");
        assert_eq!(json["state"]["t1"]["nextDue"], "2025-02-01");
    }
}
