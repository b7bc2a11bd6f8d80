//! Maintenance tracker use-case service.
//!
//! # Responsibility
//! - Run the startup sequence: load, migrate, resolve the active machine.
//! - Provide machine, task, completion and note mutations.
//! - Serve read models and backup import/export.
//!
//! # Invariants
//! - Every successful mutation is flushed with one collection `save`.
//! - The collection is never left without a machine.
//! - The active machine id, when set, names a machine in the collection.

use crate::ident::{generate_device_id, is_device_id};
use crate::model::machine::{
    CompletionRecord, Machine, MachineCollection, MachineId, Task, TaskId,
};
use crate::repo::data_migrations::run_migrations;
use crate::repo::machine_repo::{resolve_active_id, MachineRepository};
use crate::schedule::date::format_as_key;
use crate::schedule::frequency::{describe_frequency, next_due_date, Frequency};
use crate::service::overview::{build_overview, summarize, StatusCounts, TaskOverview};
use crate::service::transfer::{export_collection, parse_import, ImportError};
use crate::store::{KeyValueStore, StoreError};
use chrono::{DateTime, NaiveDate, Utc};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;
use uuid::Uuid;

pub type TrackerResult<T> = Result<T, TrackerError>;

/// Tracker use-case error.
#[derive(Debug)]
pub enum TrackerError {
    MachineNotFound(MachineId),
    TaskNotFound {
        machine_id: MachineId,
        task_id: TaskId,
    },
    DuplicateTask {
        machine_id: MachineId,
        task_id: TaskId,
    },
    /// The last machine cannot be deleted.
    LastMachine(MachineId),
    /// Frequency code matches neither the custom nor the legacy family.
    InvalidFrequency(String),
    /// Name is empty after trimming.
    EmptyName,
    /// Task has no completion to undo.
    NothingToUndo {
        machine_id: MachineId,
        task_id: TaskId,
    },
    InvalidDeviceId(String),
    Import(ImportError),
    Export(serde_json::Error),
    Store(StoreError),
}

impl Display for TrackerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MachineNotFound(id) => write!(f, "machine not found: {id}"),
            Self::TaskNotFound {
                machine_id,
                task_id,
            } => write!(f, "task `{task_id}` not found on machine `{machine_id}`"),
            Self::DuplicateTask {
                machine_id,
                task_id,
            } => write!(f, "task `{task_id}` already exists on machine `{machine_id}`"),
            Self::LastMachine(id) => write!(f, "cannot delete `{id}`: it is the last machine"),
            Self::InvalidFrequency(code) => write!(f, "unrecognized frequency code `{code}`"),
            Self::EmptyName => write!(f, "name cannot be empty"),
            Self::NothingToUndo {
                machine_id,
                task_id,
            } => write!(
                f,
                "task `{task_id}` on machine `{machine_id}` has no completion to undo"
            ),
            Self::InvalidDeviceId(value) => write!(f, "invalid device id `{value}`"),
            Self::Import(err) => write!(f, "{err}"),
            Self::Export(err) => write!(f, "failed to serialize export: {err}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for TrackerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Import(err) => Some(err),
            Self::Export(err) => Some(err),
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StoreError> for TrackerError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<ImportError> for TrackerError {
    fn from(value: ImportError) -> Self {
        Self::Import(value)
    }
}

/// In-memory tracker state bound to one key-value store.
pub struct Tracker<S: KeyValueStore> {
    repo: MachineRepository<S>,
    machines: MachineCollection,
    active_id: Option<MachineId>,
    device_id: String,
}

impl<S: KeyValueStore> Tracker<S> {
    /// Loads, migrates and resolves state from `store`.
    ///
    /// # Side effects
    /// - Writes the collection back once when migrations changed it.
    /// - Writes the active machine id when it had to be re-resolved.
    ///
    /// The device id is generated per session and never stored; callers that
    /// need a stable id across runs pass it through [`Tracker::with_device_id`].
    pub fn open(store: S) -> TrackerResult<Self> {
        let started_at = Instant::now();
        let repo = MachineRepository::new(store);
        let mut machines = repo.load();
        let stored_active = repo.load_active_id();

        let mut save_result = Ok(());
        let migrated_active = run_migrations(&mut machines, stored_active.as_deref(), |migrated| {
            save_result = repo.save(migrated);
        });
        save_result?;

        let active_id = resolve_active_id(&machines, migrated_active.as_deref());
        if active_id != stored_active {
            repo.save_active_id(active_id.as_deref())?;
        }

        info!(
            "event=tracker_open module=service status=ok machines={} active_resolved={} duration_ms={}",
            machines.len(),
            active_id != stored_active,
            started_at.elapsed().as_millis()
        );

        Ok(Self {
            repo,
            machines,
            active_id,
            device_id: generate_device_id(),
        })
    }

    /// Replaces the session device id with a caller-held one, so exports
    /// from separate runs carry the same `deviceId`.
    pub fn with_device_id(mut self, device_id: impl Into<String>) -> TrackerResult<Self> {
        let device_id = device_id.into();
        if !is_device_id(&device_id) {
            return Err(TrackerError::InvalidDeviceId(device_id));
        }
        self.device_id = device_id;
        Ok(self)
    }

    pub fn machines(&self) -> &MachineCollection {
        &self.machines
    }

    pub fn machine(&self, machine_id: &str) -> TrackerResult<&Machine> {
        self.machines
            .get(machine_id)
            .ok_or_else(|| TrackerError::MachineNotFound(machine_id.to_string()))
    }

    pub fn active_machine_id(&self) -> Option<&str> {
        self.active_id.as_deref()
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    /// Underlying key-value store.
    pub fn store(&self) -> &S {
        self.repo.store()
    }

    /// Selects the active machine; unknown ids are rejected.
    pub fn set_active_machine(&mut self, machine_id: &str) -> TrackerResult<()> {
        self.machine(machine_id)?;
        self.repo.save_active_id(Some(machine_id))?;
        self.active_id = Some(machine_id.to_string());
        Ok(())
    }

    /// Adds an empty machine and returns its generated id.
    pub fn add_machine(&mut self, name: &str) -> TrackerResult<MachineId> {
        let name = normalized_name(name)?;
        let machine_id = Uuid::new_v4().to_string();
        self.machines.insert(Machine::new(machine_id.clone(), name));
        self.flush()?;
        info!("event=machine_add module=service status=ok machine_id={machine_id}");
        Ok(machine_id)
    }

    pub fn rename_machine(&mut self, machine_id: &str, name: &str) -> TrackerResult<()> {
        let name = normalized_name(name)?;
        self.machine_mut(machine_id)?.name = name;
        self.flush()
    }

    /// Deletes a machine with its tasks and state.
    ///
    /// Fails with `LastMachine` when it is the only one left.
    pub fn delete_machine(&mut self, machine_id: &str) -> TrackerResult<()> {
        self.machine(machine_id)?;
        if self.machines.len() == 1 {
            return Err(TrackerError::LastMachine(machine_id.to_string()));
        }

        self.machines.remove(machine_id);
        self.flush()?;
        self.reresolve_active()?;
        info!("event=machine_delete module=service status=ok machine_id={machine_id}");
        Ok(())
    }

    /// Adds a task with a generated id and returns that id.
    pub fn add_task(&mut self, machine_id: &str, name: &str, freq: &str) -> TrackerResult<TaskId> {
        let name = normalized_name(name)?;
        let freq = validated_frequency(freq)?;
        let task_id = Uuid::new_v4().to_string();
        self.machine_mut(machine_id)?
            .tasks
            .push(Task::new(task_id.clone(), name, freq));
        self.flush()?;
        info!(
            "event=task_add module=service status=ok machine_id={machine_id} task_id={task_id}"
        );
        Ok(task_id)
    }

    /// Inserts a caller-built task; its id must be new on that machine.
    pub fn insert_task(&mut self, machine_id: &str, task: Task) -> TrackerResult<()> {
        let task = prepared_task(task)?;
        let machine = self.machine_mut(machine_id)?;
        if machine.task(&task.id).is_some() {
            return Err(TrackerError::DuplicateTask {
                machine_id: machine_id.to_string(),
                task_id: task.id,
            });
        }
        machine.tasks.push(task);
        self.flush()
    }

    /// Replaces the task with the same id. Completion state is kept as-is.
    pub fn update_task(&mut self, machine_id: &str, task: Task) -> TrackerResult<()> {
        let task = prepared_task(task)?;
        let machine = self.machine_mut(machine_id)?;
        let position = machine
            .task_position(&task.id)
            .ok_or_else(|| TrackerError::TaskNotFound {
                machine_id: machine_id.to_string(),
                task_id: task.id.clone(),
            })?;
        machine.tasks[position] = task;
        self.flush()
    }

    /// Removes a task and its completion state.
    pub fn remove_task(&mut self, machine_id: &str, task_id: &str) -> TrackerResult<()> {
        let machine = self.machine_mut(machine_id)?;
        let position = task_position(machine, task_id)?;
        machine.tasks.remove(position);
        machine.state.shift_remove(task_id);
        self.flush()
    }

    /// Records a completion on `completed_on` and returns the new due date key.
    pub fn complete_task(
        &mut self,
        machine_id: &str,
        task_id: &str,
        completed_on: NaiveDate,
        note: Option<String>,
    ) -> TrackerResult<String> {
        let machine = self.machine_mut(machine_id)?;
        let position = task_position(machine, task_id)?;
        let completed_key = format_as_key(completed_on);
        let next_due = next_due_date(&completed_key, &machine.tasks[position].freq);

        let state = machine.state.entry(task_id.to_string()).or_default();
        state.history.push(CompletionRecord {
            date: completed_key,
            note: note.filter(|note| !note.trim().is_empty()),
        });
        state.next_due = Some(next_due.clone());
        self.flush()?;

        info!(
            "event=task_complete module=service status=ok machine_id={machine_id} task_id={task_id} next_due={next_due}"
        );
        Ok(next_due)
    }

    /// Drops the latest completion and recomputes the due date from the one
    /// before it. Returns the new due date key, `None` when back to pending.
    pub fn undo_last_completion(
        &mut self,
        machine_id: &str,
        task_id: &str,
    ) -> TrackerResult<Option<String>> {
        let machine = self.machine_mut(machine_id)?;
        let position = task_position(machine, task_id)?;
        let freq = machine.tasks[position].freq.clone();

        let nothing_to_undo = || TrackerError::NothingToUndo {
            machine_id: machine_id.to_string(),
            task_id: task_id.to_string(),
        };
        let state = machine.state.get_mut(task_id).ok_or_else(nothing_to_undo)?;
        state.history.pop().ok_or_else(nothing_to_undo)?;

        let next_due = state
            .history
            .last()
            .map(|record| next_due_date(&record.date, &freq));
        if next_due.is_none() {
            machine.state.shift_remove(task_id);
        } else {
            state.next_due = next_due.clone();
        }
        self.flush()?;
        Ok(next_due)
    }

    /// Sets one free-form note on a machine.
    pub fn set_note(
        &mut self,
        machine_id: &str,
        key: &str,
        value: serde_json::Value,
    ) -> TrackerResult<()> {
        self.machine_mut(machine_id)?
            .notes
            .insert(key.to_string(), value);
        self.flush()
    }

    /// Removes one note; returns whether it existed.
    pub fn remove_note(&mut self, machine_id: &str, key: &str) -> TrackerResult<bool> {
        let removed = self
            .machine_mut(machine_id)?
            .notes
            .shift_remove(key)
            .is_some();
        if removed {
            self.flush()?;
        }
        Ok(removed)
    }

    pub fn task_overview(&self, machine_id: &str, today: NaiveDate) -> TrackerResult<Vec<TaskOverview>> {
        Ok(build_overview(self.machine(machine_id)?, today))
    }

    pub fn status_summary(&self, machine_id: &str, today: NaiveDate) -> TrackerResult<StatusCounts> {
        Ok(summarize(self.machine(machine_id)?, today))
    }

    /// Serializes a backup of the whole collection.
    pub fn export_json(&self, now: DateTime<Utc>) -> TrackerResult<String> {
        let envelope = export_collection(
            &self.machines,
            Some(&self.device_id),
            self.active_id.as_deref(),
            now,
        );
        let json = serde_json::to_string_pretty(&envelope).map_err(TrackerError::Export)?;
        info!(
            "event=export module=service status=ok machines={} bytes={}",
            self.machines.len(),
            json.len()
        );
        Ok(json)
    }

    /// Replaces the whole collection from a backup file.
    ///
    /// On error the current collection and store are untouched.
    pub fn import_json(&mut self, text: &str) -> TrackerResult<usize> {
        let imported = match parse_import(text) {
            Ok(imported) => imported,
            Err(err) => {
                warn!("event=import module=service status=error error={err}");
                return Err(err.into());
            }
        };
        self.repo.save(&imported)?;
        self.machines = imported;
        self.reresolve_active()?;

        info!(
            "event=import module=service status=ok machines={}",
            self.machines.len()
        );
        Ok(self.machines.len())
    }

    fn machine_mut(&mut self, machine_id: &str) -> TrackerResult<&mut Machine> {
        self.machines
            .get_mut(machine_id)
            .ok_or_else(|| TrackerError::MachineNotFound(machine_id.to_string()))
    }

    fn flush(&self) -> TrackerResult<()> {
        self.repo.save(&self.machines)?;
        Ok(())
    }

    fn reresolve_active(&mut self) -> TrackerResult<()> {
        let resolved = resolve_active_id(&self.machines, self.active_id.as_deref());
        if resolved != self.active_id {
            self.repo.save_active_id(resolved.as_deref())?;
            self.active_id = resolved;
        }
        Ok(())
    }
}

fn task_position(machine: &Machine, task_id: &str) -> TrackerResult<usize> {
    machine
        .task_position(task_id)
        .ok_or_else(|| TrackerError::TaskNotFound {
            machine_id: machine.id.clone(),
            task_id: task_id.to_string(),
        })
}

fn normalized_name(name: &str) -> TrackerResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(TrackerError::EmptyName);
    }
    Ok(trimmed.to_string())
}

fn validated_frequency(freq: &str) -> TrackerResult<&str> {
    let trimmed = freq.trim();
    match Frequency::parse(trimmed) {
        Some(_) => Ok(trimmed),
        None => Err(TrackerError::InvalidFrequency(freq.to_string())),
    }
}

/// Normalizes the frequency code and fills a blank display label.
fn prepared_task(mut task: Task) -> TrackerResult<Task> {
    let freq = validated_frequency(&task.freq)?.to_string();
    task.freq = freq;
    if task.freq_label.trim().is_empty() {
        task.freq_label = describe_frequency(&task.freq);
    }
    Ok(task)
}
