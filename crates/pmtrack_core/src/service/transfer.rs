//! JSON backup export and import validation.
//!
//! # Responsibility
//! - Wrap the machine collection in a timestamped export envelope.
//! - Validate import files and report each failure mode distinctly.
//!
//! # Invariants
//! - Import either yields a complete, non-empty collection or an error;
//!   nothing is partially applied.
//! - Unknown envelope fields are ignored on import.
//! - Every imported machine's map key equals its `id`.

use crate::model::machine::{Machine, MachineCollection, MachineId};
use chrono::{DateTime, SecondsFormat, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Backup file contents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportEnvelope {
    pub machines: MachineCollection,
    /// RFC 3339 UTC timestamp.
    pub exported_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_machine: Option<String>,
    #[serde(default)]
    pub app_version: String,
}

/// User-facing import failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportError {
    /// File is empty or whitespace only.
    EmptyFile,
    /// File is not valid JSON.
    InvalidJson(String),
    /// JSON has no top-level `machines` key.
    MissingMachines,
    /// `machines` exists but is not a machine map.
    InvalidMachines(String),
    /// `machines` is an empty map.
    NoMachines,
}

impl Display for ImportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyFile => write!(f, "import file is empty"),
            Self::InvalidJson(details) => write!(f, "import file is not valid JSON: {details}"),
            Self::MissingMachines => write!(f, "import file has no `machines` data"),
            Self::InvalidMachines(details) => {
                write!(f, "import file has malformed `machines` data: {details}")
            }
            Self::NoMachines => write!(f, "import file contains no machines"),
        }
    }
}

impl Error for ImportError {}

/// Builds an export envelope stamped with `now`.
pub fn export_collection(
    collection: &MachineCollection,
    device_id: Option<&str>,
    active_machine: Option<&str>,
    now: DateTime<Utc>,
) -> ExportEnvelope {
    ExportEnvelope {
        machines: collection.clone(),
        exported_at: now.to_rfc3339_opts(SecondsFormat::Millis, true),
        device_id: device_id.map(str::to_string),
        active_machine: active_machine.map(str::to_string),
        app_version: crate::core_version().to_string(),
    }
}

/// Parses and validates an import file into a machine collection.
pub fn parse_import(text: &str) -> Result<MachineCollection, ImportError> {
    if text.trim().is_empty() {
        return Err(ImportError::EmptyFile);
    }

    let mut value: serde_json::Value =
        serde_json::from_str(text).map_err(|err| ImportError::InvalidJson(err.to_string()))?;
    let machines = value
        .as_object_mut()
        .and_then(|object| object.remove("machines"))
        .ok_or(ImportError::MissingMachines)?;

    let entries: IndexMap<MachineId, Machine> = serde_json::from_value(machines)
        .map_err(|err| ImportError::InvalidMachines(err.to_string()))?;
    if entries.is_empty() {
        return Err(ImportError::NoMachines);
    }
    if let Some((key, machine)) = entries.iter().find(|(key, machine)| **key != machine.id) {
        return Err(ImportError::InvalidMachines(format!(
            "machine key `{key}` does not match its id `{}`",
            machine.id
        )));
    }
    Ok(MachineCollection::from(entries))
}
