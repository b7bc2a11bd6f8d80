//! Command-line front end for the maintenance tracker.
//!
//! # Responsibility
//! - Open the SQLite-backed store and run the tracker startup sequence.
//! - Render task status tables and drive completion, import and export.

use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use log::{error, info};
use pmtrack_core::db::open_store_db;
use pmtrack_core::{
    default_log_level, generate_device_id, init_logging, is_device_id, parse_date, today,
    SqliteStore, Tracker,
};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "pmtrack", version, about = "Preventive-maintenance task tracker")]
struct Cli {
    /// SQLite store file.
    #[arg(long, env = "PMTRACK_DB", default_value = "pmtrack.sqlite3")]
    db: PathBuf,

    /// Directory for rolling log files; logging is off when unset.
    #[arg(long, env = "PMTRACK_LOG_DIR")]
    log_dir: Option<PathBuf>,

    /// Log level (trace|debug|info|warn|error).
    #[arg(long, env = "PMTRACK_LOG_LEVEL")]
    log_level: Option<String>,

    /// Device id stamped on exports; a fresh one is generated per run when unset.
    #[arg(long, env = "PMTRACK_DEVICE_ID")]
    device_id: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List machines with attention counts.
    Machines,
    /// Show task status for a machine (the active one by default).
    Status {
        #[arg(long)]
        machine: Option<String>,
    },
    /// Record a task completion.
    Complete {
        machine: String,
        task: String,
        /// Completion date, defaults to today.
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        note: Option<String>,
    },
    /// Write a JSON backup to stdout or a file.
    Export {
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Replace all data from a JSON backup.
    Import { file: PathBuf },
    /// Print the configured device identifier, or a fresh one.
    DeviceId,
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Self::Machines => "machines",
            Self::Status { .. } => "status",
            Self::Complete { .. } => "complete",
            Self::Export { .. } => "export",
            Self::Import { .. } => "import",
            Self::DeviceId => "device-id",
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let command = cli.command.name();
    match run(cli) {
        Ok(()) => {
            info!("event=cli_command module=cli status=ok command={command}");
            ExitCode::SUCCESS
        }
        Err(message) => {
            error!("event=cli_command module=cli status=error command={command} error={message}");
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), String> {
    if let Some(log_dir) = &cli.log_dir {
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        let log_dir = std::path::absolute(log_dir).map_err(|err| err.to_string())?;
        init_logging(level, &log_dir.to_string_lossy())?;
    }
    info!(
        "event=cli_command module=cli status=start command={}",
        cli.command.name()
    );

    if let Command::DeviceId = cli.command {
        match cli.device_id {
            Some(device_id) if is_device_id(&device_id) => println!("{device_id}"),
            Some(device_id) => return Err(format!("invalid device id `{device_id}`")),
            None => println!("{}", generate_device_id()),
        }
        return Ok(());
    }

    let conn = open_store_db(&cli.db).map_err(|err| err.to_string())?;
    let mut tracker = Tracker::open(SqliteStore::new(&conn)).map_err(|err| err.to_string())?;
    if let Some(device_id) = cli.device_id {
        tracker = tracker
            .with_device_id(device_id)
            .map_err(|err| err.to_string())?;
    }
    let today = today();

    match cli.command {
        Command::Machines => {
            for machine in tracker.machines().machines() {
                let counts = tracker
                    .status_summary(&machine.id, today)
                    .map_err(|err| err.to_string())?;
                let marker = if tracker.active_machine_id() == Some(machine.id.as_str()) {
                    "*"
                } else {
                    " "
                };
                println!(
                    "{marker} {:<38} {:<24} overdue={} due-soon={} tasks={}",
                    machine.id,
                    machine.name,
                    counts.overdue,
                    counts.due_soon,
                    counts.total()
                );
            }
        }
        Command::Status { machine } => {
            let machine_id = match machine.as_deref().or(tracker.active_machine_id()) {
                Some(id) => id.to_string(),
                None => return Err("no machines available".to_string()),
            };
            let rows = tracker
                .task_overview(&machine_id, today)
                .map_err(|err| err.to_string())?;
            for row in rows {
                println!(
                    "{:<10} {:<36} {:<12} {}",
                    row.status.as_str(),
                    row.name,
                    row.label,
                    row.next_due_display.as_deref().unwrap_or("-")
                );
            }
        }
        Command::Complete {
            machine,
            task,
            date,
            note,
        } => {
            let completed_on = completion_date(date.as_deref(), today)?;
            let next_due = tracker
                .complete_task(&machine, &task, completed_on, note)
                .map_err(|err| err.to_string())?;
            println!("next due {next_due}");
        }
        Command::Export { out } => {
            let json = tracker.export_json(Utc::now()).map_err(|err| err.to_string())?;
            match out {
                Some(path) => std::fs::write(&path, json).map_err(|err| err.to_string())?,
                None => println!("{json}"),
            }
        }
        Command::Import { file } => {
            let text = std::fs::read_to_string(&file).map_err(|err| err.to_string())?;
            let count = tracker.import_json(&text).map_err(|err| err.to_string())?;
            println!("imported {count} machines");
        }
        Command::DeviceId => {}
    }
    Ok(())
}

fn completion_date(value: Option<&str>, today: NaiveDate) -> Result<NaiveDate, String> {
    match value {
        None => Ok(today),
        Some(value) => parse_date(value).ok_or_else(|| format!("invalid date `{value}`")),
    }
}

#[cfg(test)]
mod tests {
    use super::{completion_date, Cli, Command};
    use chrono::NaiveDate;
    use clap::Parser;

    #[test]
    fn command_names_match_subcommand_spelling() {
        let cli = Cli::try_parse_from(["pmtrack", "device-id"]).unwrap();
        assert_eq!(cli.command.name(), "device-id");
        let cli = Cli::try_parse_from(["pmtrack", "status", "--machine", "m1"]).unwrap();
        assert_eq!(cli.command.name(), "status");
        assert!(matches!(cli.command, Command::Status { machine: Some(_) }));
    }

    #[test]
    fn device_id_flag_is_parsed() {
        let cli =
            Cli::try_parse_from(["pmtrack", "--device-id", "PM-ABCDEFGH", "export"]).unwrap();
        assert_eq!(cli.device_id.as_deref(), Some("PM-ABCDEFGH"));
    }

    #[test]
    fn completion_date_defaults_to_today_and_rejects_bad_input() {
        let today = NaiveDate::from_ymd_opt(2025, 3, 4).unwrap();
        assert_eq!(completion_date(None, today), Ok(today));
        assert_eq!(
            completion_date(Some("2025-01-02"), today),
            NaiveDate::from_ymd_opt(2025, 1, 2).ok_or_else(String::new)
        );
        assert!(completion_date(Some("2025-02-30"), today).is_err());
    }
}
