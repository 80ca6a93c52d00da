//! Task inspection commands over a snapshot file.

use std::path::PathBuf;

use clap::Subcommand;
use slotwise_core::TaskStatus;

use crate::common;

#[derive(Subcommand)]
pub enum TaskAction {
    /// List tasks in a snapshot
    List {
        /// Snapshot JSON file
        snapshot: PathBuf,
        /// Filter by status: pending, in_progress, completed, cancelled, rescheduled
        #[arg(long)]
        status: Option<String>,
        /// Only tasks that currently occupy calendar time
        #[arg(long)]
        scheduled: bool,
    },
    /// Show one task as JSON
    Get {
        /// Snapshot JSON file
        snapshot: PathBuf,
        /// Task ID
        id: String,
    },
}

pub fn run(action: TaskAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        TaskAction::List {
            snapshot: path,
            status,
            scheduled,
        } => {
            let snapshot = common::load_snapshot(&path)?;
            let status_filter: Option<TaskStatus> = match status.as_deref() {
                None => None,
                Some(raw) => Some(serde_json::from_value(serde_json::Value::String(
                    raw.to_string(),
                ))?),
            };

            for task in &snapshot.tasks {
                if let Some(wanted) = status_filter {
                    if task.status != wanted {
                        continue;
                    }
                }
                if scheduled && !task.occupies_calendar() {
                    continue;
                }
                let when = match task.slot() {
                    Some(slot) => format!("{} .. {}", slot.start.to_rfc3339(), slot.end.to_rfc3339()),
                    None => "unscheduled".to_string(),
                };
                println!(
                    "{}  p{}  [{}]  {}  ({})",
                    task.id,
                    task.priority,
                    serde_json::to_value(task.status)?.as_str().unwrap_or("?"),
                    task.title,
                    when
                );
            }
        }
        TaskAction::Get { snapshot: path, id } => {
            let snapshot = common::load_snapshot(&path)?;
            let task = snapshot
                .task(&id)
                .ok_or_else(|| format!("no task with id '{id}'"))?;
            println!("{}", serde_json::to_string_pretty(task)?);
        }
    }
    Ok(())
}
