//! Scheduling commands: run the engine over a snapshot file.

use std::path::PathBuf;

use clap::Subcommand;
use slotwise_core::{AutoScheduler, Config, ScheduleMode, Snapshot, TaskStatus};

use crate::common;

#[derive(Subcommand)]
pub enum ScheduleAction {
    /// Compute a slot for one task
    Task {
        /// Snapshot JSON file
        snapshot: PathBuf,
        /// Task ID
        id: String,
        /// Mode: now, today, tomorrow, next-week, next-month, asap, due-date
        #[arg(long, default_value = "now")]
        mode: String,
        /// Anchor instant (RFC3339, default: current time)
        #[arg(long)]
        at: Option<String>,
        /// Write the placement (and any relocations) back to the snapshot
        #[arg(long)]
        apply: bool,
    },
    /// Schedule all subtasks of a container task in order
    Subtasks {
        /// Snapshot JSON file
        snapshot: PathBuf,
        /// Parent task ID
        id: String,
        /// Mode: now, today, tomorrow, next-week, next-month, asap, due-date
        #[arg(long, default_value = "now")]
        mode: String,
        /// Anchor instant (RFC3339, default: current time)
        #[arg(long)]
        at: Option<String>,
        /// Write all placements back to the snapshot
        #[arg(long)]
        apply: bool,
    },
}

pub fn run(action: ScheduleAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let availability = config.availability()?;
    let scheduler = AutoScheduler::with_config(config.scheduler_config());

    match action {
        ScheduleAction::Task {
            snapshot: path,
            id,
            mode,
            at,
            apply,
        } => {
            let mut snapshot = common::load_snapshot(&path)?;
            let mode: ScheduleMode = mode.parse()?;
            let now = common::parse_instant(at.as_deref())?;

            let outcome = scheduler.schedule(&snapshot, &availability, &id, mode, now)?;
            println!("{}", serde_json::to_string_pretty(&outcome)?);

            if apply {
                assign(&mut snapshot, &outcome.task_id, outcome.slot);
                for relocation in &outcome.relocations {
                    assign(&mut snapshot, &relocation.task_id, relocation.new_slot);
                }
                common::save_snapshot(&path, &snapshot)?;
                println!("snapshot updated");
            }
        }
        ScheduleAction::Subtasks {
            snapshot: path,
            id,
            mode,
            at,
            apply,
        } => {
            let mut snapshot = common::load_snapshot(&path)?;
            let mode: ScheduleMode = mode.parse()?;
            let now = common::parse_instant(at.as_deref())?;

            let outcome = scheduler.schedule_subtasks(&snapshot, &availability, &id, mode, now)?;
            println!("{}", serde_json::to_string_pretty(&outcome)?);

            if apply {
                for placement in &outcome.placements {
                    assign(&mut snapshot, &placement.task_id, placement.new_slot);
                }
                if outcome.clear_parent_schedule {
                    if let Some(parent) = snapshot.tasks.iter_mut().find(|t| t.id == id) {
                        parent.scheduled_start = None;
                        parent.scheduled_end = None;
                    }
                }
                common::save_snapshot(&path, &snapshot)?;
                println!("snapshot updated");
            }
        }
    }
    Ok(())
}

fn assign(snapshot: &mut Snapshot, task_id: &str, slot: slotwise_core::Slot) {
    if let Some(task) = snapshot.tasks.iter_mut().find(|t| t.id == task_id) {
        task.scheduled_start = Some(slot.start);
        task.scheduled_end = Some(slot.end);
        if task.status == TaskStatus::Rescheduled {
            task.status = TaskStatus::Pending;
        }
    }
}
