//! Mode-driven automatic scheduler.
//!
//! This module ties the engine together behind a single entry point:
//! - Resolves each mode (now / today / tomorrow / next-week / next-month /
//!   asap / due-date) to an anchor, a search horizon, and a displacement
//!   policy
//! - Bounds the search with the dependency gate and availability windows
//! - Falls back to the displacement planner in asap mode
//! - Schedules a container task's subtasks sequentially
//!
//! The scheduler computes placements; it never writes them. The caller
//! persists the returned slot and relocations as one atomic unit.

pub mod conflict;
pub mod finder;
pub mod shuffle;

use chrono::{DateTime, Datelike, Days, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::availability::Availability;
use crate::error::ScheduleError;
use crate::graph::DependencyGraph;
use crate::snapshot::Snapshot;
use crate::task::{Relocation, Slot, Task, TaskStatus};
use self::finder::SlotFinder;

/// Scheduling mode: where to anchor the search and how far it may look.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScheduleMode {
    /// First free slot from the current instant
    Now,
    /// Within what remains of today
    Today,
    /// Within tomorrow
    Tomorrow,
    /// Within the next calendar week (starting Monday)
    NextWeek,
    /// Within the next calendar month
    NextMonth,
    /// First free slot, displacing lower-priority tasks if needed
    Asap,
    /// Before the task's due date, failing if that is impossible
    DueDate,
}

impl ScheduleMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Now => "now",
            Self::Today => "today",
            Self::Tomorrow => "tomorrow",
            Self::NextWeek => "next-week",
            Self::NextMonth => "next-month",
            Self::Asap => "asap",
            Self::DueDate => "due-date",
        }
    }

    /// Whether this mode may move other tasks to make room.
    pub fn allows_displacement(&self) -> bool {
        matches!(self, Self::Asap)
    }
}

impl std::str::FromStr for ScheduleMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "now" => Ok(Self::Now),
            "today" => Ok(Self::Today),
            "tomorrow" => Ok(Self::Tomorrow),
            "next-week" => Ok(Self::NextWeek),
            "next-month" => Ok(Self::NextMonth),
            "asap" => Ok(Self::Asap),
            "due-date" => Ok(Self::DueDate),
            other => Err(format!("unknown schedule mode: {other}")),
        }
    }
}

impl std::fmt::Display for ScheduleMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scheduler configuration.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Rolling search horizon for now/asap modes (days)
    pub search_horizon_days: i64,
    /// Maximum tasks one displacement run may move
    pub max_displacements: usize,
    /// Extra horizon-sized extensions asap mode tries after displacement fails
    pub max_horizon_extensions: u32,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            search_horizon_days: 7,
            max_displacements: 16,
            max_horizon_extensions: 3,
        }
    }
}

/// Result of scheduling a single task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleOutcome {
    pub task_id: String,
    pub slot: Slot,
    /// Tasks the displacement planner moved to make room (asap mode only)
    pub relocations: Vec<Relocation>,
    /// Human-readable summary of what happened
    pub feedback: Vec<String>,
}

/// Result of scheduling every subtask of a container task in order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubtaskScheduleOutcome {
    pub parent_id: String,
    /// One placement per schedulable subtask, in execution order
    pub placements: Vec<Relocation>,
    /// The caller must clear the parent's own schedule fields
    pub clear_parent_schedule: bool,
    pub feedback: Vec<String>,
}

/// Automatic scheduler over a snapshot of one user's tasks.
pub struct AutoScheduler {
    config: SchedulerConfig,
}

impl AutoScheduler {
    /// Create a new scheduler with default config.
    pub fn new() -> Self {
        Self {
            config: SchedulerConfig::default(),
        }
    }

    /// Create with custom config.
    pub fn with_config(config: SchedulerConfig) -> Self {
        Self { config }
    }

    /// Compute a placement for one task.
    ///
    /// # Arguments
    /// * `snapshot` - The user's tasks, groups, and dependency edges
    /// * `availability` - Timezone and awake-hours
    /// * `task_id` - The task needing a slot
    /// * `mode` - Anchor/horizon/displacement policy
    /// * `now` - The caller's current instant (never sampled internally)
    ///
    /// # Returns
    /// The slot, any relocations the caller must persist with it, and
    /// feedback strings -- or a reason-coded error.
    pub fn schedule(
        &self,
        snapshot: &Snapshot,
        availability: &Availability,
        task_id: &str,
        mode: ScheduleMode,
        now: DateTime<Utc>,
    ) -> Result<ScheduleOutcome, ScheduleError> {
        let task = snapshot.task(task_id).ok_or_else(|| ScheduleError::UnknownTask {
            task_id: task_id.to_string(),
        })?;
        if snapshot.has_subtasks(task_id) {
            return Err(ScheduleError::ParentHasSubtasks {
                task_id: task_id.to_string(),
            });
        }
        let duration = positive_duration(task)?;

        let graph = DependencyGraph::build(&snapshot.tasks, &snapshot.dependencies);
        let gate = graph.earliest_start(task_id)?;
        let (anchor, horizon_end) = self.mode_bounds(mode, task, availability, now)?;
        let effective_anchor = gate.map_or(anchor, |g| g.max(anchor));

        let group = snapshot.group_for(task);
        let finder = SlotFinder::new(availability, group, &snapshot.tasks, Some(task_id));

        if let Some(slot) = finder.find(duration, effective_anchor, horizon_end) {
            return Ok(ScheduleOutcome {
                task_id: task_id.to_string(),
                slot,
                relocations: Vec::new(),
                feedback: vec![self.placed_message(availability, task, slot)],
            });
        }

        match mode {
            ScheduleMode::Asap => {
                self.schedule_with_displacement(
                    snapshot,
                    availability,
                    task,
                    &finder,
                    duration,
                    effective_anchor,
                    horizon_end,
                )
            }
            ScheduleMode::DueDate => Err(ScheduleError::DueDateUnreachable {
                task_id: task_id.to_string(),
                due_date: horizon_end,
            }),
            _ => {
                // Distinguish "a locked task is in the way" from plain
                // exhaustion so the caller can explain it.
                if let Some(ideal) =
                    finder.find_ignoring_conflicts(duration, effective_anchor, horizon_end)
                {
                    let blockers = conflict::overlapping(
                        &snapshot.tasks,
                        ideal.start,
                        ideal.end,
                        Some(task_id),
                    );
                    if let Some(locked) = blockers.iter().find(|t| t.locked) {
                        return Err(ScheduleError::LockedConflict {
                            task_id: task_id.to_string(),
                            locked_task_id: locked.id.clone(),
                        });
                    }
                }
                Err(ScheduleError::NoSlotInHorizon {
                    task_id: task_id.to_string(),
                    horizon_end,
                })
            }
        }
    }

    /// Schedule every subtask of a container task back to back.
    ///
    /// The first subtask anchors at the mode's anchor; each subsequent one
    /// at the previous subtask's end. Completed and cancelled subtasks are
    /// skipped. All placements are computed against a working copy, so the
    /// batch is all-or-nothing like everything else the engine returns.
    pub fn schedule_subtasks(
        &self,
        snapshot: &Snapshot,
        availability: &Availability,
        parent_id: &str,
        mode: ScheduleMode,
        now: DateTime<Utc>,
    ) -> Result<SubtaskScheduleOutcome, ScheduleError> {
        let parent = snapshot.task(parent_id).ok_or_else(|| ScheduleError::UnknownTask {
            task_id: parent_id.to_string(),
        })?;
        let subtasks = snapshot.subtasks_of(parent_id);
        if subtasks.is_empty() {
            return Err(ScheduleError::NoSubtasks {
                task_id: parent_id.to_string(),
            });
        }

        let (anchor, horizon_end) = self.mode_bounds(mode, parent, availability, now)?;
        let mut working = snapshot.clone();
        // The container's own block is about to be cleared; it must not
        // push its subtasks around.
        if let Some(entry) = working.tasks.iter_mut().find(|t| t.id == parent_id) {
            entry.scheduled_start = None;
            entry.scheduled_end = None;
        }
        let mut placements = Vec::new();
        let mut feedback = Vec::new();
        let mut cursor = anchor;

        for subtask in subtasks {
            if matches!(
                subtask.status,
                TaskStatus::Completed | TaskStatus::Cancelled
            ) {
                continue;
            }
            let duration = positive_duration(subtask)?;

            let graph = DependencyGraph::build(&working.tasks, &working.dependencies);
            let gate = graph.earliest_start(&subtask.id)?;
            let effective_anchor = gate.map_or(cursor, |g| g.max(cursor));

            let slot = SlotFinder::new(
                availability,
                working.group_for(subtask),
                &working.tasks,
                Some(&subtask.id),
            )
            .find(duration, effective_anchor, horizon_end)
            .ok_or_else(|| ScheduleError::NoSlotInHorizon {
                task_id: subtask.id.clone(),
                horizon_end,
            })?;

            feedback.push(self.placed_message(availability, subtask, slot));
            if let Some(entry) = working.tasks.iter_mut().find(|t| t.id == subtask.id) {
                entry.scheduled_start = Some(slot.start);
                entry.scheduled_end = Some(slot.end);
            }
            placements.push(Relocation {
                task_id: subtask.id.clone(),
                new_slot: slot,
            });
            cursor = slot.end;
        }

        let clear_parent_schedule = parent.slot().is_some();
        if clear_parent_schedule {
            feedback.push(format!(
                "Cleared the container schedule of '{}'; only its subtasks occupy the calendar",
                parent.title
            ));
        }

        Ok(SubtaskScheduleOutcome {
            parent_id: parent_id.to_string(),
            placements,
            clear_parent_schedule,
            feedback,
        })
    }

    fn schedule_with_displacement(
        &self,
        snapshot: &Snapshot,
        availability: &Availability,
        task: &Task,
        finder: &SlotFinder<'_>,
        duration: u32,
        anchor: DateTime<Utc>,
        horizon_end: DateTime<Utc>,
    ) -> Result<ScheduleOutcome, ScheduleError> {
        let displaced_horizon = Duration::days(self.config.search_horizon_days);
        match shuffle::plan_displacement(
            task,
            snapshot,
            availability,
            anchor,
            horizon_end,
            self.config.max_displacements,
            displaced_horizon,
        ) {
            Ok(plan) => {
                let mut feedback = vec![self.placed_message(availability, task, plan.slot)];
                feedback.push(format!(
                    "Moved {} lower-priority task(s) to make room",
                    plan.relocations.len()
                ));
                for relocation in &plan.relocations {
                    if let Some(moved) = snapshot.task(&relocation.task_id) {
                        feedback.push(format!(
                            "Moved '{}' to {}",
                            moved.title,
                            self.local_stamp(availability, relocation.new_slot.start)
                        ));
                    }
                }
                Ok(ScheduleOutcome {
                    task_id: task.id.clone(),
                    slot: plan.slot,
                    relocations: plan.relocations,
                    feedback,
                })
            }
            Err(displacement_error) => {
                // Last resort: look further out for a free slot before
                // giving up, a bounded number of horizon extensions.
                let extended = horizon_end
                    + Duration::days(
                        self.config.search_horizon_days
                            * i64::from(self.config.max_horizon_extensions),
                    );
                if extended > horizon_end {
                    if let Some(slot) = finder.find(duration, anchor, extended) {
                        return Ok(ScheduleOutcome {
                            task_id: task.id.clone(),
                            slot,
                            relocations: Vec::new(),
                            feedback: vec![
                                self.placed_message(availability, task, slot),
                                "No room in the normal search horizon; the search was extended"
                                    .to_string(),
                            ],
                        });
                    }
                }
                Err(displacement_error)
            }
        }
    }

    /// Anchor and horizon for a mode, computed against the user's timezone.
    fn mode_bounds(
        &self,
        mode: ScheduleMode,
        task: &Task,
        availability: &Availability,
        now: DateTime<Utc>,
    ) -> Result<(DateTime<Utc>, DateTime<Utc>), ScheduleError> {
        let horizon = Duration::days(self.config.search_horizon_days);
        let today = availability.local_date(now);
        let bounds = match mode {
            ScheduleMode::Now | ScheduleMode::Asap => (now, now + horizon),
            ScheduleMode::Today => {
                let start = availability.day_start(today).max(now);
                (start, availability.day_start(add_days(today, 1)))
            }
            ScheduleMode::Tomorrow => (
                availability.day_start(add_days(today, 1)),
                availability.day_start(add_days(today, 2)),
            ),
            ScheduleMode::NextWeek => {
                let until_monday = 7 - u64::from(today.weekday().num_days_from_monday());
                let monday = add_days(today, until_monday);
                (
                    availability.day_start(monday),
                    availability.day_start(add_days(monday, 7)),
                )
            }
            ScheduleMode::NextMonth => {
                let first = first_of_next_month(today);
                (
                    availability.day_start(first),
                    availability.day_start(first_of_next_month(first)),
                )
            }
            ScheduleMode::DueDate => {
                let due = task.due_date.ok_or_else(|| ScheduleError::MissingDueDate {
                    task_id: task.id.clone(),
                })?;
                (now, due)
            }
        };
        Ok(bounds)
    }

    fn placed_message(&self, availability: &Availability, task: &Task, slot: Slot) -> String {
        format!(
            "Scheduled '{}' from {} to {}",
            task.title,
            self.local_stamp(availability, slot.start),
            self.local_stamp(availability, slot.end),
        )
    }

    fn local_stamp(&self, availability: &Availability, instant: DateTime<Utc>) -> String {
        instant
            .with_timezone(&availability.timezone)
            .format("%a %Y-%m-%d %H:%M")
            .to_string()
    }
}

impl Default for AutoScheduler {
    fn default() -> Self {
        Self::new()
    }
}

fn positive_duration(task: &Task) -> Result<u32, ScheduleError> {
    match task.duration_minutes {
        Some(minutes) if minutes > 0 => Ok(minutes),
        _ => Err(ScheduleError::MissingDuration {
            task_id: task.id.clone(),
        }),
    }
}

fn add_days(date: NaiveDate, days: u64) -> NaiveDate {
    date.checked_add_days(Days::new(days)).unwrap_or(date)
}

fn first_of_next_month(date: NaiveDate) -> NaiveDate {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(date)
}
