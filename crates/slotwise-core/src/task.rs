//! Task model types for the scheduling engine.
//!
//! A [`Task`] is the unit of placement: it carries a duration, an optional
//! assigned [`Slot`], a priority band, and the flags the engine needs to
//! decide whether it occupies calendar time and whether it may be moved.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Most urgent priority value (numerically lowest).
pub const PRIORITY_HIGHEST: u8 = 1;
/// Least urgent priority value (numerically highest).
pub const PRIORITY_LOWEST: u8 = 5;
/// Default priority for tasks created without one.
pub const PRIORITY_DEFAULT: u8 = 3;

/// Lifecycle state of a task.
///
/// Only `Pending` and `InProgress` tasks occupy calendar time for conflict
/// purposes; the other states drop out of consideration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Task is waiting to be worked on
    Pending,
    /// Task is actively being worked on
    InProgress,
    /// Task is finished (terminal)
    Completed,
    /// Task was abandoned (terminal)
    Cancelled,
    /// Task lost its slot and is awaiting a new one
    Rescheduled,
}

impl TaskStatus {
    /// Whether a task in this state blocks other tasks on the calendar.
    pub fn occupies_calendar(&self) -> bool {
        matches!(self, TaskStatus::Pending | TaskStatus::InProgress)
    }
}

impl Default for TaskStatus {
    fn default() -> Self {
        TaskStatus::Pending
    }
}

/// A concrete `[start, end)` instant pair proposed or assigned to a task.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Slot {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Slot {
    /// Create a new slot. `end` must be after `start`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Get duration in minutes.
    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }

    /// Check if this slot overlaps a half-open `[start, end)` range.
    ///
    /// Touching endpoints do not overlap.
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.start < end && self.end > start
    }

    /// Check if this slot lies entirely within `[start, end)`.
    pub fn contained_in(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.start >= start && self.end <= end
    }
}

/// A relocation decision produced by the displacement planner.
///
/// The engine performs no I/O; the caller persists each relocation together
/// with the incoming task's slot as one atomic write.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Relocation {
    pub task_id: String,
    pub new_slot: Slot,
}

/// A task or event to be placed on the calendar.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    /// Unique identifier
    pub id: String,
    /// Task title
    pub title: String,
    /// Optional description
    #[serde(default)]
    pub description: Option<String>,
    /// Minutes required; a task with no duration cannot be scheduled
    #[serde(default)]
    pub duration_minutes: Option<u32>,
    /// Assigned start instant (UTC); set together with `scheduled_end`
    #[serde(default)]
    pub scheduled_start: Option<DateTime<Utc>>,
    /// Assigned end instant (UTC); set together with `scheduled_start`
    #[serde(default)]
    pub scheduled_end: Option<DateTime<Utc>>,
    /// Optional deadline instant
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    /// Priority 1 (most urgent) to 5 (least urgent); displacement threshold
    pub priority: u8,
    /// Lifecycle state
    #[serde(default)]
    pub status: TaskStatus,
    /// Locked tasks are never moved by the displacement planner
    #[serde(default)]
    pub locked: bool,
    /// Optional link to a task group with its own scheduling window
    #[serde(default)]
    pub group_id: Option<String>,
    /// If set, this task is a subtask of the referenced container task
    #[serde(default)]
    pub parent_task_id: Option<String>,
    /// Creation timestamp; insertion-order tie-break for displacement
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Create a new unscheduled pending task with a fresh id.
    pub fn new(title: impl Into<String>, duration_minutes: u32, created_at: DateTime<Utc>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title: title.into(),
            description: None,
            duration_minutes: Some(duration_minutes),
            scheduled_start: None,
            scheduled_end: None,
            due_date: None,
            priority: PRIORITY_DEFAULT,
            status: TaskStatus::Pending,
            locked: false,
            group_id: None,
            parent_task_id: None,
            created_at,
            updated_at: created_at,
        }
    }

    /// The task's assigned slot, if both schedule fields are set.
    pub fn slot(&self) -> Option<Slot> {
        match (self.scheduled_start, self.scheduled_end) {
            (Some(start), Some(end)) => Some(Slot::new(start, end)),
            _ => None,
        }
    }

    /// Whether this task currently blocks calendar time.
    ///
    /// True when the status is active *and* both schedule fields are set.
    pub fn occupies_calendar(&self) -> bool {
        self.status.occupies_calendar() && self.slot().is_some()
    }

    /// Check if this task's assigned slot overlaps `[start, end)`.
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.slot().is_some_and(|slot| slot.overlaps(start, end))
    }
}
