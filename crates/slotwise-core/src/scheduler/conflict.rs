//! Conflict detection over the scheduled task set.
//!
//! A task occupies calendar time when it is pending or in progress and has
//! both schedule fields set. Intervals are half-open: touching endpoints do
//! not conflict.

use chrono::{DateTime, Utc};

use crate::task::Task;

/// All occupying tasks whose slots intersect `[start, end)`.
///
/// `exclude_task_id` drops the task being (re)placed from consideration so
/// it never conflicts with its own previous slot.
pub fn overlapping<'a>(
    tasks: &'a [Task],
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    exclude_task_id: Option<&str>,
) -> Vec<&'a Task> {
    tasks
        .iter()
        .filter(|t| Some(t.id.as_str()) != exclude_task_id)
        .filter(|t| t.occupies_calendar() && t.overlaps(start, end))
        .collect()
}

/// Whether `[start, end)` is free of occupying tasks.
pub fn is_free(
    tasks: &[Task],
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    exclude_task_id: Option<&str>,
) -> bool {
    overlapping(tasks, start, end, exclude_task_id).is_empty()
}
