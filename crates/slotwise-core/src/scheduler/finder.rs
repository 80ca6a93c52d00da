//! Slot search: the forward walk that finds room for a task.
//!
//! Candidates advance on a fixed 15-minute grid (matching the calendar UI)
//! from the anchor toward the horizon, skipping closed days, windows too
//! small for the duration, and occupied spans.

use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::availability::{Availability, TaskGroup};
use crate::scheduler::conflict;
use crate::task::{Slot, Task};

/// Grid granularity of the search, in minutes.
pub const GRID_MINUTES: i64 = 15;

/// Round an instant up to the next grid boundary (no-op when aligned).
pub fn round_up_to_grid(instant: DateTime<Utc>) -> DateTime<Utc> {
    let grid_secs = GRID_MINUTES * 60;
    let secs = instant.timestamp();
    let rem = secs.rem_euclid(grid_secs);
    let aligned = if rem == 0 && instant.timestamp_subsec_nanos() == 0 {
        secs
    } else {
        secs - rem + grid_secs
    };
    Utc.timestamp_opt(aligned, 0)
        .single()
        .unwrap_or(instant)
}

/// Forward slot search over one task's applicable windows.
///
/// Holds the conflict set by reference so the displacement planner can run
/// the same search against a working copy.
pub struct SlotFinder<'a> {
    availability: &'a Availability,
    group: Option<&'a TaskGroup>,
    tasks: &'a [Task],
    exclude_task_id: Option<&'a str>,
}

impl<'a> SlotFinder<'a> {
    pub fn new(
        availability: &'a Availability,
        group: Option<&'a TaskGroup>,
        tasks: &'a [Task],
        exclude_task_id: Option<&'a str>,
    ) -> Self {
        Self {
            availability,
            group,
            tasks,
            exclude_task_id,
        }
    }

    /// Find the first free, in-window interval of `duration_minutes` within
    /// `[anchor, horizon_end]`, or `None` when the horizon is exhausted.
    ///
    /// The caller is expected to have folded the dependency gate into
    /// `anchor` already.
    pub fn find(
        &self,
        duration_minutes: u32,
        anchor: DateTime<Utc>,
        horizon_end: DateTime<Utc>,
    ) -> Option<Slot> {
        self.search(duration_minutes, anchor, horizon_end, false)
    }

    /// The earliest window-valid interval regardless of conflicts.
    ///
    /// The displacement planner uses this to pick the interval it will
    /// clear; the unified scheduler uses it to name a locked blocker.
    pub fn find_ignoring_conflicts(
        &self,
        duration_minutes: u32,
        anchor: DateTime<Utc>,
        horizon_end: DateTime<Utc>,
    ) -> Option<Slot> {
        self.search(duration_minutes, anchor, horizon_end, true)
    }

    fn search(
        &self,
        duration_minutes: u32,
        anchor: DateTime<Utc>,
        horizon_end: DateTime<Utc>,
        ignore_conflicts: bool,
    ) -> Option<Slot> {
        if duration_minutes == 0 {
            return None;
        }
        let duration = Duration::minutes(i64::from(duration_minutes));
        let mut candidate = round_up_to_grid(anchor);
        let mut date = self.availability.local_date(candidate);

        loop {
            // Once a day begins past the horizon nothing later can fit.
            if self.availability.day_start(date) > horizon_end {
                return None;
            }

            for window in self.availability.windows_for(date, self.group) {
                if candidate >= window.end {
                    continue;
                }
                if candidate < window.start {
                    candidate = round_up_to_grid(window.start);
                }

                loop {
                    let end = candidate + duration;
                    if end > horizon_end {
                        return None;
                    }
                    if end > window.end {
                        break;
                    }

                    if ignore_conflicts {
                        return Some(Slot::new(candidate, end));
                    }
                    let blockers =
                        conflict::overlapping(self.tasks, candidate, end, self.exclude_task_id);
                    match blockers
                        .iter()
                        .filter_map(|t| t.scheduled_end)
                        .max()
                    {
                        None => return Some(Slot::new(candidate, end)),
                        Some(blocker_end) => {
                            // Jump past the conflict, staying on the grid.
                            candidate = round_up_to_grid(blocker_end);
                        }
                    }
                }
            }

            date = date.succ_opt()?;
        }
    }
}
