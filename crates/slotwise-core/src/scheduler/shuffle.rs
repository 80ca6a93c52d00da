//! Displacement planning: moving lower-priority tasks to make room.
//!
//! When the free search fails, the planner walks to the earliest
//! window-valid interval whose occupants can all be moved aside, then
//! computes a new slot for each occupant after the incoming task's end.
//! The whole plan either succeeds or fails; no partial set of relocations
//! is ever returned. All placement happens on a working copy -- the
//! snapshot is never mutated.

use chrono::{DateTime, Duration, Utc};

use crate::availability::Availability;
use crate::error::ScheduleError;
use crate::graph::DependencyGraph;
use crate::scheduler::conflict;
use crate::scheduler::finder::SlotFinder;
use crate::snapshot::Snapshot;
use crate::task::{Relocation, Slot, Task};

/// A fully-resolved displacement: the incoming task's slot plus every
/// relocation required to clear it.
#[derive(Debug, Clone)]
pub struct DisplacementPlan {
    pub slot: Slot,
    pub relocations: Vec<Relocation>,
}

/// Whether `candidate` may be pushed aside for `incoming`.
///
/// Only unlocked tasks of strictly lower priority-importance (numerically
/// greater value) qualify, or tied priority when the candidate was created
/// later (later insertions are pushed first).
fn is_displaceable(incoming: &Task, candidate: &Task) -> bool {
    if candidate.locked {
        return false;
    }
    candidate.priority > incoming.priority
        || (candidate.priority == incoming.priority && candidate.created_at > incoming.created_at)
}

/// Plan the displacement needed to place `task` at the earliest
/// window-valid interval from `anchor` that can be cleared.
///
/// `anchor` must already satisfy the task's dependency gate. Fails without
/// relocations when no clearable interval exists before the horizon, when
/// more than `max_displacements` occupants are in the way, or when a
/// displaced task cannot itself find room within `displaced_horizon`.
pub fn plan_displacement(
    task: &Task,
    snapshot: &Snapshot,
    availability: &Availability,
    anchor: DateTime<Utc>,
    horizon_end: DateTime<Utc>,
    max_displacements: usize,
    displaced_horizon: Duration,
) -> Result<DisplacementPlan, ScheduleError> {
    let duration = task.duration_minutes.unwrap_or(0);
    let group = snapshot.group_for(task);
    let finder = SlotFinder::new(availability, group, &snapshot.tasks, Some(&task.id));

    // Earliest window-valid interval whose occupants can all be moved.
    // Intervals touching a locked or higher-priority task are skipped, so a
    // locked morning meeting never dooms the whole day.
    let mut probe = anchor;
    let mut skipped_immovable = false;
    let (target, occupants) = loop {
        let Some(candidate) = finder.find_ignoring_conflicts(duration, probe, horizon_end) else {
            return Err(if skipped_immovable {
                ScheduleError::DisplacementFailed {
                    task_id: task.id.clone(),
                    reason: "every candidate interval is blocked by locked or higher-priority tasks"
                        .to_string(),
                }
            } else {
                ScheduleError::NoSlotInHorizon {
                    task_id: task.id.clone(),
                    horizon_end,
                }
            });
        };
        let occupants =
            conflict::overlapping(&snapshot.tasks, candidate.start, candidate.end, Some(&task.id));
        match occupants
            .iter()
            .filter(|t| !is_displaceable(task, t))
            .filter_map(|t| t.scheduled_end)
            .max()
        {
            None => break (candidate, occupants),
            Some(immovable_end) => {
                skipped_immovable = true;
                probe = crate::scheduler::finder::round_up_to_grid(immovable_end);
            }
        }
    };

    if occupants.len() > max_displacements {
        return Err(ScheduleError::DisplacementFailed {
            task_id: task.id.clone(),
            reason: format!(
                "{} tasks occupy the target interval (limit {})",
                occupants.len(),
                max_displacements
            ),
        });
    }

    // Most important displaced task gets the first slot after the incoming
    // one; later-created tasks queue behind on ties.
    let mut displaced: Vec<Task> = occupants.into_iter().cloned().collect();
    displaced.sort_by(|a, b| {
        a.priority
            .cmp(&b.priority)
            .then(a.created_at.cmp(&b.created_at))
            .then(a.id.cmp(&b.id))
    });

    // Working copy: the incoming task takes the target interval so every
    // relocation is checked against the post-move calendar.
    let mut working: Vec<Task> = snapshot.tasks.clone();
    if let Some(incoming) = working.iter_mut().find(|t| t.id == task.id) {
        incoming.scheduled_start = Some(target.start);
        incoming.scheduled_end = Some(target.end);
    }

    let mut relocations = Vec::with_capacity(displaced.len());
    for moved in &displaced {
        // Ends of already-relocated tasks feed later gates, so the graph is
        // rebuilt over the working copy each round.
        let graph = DependencyGraph::build(&working, &snapshot.dependencies);
        let gate = graph.earliest_start(&moved.id).map_err(|_| {
            ScheduleError::DisplacementFailed {
                task_id: task.id.clone(),
                reason: format!(
                    "displaced task '{}' is blocked by an incomplete dependency",
                    moved.title
                ),
            }
        })?;
        let moved_anchor = gate.map_or(target.end, |g| g.max(target.end));

        let moved_duration = moved.duration_minutes.unwrap_or_else(|| {
            moved
                .slot()
                .map_or(0, |s| u32::try_from(s.duration_minutes()).unwrap_or(0))
        });
        let new_slot = SlotFinder::new(
            availability,
            snapshot.group_for(moved),
            &working,
            Some(&moved.id),
        )
        .find(moved_duration, moved_anchor, target.end + displaced_horizon)
        .ok_or_else(|| ScheduleError::DisplacementFailed {
            task_id: task.id.clone(),
            reason: format!("no room remains for displaced task '{}'", moved.title),
        })?;

        if let Some(entry) = working.iter_mut().find(|t| t.id == moved.id) {
            entry.scheduled_start = Some(new_slot.start);
            entry.scheduled_end = Some(new_slot.end);
        }
        relocations.push(Relocation {
            task_id: moved.id.clone(),
            new_slot,
        });
    }

    Ok(DisplacementPlan {
        slot: target,
        relocations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::availability::{HourRange, WeekHours};
    use crate::snapshot::DependencyMap;
    use chrono::TimeZone;

    fn at(day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, day, hour, minute, 0).unwrap()
    }

    fn availability() -> Availability {
        Availability::new(
            "UTC".parse().unwrap(),
            WeekHours::uniform(HourRange::new(9, 17)),
        )
    }

    fn task(id: &str, priority: u8) -> Task {
        let mut t = Task::new(id, 60, at(1, 0, 0));
        t.id = id.to_string();
        t.priority = priority;
        t
    }

    fn scheduled(id: &str, priority: u8, start: DateTime<Utc>, end: DateTime<Utc>) -> Task {
        let mut t = task(id, priority);
        t.duration_minutes = Some(u32::try_from((end - start).num_minutes()).unwrap());
        t.scheduled_start = Some(start);
        t.scheduled_end = Some(end);
        t
    }

    #[test]
    fn displaces_lower_priority_occupant() {
        let incoming = task("urgent", 1);
        let blocker = scheduled("mellow", 4, at(2, 9, 0), at(2, 10, 0));
        let snapshot = Snapshot::new(
            vec![incoming.clone(), blocker],
            vec![],
            DependencyMap::new(),
        );
        let avail = availability();

        let plan = plan_displacement(
            &incoming,
            &snapshot,
            &avail,
            at(2, 8, 0),
            at(9, 0, 0),
            16,
            Duration::days(7),
        )
        .unwrap();

        assert_eq!(plan.slot.start, at(2, 9, 0));
        assert_eq!(plan.relocations.len(), 1);
        assert_eq!(plan.relocations[0].task_id, "mellow");
        // Relocated after the incoming task's end
        assert!(plan.relocations[0].new_slot.start >= plan.slot.end);
    }

    #[test]
    fn refuses_to_move_locked_tasks() {
        let incoming = task("urgent", 1);
        let mut blocker = scheduled("anchor", 5, at(2, 9, 0), at(2, 17, 0));
        blocker.locked = true;
        let snapshot = Snapshot::new(
            vec![incoming.clone(), blocker],
            vec![],
            DependencyMap::new(),
        );
        let avail = availability();

        let err = plan_displacement(
            &incoming,
            &snapshot,
            &avail,
            at(2, 8, 0),
            at(2, 17, 0),
            16,
            Duration::days(7),
        )
        .unwrap_err();
        assert!(matches!(err, ScheduleError::DisplacementFailed { .. }));
    }

    #[test]
    fn refuses_to_move_higher_priority_tasks() {
        let incoming = task("routine", 4);
        let blocker = scheduled("important", 2, at(2, 9, 0), at(2, 10, 0));
        let snapshot = Snapshot::new(
            vec![incoming.clone(), blocker],
            vec![],
            DependencyMap::new(),
        );
        let avail = availability();

        // Incoming anchored inside the blocker's slot; only slot all day is taken
        let err = plan_displacement(
            &incoming,
            &snapshot,
            &avail,
            at(2, 9, 0),
            at(2, 10, 0),
            16,
            Duration::days(7),
        )
        .unwrap_err();
        assert!(matches!(err, ScheduleError::DisplacementFailed { .. }));
    }

    #[test]
    fn tied_priority_later_created_task_is_pushed() {
        let mut incoming = task("first", 3);
        incoming.created_at = at(1, 8, 0);
        let mut blocker = scheduled("second", 3, at(2, 9, 0), at(2, 10, 0));
        blocker.created_at = at(1, 9, 0);
        let snapshot = Snapshot::new(
            vec![incoming.clone(), blocker],
            vec![],
            DependencyMap::new(),
        );
        let avail = availability();

        let plan = plan_displacement(
            &incoming,
            &snapshot,
            &avail,
            at(2, 8, 0),
            at(9, 0, 0),
            16,
            Duration::days(7),
        )
        .unwrap();
        assert_eq!(plan.relocations[0].task_id, "second");
    }

    #[test]
    fn relocations_do_not_collide_with_each_other() {
        let incoming = task("urgent", 1);
        let a = scheduled("a", 4, at(2, 9, 0), at(2, 10, 0));
        let b = scheduled("b", 4, at(2, 9, 30), at(2, 10, 30));
        let snapshot = Snapshot::new(
            vec![incoming.clone(), a, b],
            vec![],
            DependencyMap::new(),
        );
        let avail = availability();

        let plan = plan_displacement(
            &incoming,
            &snapshot,
            &avail,
            at(2, 8, 0),
            at(9, 0, 0),
            16,
            Duration::days(7),
        )
        .unwrap();

        assert_eq!(plan.relocations.len(), 2);
        let first = plan.relocations[0].new_slot;
        let second = plan.relocations[1].new_slot;
        assert!(!first.overlaps(second.start, second.end));
        assert!(first.start >= plan.slot.end && second.start >= plan.slot.end);
    }

    #[test]
    fn fails_atomically_when_a_displaced_task_has_no_room() {
        // Window only fits the incoming task; the displaced one has nowhere
        // to go within its horizon.
        let avail = Availability::new(
            "UTC".parse().unwrap(),
            WeekHours::uniform(HourRange::new(9, 10)),
        );
        let incoming = task("urgent", 1);
        let blocker = scheduled("mellow", 4, at(2, 9, 0), at(2, 10, 0));
        let snapshot = Snapshot::new(
            vec![incoming.clone(), blocker],
            vec![],
            DependencyMap::new(),
        );

        let err = plan_displacement(
            &incoming,
            &snapshot,
            &avail,
            at(2, 8, 0),
            at(2, 12, 0),
            16,
            Duration::minutes(30),
        )
        .unwrap_err();
        assert!(matches!(err, ScheduleError::DisplacementFailed { .. }));
    }
}
