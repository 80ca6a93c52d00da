//! Read-only scheduling snapshot.
//!
//! The engine never talks to storage. The caller loads one user's tasks,
//! groups, and dependency edges into a [`Snapshot`], hands it to the
//! scheduler by reference, and persists whatever the scheduler returns.
//! Nothing in this module mutates the snapshot after construction.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::availability::TaskGroup;
use crate::error::ValidationError;
use crate::task::{Task, PRIORITY_HIGHEST, PRIORITY_LOWEST};

/// Dependency adjacency: task id to the ids of the tasks it depends on.
pub type DependencyMap = HashMap<String, Vec<String>>;

/// A point-in-time view of one user's schedulable world.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub groups: Vec<TaskGroup>,
    #[serde(default)]
    pub dependencies: DependencyMap,
}

impl Snapshot {
    pub fn new(tasks: Vec<Task>, groups: Vec<TaskGroup>, dependencies: DependencyMap) -> Self {
        Self {
            tasks,
            groups,
            dependencies,
        }
    }

    /// Look up a task by id.
    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Look up a group by id.
    pub fn group(&self, id: &str) -> Option<&TaskGroup> {
        self.groups.iter().find(|g| g.id == id)
    }

    /// The group a task belongs to, if any.
    pub fn group_for(&self, task: &Task) -> Option<&TaskGroup> {
        task.group_id.as_deref().and_then(|id| self.group(id))
    }

    /// Direct subtasks of a container task, in creation order.
    pub fn subtasks_of(&self, parent_id: &str) -> Vec<&Task> {
        let mut subtasks: Vec<&Task> = self
            .tasks
            .iter()
            .filter(|t| t.parent_task_id.as_deref() == Some(parent_id))
            .collect();
        subtasks.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        subtasks
    }

    /// Whether a task has at least one subtask (making it a container).
    pub fn has_subtasks(&self, task_id: &str) -> bool {
        self.tasks
            .iter()
            .any(|t| t.parent_task_id.as_deref() == Some(task_id))
    }

    /// Tasks that currently block calendar time.
    pub fn occupying_tasks(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter().filter(|t| t.occupies_calendar())
    }

    /// Validate the snapshot once at the boundary.
    ///
    /// Checks schedule-field pairing, priority bands, group hour ranges,
    /// and that group / parent / dependency references resolve.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let task_ids: HashSet<&str> = self.tasks.iter().map(|t| t.id.as_str()).collect();
        let group_ids: HashSet<&str> = self.groups.iter().map(|g| g.id.as_str()).collect();

        for group in &self.groups {
            group.auto_schedule_hours.validate()?;
            if !(1..=10).contains(&group.priority) {
                return Err(ValidationError::InvalidPriority {
                    field: format!("group '{}'", group.id),
                    value: i32::from(group.priority),
                    min: 1,
                    max: 10,
                });
            }
        }

        for task in &self.tasks {
            if task.scheduled_start.is_some() != task.scheduled_end.is_some() {
                return Err(ValidationError::PartialSchedule {
                    task_id: task.id.clone(),
                });
            }
            if let Some(slot) = task.slot() {
                if slot.end <= slot.start {
                    return Err(ValidationError::InvalidTimeRange {
                        start: slot.start,
                        end: slot.end,
                    });
                }
            }
            if !(PRIORITY_HIGHEST..=PRIORITY_LOWEST).contains(&task.priority) {
                return Err(ValidationError::InvalidPriority {
                    field: format!("task '{}'", task.id),
                    value: i32::from(task.priority),
                    min: i32::from(PRIORITY_HIGHEST),
                    max: i32::from(PRIORITY_LOWEST),
                });
            }
            if let Some(group_id) = task.group_id.as_deref() {
                if !group_ids.contains(group_id) {
                    return Err(ValidationError::DanglingReference {
                        kind: "group".to_string(),
                        id: group_id.to_string(),
                        task_id: task.id.clone(),
                    });
                }
            }
            if let Some(parent_id) = task.parent_task_id.as_deref() {
                if !task_ids.contains(parent_id) {
                    return Err(ValidationError::DanglingReference {
                        kind: "parent task".to_string(),
                        id: parent_id.to_string(),
                        task_id: task.id.clone(),
                    });
                }
            }
        }

        for (dependent, dependencies) in &self.dependencies {
            if !task_ids.contains(dependent.as_str()) {
                return Err(ValidationError::DanglingReference {
                    kind: "task".to_string(),
                    id: dependent.clone(),
                    task_id: dependent.clone(),
                });
            }
            for dependency in dependencies {
                if !task_ids.contains(dependency.as_str()) {
                    return Err(ValidationError::DanglingReference {
                        kind: "dependency".to_string(),
                        id: dependency.clone(),
                        task_id: dependent.clone(),
                    });
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn task(id: &str) -> Task {
        let mut t = Task::new(id, 30, Utc.with_ymd_and_hms(2026, 3, 2, 8, 0, 0).unwrap());
        t.id = id.to_string();
        t
    }

    #[test]
    fn validate_accepts_well_formed_snapshot() {
        let mut a = task("a");
        a.scheduled_start = Some(Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap());
        a.scheduled_end = Some(Utc.with_ymd_and_hms(2026, 3, 2, 9, 30, 0).unwrap());

        let snapshot = Snapshot::new(
            vec![a, task("b")],
            vec![],
            DependencyMap::from([("b".to_string(), vec!["a".to_string()])]),
        );
        assert!(snapshot.validate().is_ok());
    }

    #[test]
    fn validate_rejects_partial_schedule() {
        let mut a = task("a");
        a.scheduled_start = Some(Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap());

        let snapshot = Snapshot::new(vec![a], vec![], DependencyMap::new());
        assert!(matches!(
            snapshot.validate(),
            Err(ValidationError::PartialSchedule { .. })
        ));
    }

    #[test]
    fn validate_rejects_dangling_dependency() {
        let snapshot = Snapshot::new(
            vec![task("a")],
            vec![],
            DependencyMap::from([("a".to_string(), vec!["ghost".to_string()])]),
        );
        assert!(matches!(
            snapshot.validate(),
            Err(ValidationError::DanglingReference { .. })
        ));
    }

    #[test]
    fn subtasks_come_back_in_creation_order() {
        let mut parent = task("parent");
        parent.duration_minutes = None;
        let mut first = task("first");
        first.parent_task_id = Some("parent".to_string());
        let mut second = task("second");
        second.parent_task_id = Some("parent".to_string());
        second.created_at = first.created_at + chrono::Duration::minutes(5);

        let snapshot = Snapshot::new(
            vec![second.clone(), parent, first],
            vec![],
            DependencyMap::new(),
        );
        let ordered: Vec<&str> = snapshot
            .subtasks_of("parent")
            .iter()
            .map(|t| t.id.as_str())
            .collect();
        assert_eq!(ordered, vec!["first", "second"]);
        assert!(snapshot.has_subtasks("parent"));
        assert!(!snapshot.has_subtasks("first"));
    }
}
