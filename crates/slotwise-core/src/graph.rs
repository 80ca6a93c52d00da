//! Dependency graph: the gate that orders task placement.
//!
//! This module provides:
//! - [`DependencyGraph`], an index-based adjacency structure built once per
//!   scheduling invocation from the snapshot's dependency map
//! - The dependency gate ([`DependencyGraph::earliest_start`]) that bounds
//!   how early a task may be placed
//! - Mutation-time edge propagation ([`link_with_subtasks`] /
//!   [`unlink_with_subtasks`]) that keeps subtask ordering consistent with
//!   parent-level ordering

use std::collections::{HashMap, HashSet, VecDeque};

use chrono::{DateTime, Utc};

use crate::error::ScheduleError;
use crate::snapshot::DependencyMap;
use crate::task::{Task, TaskStatus};

/// Arena-style dependency graph over one snapshot's tasks.
///
/// Edges point from a dependent task to the tasks it depends on. Built once,
/// then queried with index-based BFS rather than repeated map lookups.
pub struct DependencyGraph<'a> {
    tasks: Vec<&'a Task>,
    index: HashMap<&'a str, usize>,
    depends_on: Vec<Vec<usize>>,
}

impl<'a> DependencyGraph<'a> {
    /// Build the adjacency structure from a task list and dependency map.
    ///
    /// Edges naming unknown tasks are ignored; snapshot validation reports
    /// them before the engine runs.
    pub fn build(tasks: &'a [Task], dependencies: &DependencyMap) -> Self {
        let task_refs: Vec<&Task> = tasks.iter().collect();
        let index: HashMap<&str, usize> = task_refs
            .iter()
            .enumerate()
            .map(|(i, t)| (t.id.as_str(), i))
            .collect();

        let mut depends_on = vec![Vec::new(); task_refs.len()];
        for (dependent, deps) in dependencies {
            let Some(&from) = index.get(dependent.as_str()) else {
                continue;
            };
            for dependency in deps {
                if let Some(&to) = index.get(dependency.as_str()) {
                    if !depends_on[from].contains(&to) {
                        depends_on[from].push(to);
                    }
                }
            }
        }

        Self {
            tasks: task_refs,
            index,
            depends_on,
        }
    }

    /// Direct dependencies of a task.
    pub fn dependencies_of(&self, task_id: &str) -> Vec<&'a Task> {
        match self.index.get(task_id) {
            Some(&i) => self.depends_on[i].iter().map(|&d| self.tasks[d]).collect(),
            None => Vec::new(),
        }
    }

    /// The earliest instant a task may start, per its direct dependencies.
    ///
    /// Completed dependencies impose no constraint regardless of their
    /// schedule. Any other dependency must have a `scheduled_end`; one
    /// without it makes the task unschedulable.
    ///
    /// Returns `Ok(None)` when nothing constrains the start.
    pub fn earliest_start(&self, task_id: &str) -> Result<Option<DateTime<Utc>>, ScheduleError> {
        let mut earliest: Option<DateTime<Utc>> = None;
        for dep in self.dependencies_of(task_id) {
            if dep.status == TaskStatus::Completed {
                continue;
            }
            match dep.scheduled_end {
                Some(end) => {
                    earliest = Some(earliest.map_or(end, |cur| cur.max(end)));
                }
                None => {
                    return Err(ScheduleError::BlockedDependency {
                        task_id: task_id.to_string(),
                        dependency_id: dep.id.clone(),
                    })
                }
            }
        }
        Ok(earliest)
    }

    /// BFS reachability along dependency edges: does `from` transitively
    /// depend on `to`?
    pub fn reaches(&self, from: &str, to: &str) -> bool {
        let (Some(&start), Some(&target)) = (self.index.get(from), self.index.get(to)) else {
            return false;
        };
        if start == target {
            return true;
        }
        let mut visited = vec![false; self.tasks.len()];
        let mut queue = VecDeque::from([start]);
        visited[start] = true;
        while let Some(node) = queue.pop_front() {
            for &next in &self.depends_on[node] {
                if next == target {
                    return true;
                }
                if !visited[next] {
                    visited[next] = true;
                    queue.push_back(next);
                }
            }
        }
        false
    }
}

/// Reachability over a raw dependency map, used while edges are in flux.
fn map_reaches(dependencies: &DependencyMap, from: &str, to: &str) -> bool {
    if from == to {
        return true;
    }
    let mut visited: HashSet<&str> = HashSet::from([from]);
    let mut queue: VecDeque<&str> = VecDeque::from([from]);
    while let Some(node) = queue.pop_front() {
        if let Some(deps) = dependencies.get(node) {
            for dep in deps {
                if dep == to {
                    return true;
                }
                if visited.insert(dep.as_str()) {
                    queue.push_back(dep.as_str());
                }
            }
        }
    }
    false
}

fn insert_edge(dependencies: &mut DependencyMap, dependent: &str, dependency: &str) -> bool {
    let deps = dependencies.entry(dependent.to_string()).or_default();
    if deps.iter().any(|d| d == dependency) {
        return false;
    }
    deps.push(dependency.to_string());
    true
}

fn remove_edge(dependencies: &mut DependencyMap, dependent: &str, dependency: &str) {
    if let Some(deps) = dependencies.get_mut(dependent) {
        deps.retain(|d| d != dependency);
        if deps.is_empty() {
            dependencies.remove(dependent);
        }
    }
}

fn subtask_ids<'a>(tasks: &'a [Task], parent_id: &str) -> Vec<&'a str> {
    let mut subtasks: Vec<&Task> = tasks
        .iter()
        .filter(|t| t.parent_task_id.as_deref() == Some(parent_id))
        .collect();
    subtasks.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
    subtasks.iter().map(|t| t.id.as_str()).collect()
}

/// Create the edge `dependent -> dependency` and materialize all-to-all
/// edges between their subtasks.
///
/// When both ends have subtasks, every subtask of the dependent ends up
/// depending on every subtask of the dependency. Each candidate edge is
/// checked for cycles first (reachability from the prospective dependency
/// back to the dependent) and skipped if it would introduce one.
///
/// Returns the number of edges actually added.
pub fn link_with_subtasks(
    dependencies: &mut DependencyMap,
    tasks: &[Task],
    dependent: &str,
    dependency: &str,
) -> usize {
    let mut added = 0;

    if !map_reaches(dependencies, dependency, dependent)
        && insert_edge(dependencies, dependent, dependency)
    {
        added += 1;
    }

    let dependent_subtasks = subtask_ids(tasks, dependent);
    let dependency_subtasks = subtask_ids(tasks, dependency);
    if dependent_subtasks.is_empty() || dependency_subtasks.is_empty() {
        return added;
    }

    for sub_dependent in &dependent_subtasks {
        for sub_dependency in &dependency_subtasks {
            if map_reaches(dependencies, sub_dependency, sub_dependent) {
                continue;
            }
            if insert_edge(dependencies, sub_dependent, sub_dependency) {
                added += 1;
            }
        }
    }
    added
}

/// Remove the edge `dependent -> dependency` along with every derived
/// subtask-to-subtask edge.
pub fn unlink_with_subtasks(
    dependencies: &mut DependencyMap,
    tasks: &[Task],
    dependent: &str,
    dependency: &str,
) {
    remove_edge(dependencies, dependent, dependency);

    for sub_dependent in subtask_ids(tasks, dependent) {
        for sub_dependency in subtask_ids(tasks, dependency) {
            remove_edge(dependencies, sub_dependent, sub_dependency);
        }
    }
}
