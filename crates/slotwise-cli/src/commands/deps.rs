//! Dependency edge management with subtask propagation.

use std::path::PathBuf;

use clap::Subcommand;
use slotwise_core::{link_with_subtasks, unlink_with_subtasks, DependencyGraph};

use crate::common;

#[derive(Subcommand)]
pub enum DepsAction {
    /// Add an edge: DEPENDENT waits for DEPENDENCY (propagates to subtasks)
    Link {
        /// Snapshot JSON file
        snapshot: PathBuf,
        /// Task that must wait
        dependent: String,
        /// Task it waits for
        dependency: String,
    },
    /// Remove an edge and its derived subtask edges
    Unlink {
        /// Snapshot JSON file
        snapshot: PathBuf,
        /// Task that was waiting
        dependent: String,
        /// Task it was waiting for
        dependency: String,
    },
    /// Show the earliest start a task's dependencies permit
    Check {
        /// Snapshot JSON file
        snapshot: PathBuf,
        /// Task ID
        id: String,
    },
}

pub fn run(action: DepsAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        DepsAction::Link {
            snapshot: path,
            dependent,
            dependency,
        } => {
            let mut snapshot = common::load_snapshot(&path)?;
            if snapshot.task(&dependent).is_none() {
                return Err(format!("no task with id '{dependent}'").into());
            }
            if snapshot.task(&dependency).is_none() {
                return Err(format!("no task with id '{dependency}'").into());
            }

            let added = link_with_subtasks(
                &mut snapshot.dependencies,
                &snapshot.tasks,
                &dependent,
                &dependency,
            );
            common::save_snapshot(&path, &snapshot)?;
            println!("{added} edge(s) added");
        }
        DepsAction::Unlink {
            snapshot: path,
            dependent,
            dependency,
        } => {
            let mut snapshot = common::load_snapshot(&path)?;
            unlink_with_subtasks(
                &mut snapshot.dependencies,
                &snapshot.tasks,
                &dependent,
                &dependency,
            );
            common::save_snapshot(&path, &snapshot)?;
            println!("edge removed");
        }
        DepsAction::Check { snapshot: path, id } => {
            let snapshot = common::load_snapshot(&path)?;
            if snapshot.task(&id).is_none() {
                return Err(format!("no task with id '{id}'").into());
            }
            let graph = DependencyGraph::build(&snapshot.tasks, &snapshot.dependencies);
            match graph.earliest_start(&id) {
                Ok(None) => println!("unconstrained"),
                Ok(Some(instant)) => println!("earliest start: {}", instant.to_rfc3339()),
                Err(e) => println!("blocked: {e}"),
            }
        }
    }
    Ok(())
}
