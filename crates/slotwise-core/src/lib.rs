//! # Slotwise Core Library
//!
//! This library provides the auto-scheduling engine for Slotwise: given a
//! snapshot of one user's tasks, groups, and dependency edges, it computes
//! where a task should be placed on the calendar -- or which lower-priority
//! tasks to move to make room. It implements a CLI-first philosophy where
//! all operations are available via a standalone CLI binary, with any GUI
//! or HTTP surface being a thin layer over the same core library.
//!
//! ## Architecture
//!
//! - **Engine, not a service**: synchronous, pure computation over an
//!   in-memory [`Snapshot`]; the caller loads data, calls the engine, and
//!   persists the returned placements atomically
//! - **Layered constraints**: availability windows (user awake-hours or a
//!   group override), conflict detection, dependency gating, and mode
//!   horizons all bound the slot search
//! - **Displacement**: in asap mode the planner relocates unlocked,
//!   lower-priority tasks, all-or-nothing
//!
//! ## Key Components
//!
//! - [`AutoScheduler`]: mode-driven scheduling entry point
//! - [`Snapshot`]: read-only view of tasks, groups, and dependencies
//! - [`Availability`]: timezone-aware window resolution
//! - [`DependencyGraph`]: earliest-start gate and edge propagation
//! - [`Config`]: TOML configuration management

pub mod availability;
pub mod config;
pub mod error;
pub mod graph;
pub mod scheduler;
pub mod snapshot;
pub mod task;

pub use availability::{Availability, HourRange, TaskGroup, WeekHours};
pub use config::Config;
pub use error::{ConfigError, CoreError, ScheduleError, ValidationError};
pub use graph::{link_with_subtasks, unlink_with_subtasks, DependencyGraph};
pub use scheduler::{
    AutoScheduler, ScheduleMode, ScheduleOutcome, SchedulerConfig, SubtaskScheduleOutcome,
};
pub use snapshot::{DependencyMap, Snapshot};
pub use task::{Relocation, Slot, Task, TaskStatus};
