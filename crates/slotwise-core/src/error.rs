//! Core error types for slotwise-core.
//!
//! This module defines a comprehensive error hierarchy using thiserror
//! for better error handling and reporting across the library.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for slotwise-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Scheduling engine errors
    #[error("Scheduling error: {0}")]
    Schedule(#[from] ScheduleError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors with context
    #[error("{0}")]
    Custom(String),
}

/// Scheduling engine errors.
///
/// Every failure mode of the engine is a distinct variant so the caller can
/// explain to the user *why* a task could not be placed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    /// The task does not exist in the snapshot
    #[error("Unknown task: {task_id}")]
    UnknownTask { task_id: String },

    /// The task has no (or zero) duration and cannot be placed
    #[error("Task '{task_id}' must have a positive duration to be scheduled")]
    MissingDuration { task_id: String },

    /// An incomplete dependency has no scheduled end time
    #[error("Task '{task_id}' is blocked: dependency '{dependency_id}' is incomplete and has no end time")]
    BlockedDependency {
        task_id: String,
        dependency_id: String,
    },

    /// The search walked past the mode's horizon without finding room
    #[error("No available slot for task '{task_id}' before {horizon_end} (try 'asap' mode to move lower-priority tasks)")]
    NoSlotInHorizon {
        task_id: String,
        horizon_end: chrono::DateTime<chrono::Utc>,
    },

    /// Due-date mode and the due date cannot be met
    #[error("No available slot for task '{task_id}' before its due date {due_date}")]
    DueDateUnreachable {
        task_id: String,
        due_date: chrono::DateTime<chrono::Utc>,
    },

    /// The task has no due date but due-date mode was requested
    #[error("Task '{task_id}' has no due date")]
    MissingDueDate { task_id: String },

    /// The earliest valid interval collides with a locked task and the mode
    /// does not permit displacement
    #[error("Task '{task_id}' would conflict with locked task '{locked_task_id}' and displacement is disabled in this mode")]
    LockedConflict {
        task_id: String,
        locked_task_id: String,
    },

    /// Displacement could not fully clear the target interval
    #[error("Could not resolve conflicts for task '{task_id}': {reason}")]
    DisplacementFailed { task_id: String, reason: String },

    /// Parent container tasks are never scheduled directly
    #[error("Task '{task_id}' has subtasks; schedule its subtasks instead")]
    ParentHasSubtasks { task_id: String },

    /// Batch subtask scheduling was requested for a task without subtasks
    #[error("Task '{task_id}' has no subtasks to schedule")]
    NoSubtasks { task_id: String },
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

/// Validation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Invalid time range
    #[error("Invalid time range: end_time ({end}) must be greater than start_time ({start})")]
    InvalidTimeRange {
        start: chrono::DateTime<chrono::Utc>,
        end: chrono::DateTime<chrono::Utc>,
    },

    /// Invalid hour-of-day range
    #[error("Invalid hour range for {weekday}: start {start} must be less than end {end} (hours 0-23)")]
    InvalidHourRange {
        weekday: String,
        start: u8,
        end: u8,
    },

    /// A task has exactly one of scheduled_start/scheduled_end set
    #[error("Task '{task_id}' has a partial schedule: scheduled_start and scheduled_end must both be set or both be empty")]
    PartialSchedule { task_id: String },

    /// Priority outside the accepted band
    #[error("Invalid priority {value} for '{field}': expected {min}-{max}")]
    InvalidPriority {
        field: String,
        value: i32,
        min: i32,
        max: i32,
    },

    /// A reference points at an id missing from the snapshot
    #[error("Unknown {kind} id '{id}' referenced by task '{task_id}'")]
    DanglingReference {
        kind: String,
        id: String,
        task_id: String,
    },

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
