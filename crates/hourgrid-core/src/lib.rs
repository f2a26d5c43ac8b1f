//! # hourgrid-core
//!
//! Core domain model and traits for the hourgrid schedule exporter.
//!
//! This crate provides:
//! - Input payloads as delivered by the planning system: `PlanningSettings`,
//!   `MachineGroup`, `Job`, `ResourceCalendar`
//! - The rendered output: `ScheduleGrid`, `Grid`, `Cell`
//! - Timestamp parsing in a caller-chosen time zone
//! - The `Renderer` trait and error types
//!
//! ## Example
//!
//! ```rust
//! use hourgrid_core::{Grid, CellContent};
//!
//! let mut grid = Grid::new(24, 2);
//! grid.write_label(3, 1, "Press run", true);
//! grid.highlight(3, 1);
//!
//! let cell = grid.get(3, 1).unwrap();
//! assert_eq!(cell.text(), Some("Press run"));
//! assert!(cell.is_bold());
//! assert!(cell.highlighted);
//! ```

pub mod grid;
pub mod time;

pub use grid::{Cell, CellContent, Grid, ScheduleGrid};
pub use time::{local_midnight, parse_instant};

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Type Aliases
// ============================================================================

/// Opaque machine identifier (a GUID in the planning system)
pub type MachineId = String;

/// Display text used when a task field is missing or empty
pub const NOT_AVAILABLE: &str = "N/A";

// ============================================================================
// Settings
// ============================================================================

/// Planning window settings as delivered by the planning system
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct PlanningSettings {
    /// ISO-8601 planning start; only the local calendar date is used
    pub planning_start: Option<String>,
    /// Days shown before the planning start (negative shifts the window forward)
    pub days_before_planning_start: Option<i64>,
    /// Planning horizon in weeks
    pub planning_horizon: Option<i64>,
}

/// Validated window parameters extracted from [`PlanningSettings`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WindowSettings {
    pub planning_start: String,
    pub lead_days: i64,
    pub horizon_weeks: i64,
}

impl PlanningSettings {
    /// Check that every field needed to lay out the timeline is present
    pub fn window(&self) -> Result<WindowSettings, InputError> {
        let planning_start = self
            .planning_start
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or(InputError::MissingSetting("PlanningStart"))?;
        let lead_days = self
            .days_before_planning_start
            .ok_or(InputError::MissingSetting("DaysBeforePlanningStart"))?;
        let horizon_weeks = self
            .planning_horizon
            .ok_or(InputError::MissingSetting("PlanningHorizon"))?;

        Ok(WindowSettings {
            planning_start: planning_start.to_string(),
            lead_days,
            horizon_weeks,
        })
    }
}

// ============================================================================
// Machines
// ============================================================================

/// A resource group whose members become the grid columns
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct MachineGroup {
    pub resources: Vec<Machine>,
}

/// A machine column
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Machine {
    /// Unique identifier
    #[serde(rename = "Guid")]
    pub id: MachineId,
    /// Column header text
    #[serde(rename = "Name", default)]
    pub name: String,
}

impl Machine {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

// ============================================================================
// Jobs and Tasks
// ============================================================================

/// Execution status shared by jobs and tasks
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkStatus {
    Planned,
    Started,
    /// Any status the grid does not render (completed, unplanned, ...)
    #[default]
    #[serde(other)]
    Other,
}

impl WorkStatus {
    /// Only planned and started work appears on the grid
    pub fn is_active(self) -> bool {
        matches!(self, WorkStatus::Planned | WorkStatus::Started)
    }
}

/// A production job with its tasks
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Job {
    pub execute_status: WorkStatus,
    pub customer: Option<String>,
    /// Free-form label (production line) shown on setup tasks
    pub custom_field_value1: Option<String>,
    pub tasks: Vec<JobTask>,
}

impl Job {
    /// Tasks that belong on the grid: both the job and the task must be active
    pub fn active_tasks(&self) -> impl Iterator<Item = &JobTask> {
        let job_active = self.execute_status.is_active();
        self.tasks
            .iter()
            .filter(move |task| job_active && task.task_status.is_active())
    }
}

/// A scheduled task as delivered by the planning system
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct JobTask {
    pub task_status: WorkStatus,
    pub name: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    /// Explicit setup duration; any positive value marks a setup task
    pub setup_time: Option<f64>,
    pub assigned_resources: Vec<ResourceRef>,
}

/// Reference to an assigned machine
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRef {
    #[serde(rename = "Guid")]
    pub id: MachineId,
}

// ============================================================================
// Resource Calendars
// ============================================================================

/// Calendar exceptions for one machine
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ResourceCalendar {
    #[serde(rename = "Guid")]
    pub id: MachineId,
    pub calendar_exceptions: Vec<CalendarException>,
}

/// A calendar day on which the machine is unavailable
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct CalendarException {
    pub date: Option<String>,
}

// ============================================================================
// Input Bundle
// ============================================================================

/// The four payloads fetched from the planning system for one export
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleInput {
    pub settings: PlanningSettings,
    pub machines: MachineGroup,
    pub jobs: Vec<Job>,
    pub resources: Vec<ResourceCalendar>,
}

// ============================================================================
// Traits
// ============================================================================

/// Output rendering
pub trait Renderer {
    type Output;

    /// Render a built schedule grid to the output format
    fn render(&self, schedule: &ScheduleGrid) -> Result<Self::Output, RenderError>;
}

// ============================================================================
// Errors
// ============================================================================

/// Structurally invalid input that prevents laying out the grid
#[derive(Debug, Error)]
pub enum InputError {
    #[error("Missing setting: {0}")]
    MissingSetting(&'static str),

    #[error("Invalid setting {field}: {message}")]
    InvalidSetting { field: &'static str, message: String },

    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("Local time does not exist in the configured time zone: {0}")]
    NonexistentLocalTime(String),
}

/// Rendering error
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Format error: {0}")]
    Format(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

// ============================================================================
// Tests
// ============================================================================
