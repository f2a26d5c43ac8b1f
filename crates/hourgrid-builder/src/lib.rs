//! # hourgrid-builder
//!
//! Schedule matrix builder: turns planning-system payloads into an hourly
//! time-by-machine grid.
//!
//! This crate provides:
//! - Timeline generation for the visible planning window
//! - Machine column indexing
//! - Task projection (rounding, clamping, label distribution)
//! - Calendar exception overlay
//!
//! The grid moves by value through the two write phases: tasks first, then
//! exceptions, so highlights land on top of task content.
//!
//! ## Example
//!
//! ```rust
//! use chrono::Utc;
//! use hourgrid_builder::GridBuilder;
//! use hourgrid_core::{Machine, PlanningSettings, ScheduleInput};
//!
//! let input = ScheduleInput {
//!     settings: PlanningSettings {
//!         planning_start: Some("2025-03-10T06:00:00".into()),
//!         days_before_planning_start: Some(1),
//!         planning_horizon: Some(1),
//!     },
//!     machines: hourgrid_core::MachineGroup {
//!         resources: vec![Machine::new("m-1", "Press 1")],
//!     },
//!     ..ScheduleInput::default()
//! };
//!
//! let schedule = GridBuilder::new(Utc).build(&input).unwrap();
//! assert_eq!(schedule.timeline.len(), 8 * 24);
//! assert_eq!(schedule.machine_names, ["Press 1"]);
//! ```

pub mod exceptions;
pub mod machines;
pub mod tasks;
pub mod timeline;

pub use exceptions::overlay_exceptions;
pub use machines::MachineIndex;
pub use tasks::{collect_tasks, project_tasks, round_to_nearest_hour, Task};
pub use timeline::Timeline;

use chrono::{Local, TimeZone};
use hourgrid_core::{parse_instant, Grid, InputError, ScheduleGrid, ScheduleInput};
use tracing::debug;

/// Builds a [`ScheduleGrid`] in a fixed time zone
#[derive(Clone, Debug)]
pub struct GridBuilder<Tz: TimeZone> {
    tz: Tz,
}

impl GridBuilder<Local> {
    /// Builder for the process's local time zone
    pub fn local() -> Self {
        Self::new(Local)
    }
}

impl<Tz: TimeZone> GridBuilder<Tz> {
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }

    pub fn time_zone(&self) -> &Tz {
        &self.tz
    }

    /// Lay out the planning window from the settings payload
    pub fn timeline(&self, input: &ScheduleInput) -> Result<Timeline<Tz>, InputError> {
        let window = input.settings.window()?;
        let planning_start = parse_instant(&window.planning_start, &self.tz)?;
        Timeline::generate(
            planning_start.naive_local().date(),
            window.lead_days,
            window.horizon_weeks,
            &self.tz,
        )
    }

    /// Run both write phases and hand back the finished grid
    ///
    /// Only settings problems fail the build; tasks and exceptions that
    /// cannot be placed are dropped.
    pub fn build(&self, input: &ScheduleInput) -> Result<ScheduleGrid, InputError> {
        let timeline = self.timeline(input)?;
        let machines = MachineIndex::new(&input.machines.resources);
        let tasks = collect_tasks(&input.jobs, &self.tz);

        debug!(
            rows = timeline.len(),
            machines = machines.len(),
            tasks = tasks.len(),
            "building schedule grid"
        );

        let grid = Grid::new(timeline.len(), machines.len());
        let grid = project_tasks(grid, &timeline, &machines, &tasks);
        let grid = overlay_exceptions(grid, &timeline, &machines, &input.resources, &self.tz);

        Ok(ScheduleGrid {
            timeline: timeline.wall_clock(),
            machine_names: machines.names().to_vec(),
            grid,
        })
    }
}
