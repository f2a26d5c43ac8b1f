//! Task projection onto the grid
//!
//! Eligible tasks are rounded to whole hours, clamped to the visible window,
//! and written into every assigned machine's column:
//!
//! ```text
//! single hour      multi-hour, not setup   multi-hour, setup (bold)
//! ┌────────────┐   ┌──────────┐            ┌──────────┐
//! │ note:      │   │ name     │            │ name     │
//! │ name       │   │ customer │            │ customer │
//! │ customer   │   │ ---      │            │ line     │
//! │ line       │   │ ---      │            │ ---      │
//! └────────────┘   └──────────┘            └──────────┘
//! ```
//!
//! Tasks that cannot be placed exactly are dropped without error: outside the
//! window, unparseable timestamps, bounds that miss the hourly grid, or
//! machines that are not columns. Overlapping tasks overwrite each other in
//! input order.

use std::sync::OnceLock;

use chrono::{DateTime, Duration, FixedOffset, TimeZone, Timelike};
use hourgrid_core::{parse_instant, Grid, Job, JobTask, MachineId, NOT_AVAILABLE};
use regex::Regex;
use tracing::debug;

use crate::machines::MachineIndex;
use crate::timeline::Timeline;

/// Text written below the name/customer/line rows of a long task
pub const CONTINUATION: &str = "---";

fn setup_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?i)SET\s?UP").expect("setup pattern is valid"))
}

/// A grid-ready task with resolved display fields
#[derive(Clone, Debug, PartialEq)]
pub struct Task {
    pub name: String,
    pub customer_label: String,
    pub line_label: String,
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
    pub is_setup: bool,
    pub machine_ids: Vec<MachineId>,
}

impl Task {
    /// Resolve a planning-system task against its job
    ///
    /// Returns `None` when either timestamp is missing or cannot be parsed
    /// in `tz`.
    pub fn from_payload<Tz: TimeZone>(job: &Job, task: &JobTask, tz: &Tz) -> Option<Self> {
        let (Some(start), Some(end)) = (task.start.as_deref(), task.end.as_deref()) else {
            debug!(task = ?task.name, "skipping task without start or end");
            return None;
        };
        let (start, end) = match (parse_instant(start, tz), parse_instant(end, tz)) {
            (Ok(start), Ok(end)) => (start, end),
            (Err(err), _) | (_, Err(err)) => {
                debug!(task = ?task.name, %err, "skipping task with unusable timestamps");
                return None;
            }
        };

        let name = display_field(task.name.as_deref());
        let is_setup = is_setup_task(task.setup_time, &name);

        Some(Self {
            is_setup,
            name,
            customer_label: display_field(job.customer.as_deref()),
            line_label: display_field(job.custom_field_value1.as_deref()),
            start,
            end,
            machine_ids: task.assigned_resources.iter().map(|r| r.id.clone()).collect(),
        })
    }

    /// Comment text for a task that fits in one cell
    pub fn note_text(&self) -> String {
        format!("{}\n{}\n{}", self.name, self.customer_label, self.line_label)
    }

    /// Label for the row `offset` hours into a multi-hour task
    pub fn label_at(&self, offset: usize) -> &str {
        match offset {
            0 => &self.name,
            1 => &self.customer_label,
            2 if self.is_setup => &self.line_label,
            _ => CONTINUATION,
        }
    }
}

/// Eligible tasks of every active job, in input order
pub fn collect_tasks<Tz: TimeZone>(jobs: &[Job], tz: &Tz) -> Vec<Task> {
    jobs.iter()
        .flat_map(|job| {
            job.active_tasks()
                .filter_map(move |task| Task::from_payload(job, task, tz))
        })
        .collect()
}

fn display_field(value: Option<&str>) -> String {
    match value {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => NOT_AVAILABLE.to_string(),
    }
}

/// A positive setup duration or a "set up" name marks a changeover task
pub fn is_setup_task(setup_time: Option<f64>, name: &str) -> bool {
    setup_time.is_some_and(|t| t > 0.0) || setup_pattern().is_match(name)
}

/// Round to the nearest whole hour of local time; `:30` rounds up
pub fn round_to_nearest_hour(instant: DateTime<FixedOffset>) -> DateTime<FixedOffset> {
    let minutes = instant.minute();
    let floored = instant
        - Duration::seconds(i64::from(minutes * 60 + instant.second()))
        - Duration::nanoseconds(i64::from(instant.nanosecond()));
    if minutes >= 30 {
        floored + Duration::hours(1)
    } else {
        floored
    }
}

/// Write every task into the grid, returning it for the next phase
pub fn project_tasks<Tz: TimeZone>(
    mut grid: Grid,
    timeline: &Timeline<Tz>,
    machines: &MachineIndex,
    tasks: &[Task],
) -> Grid {
    let tz = timeline.start().timezone();
    let window_start = timeline.start().fixed_offset();
    let window_end = timeline.end().fixed_offset();
    let mut in_window = 0usize;

    for task in tasks {
        // Round on the export zone's wall clock
        let start = round_to_nearest_hour(task.start.with_timezone(&tz).fixed_offset());
        let end = round_to_nearest_hour(task.end.with_timezone(&tz).fixed_offset());

        if start > window_end || end < window_start {
            continue;
        }

        let start = start.max(window_start);
        let end = end.min(window_end);

        let (Some(row_start), Some(row_end)) = (timeline.row_of(&start), timeline.row_of(&end))
        else {
            debug!(task = %task.name, %start, %end, "task bounds miss the hourly grid");
            continue;
        };

        for machine_id in &task.machine_ids {
            let Some(column) = machines.column_of(machine_id) else {
                debug!(task = %task.name, machine = %machine_id, "task assigned to unknown machine");
                continue;
            };

            if row_start == row_end {
                grid.write_note(row_start, column, task.note_text());
                continue;
            }

            for row in row_start..row_end {
                grid.write_label(row, column, task.label_at(row - row_start), task.is_setup);
            }
        }
        in_window += 1;
    }

    debug!(in_window, total = tasks.len(), "projected tasks");
    grid
}

#[cfg(test)]
mod tests {
    use super::*;
    use hourgrid_core::{ResourceRef, WorkStatus};
    use pretty_assertions::assert_eq;

    fn at(hour: u32, minute: u32, second: u32) -> DateTime<FixedOffset> {
        FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2025, 3, 10, hour, minute, second)
            .unwrap()
    }

    fn job_with(task: JobTask) -> Job {
        Job {
            execute_status: WorkStatus::Planned,
            customer: Some("Acme".into()),
            custom_field_value1: Some("Line 4".into()),
            tasks: vec![task],
        }
    }

    fn payload_task(name: Option<&str>) -> JobTask {
        JobTask {
            task_status: WorkStatus::Started,
            name: name.map(String::from),
            start: Some("2025-03-10T08:00:00".into()),
            end: Some("2025-03-10T12:00:00".into()),
            setup_time: None,
            assigned_resources: vec![ResourceRef { id: "m-1".into() }],
        }
    }

    #[test]
    fn rounding_half_hour_boundary() {
        assert_eq!(round_to_nearest_hour(at(10, 31, 0)), at(11, 0, 0));
        assert_eq!(round_to_nearest_hour(at(10, 29, 0)), at(10, 0, 0));
        assert_eq!(round_to_nearest_hour(at(10, 30, 0)), at(11, 0, 0));
        assert_eq!(round_to_nearest_hour(at(10, 29, 59)), at(10, 0, 0));
        assert_eq!(round_to_nearest_hour(at(23, 45, 0)), at(23, 0, 0) + Duration::hours(1));
    }

    #[test]
    fn projection_rounds_in_timeline_zone() {
        // 13:40+05:30 .. 17:40+05:30 is 08:10Z .. 12:10Z, rows 8..12 of a UTC day
        let day = chrono::NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        let timeline = Timeline::generate(day, 0, 0, &chrono::Utc).unwrap();
        let machines = MachineIndex::new(&[hourgrid_core::Machine::new("m-1", "Press")]);
        let payload = payload_task(Some("Print"));
        let base = Task::from_payload(&job_with(payload.clone()), &payload, &chrono::Utc).unwrap();
        let ist = FixedOffset::east_opt(5 * 3600 + 1800).unwrap();
        let task = Task {
            start: ist.with_ymd_and_hms(2025, 3, 10, 13, 40, 0).unwrap(),
            end: ist.with_ymd_and_hms(2025, 3, 10, 17, 40, 0).unwrap(),
            ..base
        };

        let grid = project_tasks(Grid::new(timeline.len(), 1), &timeline, &machines, &[task]);
        assert_eq!(grid.occupied_count(), 4);
        assert_eq!(grid.get(8, 0).unwrap().text(), Some("Print"));
        assert_eq!(grid.get(11, 0).unwrap().text(), Some(CONTINUATION));
        assert!(grid.get(12, 0).unwrap().is_blank());
    }

    #[test]
    fn missing_timestamps_skip_the_task() {
        let mut task = payload_task(Some("Print"));
        task.start = None;
        assert!(Task::from_payload(&job_with(task.clone()), &task, &chrono::Utc).is_none());

        let mut task = payload_task(Some("Print"));
        task.end = None;
        assert!(Task::from_payload(&job_with(task.clone()), &task, &chrono::Utc).is_none());
    }

    #[test]
    fn setup_detection() {
        assert!(is_setup_task(Some(15.0), "Print"));
        assert!(is_setup_task(None, "Machine SET UP"));
        assert!(is_setup_task(None, "setup die"));
        assert!(is_setup_task(Some(0.0), "Set Up"));
    }

    #[test]
    fn setup_detection_negative_cases() {
        assert!(!is_setup_task(None, "Print"));
        assert!(!is_setup_task(Some(0.0), "Upset"));
        assert!(!is_setup_task(Some(-5.0), "Cut"));
        // at most one whitespace character between the words
        assert!(!is_setup_task(None, "Set  Up"));
    }

    #[test]
    fn payload_fields_fall_back_to_na() {
        let job = Job {
            customer: Some(String::new()),
            custom_field_value1: None,
            ..job_with(payload_task(None))
        };
        let task = Task::from_payload(&job, &job.tasks[0], &chrono::Utc).unwrap();

        assert_eq!(task.name, "N/A");
        assert_eq!(task.customer_label, "N/A");
        assert_eq!(task.line_label, "N/A");
        assert_eq!(task.note_text(), "N/A\nN/A\nN/A");
    }

    #[test]
    fn payload_with_bad_timestamp_is_dropped() {
        let mut task = payload_task(Some("Print"));
        task.end = Some("soon".into());
        let job = job_with(task);
        assert!(Task::from_payload(&job, &job.tasks[0], &chrono::Utc).is_none());
    }

    #[test]
    fn labels_by_offset() {
        let job = job_with(payload_task(Some("Print")));
        let mut task = Task::from_payload(&job, &job.tasks[0], &chrono::Utc).unwrap();

        let labels: Vec<&str> = (0..4).map(|o| task.label_at(o)).collect();
        assert_eq!(labels, ["Print", "Acme", "---", "---"]);

        task.is_setup = true;
        let labels: Vec<&str> = (0..4).map(|o| task.label_at(o)).collect();
        assert_eq!(labels, ["Print", "Acme", "Line 4", "---"]);
    }

    #[test]
    fn collect_skips_inactive_work() {
        let mut done = payload_task(Some("Done"));
        done.task_status = WorkStatus::Other;
        let mut job = job_with(payload_task(Some("Live")));
        job.tasks.push(done);

        let closed = Job {
            execute_status: WorkStatus::Other,
            ..job_with(payload_task(Some("Closed job")))
        };

        let tasks = collect_tasks(&[job, closed], &chrono::Utc);
        let names: Vec<&str> = tasks.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, ["Live"]);
    }
}
