//! Machine unavailability overlay
//!
//! Each calendar exception blocks a machine from the exception's local
//! midnight to the same wall-clock time on the next day. Blocked rows get the
//! highlight flag; their task content stays as written.

use chrono::{DateTime, Days, FixedOffset, TimeZone};
use hourgrid_core::{parse_instant, Grid, ResourceCalendar};
use tracing::debug;

use crate::machines::MachineIndex;
use crate::timeline::Timeline;

/// Highlight every in-window exception day, returning the grid
pub fn overlay_exceptions<Tz: TimeZone>(
    mut grid: Grid,
    timeline: &Timeline<Tz>,
    machines: &MachineIndex,
    resources: &[ResourceCalendar],
    tz: &Tz,
) -> Grid {
    let mut blocked_days = 0usize;

    for resource in resources {
        let Some(column) = machines.column_of(&resource.id) else {
            continue;
        };

        for exception in &resource.calendar_exceptions {
            let Some(date) = exception.date.as_deref() else {
                debug!(machine = %resource.id, "skipping calendar exception without a date");
                continue;
            };
            let day = match parse_instant(date, tz) {
                Ok(day) => day,
                Err(err) => {
                    debug!(machine = %resource.id, %err, "skipping unusable calendar exception");
                    continue;
                }
            };
            if day < *timeline.start() || day >= *timeline.end() {
                continue;
            }

            let Some(next_day) = next_day(&day, tz) else {
                continue;
            };
            let (Some(row_start), Some(row_end)) = (timeline.row_of(&day), timeline.row_of(&next_day))
            else {
                debug!(machine = %resource.id, %day, "exception day misses the hourly grid");
                continue;
            };

            for row in row_start..row_end {
                grid.highlight(row, column);
            }
            blocked_days += 1;
        }
    }

    debug!(blocked_days, "overlaid calendar exceptions");
    grid
}

/// Same wall-clock time in `tz` one calendar day later
fn next_day<Tz: TimeZone>(day: &DateTime<FixedOffset>, tz: &Tz) -> Option<DateTime<FixedOffset>> {
    let wall = day
        .with_timezone(tz)
        .naive_local()
        .checked_add_days(Days::new(1))?;
    tz.from_local_datetime(&wall)
        .earliest()
        .map(|next| next.fixed_offset())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use hourgrid_core::{CalendarException, Machine};

    fn setup() -> (Timeline<Utc>, MachineIndex) {
        let timeline =
            Timeline::generate(NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(), 0, 0, &Utc).unwrap();
        let machines = MachineIndex::new(&[Machine::new("a", "Press A"), Machine::new("b", "Press B")]);
        (timeline, machines)
    }

    fn calendar(id: &str, dates: &[&str]) -> ResourceCalendar {
        ResourceCalendar {
            id: id.into(),
            calendar_exceptions: dates
                .iter()
                .map(|d| CalendarException {
                    date: Some((*d).into()),
                })
                .collect(),
        }
    }

    #[test]
    fn exception_on_last_day_misses_window_end() {
        // One-day window: the day's end is the exclusive window end, which has no row.
        let (timeline, machines) = setup();
        let grid = Grid::new(timeline.len(), machines.len());

        let grid = overlay_exceptions(
            grid,
            &timeline,
            &machines,
            &[calendar("a", &["2025-03-10T00:00:00"])],
            &Utc,
        );
        assert_eq!(grid.highlighted_count(), 0);
    }

    #[test]
    fn unknown_machine_and_bad_dates_are_ignored() {
        let (timeline, machines) = setup();
        let grid = Grid::new(timeline.len(), machines.len());

        let grid = overlay_exceptions(
            grid,
            &timeline,
            &machines,
            &[calendar("zzz", &["2025-03-10"]), calendar("b", &["whenever"])],
            &Utc,
        );
        assert_eq!(grid.mutated_count(), 0);
    }

    #[test]
    fn next_day_keeps_wall_time() {
        let tz = FixedOffset::east_opt(3600).unwrap();
        let day = tz.with_ymd_and_hms(2025, 3, 10, 0, 0, 0).unwrap();
        let next = next_day(&day, &tz).unwrap();
        assert_eq!(next, tz.with_ymd_and_hms(2025, 3, 11, 0, 0, 0).unwrap());
    }

    #[test]
    fn next_day_steps_the_zone_wall_clock() {
        // 2025-03-11T00:00Z is 02:00 at +02:00; one local day later is 02:00 on the 12th
        let tz = FixedOffset::east_opt(2 * 3600).unwrap();
        let day = Utc.with_ymd_and_hms(2025, 3, 11, 0, 0, 0).unwrap().fixed_offset();
        let next = next_day(&day, &tz).unwrap();
        assert_eq!(next.naive_local(), tz.with_ymd_and_hms(2025, 3, 12, 2, 0, 0).unwrap().naive_local());
        assert_eq!(next - day, chrono::Duration::hours(24));
    }

    #[test]
    fn exception_with_foreign_offset_blocks_a_full_day() {
        let tz = FixedOffset::east_opt(2 * 3600).unwrap();
        let timeline =
            Timeline::generate(NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(), 0, 1, &tz).unwrap();
        let machines = MachineIndex::new(&[Machine::new("a", "Press A")]);
        let grid = Grid::new(timeline.len(), machines.len());

        let grid = overlay_exceptions(
            grid,
            &timeline,
            &machines,
            &[calendar("a", &["2025-03-11T00:00:00Z"])],
            &tz,
        );
        assert_eq!(grid.highlighted_count(), 24);
        // 00:00Z is 02:00 local on the 11th: rows 24 + 2 .. 24 + 26
        assert!(grid.get(25, 0).unwrap().is_blank());
        assert!(grid.get(26, 0).unwrap().highlighted);
        assert!(grid.get(49, 0).unwrap().highlighted);
        assert!(grid.get(50, 0).unwrap().is_blank());
    }

    #[test]
    fn exception_without_date_is_ignored() {
        let (timeline, machines) = setup();
        let grid = Grid::new(timeline.len(), machines.len());
        let resources = [ResourceCalendar {
            id: "a".into(),
            calendar_exceptions: vec![CalendarException { date: None }],
        }];

        let grid = overlay_exceptions(grid, &timeline, &machines, &resources, &Utc);
        assert_eq!(grid.mutated_count(), 0);
    }
}
