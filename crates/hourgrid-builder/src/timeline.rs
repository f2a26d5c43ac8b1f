//! Hourly timeline for the visible planning window
//!
//! The window starts at local midnight `lead_days` before the planning start
//! date and ends `7 * horizon_weeks + 1` days after that shifted start. Rows
//! are one hour apart; each row's millisecond offset from the window start is
//! indexed so that placing an instant is an exact O(1) lookup.

use std::collections::HashMap;

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, TimeZone};
use hourgrid_core::{local_midnight, InputError};

/// Longest horizon accepted (ten years of weeks)
pub const MAX_HORIZON_WEEKS: i64 = 520;

/// Largest lead in either direction (about ten years of days)
pub const MAX_LEAD_DAYS: i64 = 3650;

const HOUR_MS: i64 = 3_600_000;

/// Ordered hourly instants covering `[start, end)`
#[derive(Clone, Debug)]
pub struct Timeline<Tz: TimeZone> {
    start: DateTime<Tz>,
    end: DateTime<Tz>,
    instants: Vec<DateTime<Tz>>,
    offsets: Vec<i64>,
    rows_by_offset: HashMap<i64, usize>,
}

impl<Tz: TimeZone> Timeline<Tz> {
    /// Lay out the window for a planning start date
    pub fn generate(
        planning_start: NaiveDate,
        lead_days: i64,
        horizon_weeks: i64,
        tz: &Tz,
    ) -> Result<Self, InputError> {
        if !(-MAX_LEAD_DAYS..=MAX_LEAD_DAYS).contains(&lead_days) {
            return Err(InputError::InvalidSetting {
                field: "DaysBeforePlanningStart",
                message: format!("{lead_days} is outside ±{MAX_LEAD_DAYS} days"),
            });
        }
        if !(0..=MAX_HORIZON_WEEKS).contains(&horizon_weeks) {
            return Err(InputError::InvalidSetting {
                field: "PlanningHorizon",
                message: format!("{horizon_weeks} is outside 0..={MAX_HORIZON_WEEKS} weeks"),
            });
        }

        let start_date = planning_start
            .checked_sub_signed(Duration::days(lead_days))
            .ok_or_else(|| out_of_range("DaysBeforePlanningStart", planning_start))?;
        // Measured from the shifted start, not from the planning start.
        let end_date = start_date
            .checked_add_signed(Duration::days(7 * horizon_weeks + 1))
            .ok_or_else(|| out_of_range("PlanningHorizon", start_date))?;

        let start = local_midnight(start_date, tz)
            .ok_or_else(|| InputError::NonexistentLocalTime(format!("{start_date} 00:00")))?;
        let end = local_midnight(end_date, tz)
            .ok_or_else(|| InputError::NonexistentLocalTime(format!("{end_date} 00:00")))?;

        Ok(Self::stepping(start, end))
    }

    /// Step one hour at a time from `start` up to but excluding `end`
    ///
    /// Steps are elapsed hours, not wall-clock hours. A DST fall-back day has
    /// 25 rows and shows the repeated local hour twice; a spring-forward day
    /// has 23 rows and skips the missing hour.
    fn stepping(start: DateTime<Tz>, end: DateTime<Tz>) -> Self {
        let mut instants = Vec::new();
        let mut offsets = Vec::new();
        let mut rows_by_offset = HashMap::new();

        let mut current = start.clone();
        while current < end {
            let offset = current.clone().signed_duration_since(&start).num_milliseconds();
            rows_by_offset.insert(offset, instants.len());
            offsets.push(offset);
            instants.push(current.clone());
            current = current + Duration::hours(1);
        }

        Self {
            start,
            end,
            instants,
            offsets,
            rows_by_offset,
        }
    }

    pub fn start(&self) -> &DateTime<Tz> {
        &self.start
    }

    /// Exclusive window end
    pub fn end(&self) -> &DateTime<Tz> {
        &self.end
    }

    pub fn len(&self) -> usize {
        self.instants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instants.is_empty()
    }

    pub fn instants(&self) -> &[DateTime<Tz>] {
        &self.instants
    }

    /// Millisecond offset of every row from the window start
    pub fn offsets(&self) -> &[i64] {
        &self.offsets
    }

    /// Milliseconds from the window start to `instant`
    pub fn offset_of<Tz2: TimeZone>(&self, instant: &DateTime<Tz2>) -> i64 {
        instant.clone().signed_duration_since(&self.start).num_milliseconds()
    }

    /// Row whose offset equals `instant`'s offset exactly
    ///
    /// Instants off the hourly grid, and the exclusive window end, have no row.
    pub fn row_of<Tz2: TimeZone>(&self, instant: &DateTime<Tz2>) -> Option<usize> {
        self.rows_by_offset.get(&self.offset_of(instant)).copied()
    }

    /// Local wall-clock time of every row
    pub fn wall_clock(&self) -> Vec<NaiveDateTime> {
        self.instants.iter().map(DateTime::naive_local).collect()
    }

    /// Whole hours between the window bounds
    pub fn span_hours(&self) -> i64 {
        let ms = self.end.clone().signed_duration_since(&self.start).num_milliseconds();
        (ms + HOUR_MS - 1) / HOUR_MS
    }
}

fn out_of_range(field: &'static str, date: NaiveDate) -> InputError {
    InputError::InvalidSetting {
        field,
        message: format!("window around {date} is out of the supported date range"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};
    use pretty_assertions::assert_eq;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn window_bounds_follow_shifted_start() {
        let timeline = Timeline::generate(date(2025, 3, 10), 1, 1, &Utc).unwrap();

        assert_eq!(timeline.start().naive_local(), date(2025, 3, 9).and_hms_opt(0, 0, 0).unwrap());
        assert_eq!(timeline.end().naive_local(), date(2025, 3, 17).and_hms_opt(0, 0, 0).unwrap());
        assert_eq!(timeline.len(), 8 * 24);
        assert_eq!(timeline.span_hours(), 8 * 24);
    }

    #[test]
    fn negative_lead_moves_window_forward() {
        let timeline = Timeline::generate(date(2025, 3, 10), -2, 0, &Utc).unwrap();

        assert_eq!(timeline.start().naive_local().date(), date(2025, 3, 12));
        assert_eq!(timeline.len(), 24);
    }

    #[test]
    fn rows_are_hourly_and_strictly_increasing() {
        let tz = FixedOffset::east_opt(2 * 3600).unwrap();
        let timeline = Timeline::generate(date(2025, 1, 30), 3, 2, &tz).unwrap();

        assert_eq!(timeline.len() as i64, timeline.span_hours());
        for pair in timeline.instants().windows(2) {
            assert_eq!(pair[1].signed_duration_since(&pair[0]), Duration::hours(1));
        }
        for (row, offset) in timeline.offsets().iter().enumerate() {
            assert_eq!(*offset, row as i64 * HOUR_MS);
        }
    }

    #[test]
    fn row_lookup_is_exact() {
        let timeline = Timeline::generate(date(2025, 3, 10), 0, 0, &Utc).unwrap();
        let start = *timeline.start();

        assert_eq!(timeline.row_of(&start), Some(0));
        assert_eq!(timeline.row_of(&(start + Duration::hours(5))), Some(5));
        assert_eq!(timeline.row_of(&(start + Duration::minutes(90))), None);
        assert_eq!(timeline.row_of(timeline.end()), None);
        assert_eq!(timeline.row_of(&(start - Duration::hours(1))), None);
    }

    #[test]
    fn row_lookup_across_zones() {
        let timeline = Timeline::generate(date(2025, 3, 10), 0, 0, &Utc).unwrap();
        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();
        // 05:00 at +02:00 is 03:00 UTC
        let instant = plus_two.with_ymd_and_hms(2025, 3, 10, 5, 0, 0).unwrap();
        assert_eq!(timeline.row_of(&instant), Some(3));
    }

    #[test]
    fn wall_clock_uses_zone_time() {
        let tz = FixedOffset::west_opt(5 * 3600).unwrap();
        let timeline = Timeline::generate(date(2025, 3, 10), 0, 0, &tz).unwrap();
        let wall = timeline.wall_clock();
        assert_eq!(wall[0], date(2025, 3, 10).and_hms_opt(0, 0, 0).unwrap());
        assert_eq!(wall[23], date(2025, 3, 10).and_hms_opt(23, 0, 0).unwrap());
    }

    #[test]
    fn horizon_out_of_range_is_rejected() {
        let err = Timeline::generate(date(2025, 3, 10), 0, -1, &Utc).unwrap_err();
        assert!(matches!(err, InputError::InvalidSetting { field: "PlanningHorizon", .. }));

        let err = Timeline::generate(date(2025, 3, 10), 0, MAX_HORIZON_WEEKS + 1, &Utc).unwrap_err();
        assert!(matches!(err, InputError::InvalidSetting { field: "PlanningHorizon", .. }));
    }

    #[test]
    fn lead_out_of_range_is_rejected() {
        let err = Timeline::generate(date(2025, 3, 10), MAX_LEAD_DAYS + 1, 1, &Utc).unwrap_err();
        assert!(matches!(
            err,
            InputError::InvalidSetting { field: "DaysBeforePlanningStart", .. }
        ));
    }
}
