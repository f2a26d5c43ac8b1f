//! # hourgrid-render
//!
//! Rendering backends for hourgrid schedule grids.
//!
//! This crate provides:
//! - Excel workbooks with one row per hour and one column per machine
//! - Fixed-width text previews for terminals and logs
//! - The shared row-header layout both backends follow
//!
//! ## Row layout
//!
//! Rows come in 24-hour blocks that start at local midnight. The window
//! opens a few lead days before planning starts, so the first working shift
//! begins at hour 7: a divider is drawn under hour 6 and the date and weekday
//! are stamped on hour 7 of every block.
//!
//! ```text
//! | Date   | Day | Time | Press 1  | Press 2 |
//! |        |     | 05   |          |         |
//! |        |     | 06   |          |         |
//! |--------|-----|------|----------|---------|
//! | Mar 10 | Mon | 07   | Print    |         |
//! |        |     | 08   | Acme     |         |
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use hourgrid_core::Renderer;
//! use hourgrid_render::{ExcelRenderer, TextRenderer};
//!
//! let xlsx_bytes = ExcelRenderer::new().render(&schedule)?;
//! std::fs::write("schedule.xlsx", xlsx_bytes)?;
//!
//! println!("{}", TextRenderer::new().column_width(10).render(&schedule)?);
//! ```

pub mod excel;
pub mod text;

pub use excel::ExcelRenderer;
pub use text::TextRenderer;

use chrono::{NaiveDateTime, Timelike};

/// Rows per day block
pub const HOURS_PER_DAY: usize = 24;

/// Row within each day block that gets a divider underneath
pub const DIVIDER_ROW_OFFSET: usize = 6;

/// Row within each day block that carries the date and weekday
pub const DATE_ROW_OFFSET: usize = 7;

/// Leading header columns before the machine columns
pub const HEADER_COLUMNS: [&str; 3] = ["Date", "Day", "Time"];

/// The three leading cells of one timeline row
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RowHeader {
    /// Short month and two-digit day, e.g. `Mar 09`
    pub date: Option<String>,
    /// Weekday abbreviation, e.g. `Sun`
    pub day: Option<String>,
    /// Zero-padded hour of day
    pub hour: String,
    /// Draw a divider under this row
    pub divider: bool,
}

impl RowHeader {
    /// Header cells for timeline row `index` at local time `time`
    pub fn for_row(index: usize, time: NaiveDateTime) -> Self {
        let offset = index % HOURS_PER_DAY;
        let stamped = offset == DATE_ROW_OFFSET;

        Self {
            date: stamped.then(|| time.format("%b %d").to_string()),
            day: stamped.then(|| time.format("%a").to_string()),
            hour: format!("{:02}", time.hour()),
            divider: offset == DIVIDER_ROW_OFFSET,
        }
    }
}
