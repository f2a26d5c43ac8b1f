//! Excel schedule renderer
//!
//! Writes a single worksheet laid out like a textual Gantt chart:
//!
//! ```text
//! | Date   | Day | Time | Press 1 | Press 2  |
//! |--------|-----|------|---------|----------|
//! |        |     | 06   |         |          |   <- medium bottom border
//! | Mar 10 | Mon | 07   | Print   | [note]   |
//! |        |     | 08   | Acme    | ░░░░░░░░ |   <- unavailable (fill)
//! ```
//!
//! - Header row and the Date/Day/Time columns are bold
//! - Labels from setup tasks are bold
//! - Single-hour tasks become cell comments, with the highlight fill so they
//!   stand out in an otherwise empty cell
//! - Unavailable hours get the highlight fill
//! - One row and the three header columns are frozen

use hourgrid_core::{Cell, CellContent, RenderError, Renderer, ScheduleGrid};
use rust_xlsxwriter::{Format, FormatBorder, Note, Workbook, Worksheet};

use crate::{RowHeader, HEADER_COLUMNS};

/// Default fill for unavailable hours and notes
pub const DEFAULT_HIGHLIGHT_COLOR: u32 = 0x00BF_B1D1;

/// Excel schedule renderer
#[derive(Clone, Debug)]
pub struct ExcelRenderer {
    /// Worksheet name
    pub sheet_name: String,
    /// RGB fill for highlighted cells and notes
    pub highlight_color: u32,
    /// Narrowest column, before padding
    pub min_column_width: usize,
    /// Extra characters added to every column
    pub column_padding: usize,
    /// Freeze the header row and the Date/Day/Time columns
    pub freeze_headers: bool,
}

impl Default for ExcelRenderer {
    fn default() -> Self {
        Self {
            sheet_name: "Sheet 1".into(),
            highlight_color: DEFAULT_HIGHLIGHT_COLOR,
            min_column_width: 5,
            column_padding: 2,
            freeze_headers: true,
        }
    }
}

impl ExcelRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set worksheet name
    pub fn sheet_name(mut self, name: impl Into<String>) -> Self {
        self.sheet_name = name.into();
        self
    }

    /// Set highlight fill as `0xRRGGBB`
    pub fn highlight_color(mut self, rgb: u32) -> Self {
        self.highlight_color = rgb;
        self
    }

    /// Set the narrowest column width
    pub fn min_column_width(mut self, width: usize) -> Self {
        self.min_column_width = width;
        self
    }

    /// Leave all panes scrollable
    pub fn no_freeze(mut self) -> Self {
        self.freeze_headers = false;
        self
    }

    /// Generate Excel workbook bytes
    pub fn render_to_bytes(&self, schedule: &ScheduleGrid) -> Result<Vec<u8>, RenderError> {
        check_shape(schedule)?;

        let mut workbook = Workbook::new();
        let formats = ExcelFormats::new(self.highlight_color);

        let sheet = workbook.add_worksheet();
        sheet
            .set_name(&self.sheet_name)
            .map_err(|e| RenderError::Format(format!("Invalid sheet name: {e}")))?;

        self.write_schedule(sheet, schedule, &formats)?;

        let buffer = workbook
            .save_to_buffer()
            .map_err(|e| RenderError::Format(format!("Failed to create Excel: {e}")))?;

        Ok(buffer)
    }

    fn write_schedule(
        &self,
        sheet: &mut Worksheet,
        schedule: &ScheduleGrid,
        formats: &ExcelFormats,
    ) -> Result<(), RenderError> {
        let mut widths = ColumnWidths::default();

        // Header row
        let headers = HEADER_COLUMNS
            .iter()
            .copied()
            .chain(schedule.machine_names.iter().map(String::as_str));
        for (col, title) in headers.enumerate() {
            sheet
                .write_string_with_format(0, excel_col(col)?, title, &formats.header)
                .map_err(xlsx_error)?;
            widths.observe(col, title);
        }

        for (index, (time, cells)) in schedule
            .timeline
            .iter()
            .zip(schedule.grid.iter_rows())
            .enumerate()
        {
            let row = excel_row(index + 1)?;
            let header = RowHeader::for_row(index, *time);
            let row_header = formats.row_header(header.divider);

            let leading = [header.date.as_deref(), header.day.as_deref(), Some(&*header.hour)];
            for (col, value) in leading.into_iter().enumerate() {
                let col_num = excel_col(col)?;
                match value {
                    Some(text) => {
                        sheet
                            .write_string_with_format(row, col_num, text, row_header)
                            .map_err(xlsx_error)?;
                        widths.observe(col, text);
                    }
                    None if header.divider => {
                        sheet
                            .write_blank(row, col_num, row_header)
                            .map_err(xlsx_error)?;
                    }
                    None => {}
                }
            }

            for (machine, cell) in cells.iter().enumerate() {
                let col = HEADER_COLUMNS.len() + machine;
                write_cell(sheet, row, excel_col(col)?, cell, header.divider, formats)?;
                if let Some(text) = cell.text() {
                    widths.observe(col, text);
                }
            }
        }

        for col in 0..HEADER_COLUMNS.len() + schedule.machine_names.len() {
            let width = widths.get(col).max(self.min_column_width) + self.column_padding;
            sheet
                .set_column_width(excel_col(col)?, u32::try_from(width).unwrap_or(u32::MAX))
                .map_err(xlsx_error)?;
        }

        if self.freeze_headers {
            let freeze_cols = excel_col(HEADER_COLUMNS.len())?;
            sheet.set_freeze_panes(1, freeze_cols).map_err(xlsx_error)?;
        }

        Ok(())
    }
}

impl Renderer for ExcelRenderer {
    type Output = Vec<u8>;

    fn render(&self, schedule: &ScheduleGrid) -> Result<Vec<u8>, RenderError> {
        self.render_to_bytes(schedule)
    }
}

/// Reusable formats
///
/// Cell formats are indexed by `bold | fill << 1 | divider << 2`.
struct ExcelFormats {
    header: Format,
    row_header: Format,
    row_header_divider: Format,
    cells: [Format; 8],
}

impl ExcelFormats {
    fn new(highlight_color: u32) -> Self {
        let header = Format::new()
            .set_bold()
            .set_border_bottom(FormatBorder::Medium);
        let row_header = Format::new().set_bold();
        let row_header_divider = Format::new()
            .set_bold()
            .set_border_bottom(FormatBorder::Medium);

        let cells = std::array::from_fn(|style| {
            let mut format = Format::new();
            if style & 1 != 0 {
                format = format.set_bold();
            }
            if style & 2 != 0 {
                format = format.set_background_color(highlight_color);
            }
            if style & 4 != 0 {
                format = format.set_border_bottom(FormatBorder::Medium);
            }
            format
        });

        Self {
            header,
            row_header,
            row_header_divider,
            cells,
        }
    }

    fn row_header(&self, divider: bool) -> &Format {
        if divider {
            &self.row_header_divider
        } else {
            &self.row_header
        }
    }

    fn cell(&self, bold: bool, fill: bool, divider: bool) -> &Format {
        let style = usize::from(bold) | (usize::from(fill) << 1) | (usize::from(divider) << 2);
        &self.cells[style]
    }
}

/// Longest value written per column, in characters
#[derive(Default)]
struct ColumnWidths(Vec<usize>);

impl ColumnWidths {
    fn observe(&mut self, col: usize, value: &str) {
        if self.0.len() <= col {
            self.0.resize(col + 1, 0);
        }
        let len = value.chars().count();
        if len > self.0[col] {
            self.0[col] = len;
        }
    }

    fn get(&self, col: usize) -> usize {
        self.0.get(col).copied().unwrap_or(0)
    }
}

fn write_cell(
    sheet: &mut Worksheet,
    row: u32,
    col: u16,
    cell: &Cell,
    divider: bool,
    formats: &ExcelFormats,
) -> Result<(), RenderError> {
    match &cell.content {
        CellContent::Label { text, bold } => {
            let format = formats.cell(*bold, cell.highlighted, divider);
            sheet
                .write_string_with_format(row, col, text, format)
                .map_err(xlsx_error)?;
        }
        CellContent::Note { text } => {
            sheet
                .write_blank(row, col, formats.cell(false, true, divider))
                .map_err(xlsx_error)?;
            sheet
                .insert_note(row, col, &Note::new(text))
                .map_err(xlsx_error)?;
        }
        CellContent::Empty if cell.highlighted || divider => {
            sheet
                .write_blank(row, col, formats.cell(false, cell.highlighted, divider))
                .map_err(xlsx_error)?;
        }
        CellContent::Empty => {}
    }
    Ok(())
}

fn check_shape(schedule: &ScheduleGrid) -> Result<(), RenderError> {
    let grid = &schedule.grid;
    if grid.rows() != schedule.timeline.len() {
        return Err(RenderError::InvalidData(format!(
            "grid has {} rows but the timeline has {}",
            grid.rows(),
            schedule.timeline.len()
        )));
    }
    if grid.columns() != schedule.machine_names.len() {
        return Err(RenderError::InvalidData(format!(
            "grid has {} columns but there are {} machines",
            grid.columns(),
            schedule.machine_names.len()
        )));
    }
    Ok(())
}

fn excel_row(row: usize) -> Result<u32, RenderError> {
    u32::try_from(row).map_err(|_| RenderError::InvalidData(format!("row {row} out of range")))
}

fn excel_col(col: usize) -> Result<u16, RenderError> {
    u16::try_from(col).map_err(|_| RenderError::InvalidData(format!("column {col} out of range")))
}

fn xlsx_error(e: rust_xlsxwriter::XlsxError) -> RenderError {
    RenderError::Format(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};
    use hourgrid_core::Grid;

    fn schedule(rows: usize, machines: &[&str]) -> ScheduleGrid {
        let start = NaiveDate::from_ymd_opt(2025, 3, 9)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        ScheduleGrid {
            timeline: (0..rows)
                .map(|h| start + Duration::hours(i64::try_from(h).unwrap()))
                .collect(),
            machine_names: machines.iter().map(|m| (*m).to_string()).collect(),
            grid: Grid::new(rows, machines.len()),
        }
    }

    #[test]
    fn renderer_defaults() {
        let renderer = ExcelRenderer::new();
        assert_eq!(renderer.sheet_name, "Sheet 1");
        assert_eq!(renderer.highlight_color, DEFAULT_HIGHLIGHT_COLOR);
        assert_eq!(renderer.min_column_width, 5);
        assert!(renderer.freeze_headers);
    }

    #[test]
    fn builder_methods() {
        let renderer = ExcelRenderer::new()
            .sheet_name("Plan")
            .highlight_color(0xFF0000)
            .min_column_width(8)
            .no_freeze();
        assert_eq!(renderer.sheet_name, "Plan");
        assert_eq!(renderer.highlight_color, 0xFF0000);
        assert_eq!(renderer.min_column_width, 8);
        assert!(!renderer.freeze_headers);
    }

    #[test]
    fn render_produces_xlsx_zip() {
        let mut schedule = schedule(48, &["Press 1", "Folder"]);
        schedule.grid.write_label(7, 0, "Print", true);
        schedule.grid.write_label(8, 0, "Acme", true);
        schedule.grid.write_note(10, 1, "Fold\nAcme\nLine 1");
        schedule.grid.highlight(30, 1);

        let bytes = ExcelRenderer::new().render(&schedule).unwrap();
        assert!(bytes.len() > 100);
        assert_eq!(&bytes[0..2], b"PK");
    }

    #[test]
    fn render_without_machines() {
        let bytes = ExcelRenderer::new().render(&schedule(24, &[])).unwrap();
        assert_eq!(&bytes[0..2], b"PK");
    }

    #[test]
    fn mismatched_grid_is_rejected() {
        let mut broken = schedule(24, &["A"]);
        broken.timeline.pop();
        let err = ExcelRenderer::new().render(&broken).unwrap_err();
        assert!(matches!(err, RenderError::InvalidData(_)));

        let mut broken = schedule(24, &["A"]);
        broken.machine_names.push("B".into());
        let err = ExcelRenderer::new().render(&broken).unwrap_err();
        assert!(matches!(err, RenderError::InvalidData(_)));
    }

    #[test]
    fn invalid_sheet_name_is_a_format_error() {
        let err = ExcelRenderer::new()
            .sheet_name("bad/name")
            .render(&schedule(24, &["A"]))
            .unwrap_err();
        assert!(matches!(err, RenderError::Format(_)));
    }

    #[test]
    fn column_widths_track_longest_value() {
        let mut widths = ColumnWidths::default();
        widths.observe(2, "Time");
        widths.observe(2, "07");
        widths.observe(4, "Überlänge");
        assert_eq!(widths.get(0), 0);
        assert_eq!(widths.get(2), 4);
        assert_eq!(widths.get(4), 9);
        assert_eq!(widths.get(9), 0);
    }

    #[test]
    fn cell_format_index_covers_all_styles() {
        let formats = ExcelFormats::new(DEFAULT_HIGHLIGHT_COLOR);
        assert!(std::ptr::eq(formats.cell(false, false, false), &formats.cells[0]));
        assert!(std::ptr::eq(formats.cell(true, false, false), &formats.cells[1]));
        assert!(std::ptr::eq(formats.cell(false, true, false), &formats.cells[2]));
        assert!(std::ptr::eq(formats.cell(true, true, true), &formats.cells[7]));
    }
}
