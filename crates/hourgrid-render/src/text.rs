//! Plain-text schedule preview
//!
//! Renders the grid as fixed-width columns for terminals and logs:
//!
//! ```text
//! Date   | Day | Time | Press 1    | Folder
//! ...
//!        |     | 06   |            |
//! -------+-----+------+------------+-----------
//! Mar 10 | Mon | 07   | Print      | *Fold
//!        |     | 08   | Acme       | ##########
//! ```
//!
//! Notes show as `*` followed by the task name; unavailable hours are padded
//! with `#` instead of spaces.

use hourgrid_core::{Cell, CellContent, RenderError, Renderer, ScheduleGrid};

use crate::{RowHeader, HEADER_COLUMNS};

const DATE_WIDTH: usize = 6;
const DAY_WIDTH: usize = 3;
const TIME_WIDTH: usize = 4;

/// Text preview renderer
#[derive(Clone, Debug)]
pub struct TextRenderer {
    /// Characters per machine column
    pub column_width: usize,
}

impl Default for TextRenderer {
    fn default() -> Self {
        Self { column_width: 12 }
    }
}

impl TextRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set machine column width (at least one character)
    pub fn column_width(mut self, width: usize) -> Self {
        self.column_width = width.max(1);
        self
    }

    fn header_line(&self, schedule: &ScheduleGrid) -> String {
        let mut fields = vec![
            pad(HEADER_COLUMNS[0], DATE_WIDTH, ' '),
            pad(HEADER_COLUMNS[1], DAY_WIDTH, ' '),
            pad(HEADER_COLUMNS[2], TIME_WIDTH, ' '),
        ];
        fields.extend(
            schedule
                .machine_names
                .iter()
                .map(|name| pad(name, self.column_width, ' ')),
        );
        fields.join(" | ")
    }

    fn divider_line(&self, machines: usize) -> String {
        let mut fields = vec!["-".repeat(DATE_WIDTH), "-".repeat(DAY_WIDTH), "-".repeat(TIME_WIDTH)];
        fields.extend(std::iter::repeat("-".repeat(self.column_width)).take(machines));
        fields.join("-+-")
    }

    fn cell_text(&self, cell: &Cell) -> String {
        let fill = if cell.highlighted { '#' } else { ' ' };
        let text = match &cell.content {
            CellContent::Empty => String::new(),
            CellContent::Label { text, .. } => text.clone(),
            CellContent::Note { text } => {
                format!("*{}", text.lines().next().unwrap_or_default())
            }
        };
        pad(&text, self.column_width, fill)
    }
}

impl Renderer for TextRenderer {
    type Output = String;

    fn render(&self, schedule: &ScheduleGrid) -> Result<String, RenderError> {
        if schedule.grid.rows() != schedule.timeline.len()
            || schedule.grid.columns() != schedule.machine_names.len()
        {
            return Err(RenderError::InvalidData(
                "grid shape does not match timeline and machines".into(),
            ));
        }

        let mut output = String::new();
        output.push_str(self.header_line(schedule).trim_end());
        output.push('\n');

        let divider = self.divider_line(schedule.machine_names.len());

        for (index, (time, cells)) in schedule
            .timeline
            .iter()
            .zip(schedule.grid.iter_rows())
            .enumerate()
        {
            let header = RowHeader::for_row(index, *time);
            let mut fields = vec![
                pad(header.date.as_deref().unwrap_or_default(), DATE_WIDTH, ' '),
                pad(header.day.as_deref().unwrap_or_default(), DAY_WIDTH, ' '),
                pad(&header.hour, TIME_WIDTH, ' '),
            ];
            fields.extend(cells.iter().map(|cell| self.cell_text(cell)));

            output.push_str(fields.join(" | ").trim_end());
            output.push('\n');

            if header.divider {
                output.push_str(&divider);
                output.push('\n');
            }
        }

        Ok(output)
    }
}

/// Truncate or fill `text` to exactly `width` characters
fn pad(text: &str, width: usize, fill: char) -> String {
    let mut out: String = text.chars().take(width).collect();
    let len = out.chars().count();
    out.extend(std::iter::repeat(fill).take(width - len));
    out
}
