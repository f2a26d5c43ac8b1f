//! Time-by-machine grid
//!
//! A [`Grid`] is a dense `rows × columns` array of [`Cell`]s where rows are
//! hourly timeline slots and columns are machines. The builder writes task
//! labels and notes first, then overlays unavailability highlights; renderers
//! only read it.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// What a task wrote into a cell
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CellContent {
    #[default]
    Empty,
    /// One row of a multi-hour task
    Label { text: String, bold: bool },
    /// A task that fits inside a single hour, shown as a cell comment
    Note { text: String },
}

/// One grid cell
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub content: CellContent,
    /// Machine unavailable during this hour
    pub highlighted: bool,
}

impl Cell {
    pub fn text(&self) -> Option<&str> {
        match &self.content {
            CellContent::Label { text, .. } => Some(text),
            _ => None,
        }
    }

    pub fn note(&self) -> Option<&str> {
        match &self.content {
            CellContent::Note { text } => Some(text),
            _ => None,
        }
    }

    pub fn is_bold(&self) -> bool {
        matches!(self.content, CellContent::Label { bold: true, .. })
    }

    /// Nothing written and not highlighted
    pub fn is_blank(&self) -> bool {
        self.content == CellContent::Empty && !self.highlighted
    }
}

/// Dense row-major cell storage
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    rows: usize,
    columns: usize,
    cells: Vec<Cell>,
}

impl Grid {
    /// Create a grid of empty cells
    pub fn new(rows: usize, columns: usize) -> Self {
        Self {
            rows,
            columns,
            cells: vec![Cell::default(); rows * columns],
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    fn index(&self, row: usize, column: usize) -> Option<usize> {
        (row < self.rows && column < self.columns).then(|| row * self.columns + column)
    }

    pub fn get(&self, row: usize, column: usize) -> Option<&Cell> {
        self.index(row, column).map(|i| &self.cells[i])
    }

    fn get_mut(&mut self, row: usize, column: usize) -> Option<&mut Cell> {
        self.index(row, column).map(move |i| &mut self.cells[i])
    }

    /// Replace the cell content with a label. Returns false when out of bounds.
    pub fn write_label(
        &mut self,
        row: usize,
        column: usize,
        text: impl Into<String>,
        bold: bool,
    ) -> bool {
        self.write(row, column, CellContent::Label { text: text.into(), bold })
    }

    /// Replace the cell content with a note. Returns false when out of bounds.
    pub fn write_note(&mut self, row: usize, column: usize, text: impl Into<String>) -> bool {
        self.write(row, column, CellContent::Note { text: text.into() })
    }

    fn write(&mut self, row: usize, column: usize, content: CellContent) -> bool {
        match self.get_mut(row, column) {
            Some(cell) => {
                cell.content = content;
                true
            }
            None => false,
        }
    }

    /// Mark a cell unavailable, keeping whatever content it holds
    pub fn highlight(&mut self, row: usize, column: usize) -> bool {
        match self.get_mut(row, column) {
            Some(cell) => {
                cell.highlighted = true;
                true
            }
            None => false,
        }
    }

    /// Iterate rows in timeline order
    pub fn iter_rows(&self) -> impl Iterator<Item = &[Cell]> {
        // chunks() panics on a zero chunk size
        self.cells.chunks(self.columns.max(1)).take(self.rows)
    }

    /// Cells holding a label or a note
    pub fn occupied_count(&self) -> usize {
        self.cells
            .iter()
            .filter(|c| c.content != CellContent::Empty)
            .count()
    }

    pub fn highlighted_count(&self) -> usize {
        self.cells.iter().filter(|c| c.highlighted).count()
    }

    /// Cells that differ from a freshly created grid
    pub fn mutated_count(&self) -> usize {
        self.cells.iter().filter(|c| !c.is_blank()).count()
    }
}

/// A built grid with its coordinate systems, ready for rendering
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleGrid {
    /// Local wall-clock time of each row
    pub timeline: Vec<NaiveDateTime>,
    /// Column headers, in column order
    pub machine_names: Vec<String>,
    pub grid: Grid,
}

impl ScheduleGrid {
    pub fn window_start(&self) -> Option<NaiveDateTime> {
        self.timeline.first().copied()
    }

    /// Exclusive end of the window (one hour past the last row)
    pub fn window_end(&self) -> Option<NaiveDateTime> {
        self.timeline
            .last()
            .map(|last| *last + chrono::Duration::hours(1))
    }
}
