//! In-memory workbook model and the source/sink capabilities the pipelines use

use crate::error::{SheetbindError, SheetbindResult};
use crate::types::Cell;
use std::collections::BTreeMap;

/// Read access to one worksheet
pub trait SheetSource {
    fn name(&self) -> &str;

    /// Index of the last physical row, `None` when the sheet has no rows
    fn last_row_index(&self) -> Option<usize>;

    /// Indices of the physical rows, ascending
    fn row_indices(&self) -> Vec<usize>;

    /// Last populated cell index + 1 of a row (0 for a missing row)
    fn row_width(&self, row: usize) -> usize;

    fn cell(&self, row: usize, col: usize) -> Option<&Cell>;
}

/// Read access to a workbook's sheets
pub trait WorkbookSource {
    fn sheet_count(&self) -> usize;

    fn sheet_at(&self, index: usize) -> Option<&dyn SheetSource>;
}

/// Write access to a workbook
pub trait WorkbookSink {
    /// Create a sheet and return its index
    fn create_sheet(&mut self, name: &str) -> SheetbindResult<usize>;

    fn set_default_column_width(&mut self, sheet: usize, width: f64) -> SheetbindResult<()>;

    fn write_string(&mut self, sheet: usize, row: u32, col: u16, value: &str) -> SheetbindResult<()>;
}

/// Worksheet held in memory; only physically present rows are stored
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sheet {
    name: String,
    rows: BTreeMap<usize, Vec<Option<Cell>>>,
    default_column_width: Option<f64>,
}

impl Sheet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Builder form of `set_row`
    pub fn with_row(mut self, row: usize, cells: Vec<Option<Cell>>) -> Self {
        self.set_row(row, cells);
        self
    }

    /// Builder form taking text cells
    pub fn with_text_row(self, row: usize, cells: &[&str]) -> Self {
        let cells = cells.iter().map(|s| Some(Cell::text(*s))).collect();
        self.with_row(row, cells)
    }

    pub fn set_row(&mut self, row: usize, cells: Vec<Option<Cell>>) {
        self.rows.insert(row, cells);
    }

    pub fn set_cell(&mut self, row: usize, col: usize, cell: Cell) {
        let cells = self.rows.entry(row).or_default();
        if cells.len() <= col {
            cells.resize(col + 1, None);
        }
        cells[col] = Some(cell);
    }

    pub fn default_column_width(&self) -> Option<f64> {
        self.default_column_width
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

impl SheetSource for Sheet {
    fn name(&self) -> &str {
        &self.name
    }

    fn last_row_index(&self) -> Option<usize> {
        self.rows.keys().next_back().copied()
    }

    fn row_indices(&self) -> Vec<usize> {
        self.rows.keys().copied().collect()
    }

    fn row_width(&self, row: usize) -> usize {
        self.rows
            .get(&row)
            .and_then(|cells| cells.iter().rposition(Option::is_some))
            .map_or(0, |idx| idx + 1)
    }

    fn cell(&self, row: usize, col: usize) -> Option<&Cell> {
        self.rows.get(&row)?.get(col)?.as_ref()
    }
}

/// Workbook held in memory
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Workbook {
    sheets: Vec<Sheet>,
}

impl Workbook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sheet(mut self, sheet: Sheet) -> Self {
        self.sheets.push(sheet);
        self
    }

    pub fn add_sheet(&mut self, sheet: Sheet) {
        self.sheets.push(sheet);
    }

    pub fn sheets(&self) -> &[Sheet] {
        &self.sheets
    }

    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }

    fn sheet_mut(&mut self, index: usize) -> SheetbindResult<&mut Sheet> {
        self.sheets
            .get_mut(index)
            .ok_or_else(|| SheetbindError::Export(format!("No sheet at index {}", index)))
    }
}

impl WorkbookSource for Workbook {
    fn sheet_count(&self) -> usize {
        self.sheets.len()
    }

    fn sheet_at(&self, index: usize) -> Option<&dyn SheetSource> {
        self.sheets.get(index).map(|s| s as &dyn SheetSource)
    }
}

impl WorkbookSink for Workbook {
    fn create_sheet(&mut self, name: &str) -> SheetbindResult<usize> {
        if self.sheet(name).is_some() {
            return Err(SheetbindError::Export(format!(
                "Sheet '{}' already exists",
                name
            )));
        }
        self.sheets.push(Sheet::new(name));
        Ok(self.sheets.len() - 1)
    }

    fn set_default_column_width(&mut self, sheet: usize, width: f64) -> SheetbindResult<()> {
        self.sheet_mut(sheet)?.default_column_width = Some(width);
        Ok(())
    }

    fn write_string(&mut self, sheet: usize, row: u32, col: u16, value: &str) -> SheetbindResult<()> {
        self.sheet_mut(sheet)?
            .set_cell(row as usize, col as usize, Cell::text(value));
        Ok(())
    }
}
