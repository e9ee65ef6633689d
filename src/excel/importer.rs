//! Excel importer implementation - Excel (.xlsx/.xls/.xlsb/.ods) → records

use crate::core::{BindMode, ImportReport, Record, RecordImporter, Template};
use crate::error::{SheetbindError, SheetbindResult};
use crate::excel::reader;
use crate::excel::workbook::{Sheet, Workbook};
use crate::types::{Cell, Row};
use calamine::{open_workbook_auto, Data, Ods, Range, Reader, Xls, Xlsb, Xlsx};
use std::collections::BTreeMap;
use std::fmt::Display;
use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Workbook file format, chosen from the file name suffix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkbookFormat {
    Xls,
    Xlsx,
    Xlsb,
    Ods,
}

impl WorkbookFormat {
    /// Anything that is not `xls`, `xlsb` or `ods` is read as xlsx
    pub fn from_filename(filename: &str) -> Self {
        let suffix = filename.rsplit('.').next().unwrap_or("");
        match suffix.to_ascii_lowercase().as_str() {
            "xls" => WorkbookFormat::Xls,
            "xlsb" => WorkbookFormat::Xlsb,
            "ods" => WorkbookFormat::Ods,
            _ => WorkbookFormat::Xlsx,
        }
    }
}

/// Open a workbook file, detecting the format from its extension
pub fn open_workbook<P: AsRef<Path>>(path: P) -> SheetbindResult<Workbook> {
    let path = path.as_ref();
    let workbook = open_workbook_auto(path).map_err(|e| {
        SheetbindError::Workbook(format!("Failed to open {}: {}", path.display(), e))
    })?;
    load_sheets::<BufReader<File>, _>(workbook)
}

/// Open a workbook held in memory, e.g. an uploaded file
pub fn open_workbook_from_bytes(filename: &str, bytes: Vec<u8>) -> SheetbindResult<Workbook> {
    let source = Cursor::new(bytes);
    match WorkbookFormat::from_filename(filename) {
        WorkbookFormat::Xls => load_from_memory::<Xls<MemorySource>>(filename, source),
        WorkbookFormat::Xlsx => load_from_memory::<Xlsx<MemorySource>>(filename, source),
        WorkbookFormat::Xlsb => load_from_memory::<Xlsb<MemorySource>>(filename, source),
        WorkbookFormat::Ods => load_from_memory::<Ods<MemorySource>>(filename, source),
    }
}

type MemorySource = Cursor<Vec<u8>>;

fn load_from_memory<R>(filename: &str, source: MemorySource) -> SheetbindResult<Workbook>
where
    R: Reader<MemorySource>,
    R::Error: Display,
{
    let workbook = R::new(source).map_err(|e| {
        SheetbindError::Workbook(format!("Failed to open {}: {}", filename, e))
    })?;
    load_sheets::<MemorySource, R>(workbook)
}

/// Load every sheet into memory
fn load_sheets<RS, R>(mut workbook: R) -> SheetbindResult<Workbook>
where
    RS: Read + Seek,
    R: Reader<RS>,
    R::Error: Display,
{
    let mut loaded = Workbook::new();
    for sheet_name in workbook.sheet_names().to_vec() {
        let range = workbook.worksheet_range(&sheet_name).map_err(|e| {
            SheetbindError::Workbook(format!("Failed to read sheet '{}': {}", sheet_name, e))
        })?;
        // Not every format exposes formulas; values are still usable without them
        let formulas = workbook.worksheet_formula(&sheet_name).ok();
        let sheet = convert_sheet(&sheet_name, &range, formulas.as_ref());
        debug!(sheet = %sheet_name, rows = sheet.row_count(), "sheet loaded");
        loaded.add_sheet(sheet);
    }
    Ok(loaded)
}

/// Build a sheet from calamine ranges; a row exists when any of its cells holds data
fn convert_sheet(name: &str, range: &Range<Data>, formulas: Option<&Range<String>>) -> Sheet {
    let mut cells: BTreeMap<(usize, usize), Cell> = BTreeMap::new();

    let (start_row, start_col) = range.start().unwrap_or_default();
    for (row, col, data) in range.used_cells() {
        if let Some(cell) = convert_cell(data) {
            let pos = (row + start_row as usize, col + start_col as usize);
            cells.insert(pos, cell);
        }
    }

    if let Some(formulas) = formulas {
        let (start_row, start_col) = formulas.start().unwrap_or_default();
        for (row, col, formula) in formulas.used_cells() {
            if !formula.is_empty() {
                let source = formula.strip_prefix('=').unwrap_or(formula);
                let pos = (row + start_row as usize, col + start_col as usize);
                cells.insert(pos, Cell::formula(source));
            }
        }
    }

    let mut sheet = Sheet::new(name);
    for ((row, col), cell) in cells {
        sheet.set_cell(row, col, cell);
    }
    sheet
}

/// Map a calamine value to a cell; `None` for empty cells
fn convert_cell(data: &Data) -> Option<Cell> {
    let cell = match data {
        Data::Empty => return None,
        Data::String(s) => Cell::text(s.clone()),
        Data::Float(f) => Cell::number(*f),
        Data::Int(i) => Cell::number(*i as f64),
        Data::Bool(b) => Cell::Boolean(*b),
        Data::Error(e) => Cell::Error(e.to_string()),
        Data::DateTime(dt) => Cell::date_serial(dt.as_f64()),
        Data::DateTimeIso(s) => Cell::text(s.clone()),
        Data::DurationIso(_) => Cell::Unknown,
    };
    Some(cell)
}

/// Excel importer binding the first sheet of a workbook file to records
pub struct ExcelImporter {
    path: PathBuf,
}

impl ExcelImporter {
    /// Create a new Excel importer
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Normalized rows of the first sheet
    pub fn read_first_sheet(&self) -> SheetbindResult<Vec<Row>> {
        let workbook = open_workbook(&self.path)?;
        Ok(reader::read_first_sheet(&workbook))
    }

    /// Normalized rows of every sheet with data
    pub fn read_all_sheets(&self) -> SheetbindResult<BTreeMap<String, Vec<Row>>> {
        let workbook = open_workbook(&self.path)?;
        Ok(reader::read_all_sheets(&workbook))
    }

    /// Import the first sheet into default-constructed records
    pub fn import<R: Record + Default>(
        &self,
        template: &Template,
        mode: BindMode,
    ) -> SheetbindResult<Vec<R>> {
        self.import_report(template, mode, R::default)
            .map(|report| report.records)
    }

    /// Import the first sheet, keeping diagnostics for dropped rows
    pub fn import_report<R, F>(
        &self,
        template: &Template,
        mode: BindMode,
        factory: F,
    ) -> SheetbindResult<ImportReport<R>>
    where
        R: Record,
        F: FnMut() -> R,
    {
        let rows = self.read_first_sheet()?;
        info!(path = %self.path.display(), rows = rows.len(), "workbook read");
        RecordImporter::new(template)
            .with_mode(mode)
            .import_report(&rows, factory)
    }
}
