//! Excel exporter implementation - records → Excel (.xlsx)

use crate::core::{BindMode, Record, RecordExporter, Template};
use crate::error::{SheetbindError, SheetbindResult};
use crate::excel::workbook::WorkbookSink;
use crate::types::Row;
use rust_xlsxwriter::{Workbook, Worksheet, XlsxError};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use tracing::info;

/// Column width applied to every exported column unless overridden
pub const DEFAULT_COLUMN_WIDTH: f64 = 30.0;

fn export_error(context: &str, e: XlsxError) -> SheetbindError {
    SheetbindError::Export(format!("{}: {}", context, e))
}

/// Longest sheet name Excel accepts
pub const MAX_SHEET_NAME_LENGTH: usize = 31;

const INVALID_SHEET_NAME_CHARS: [char; 7] = ['[', ']', ':', '*', '?', '/', '\\'];

/// Check a sheet name against Excel's naming rules
pub fn validate_sheet_name(name: &str) -> SheetbindResult<()> {
    let invalid = |reason: &str| -> SheetbindResult<()> {
        Err(SheetbindError::SheetName(format!("'{}' {}", name, reason)))
    };

    if name.is_empty() {
        return invalid("is empty");
    }
    if name.chars().count() > MAX_SHEET_NAME_LENGTH {
        return invalid(&format!("is longer than {} characters", MAX_SHEET_NAME_LENGTH));
    }
    if name.contains(INVALID_SHEET_NAME_CHARS) {
        return invalid("contains one of [ ] : * ? / \\");
    }
    if name.starts_with('\'') || name.ends_with('\'') {
        return invalid("starts or ends with an apostrophe");
    }
    if name.eq_ignore_ascii_case("history") {
        return invalid("is reserved by Excel");
    }
    Ok(())
}

/// Write rows into a new sheet of `sink`, returning the sheet index
pub fn write_rows(
    sink: &mut dyn WorkbookSink,
    sheet_name: &str,
    rows: &[Row],
    column_width: f64,
) -> SheetbindResult<usize> {
    let sheet = sink.create_sheet(sheet_name)?;
    sink.set_default_column_width(sheet, column_width)?;

    for (row_idx, row) in rows.iter().enumerate() {
        let row_num = u32::try_from(row_idx)
            .map_err(|_| SheetbindError::Export(format!("Row {} out of range", row_idx)))?;
        for (col_idx, value) in row.iter().enumerate() {
            let col_num = u16::try_from(col_idx)
                .map_err(|_| SheetbindError::Export(format!("Column {} out of range", col_idx)))?;
            sink.write_string(sheet, row_num, col_num, value)?;
        }
    }
    Ok(sheet)
}

/// `WorkbookSink` over an xlsx workbook
pub struct XlsxSink {
    workbook: Workbook,
    sheet_count: usize,
    /// Default width per sheet index
    column_widths: HashMap<usize, f64>,
    /// Columns whose width has already been applied
    sized_columns: HashSet<(usize, u16)>,
}

impl XlsxSink {
    pub fn new() -> Self {
        Self {
            workbook: Workbook::new(),
            sheet_count: 0,
            column_widths: HashMap::new(),
            sized_columns: HashSet::new(),
        }
    }

    /// Save the workbook to an .xlsx file
    pub fn save(mut self, path: &Path) -> SheetbindResult<()> {
        self.workbook
            .save(path)
            .map_err(|e| export_error("Failed to save Excel file", e))
    }

    /// Serialize the workbook to .xlsx bytes
    pub fn into_buffer(mut self) -> SheetbindResult<Vec<u8>> {
        self.workbook
            .save_to_buffer()
            .map_err(|e| export_error("Failed to serialize Excel file", e))
    }

    fn worksheet(&mut self, sheet: usize) -> SheetbindResult<&mut Worksheet> {
        self.workbook
            .worksheet_from_index(sheet)
            .map_err(|e| export_error("Unknown worksheet", e))
    }
}

impl Default for XlsxSink {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkbookSink for XlsxSink {
    fn create_sheet(&mut self, name: &str) -> SheetbindResult<usize> {
        let mut worksheet = Worksheet::new();
        worksheet
            .set_name(name)
            .map_err(|e| export_error("Failed to set worksheet name", e))?;
        self.workbook.push_worksheet(worksheet);
        self.sheet_count += 1;
        Ok(self.sheet_count - 1)
    }

    fn set_default_column_width(&mut self, sheet: usize, width: f64) -> SheetbindResult<()> {
        if sheet >= self.sheet_count {
            return Err(SheetbindError::Export(format!("No sheet at index {}", sheet)));
        }
        self.column_widths.insert(sheet, width);
        Ok(())
    }

    fn write_string(&mut self, sheet: usize, row: u32, col: u16, value: &str) -> SheetbindResult<()> {
        let width = self.column_widths.get(&sheet).copied();
        let needs_width = width.is_some() && self.sized_columns.insert((sheet, col));

        let worksheet = self.worksheet(sheet)?;
        if let (true, Some(width)) = (needs_width, width) {
            worksheet
                .set_column_width(col, width)
                .map_err(|e| export_error("Failed to set column width", e))?;
        }
        worksheet
            .write_string(row, col, value)
            .map_err(|e| export_error("Failed to write cell", e))?;
        Ok(())
    }
}

/// Export view: template plus download file name, sheet name and column width
#[derive(Debug, Clone)]
pub struct ExcelExporter {
    template: Template,
    filename: String,
    sheet_name: String,
    column_width: f64,
    mode: BindMode,
}

impl ExcelExporter {
    /// Create a new Excel exporter; file and sheet are named after the template
    pub fn new(template: Template) -> Self {
        let name = template.name().to_string();
        Self {
            template,
            filename: name.clone(),
            sheet_name: name,
            column_width: DEFAULT_COLUMN_WIDTH,
            mode: BindMode::Declared,
        }
    }

    /// Download name without the `.xlsx` extension
    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = filename.into();
        self
    }

    pub fn with_sheet_name(mut self, sheet_name: impl Into<String>) -> Self {
        self.sheet_name = sheet_name.into();
        self
    }

    pub fn with_column_width(mut self, width: f64) -> Self {
        self.column_width = width;
        self
    }

    pub fn with_mode(mut self, mode: BindMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn template(&self) -> &Template {
        &self.template
    }

    pub fn sheet_name(&self) -> &str {
        &self.sheet_name
    }

    /// Header plus one row per record
    pub fn rows<R: Record>(&self, records: &[R]) -> Vec<Row> {
        RecordExporter::new(&self.template)
            .with_mode(self.mode)
            .export(records)
    }

    /// Write the records as a new sheet of any sink
    pub fn write_to<R: Record>(
        &self,
        sink: &mut dyn WorkbookSink,
        records: &[R],
    ) -> SheetbindResult<usize> {
        validate_sheet_name(&self.sheet_name)?;
        let rows = self.rows(records);
        write_rows(sink, &self.sheet_name, &rows, self.column_width)
    }

    /// Export the records to an .xlsx file
    pub fn export<R: Record>(&self, records: &[R], output_path: &Path) -> SheetbindResult<()> {
        let mut sink = XlsxSink::new();
        self.write_to(&mut sink, records)?;
        sink.save(output_path)?;
        info!(path = %output_path.display(), records = records.len(), "workbook written");
        Ok(())
    }

    /// Export the records to .xlsx bytes
    pub fn export_to_buffer<R: Record>(&self, records: &[R]) -> SheetbindResult<Vec<u8>> {
        let mut sink = XlsxSink::new();
        self.write_to(&mut sink, records)?;
        sink.into_buffer()
    }

    /// File name offered for download
    pub fn attachment_filename(&self) -> String {
        format!("{}.xlsx", self.filename)
    }

    /// `Content-Disposition` value for a download.
    ///
    /// The name is sent as raw UTF-8 inside quotes so browsers keep spaces.
    pub fn content_disposition(&self) -> String {
        let name: String = self
            .attachment_filename()
            .chars()
            .map(|c| if c == '"' || c.is_control() { '_' } else { c })
            .collect();
        format!("attachment; filename=\"{}\"", name)
    }
}
