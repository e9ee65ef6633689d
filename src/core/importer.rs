//! Import pipeline: normalized rows → records

use crate::core::column::Template;
use crate::core::record::{write_field, BindMode, Record};
use crate::error::{ErrorCode, SheetbindError, SheetbindResult};
use crate::types::Row;
use serde::Serialize;
use tracing::{debug, info, warn};

/// A data row dropped because one of its values failed a column check
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RejectedRow {
    /// Index in the row sequence (the header is row 0)
    pub row: usize,
    pub column: usize,
    pub title: String,
    pub code: ErrorCode,
}

/// Import result with diagnostics for every dropped row
#[derive(Debug)]
pub struct ImportReport<R> {
    pub records: Vec<R>,
    pub rejected: Vec<RejectedRow>,
    /// Number of data rows read, header excluded
    pub total_rows: usize,
}

/// Binds rows to records through a template
pub struct RecordImporter<'a> {
    template: &'a Template,
    mode: BindMode,
}

impl<'a> RecordImporter<'a> {
    /// Create an importer that binds through the record hierarchy
    pub fn new(template: &'a Template) -> Self {
        Self {
            template,
            mode: BindMode::default(),
        }
    }

    pub fn with_mode(mut self, mode: BindMode) -> Self {
        self.mode = mode;
        self
    }

    /// Import into default-constructed records.
    ///
    /// Rows failing a column check are dropped without error; only a header
    /// mismatch fails the import.
    pub fn import<R: Record + Default>(&self, rows: &[Row]) -> SheetbindResult<Vec<R>> {
        self.import_with(rows, R::default)
    }

    /// Import into records built by `factory`
    pub fn import_with<R, F>(&self, rows: &[Row], factory: F) -> SheetbindResult<Vec<R>>
    where
        R: Record,
        F: FnMut() -> R,
    {
        self.import_report(rows, factory).map(|report| report.records)
    }

    /// Import, also reporting the rows that were dropped
    pub fn import_report<R, F>(&self, rows: &[Row], mut factory: F) -> SheetbindResult<ImportReport<R>>
    where
        R: Record,
        F: FnMut() -> R,
    {
        let Some((header, data)) = rows.split_first() else {
            return Ok(ImportReport {
                records: Vec::new(),
                rejected: Vec::new(),
                total_rows: 0,
            });
        };

        if !self.template.is_title_legal(header) {
            return Err(SheetbindError::TitleMismatch {
                expected: self.template.titles(),
                found: header.clone(),
            });
        }

        let mut records = Vec::with_capacity(data.len());
        let mut rejected = Vec::new();

        for (offset, row) in data.iter().enumerate() {
            let row_idx = offset + 1;
            if let Some((column, code)) = self.template.check_row(row) {
                let title = self.template.columns()[column].title().to_string();
                debug!(row = row_idx, column = %title, code = %code, "row rejected");
                rejected.push(RejectedRow {
                    row: row_idx,
                    column,
                    title,
                    code,
                });
                continue;
            }

            let mut record = factory();
            self.bind_row(&mut record, row);
            records.push(record);
        }

        info!(
            template = self.template.name(),
            accepted = records.len(),
            rejected = rejected.len(),
            "import finished"
        );

        Ok(ImportReport {
            records,
            rejected,
            total_rows: data.len(),
        })
    }

    /// Bind every column of an accepted row; failures leave the field untouched
    fn bind_row(&self, record: &mut dyn Record, row: &[String]) {
        for (idx, column) in self.template.columns().iter().enumerate() {
            let raw = row.get(idx).map(String::as_str).unwrap_or("");
            let value = column.resolve_import_value(raw);
            if let Err(err) = write_field(record, column.field_name(), value, self.mode) {
                warn!(column = column.title(), "field import failed: {}", err);
            }
        }
    }
}
