//! Export pipeline: records → rows

use crate::core::column::Template;
use crate::core::record::{read_field, BindMode, Record};
use crate::types::{Row, Value};
use tracing::{info, warn};

/// Renders records into rows through a template
pub struct RecordExporter<'a> {
    template: &'a Template,
    mode: BindMode,
}

impl<'a> RecordExporter<'a> {
    /// Create an exporter that reads only fields declared on the record type
    pub fn new(template: &'a Template) -> Self {
        Self {
            template,
            mode: BindMode::Declared,
        }
    }

    pub fn with_mode(mut self, mode: BindMode) -> Self {
        self.mode = mode;
        self
    }

    /// Header row: one title per column
    pub fn header(&self) -> Row {
        self.template.titles()
    }

    /// One data row; unreadable fields render as null
    pub fn row(&self, record: &dyn Record) -> Row {
        self.template
            .columns()
            .iter()
            .map(|column| {
                let value = match read_field(record, column.field_name(), self.mode) {
                    Ok(value) => value,
                    Err(err) => {
                        warn!(column = column.title(), "field export failed: {}", err);
                        Value::Null
                    }
                };
                column.resolve_export_value(&value)
            })
            .collect()
    }

    /// Header followed by one row per record, in record order
    pub fn export<R: Record>(&self, records: &[R]) -> Vec<Row> {
        let mut rows = Vec::with_capacity(records.len() + 1);
        rows.push(self.header());
        rows.extend(records.iter().map(|record| self.row(record)));
        info!(
            template = self.template.name(),
            records = records.len(),
            "export finished"
        );
        rows
    }
}
