//! Column descriptors and templates
//!
//! A [`Template`] is the ordered list of [`ColumnDescriptor`]s binding the
//! columns of a sheet to the fields of a record. Index `i` of the template is
//! column `i` of every row, for import and export alike.

use crate::error::{ErrorCode, SheetbindError, SheetbindResult};
use crate::types::Value;
use std::fmt;
use std::sync::Arc;

/// Maps a non-blank raw value to an error code, or `None` when it is valid
pub type ValueValidator = Arc<dyn Fn(&str) -> Option<ErrorCode> + Send + Sync>;

/// Maps a raw value to the typed value bound into the record
pub type ImportResolver = Arc<dyn Fn(&str) -> Value + Send + Sync>;

/// Maps a record value to the text written into the sheet
pub type ExportResolver = Arc<dyn Fn(&Value) -> String + Send + Sync>;

/// Metadata and capabilities for one spreadsheet column
#[derive(Clone)]
pub struct ColumnDescriptor {
    title: String,
    field_name: String,
    required: bool,
    max_length: usize,
    validator: Option<ValueValidator>,
    import_resolver: Option<ImportResolver>,
    export_resolver: Option<ExportResolver>,
}

impl ColumnDescriptor {
    /// Create an optional column with no validator and identity resolvers
    pub fn new(title: impl Into<String>, field_name: impl Into<String>, max_length: usize) -> Self {
        Self {
            title: title.into(),
            field_name: field_name.into(),
            required: false,
            max_length,
            validator: None,
            import_resolver: None,
            export_resolver: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn with_validator<F>(mut self, validator: F) -> Self
    where
        F: Fn(&str) -> Option<ErrorCode> + Send + Sync + 'static,
    {
        self.validator = Some(Arc::new(validator));
        self
    }

    pub fn with_import_resolver<F>(mut self, resolver: F) -> Self
    where
        F: Fn(&str) -> Value + Send + Sync + 'static,
    {
        self.import_resolver = Some(Arc::new(resolver));
        self
    }

    pub fn with_export_resolver<F>(mut self, resolver: F) -> Self
    where
        F: Fn(&Value) -> String + Send + Sync + 'static,
    {
        self.export_resolver = Some(Arc::new(resolver));
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn field_name(&self) -> &str {
        &self.field_name
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn max_length(&self) -> usize {
        self.max_length
    }

    pub fn has_validator(&self) -> bool {
        self.validator.is_some()
    }

    /// Check a raw cell value.
    ///
    /// Checks run in a fixed order and the first failure wins: required,
    /// then length, then the attached validator (non-blank values only).
    pub fn check_value(&self, raw: &str) -> Option<ErrorCode> {
        let blank = is_blank(raw);
        if self.required && blank {
            return Some(ErrorCode::NullValue);
        }
        if raw.chars().count() > self.max_length {
            return Some(ErrorCode::OverLength);
        }
        if !blank {
            if let Some(validator) = &self.validator {
                return validator(raw);
            }
        }
        None
    }

    /// Typed value for a raw cell; the raw text itself when no resolver is set
    pub fn resolve_import_value(&self, raw: &str) -> Value {
        match &self.import_resolver {
            Some(resolver) => resolver(raw),
            None => Value::Text(raw.to_string()),
        }
    }

    /// Cell text for a record value
    pub fn resolve_export_value(&self, value: &Value) -> String {
        match &self.export_resolver {
            Some(resolver) => resolver(value),
            None => value.to_string(),
        }
    }
}

impl fmt::Debug for ColumnDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnDescriptor")
            .field("title", &self.title)
            .field("field_name", &self.field_name)
            .field("required", &self.required)
            .field("max_length", &self.max_length)
            .field("validator", &self.validator.is_some())
            .field("import_resolver", &self.import_resolver.is_some())
            .field("export_resolver", &self.export_resolver.is_some())
            .finish()
    }
}

/// Blank means empty or whitespace only
pub fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Ordered, immutable set of column descriptors for one record type
#[derive(Debug, Clone)]
pub struct Template {
    name: String,
    columns: Arc<[ColumnDescriptor]>,
}

impl Template {
    /// Build a template; at least one column is required
    pub fn new(name: impl Into<String>, columns: Vec<ColumnDescriptor>) -> SheetbindResult<Self> {
        let name = name.into();
        if columns.is_empty() {
            return Err(SheetbindError::Template(format!(
                "template '{}' has no columns",
                name
            )));
        }
        Ok(Self {
            name,
            columns: columns.into(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Whether the template has no columns
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn titles(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.title.clone()).collect()
    }

    /// Whether the header row matches the titles position for position.
    ///
    /// Extra trailing header cells are ignored.
    pub fn is_title_legal(&self, header: &[String]) -> bool {
        header.len() >= self.columns.len()
            && self
                .columns
                .iter()
                .zip(header)
                .all(|(column, title)| column.title == *title)
    }

    /// First failing column of a data row as `(column index, code)`.
    ///
    /// Missing trailing cells are checked as empty strings.
    pub fn check_row(&self, row: &[String]) -> Option<(usize, ErrorCode)> {
        self.columns.iter().enumerate().find_map(|(idx, column)| {
            let raw = row.get(idx).map(String::as_str).unwrap_or("");
            column.check_value(raw).map(|code| (idx, code))
        })
    }

    pub fn is_row_legal(&self, row: &[String]) -> bool {
        self.check_row(row).is_none()
    }
}
