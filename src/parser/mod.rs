use crate::core::{ColumnDescriptor, Template};
use crate::error::{ErrorCode, SheetbindError, SheetbindResult};
use crate::excel::{validate_sheet_name, ExcelExporter, DEFAULT_COLUMN_WIDTH};
use crate::types::Value;
use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Code raised when an integer or decimal column holds something else
pub const NUMBER_FORMAT_ERROR: &str = "NUMBER_FORMAT_ERROR";

/// Code raised when a value does not match the column's `pattern`
pub const PATTERN_MISMATCH: &str = "PATTERN_MISMATCH";

const DATE_FORMAT: &str = "%Y-%m-%d";

fn default_column_width() -> f64 {
    DEFAULT_COLUMN_WIDTH
}

fn default_kind() -> String {
    ValueKind::Text.to_string()
}

/// Template declared in YAML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TemplateConfig {
    pub name: String,

    /// Export download name, without extension
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,

    /// Export sheet name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sheet: Option<String>,

    #[serde(default = "default_column_width")]
    pub column_width: f64,

    pub columns: Vec<ColumnConfig>,
}

/// One column of a YAML template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ColumnConfig {
    pub title: String,
    pub field: String,

    #[serde(default)]
    pub required: bool,

    #[serde(default)]
    pub max_length: usize,

    /// Kept as text so an unknown type is reported as a template error
    #[serde(rename = "type", default = "default_kind")]
    pub kind: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
}

/// Value type of a configured column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValueKind {
    #[default]
    Text,
    Integer,
    Decimal,
    Boolean,
    Date,
}

impl ValueKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueKind::Text => "text",
            ValueKind::Integer => "integer",
            ValueKind::Decimal => "decimal",
            ValueKind::Boolean => "boolean",
            ValueKind::Date => "date",
        }
    }

    /// Error code for a non-blank raw value that is not of this kind
    pub fn check(&self, raw: &str) -> Option<ErrorCode> {
        let raw = raw.trim();
        let valid = match self {
            ValueKind::Text => true,
            ValueKind::Integer => raw.parse::<i64>().is_ok(),
            ValueKind::Decimal => parse_decimal(raw).is_some(),
            ValueKind::Boolean => {
                return parse_bool(raw)
                    .is_none()
                    .then_some(ErrorCode::ContentBeyondRange)
            }
            ValueKind::Date => {
                return parse_date(raw)
                    .is_none()
                    .then_some(ErrorCode::DateFormatError)
            }
        };
        (!valid).then(|| ErrorCode::custom(NUMBER_FORMAT_ERROR))
    }

    /// Typed value for a raw cell; blank cells resolve to `Null`
    pub fn resolve(&self, raw: &str) -> Value {
        let raw = raw.trim();
        if raw.is_empty() {
            return Value::Null;
        }
        match self {
            ValueKind::Text => Value::Text(raw.to_string()),
            ValueKind::Integer => raw.parse::<i64>().map(Value::Integer).unwrap_or_default(),
            ValueKind::Decimal => parse_decimal(raw).map(Value::Decimal).unwrap_or_default(),
            ValueKind::Boolean => parse_bool(raw).map(Value::Boolean).unwrap_or_default(),
            ValueKind::Date => parse_date(raw).map(Value::Date).unwrap_or_default(),
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ValueKind {
    type Err = SheetbindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "string" => Ok(ValueKind::Text),
            "integer" | "int" => Ok(ValueKind::Integer),
            "decimal" | "number" => Ok(ValueKind::Decimal),
            "boolean" | "bool" => Ok(ValueKind::Boolean),
            "date" => Ok(ValueKind::Date),
            other => Err(SheetbindError::Template(format!(
                "Unknown column type '{}' (expected text, integer, decimal, boolean or date)",
                other
            ))),
        }
    }
}

fn parse_decimal(raw: &str) -> Option<f64> {
    raw.parse::<f64>().ok().filter(|value| value.is_finite())
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT).ok()
}

fn export_date(value: &Value) -> String {
    match value {
        Value::Date(date) => date.format(DATE_FORMAT).to_string(),
        Value::DateTime(dt) => dt.date().format(DATE_FORMAT).to_string(),
        other => other.to_string(),
    }
}

impl ColumnConfig {
    pub fn value_kind(&self) -> SheetbindResult<ValueKind> {
        self.kind.parse()
    }

    /// Build the column descriptor: type check, then options, then pattern
    pub fn build(&self) -> SheetbindResult<ColumnDescriptor> {
        let kind = self.value_kind()?;
        if self.max_length == 0 {
            return Err(SheetbindError::Template(format!(
                "Column '{}' needs a positive max_length",
                self.title
            )));
        }
        let pattern = self
            .pattern
            .as_deref()
            .map(Regex::new)
            .transpose()
            .map_err(|e| {
                SheetbindError::Template(format!("Column '{}' has an invalid pattern: {}", self.title, e))
            })?;
        let options = self.options.clone();

        let validator = move |raw: &str| {
            if let Some(code) = kind.check(raw) {
                return Some(code);
            }
            if !options.is_empty() && !options.iter().any(|option| option == raw.trim()) {
                return Some(ErrorCode::ContentBeyondRange);
            }
            match &pattern {
                Some(regex) if !regex.is_match(raw) => Some(ErrorCode::custom(PATTERN_MISMATCH)),
                _ => None,
            }
        };

        let mut column = ColumnDescriptor::new(&self.title, &self.field, self.max_length)
            .with_required(self.required)
            .with_validator(validator)
            .with_import_resolver(move |raw| kind.resolve(raw));
        if kind == ValueKind::Date {
            column = column.with_export_resolver(export_date);
        }
        Ok(column)
    }
}

impl TemplateConfig {
    /// Build the column template
    pub fn build(&self) -> SheetbindResult<Template> {
        let columns = self
            .columns
            .iter()
            .map(ColumnConfig::build)
            .collect::<SheetbindResult<Vec<_>>>()?;
        Template::new(&self.name, columns)
    }

    /// Build an export view carrying the configured file name, sheet name and width
    pub fn exporter(&self) -> SheetbindResult<ExcelExporter> {
        let mut exporter = ExcelExporter::new(self.build()?).with_column_width(self.column_width);
        if let Some(filename) = &self.filename {
            exporter = exporter.with_filename(filename);
        }
        if let Some(sheet) = &self.sheet {
            exporter = exporter.with_sheet_name(sheet);
        }
        Ok(exporter)
    }
}

/// Parse a YAML template file.
///
/// # Arguments
/// * `path` - Path to the template YAML file
///
/// # Returns
/// * `Ok(TemplateConfig)` - Parsed and validated template configuration
/// * `Err(SheetbindError)` - I/O, YAML or template error
///
/// # Example
/// ```no_run
/// use sheetbind::parser::parse_template;
/// use std::path::Path;
///
/// let config = parse_template(Path::new("api.yaml"))?;
/// let template = config.build()?;
/// println!("Columns: {}", template.len());
/// # Ok::<(), sheetbind::error::SheetbindError>(())
/// ```
pub fn parse_template(path: &Path) -> SheetbindResult<TemplateConfig> {
    let content = std::fs::read_to_string(path)?;
    parse_template_str(&content)
}

/// Parse a YAML template held in memory.
///
/// The template is built once so that configuration errors surface at load
/// time rather than on the first import.
pub fn parse_template_str(yaml: &str) -> SheetbindResult<TemplateConfig> {
    let config: TemplateConfig = serde_yaml::from_str(yaml)?;
    config.build()?;
    let sheet = config.sheet.as_deref().unwrap_or(&config.name);
    validate_sheet_name(sheet).map_err(|e| SheetbindError::Template(e.to_string()))?;
    Ok(config)
}
