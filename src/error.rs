use serde::{Serialize, Serializer};
use std::fmt;
use thiserror::Error;

pub type SheetbindResult<T> = Result<T, SheetbindError>;

#[derive(Error, Debug)]
pub enum SheetbindError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Workbook error: {0}")]
    Workbook(String),

    #[error("Export error: {0}")]
    Export(String),

    #[error("Template error: {0}")]
    Template(String),

    #[error("Unknown template: {0}")]
    UnknownTemplate(String),

    #[error("Invalid records: {0}")]
    Records(String),

    #[error("Invalid sheet name: {0}")]
    SheetName(String),

    /// Header row does not match the template, position for position.
    #[error("{}: expected {expected:?}, found {found:?}", ErrorCode::FileTitleError.message())]
    TitleMismatch {
        expected: Vec<String>,
        found: Vec<String>,
    },
}

impl SheetbindError {
    /// Import error code carried by this error, if it is a structural import failure
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            SheetbindError::TitleMismatch { .. } => Some(ErrorCode::FileTitleError),
            _ => None,
        }
    }
}

/// Import error codes.
///
/// `FileTitleError` aborts a whole import; every other code only rejects the
/// row it was raised for.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    FileTitleError,
    NullValue,
    OverLength,
    DateFormatError,
    ContentBeyondRange,
    /// Code raised by a caller-supplied validator
    Custom(String),
}

impl ErrorCode {
    pub fn custom(code: impl Into<String>) -> Self {
        ErrorCode::Custom(code.into())
    }

    /// Stable code name, e.g. `NULL_VALUE`
    pub fn as_str(&self) -> &str {
        match self {
            ErrorCode::FileTitleError => "FILE_TITLE_ERROR",
            ErrorCode::NullValue => "NULL_VALUE",
            ErrorCode::OverLength => "OVER_LENGTH",
            ErrorCode::DateFormatError => "DATE_FORMAT_ERROR",
            ErrorCode::ContentBeyondRange => "CONTENT_BEYOND_RANGE",
            ErrorCode::Custom(code) => code,
        }
    }

    /// Human readable description
    pub fn message(&self) -> &str {
        match self {
            ErrorCode::FileTitleError => {
                "File header does not match the template, please upload again using the template"
            }
            ErrorCode::NullValue => "Required value is empty",
            ErrorCode::OverLength => "Value exceeds the length limit",
            ErrorCode::DateFormatError => "Invalid date format",
            ErrorCode::ContentBeyondRange => "Value is not one of the allowed options",
            ErrorCode::Custom(code) => code,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ErrorCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Failure to read or write a named field on a record
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FieldError {
    #[error("no field '{field}' on {record}")]
    NoSuchField { record: String, field: String },

    #[error("field '{field}' on {record} is not accessible")]
    AccessDenied { record: String, field: String },

    #[error("field '{field}' expects {expected}, got {found}")]
    TypeMismatch {
        field: String,
        expected: &'static str,
        found: &'static str,
    },
}

impl FieldError {
    pub fn no_such_field(record: &str, field: &str) -> Self {
        FieldError::NoSuchField {
            record: record.to_string(),
            field: field.to_string(),
        }
    }

    pub fn access_denied(record: &str, field: &str) -> Self {
        FieldError::AccessDenied {
            record: record.to_string(),
            field: field.to_string(),
        }
    }
}
