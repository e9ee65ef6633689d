use crate::error::FieldError;
use chrono::{NaiveDate, NaiveDateTime};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

//==============================================================================
// Rows and cells
//==============================================================================

/// One spreadsheet row as canonical strings, one per column
pub type Row = Vec<String>;

/// A raw spreadsheet cell, as seen before normalization
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// Number; `date_formatted` is set when the cell's number format is a date
    Numeric { value: f64, date_formatted: bool },
    /// Literal text
    Text(String),
    /// Formula source (without the leading `=`)
    Formula(String),
    /// Physically present but empty
    Blank,
    Boolean(bool),
    /// Error code text, e.g. `#DIV/0!`
    Error(String),
    /// Any kind the reader does not understand
    Unknown,
}

impl Cell {
    pub fn number(value: f64) -> Self {
        Cell::Numeric {
            value,
            date_formatted: false,
        }
    }

    /// Date-formatted numeric cell holding an Excel serial
    pub fn date_serial(serial: f64) -> Self {
        Cell::Numeric {
            value: serial,
            date_formatted: true,
        }
    }

    /// Date-formatted numeric cell for a calendar date
    pub fn date(date: NaiveDate) -> Self {
        Cell::date_serial(crate::core::normalizer::date_to_serial(date))
    }

    pub fn text(value: impl Into<String>) -> Self {
        Cell::Text(value.into())
    }

    pub fn formula(source: impl Into<String>) -> Self {
        Cell::Formula(source.into())
    }
}

//==============================================================================
// Typed values
//==============================================================================

/// Caller-defined value carried through `Value::Custom`
pub trait CustomValue: Any + fmt::Debug + fmt::Display + Send + Sync {
    fn as_any(&self) -> &dyn Any;
}

impl<T: Any + fmt::Debug + fmt::Display + Send + Sync> CustomValue for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Typed value moved between column descriptors and record fields
#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Text(String),
    Integer(i64),
    Decimal(f64),
    Boolean(bool),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Custom(Arc<dyn CustomValue>),
}

impl Value {
    pub fn custom<T: CustomValue>(value: T) -> Self {
        Value::Custom(Arc::new(value))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Name of the variant, used in type mismatch reports
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Text(_) => "text",
            Value::Integer(_) => "integer",
            Value::Decimal(_) => "decimal",
            Value::Boolean(_) => "boolean",
            Value::Date(_) => "date",
            Value::DateTime(_) => "datetime",
            Value::Custom(_) => "custom",
        }
    }

    /// Borrow the custom payload as `T`
    pub fn custom_ref<T: Any>(&self) -> Option<&T> {
        match self {
            Value::Custom(custom) => (**custom).as_any().downcast_ref::<T>(),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Convert into a field type, reporting a mismatch against `field`
    pub fn into_field<T: FromValue>(self, field: &str) -> Result<T, FieldError> {
        let found = self.type_name();
        T::from_value(self).ok_or_else(|| FieldError::TypeMismatch {
            field: field.to_string(),
            expected: T::EXPECTED,
            found,
        })
    }

    /// Convert a custom payload into a field of type `T` (`Null` is rejected)
    pub fn into_custom<T: Any + Clone>(self, field: &str) -> Result<T, FieldError> {
        self.custom_ref::<T>()
            .cloned()
            .ok_or_else(|| FieldError::TypeMismatch {
                field: field.to_string(),
                expected: std::any::type_name::<T>(),
                found: self.type_name(),
            })
    }

    /// Same as `into_custom` but maps `Null` to `None`
    pub fn into_optional_custom<T: Any + Clone>(self, field: &str) -> Result<Option<T>, FieldError> {
        if self.is_null() {
            return Ok(None);
        }
        self.into_custom(field).map(Some)
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Text(s) => serde_json::Value::String(s.clone()),
            Value::Integer(i) => serde_json::Value::from(*i),
            Value::Decimal(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::Boolean(b) => serde_json::Value::Bool(*b),
            Value::Date(_) | Value::DateTime(_) | Value::Custom(_) => {
                serde_json::Value::String(self.to_string())
            }
        }
    }

    pub fn from_json(json: &serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Boolean(*b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Integer(i),
                None => Value::Decimal(n.as_f64().unwrap_or_default()),
            },
            serde_json::Value::String(s) => Value::Text(s.clone()),
            other => Value::Text(other.to_string()),
        }
    }
}

/// Default textual representation used when a column has no export resolver
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Text(s) => f.write_str(s),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Decimal(d) => write!(f, "{}", d),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Value::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
            Value::Custom(c) => write!(f, "{}", c),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Decimal(a), Value::Decimal(b)) => a == b,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Date(a), Value::Date(b)) => a == b,
            (Value::DateTime(a), Value::DateTime(b)) => a == b,
            // Custom payloads are opaque; compare their rendering
            (Value::Custom(a), Value::Custom(b)) => Arc::ptr_eq(a, b) || a.to_string() == b.to_string(),
            _ => false,
        }
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Decimal(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<NaiveDate> for Value {
    fn from(value: NaiveDate) -> Self {
        Value::Date(value)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(value: NaiveDateTime) -> Self {
        Value::DateTime(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::Null)
    }
}

/// Conversion from a `Value` into a concrete record field type
pub trait FromValue: Sized {
    const EXPECTED: &'static str;

    fn from_value(value: Value) -> Option<Self>;
}

impl FromValue for String {
    const EXPECTED: &'static str = "text";

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl FromValue for i64 {
    const EXPECTED: &'static str = "integer";

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Integer(i) => Some(i),
            _ => None,
        }
    }
}

impl FromValue for f64 {
    const EXPECTED: &'static str = "decimal";

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Decimal(d) => Some(d),
            Value::Integer(i) => Some(i as f64),
            _ => None,
        }
    }
}

impl FromValue for bool {
    const EXPECTED: &'static str = "boolean";

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Boolean(b) => Some(b),
            _ => None,
        }
    }
}

impl FromValue for NaiveDate {
    const EXPECTED: &'static str = "date";

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Date(d) => Some(d),
            _ => None,
        }
    }
}

impl FromValue for NaiveDateTime {
    const EXPECTED: &'static str = "datetime";

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::DateTime(dt) => Some(dt),
            _ => None,
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    const EXPECTED: &'static str = T::EXPECTED;

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Null => Some(None),
            other => T::from_value(other).map(Some),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    enum Shade {
        Dark,
    }

    impl fmt::Display for Shade {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "dark")
        }
    }

    #[test]
    fn test_default_rendering() {
        assert_eq!(Value::Null.to_string(), "");
        assert_eq!(Value::from("abc").to_string(), "abc");
        assert_eq!(Value::Integer(42).to_string(), "42");
        assert_eq!(Value::Decimal(100.5).to_string(), "100.5");
        assert_eq!(Value::Boolean(true).to_string(), "true");
        let date = NaiveDate::from_ymd_opt(2018, 1, 1).unwrap();
        assert_eq!(Value::Date(date).to_string(), "2018-01-01");
        assert_eq!(Value::custom(Shade::Dark).to_string(), "dark");
    }

    #[test]
    fn test_custom_downcast() {
        let value = Value::custom(Shade::Dark);
        assert_eq!(value.custom_ref::<Shade>(), Some(&Shade::Dark));
        assert!(value.custom_ref::<String>().is_none());
        assert_eq!(value.into_custom::<Shade>("shade").unwrap(), Shade::Dark);
    }

    #[test]
    fn test_optional_custom_accepts_null() {
        assert_eq!(Value::Null.into_optional_custom::<Shade>("shade").unwrap(), None);
        assert!(Value::from("x").into_optional_custom::<Shade>("shade").is_err());
    }

    #[test]
    fn test_into_field_mismatch() {
        let err = Value::from("abc").into_field::<i64>("count").unwrap_err();
        assert_eq!(
            err,
            FieldError::TypeMismatch {
                field: "count".to_string(),
                expected: "integer",
                found: "text",
            }
        );
    }

    #[test]
    fn test_option_fields_accept_null() {
        let value: Option<String> = Value::Null.into_field("memo").unwrap();
        assert_eq!(value, None);
        let value: Option<String> = Value::from("x").into_field("memo").unwrap();
        assert_eq!(value, Some("x".to_string()));
    }

    #[test]
    fn test_json_conversion() {
        let json = serde_json::json!({"a": 1, "b": 1.5, "c": "x", "d": null, "e": true});
        let obj = json.as_object().unwrap();
        assert_eq!(Value::from_json(&obj["a"]), Value::Integer(1));
        assert_eq!(Value::from_json(&obj["b"]), Value::Decimal(1.5));
        assert_eq!(Value::from_json(&obj["c"]), Value::from("x"));
        assert_eq!(Value::from_json(&obj["d"]), Value::Null);
        assert_eq!(Value::from_json(&obj["e"]), Value::Boolean(true));

        let date = NaiveDate::from_ymd_opt(2020, 2, 29).unwrap();
        assert_eq!(Value::Date(date).to_json(), serde_json::json!("2020-02-29"));
    }
}
