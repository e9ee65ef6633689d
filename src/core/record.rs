//! Named-field access to records
//!
//! Records expose the fields they declare themselves; an embedded parent
//! record plays the role of a supertype. [`BindMode`] decides whether a field
//! lookup stays on the record's own type or walks up the parent chain.

use crate::error::{FieldError, SheetbindError, SheetbindResult};
use crate::types::Value;
use serde::Deserialize;
use std::collections::BTreeMap;

/// How field names are resolved on a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BindMode {
    /// Only fields declared directly on the record's own type
    Declared,
    /// The first declaring type, walking up the parent chain
    #[default]
    Hierarchy,
}

/// Named-field access on a record type
pub trait Record {
    /// Type name used in diagnostics
    fn type_name(&self) -> &str;

    /// Fields declared directly on this type (not on its parents)
    fn declared_fields(&self) -> Vec<&str>;

    fn read_declared(&self, field: &str) -> Result<Value, FieldError>;

    fn write_declared(&mut self, field: &str, value: Value) -> Result<(), FieldError>;

    fn parent(&self) -> Option<&dyn Record> {
        None
    }

    fn parent_mut(&mut self) -> Option<&mut dyn Record> {
        None
    }

    fn declares(&self, field: &str) -> bool {
        self.declared_fields().contains(&field)
    }
}

/// Read a named field
pub fn read_field(record: &dyn Record, field: &str, mode: BindMode) -> Result<Value, FieldError> {
    if record.declares(field) {
        return record.read_declared(field);
    }
    if mode == BindMode::Hierarchy {
        let mut current = record.parent();
        while let Some(ancestor) = current {
            if ancestor.declares(field) {
                return ancestor.read_declared(field);
            }
            current = ancestor.parent();
        }
    }
    Err(FieldError::no_such_field(record.type_name(), field))
}

/// Write a named field
pub fn write_field(
    record: &mut dyn Record,
    field: &str,
    value: Value,
    mode: BindMode,
) -> Result<(), FieldError> {
    if record.declares(field) {
        return record.write_declared(field, value);
    }
    let type_name = record.type_name().to_string();
    if mode == BindMode::Hierarchy {
        if let Some(parent) = record.parent_mut() {
            return write_field(parent, field, value, mode).map_err(|err| match err {
                FieldError::NoSuchField { field, .. } => FieldError::NoSuchField {
                    record: type_name,
                    field,
                },
                other => other,
            });
        }
    }
    Err(FieldError::no_such_field(&type_name, field))
}

/// Record with free-form fields, used for templates configured at runtime
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DynamicRecord {
    fields: BTreeMap<String, Value>,
}

impl DynamicRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(field.into(), value.into());
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn to_json(&self) -> serde_json::Value {
        let map = self
            .fields
            .iter()
            .map(|(name, value)| (name.clone(), value.to_json()))
            .collect::<serde_json::Map<_, _>>();
        serde_json::Value::Object(map)
    }

    /// Build from a JSON object; any other JSON value yields an empty record
    pub fn from_json(json: &serde_json::Value) -> Self {
        let fields = json
            .as_object()
            .map(|obj| {
                obj.iter()
                    .map(|(name, value)| (name.clone(), Value::from_json(value)))
                    .collect()
            })
            .unwrap_or_default();
        Self { fields }
    }
}

/// Parse a JSON array of objects into records
pub fn records_from_json(json: &serde_json::Value) -> SheetbindResult<Vec<DynamicRecord>> {
    let items = json.as_array().ok_or_else(|| {
        SheetbindError::Records("expected a JSON array of objects".to_string())
    })?;
    items
        .iter()
        .enumerate()
        .map(|(idx, item)| {
            if item.is_object() {
                Ok(DynamicRecord::from_json(item))
            } else {
                Err(SheetbindError::Records(format!("record {} is not a JSON object", idx)))
            }
        })
        .collect()
}

impl Record for DynamicRecord {
    fn type_name(&self) -> &str {
        "DynamicRecord"
    }

    fn declared_fields(&self) -> Vec<&str> {
        self.fields.keys().map(String::as_str).collect()
    }

    /// Every name is writable on a dynamic record
    fn declares(&self, _field: &str) -> bool {
        true
    }

    fn read_declared(&self, field: &str) -> Result<Value, FieldError> {
        self.fields
            .get(field)
            .cloned()
            .ok_or_else(|| FieldError::no_such_field(self.type_name(), field))
    }

    fn write_declared(&mut self, field: &str, value: Value) -> Result<(), FieldError> {
        self.fields.insert(field.to_string(), value);
        Ok(())
    }
}
