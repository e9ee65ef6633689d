//! Sheetbind - template-driven spreadsheet import and export
//!
//! This library binds the rows of a spreadsheet to typed records through an
//! ordered list of column descriptors, and renders records back into a sheet
//! through the same list.
//!
//! # Features
//!
//! - Column templates with required, length and custom value checks
//! - Import and export resolvers for typed values
//! - Field binding on a record's own type or through its parent chain
//! - Excel (.xlsx/.xls/.xlsb/.ods) reading and .xlsx writing
//! - YAML template files for records without Rust code
//!
//! # Example
//!
//! ```no_run
//! use sheetbind::core::{BindMode, DynamicRecord};
//! use sheetbind::excel::ExcelImporter;
//! use sheetbind::parser::parse_template;
//! use std::path::Path;
//!
//! let template = parse_template(Path::new("api.yaml"))?.build()?;
//! let importer = ExcelImporter::new("apis.xlsx");
//! let records: Vec<DynamicRecord> = importer.import(&template, BindMode::Hierarchy)?;
//!
//! println!("Records: {}", records.len());
//! # Ok::<(), sheetbind::error::SheetbindError>(())
//! ```

pub mod api;
pub mod cli;
pub mod core;
pub mod error;
pub mod excel;
pub mod parser;
pub mod types;

// Re-export commonly used types
pub use crate::core::{BindMode, ColumnDescriptor, DynamicRecord, Record, Template};
pub use crate::error::{ErrorCode, FieldError, SheetbindError, SheetbindResult};
pub use crate::types::{Cell, Row, Value};
