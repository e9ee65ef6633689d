//! Template engine: column descriptors, cell normalization and the
//! import/export pipelines

pub mod column;
pub mod exporter;
pub mod importer;
pub mod normalizer;
pub mod record;

pub use column::{ColumnDescriptor, Template};
pub use exporter::RecordExporter;
pub use importer::{ImportReport, RecordImporter, RejectedRow};
pub use normalizer::normalize;
pub use record::{read_field, records_from_json, write_field, BindMode, DynamicRecord, Record};
