//! Workbook I/O
//!
//! - Import: Excel (.xlsx/.xls/.xlsb/.ods) → rows → records
//! - Export: records → rows → Excel (.xlsx)

pub mod exporter;
pub mod importer;
pub mod reader;
pub mod workbook;

pub use exporter::{
    validate_sheet_name, write_rows, ExcelExporter, XlsxSink, DEFAULT_COLUMN_WIDTH,
    MAX_SHEET_NAME_LENGTH,
};
pub use importer::{open_workbook, open_workbook_from_bytes, ExcelImporter, WorkbookFormat};
pub use reader::{read_all_sheets, read_first_sheet, read_sheet};
pub use workbook::{Sheet, SheetSource, Workbook, WorkbookSink, WorkbookSource};
