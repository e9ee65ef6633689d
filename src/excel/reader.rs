//! Tabular reader: worksheet → rows of canonical strings

use crate::core::normalizer::normalize;
use crate::excel::workbook::{SheetSource, WorkbookSource};
use crate::types::Row;
use std::collections::BTreeMap;
use tracing::debug;

/// Read the first sheet of a workbook.
///
/// Row 0 of the result is the header. A missing sheet, an empty sheet or a
/// header-only sheet yields no rows.
pub fn read_first_sheet(source: &dyn WorkbookSource) -> Vec<Row> {
    match source.sheet_at(0) {
        Some(sheet) if has_data(sheet) => read_sheet(sheet),
        _ => Vec::new(),
    }
}

/// Read every sheet that has data rows, keyed by sheet name
pub fn read_all_sheets(source: &dyn WorkbookSource) -> BTreeMap<String, Vec<Row>> {
    let mut sheets = BTreeMap::new();
    for index in 0..source.sheet_count() {
        let Some(sheet) = source.sheet_at(index) else {
            continue;
        };
        if !has_data(sheet) {
            debug!(sheet = sheet.name(), "skipping sheet without data rows");
            continue;
        }
        sheets.insert(sheet.name().to_string(), read_sheet(sheet));
    }
    sheets
}

/// Whether the sheet has at least one row after the header
fn has_data(sheet: &dyn SheetSource) -> bool {
    sheet.last_row_index().is_some_and(|last| last > 0)
}

/// Every physical row, each exactly as wide as the header row
pub fn read_sheet(sheet: &dyn SheetSource) -> Vec<Row> {
    let cell_num = sheet.row_width(0);
    sheet
        .row_indices()
        .into_iter()
        .map(|row| {
            (0..cell_num)
                .map(|col| normalize(sheet.cell(row, col)))
                .collect()
        })
        .collect()
}
