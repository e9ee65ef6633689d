//! Cell normalization: raw cell → canonical string

use crate::types::Cell;
use chrono::{Duration, NaiveDate};

/// Whole numbers below this magnitude render without a fraction
const WHOLE_NUMBER_LIMIT: f64 = 1e15;

/// Convert one raw cell into its canonical string.
///
/// Never fails: unknown kinds and absent cells normalize to an empty string.
pub fn normalize(cell: Option<&Cell>) -> String {
    let Some(cell) = cell else {
        return String::new();
    };

    match cell {
        Cell::Numeric {
            value,
            date_formatted: true,
        } => serial_to_date(*value)
            .map(|date| date.format("%Y-%m-%d").to_string())
            .unwrap_or_default(),
        Cell::Numeric { value, .. } => normalize_number(*value),
        Cell::Text(text) => text.clone(),
        Cell::Formula(source) => source.clone(),
        Cell::Blank => String::new(),
        Cell::Boolean(b) => b.to_string(),
        Cell::Error(code) => code.clone(),
        Cell::Unknown => String::new(),
    }
}

/// Render a number the way the cell displays it as text, keeping whole
/// numbers free of a trailing `.0` and trimming fractional ones to their
/// shortest decimal form.
fn normalize_number(value: f64) -> String {
    let rendered = number_text(value);
    if rendered.contains('.') {
        match rendered.parse::<f64>() {
            Ok(parsed) => parsed.to_string().trim().to_string(),
            Err(_) => rendered.trim().to_string(),
        }
    } else {
        rendered.trim().to_string()
    }
}

fn number_text(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < WHOLE_NUMBER_LIMIT {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

/// Convert an Excel serial (1900 date system) to a calendar date.
///
/// Serial 60 is the fictitious 1900-02-29; serials below 61 count from
/// 1899-12-31, later ones from 1899-12-30.
pub fn serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }
    let whole_days = serial.floor() as i64;
    let epoch = if whole_days < 61 {
        NaiveDate::from_ymd_opt(1899, 12, 31)?
    } else {
        NaiveDate::from_ymd_opt(1899, 12, 30)?
    };
    epoch.checked_add_signed(Duration::try_days(whole_days)?)
}

/// Inverse of `serial_to_date` for dates after 1900-02-28
pub fn date_to_serial(date: NaiveDate) -> f64 {
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30).unwrap_or(NaiveDate::MIN);
    (date - epoch).num_days() as f64
}
