//! YAML template tests: loading files and importing through configured columns

use pretty_assertions::assert_eq;
use sheetbind::core::{DynamicRecord, RecordImporter};
use sheetbind::error::{ErrorCode, SheetbindError};
use sheetbind::parser::{parse_template, parse_template_str, NUMBER_FORMAT_ERROR};
use sheetbind::types::Value;
use std::fs;
use tempfile::TempDir;

const ORDERS: &str = r#"
name: orders
filename: 订单导出
columns:
  - title: 订单号
    field: orderNo
    required: true
    max_length: 20
    pattern: "^SO[0-9]+$"
  - title: 数量
    field: quantity
    required: true
    max_length: 6
    type: integer
  - title: 单价
    field: price
    max_length: 12
    type: decimal
  - title: 下单日期
    field: orderedAt
    max_length: 10
    type: date
  - title: 加急
    field: urgent
    max_length: 5
    type: boolean
"#;

fn row(cells: &[&str]) -> Vec<String> {
    cells.iter().map(|s| s.to_string()).collect()
}

fn header() -> Vec<String> {
    row(&["订单号", "数量", "单价", "下单日期", "加急"])
}

// ═══════════════════════════════════════════════════════════════════════════
// LOADING TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_parse_template_from_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("orders.yaml");
    fs::write(&path, ORDERS).unwrap();

    let config = parse_template(&path).unwrap();
    assert_eq!(config.name, "orders");
    assert_eq!(config.sheet, None);
    assert_eq!(config.columns.len(), 5);

    let template = config.build().unwrap();
    assert_eq!(template.titles(), header());
}

#[test]
fn test_parse_template_missing_file() {
    let dir = TempDir::new().unwrap();
    let result = parse_template(&dir.path().join("missing.yaml"));
    assert!(matches!(result, Err(SheetbindError::Io(_))));
}

#[test]
fn test_malformed_yaml_is_yaml_error() {
    let result = parse_template_str("name: [unclosed");
    assert!(matches!(result, Err(SheetbindError::Yaml(_))));
}

// ═══════════════════════════════════════════════════════════════════════════
// IMPORT THROUGH CONFIGURED TEMPLATES
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_typed_values_are_bound() {
    let template = parse_template_str(ORDERS).unwrap().build().unwrap();
    let rows = vec![header(), row(&["SO1001", "3", "19.9", "2024-05-01", "yes"])];
    let records: Vec<DynamicRecord> = RecordImporter::new(&template).import(&rows).unwrap();

    let record = &records[0];
    assert_eq!(record.get("orderNo"), Some(&Value::from("SO1001")));
    assert_eq!(record.get("quantity"), Some(&Value::Integer(3)));
    assert_eq!(record.get("price"), Some(&Value::Decimal(19.9)));
    assert_eq!(
        record.get("orderedAt"),
        Some(&Value::Date(chrono::NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()))
    );
    assert_eq!(record.get("urgent"), Some(&Value::Boolean(true)));
}

#[test]
fn test_blank_optional_values_are_null() {
    let template = parse_template_str(ORDERS).unwrap().build().unwrap();
    let rows = vec![header(), row(&["SO1002", "1", "", "", ""])];
    let records: Vec<DynamicRecord> = RecordImporter::new(&template).import(&rows).unwrap();

    assert_eq!(records[0].get("price"), Some(&Value::Null));
    assert_eq!(records[0].to_json()["orderedAt"], serde_json::Value::Null);
}

#[test]
fn test_typed_checks_reject_rows() {
    let template = parse_template_str(ORDERS).unwrap().build().unwrap();
    let rows = vec![
        header(),
        row(&["SO1", "three", "", "", ""]),
        row(&["SO2", "1", "1,5", "", ""]),
        row(&["SO3", "1", "", "01/05/2024", ""]),
        row(&["SO4", "1", "", "", "maybe"]),
        row(&["X5", "1", "", "", ""]),
        row(&["SO6", "1", "", "", "no"]),
    ];
    let report = RecordImporter::new(&template)
        .import_report(&rows, DynamicRecord::new)
        .unwrap();

    let codes: Vec<ErrorCode> = report.rejected.iter().map(|r| r.code.clone()).collect();
    assert_eq!(
        codes,
        vec![
            ErrorCode::custom(NUMBER_FORMAT_ERROR),
            ErrorCode::custom(NUMBER_FORMAT_ERROR),
            ErrorCode::DateFormatError,
            ErrorCode::ContentBeyondRange,
            ErrorCode::custom("PATTERN_MISMATCH"),
        ]
    );
    assert_eq!(report.records.len(), 1);
    assert_eq!(report.records[0].get("urgent"), Some(&Value::Boolean(false)));
}

#[test]
fn test_dynamic_records_round_trip_json() {
    let template = parse_template_str(ORDERS).unwrap().build().unwrap();
    let rows = vec![header(), row(&["SO7", "2", "5", "2024-01-31", "true"])];
    let records: Vec<DynamicRecord> = RecordImporter::new(&template).import(&rows).unwrap();

    let json = records[0].to_json();
    assert_eq!(
        json,
        serde_json::json!({
            "orderNo": "SO7",
            "quantity": 2,
            "price": 5.0,
            "orderedAt": "2024-01-31",
            "urgent": true
        })
    );
    let back = DynamicRecord::from_json(&json);
    assert_eq!(back.get("quantity"), Some(&Value::Integer(2)));
}
