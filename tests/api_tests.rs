//! API integration tests
//!
//! Drives the router in-process with `tower::ServiceExt::oneshot`.

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use pretty_assertions::assert_eq;
use serde_json::{json, Value as Json};
use sheetbind::api::handlers::XLSX_CONTENT_TYPE;
use sheetbind::api::{build_router, AppState};
use sheetbind::core::{ColumnDescriptor, DynamicRecord, Template};
use sheetbind::excel::{open_workbook_from_bytes, read_first_sheet, ExcelExporter};
use sheetbind::parser::parse_template_str;
use std::sync::Arc;
use tower::ServiceExt;

const TEMPLATE: &str = r#"
name: api
filename: 接口导出
sheet: 接口数据
columns:
  - title: 项目名
    field: project
    required: true
    max_length: 50
  - title: 接口名称
    field: name
    required: true
    max_length: 30
  - title: 资源属性
    field: platform
    required: true
    max_length: 10
    options: [系统, 运营, 租户]
"#;

fn app() -> Router {
    let config = parse_template_str(TEMPLATE).unwrap();
    let state = AppState::new(vec![config]).unwrap();
    build_router(Arc::new(state))
}

fn record(project: &str, name: &str, platform: &str) -> DynamicRecord {
    let mut record = DynamicRecord::new();
    record.set("project", project);
    record.set("name", name);
    record.set("platform", platform);
    record
}

/// Workbook bytes with the given titles and records
fn workbook(titles: &[(&str, &str)], records: &[DynamicRecord]) -> Vec<u8> {
    let columns = titles
        .iter()
        .map(|(title, field)| ColumnDescriptor::new(*title, *field, 50))
        .collect();
    let template = Template::new("upload", columns).unwrap();
    ExcelExporter::new(template).export_to_buffer(records).unwrap()
}

fn api_titles() -> Vec<(&'static str, &'static str)> {
    vec![("项目名", "project"), ("接口名称", "name"), ("资源属性", "platform")]
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, body.to_vec())
}

async fn send_json(app: Router, request: Request<Body>) -> (StatusCode, Json) {
    let (status, body) = send(app, request).await;
    (status, serde_json::from_slice(&body).unwrap())
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn upload(uri: &str, bytes: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, XLSX_CONTENT_TYPE)
        .body(Body::from(bytes))
        .unwrap()
}

fn post_json(uri: &str, body: Json) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

// ═══════════════════════════════════════════════════════════════════════════
// INFO ENDPOINTS
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_health() {
    let (status, body) = send_json(app(), get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "healthy");
    assert!(body["request_id"].as_str().is_some());
}

#[tokio::test]
async fn test_version() {
    let (status, body) = send_json(app(), get("/version")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_root_lists_endpoints() {
    let (status, body) = send_json(app(), get("/")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["endpoints"].as_array().unwrap().len() >= 5);
}

#[tokio::test]
async fn test_list_templates() {
    let (status, body) = send_json(app(), get("/api/v1/templates")).await;
    assert_eq!(status, StatusCode::OK);
    let templates = body["data"].as_array().unwrap();
    assert_eq!(templates.len(), 1);
    assert_eq!(templates[0]["name"], "api");
    assert_eq!(templates[0]["filename"], "接口导出.xlsx");
    assert_eq!(templates[0]["sheet"], "接口数据");
    assert_eq!(templates[0]["columns"][1]["title"], "接口名称");
    assert_eq!(templates[0]["columns"][1]["type"], "text");
}

// ═══════════════════════════════════════════════════════════════════════════
// IMPORT ENDPOINT
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_import_upload() {
    let bytes = workbook(
        &api_titles(),
        &[
            record("uc", "查询用户", "系统"),
            record("uc", "未知平台", "其他"),
            record("ops", "列表", "运营"),
        ],
    );
    let (status, body) = send_json(
        app(),
        upload("/api/v1/templates/api/import?filename=apis.xlsx", bytes),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let data = &body["data"];
    assert_eq!(data["total_rows"], 3);
    assert_eq!(
        data["records"],
        json!([
            {"project": "uc", "name": "查询用户", "platform": "系统"},
            {"project": "ops", "name": "列表", "platform": "运营"}
        ])
    );
    assert_eq!(data["rejected"][0]["row"], 2);
    assert_eq!(data["rejected"][0]["column"], 2);
    assert_eq!(data["rejected"][0]["code"], "CONTENT_BEYOND_RANGE");
}

#[tokio::test]
async fn test_import_without_filename_assumes_xlsx() {
    let bytes = workbook(&api_titles(), &[record("uc", "查询用户", "系统")]);
    let (status, body) = send_json(
        app(),
        upload("/api/v1/templates/api/import?mode=declared", bytes),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["records"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_import_title_mismatch_is_bad_request() {
    let bytes = workbook(
        &[("项目", "project"), ("接口名称", "name"), ("资源属性", "platform")],
        &[record("uc", "查询用户", "系统")],
    );
    let (status, body) = send_json(app(), upload("/api/v1/templates/api/import", bytes)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "FILE_TITLE_ERROR");
    assert!(body["error"]
        .as_str()
        .unwrap()
        .starts_with("File header does not match"));
}

#[tokio::test]
async fn test_import_garbage_is_bad_request() {
    let (status, body) = send_json(
        app(),
        upload("/api/v1/templates/api/import", b"not a workbook".to_vec()),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_import_unknown_template_is_not_found() {
    let bytes = workbook(&api_titles(), &[]);
    let (status, body) =
        send_json(app(), upload("/api/v1/templates/nope/import", bytes)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("nope"));
}

// ═══════════════════════════════════════════════════════════════════════════
// EXPORT ENDPOINT
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_export_download() {
    let request = post_json(
        "/api/v1/templates/api/export",
        json!({
            "records": [
                {"project": "uc", "name": "查询用户", "platform": "系统"}
            ]
        }),
    );
    let response = app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        XLSX_CONTENT_TYPE
    );
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION].as_bytes(),
        "attachment; filename=\"接口导出.xlsx\"".as_bytes()
    );

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let workbook = open_workbook_from_bytes("download.xlsx", body.to_vec()).unwrap();
    assert!(workbook.sheet("接口数据").is_some());
    let rows = read_first_sheet(&workbook);
    assert_eq!(rows[0], vec!["项目名", "接口名称", "资源属性"]);
    assert_eq!(rows[1], vec!["uc", "查询用户", "系统"]);
}

#[tokio::test]
async fn test_export_overrides_names() {
    let request = post_json(
        "/api/v1/templates/api/export",
        json!({"records": [], "filename": "report", "sheet": "data"}),
    );
    let response = app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"report.xlsx\""
    );

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let workbook = open_workbook_from_bytes("report.xlsx", body.to_vec()).unwrap();
    assert!(workbook.sheet("data").is_some());
}

#[tokio::test]
async fn test_export_rejects_non_array_records() {
    let (status, body) = send_json(
        app(),
        post_json("/api/v1/templates/api/export", json!({"records": {"project": "uc"}})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("Invalid records"));
}

#[tokio::test]
async fn test_export_rejects_non_object_records() {
    let (status, body) = send_json(
        app(),
        post_json(
            "/api/v1/templates/api/export",
            json!({"records": [{"project": "uc"}, 1, "x"]}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("record 1 is not a JSON object"));
}

#[tokio::test]
async fn test_export_rejects_invalid_sheet_name() {
    let (status, body) = send_json(
        app(),
        post_json(
            "/api/v1/templates/api/export",
            json!({"records": [], "sheet": "bad/name"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("Invalid sheet name"));
}

#[tokio::test]
async fn test_export_unknown_template_is_not_found() {
    let (status, _) = send(
        app(),
        post_json("/api/v1/templates/nope/export", json!({"records": []})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
