//! API request handlers
//!
//! Handlers for all REST API endpoints.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use super::server::AppState;
use crate::core::{records_from_json, BindMode, DynamicRecord, RecordImporter, RejectedRow};
use crate::error::{SheetbindError, SheetbindResult};
use crate::excel::{open_workbook_from_bytes, read_first_sheet, validate_sheet_name};

/// MIME type of .xlsx downloads
pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// File name assumed for uploads that do not name themselves
const DEFAULT_UPLOAD_NAME: &str = "upload.xlsx";

/// Standard API response wrapper
#[derive(Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub request_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Import error code, e.g. `FILE_TITLE_ERROR`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            request_id: Uuid::new_v4().to_string(),
            data: Some(data),
            error: None,
            code: None,
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            request_id: Uuid::new_v4().to_string(),
            data: None,
            error: Some(message.into()),
            code: None,
        }
    }
}

/// Status code for an error raised while serving a request
fn status_for(err: &SheetbindError) -> StatusCode {
    match err {
        SheetbindError::UnknownTemplate(_) => StatusCode::NOT_FOUND,
        SheetbindError::TitleMismatch { .. }
        | SheetbindError::Workbook(_)
        | SheetbindError::Records(_)
        | SheetbindError::SheetName(_)
        | SheetbindError::Json(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// JSON error body with the matching status code
fn error_response(err: SheetbindError) -> Response {
    let status = status_for(&err);
    if status.is_server_error() {
        warn!("request failed: {}", err);
    }
    let mut body = ApiResponse::<()>::err(err.to_string());
    body.code = err.code().map(|code| code.as_str().to_string());
    (status, Json(body)).into_response()
}

/// Root endpoint response
#[derive(Serialize, Deserialize)]
pub struct RootResponse {
    pub name: String,
    pub version: String,
    pub description: String,
    pub endpoints: Vec<EndpointInfo>,
}

#[derive(Serialize, Deserialize)]
pub struct EndpointInfo {
    pub path: String,
    pub method: String,
    pub description: String,
}

impl EndpointInfo {
    fn new(method: &str, path: &str, description: &str) -> Self {
        Self {
            path: path.to_string(),
            method: method.to_string(),
            description: description.to_string(),
        }
    }
}

/// GET / - Root info
pub async fn root(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let response = RootResponse {
        name: "Sheetbind API Server".to_string(),
        version: state.version.clone(),
        description: "Template-driven spreadsheet import and export".to_string(),
        endpoints: vec![
            EndpointInfo::new("GET", "/health", "Health check endpoint"),
            EndpointInfo::new("GET", "/version", "Get server version"),
            EndpointInfo::new("GET", "/api/v1/templates", "List loaded templates"),
            EndpointInfo::new(
                "POST",
                "/api/v1/templates/:name/import",
                "Import a workbook through a template",
            ),
            EndpointInfo::new(
                "POST",
                "/api/v1/templates/:name/export",
                "Export records to an .xlsx download",
            ),
        ],
    };
    Json(ApiResponse::ok(response))
}

/// Health check response
#[derive(Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub uptime_message: String,
}

/// GET /health - Health check
pub async fn health() -> impl IntoResponse {
    Json(ApiResponse::ok(HealthResponse {
        status: "healthy".to_string(),
        uptime_message: "Server is running".to_string(),
    }))
}

/// Version response
#[derive(Serialize, Deserialize)]
pub struct VersionResponse {
    pub version: String,
    pub features: Vec<String>,
}

/// GET /version - Server version
pub async fn version(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(ApiResponse::ok(VersionResponse {
        version: state.version.clone(),
        features: vec!["templates".to_string(), "import".to_string(), "export".to_string()],
    }))
}

/// Column summary in the template listing
#[derive(Serialize, Deserialize)]
pub struct ColumnSummary {
    pub title: String,
    pub field: String,
    pub required: bool,
    pub max_length: usize,
    #[serde(rename = "type")]
    pub kind: String,
}

/// Template summary
#[derive(Serialize, Deserialize)]
pub struct TemplateSummary {
    pub name: String,
    pub filename: String,
    pub sheet: String,
    pub columns: Vec<ColumnSummary>,
}

/// GET /api/v1/templates - List loaded templates
pub async fn list_templates(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let templates: Vec<TemplateSummary> = state
        .templates
        .values()
        .map(|loaded| TemplateSummary {
            name: loaded.config.name.clone(),
            filename: loaded.exporter.attachment_filename(),
            sheet: loaded.exporter.sheet_name().to_string(),
            columns: loaded
                .config
                .columns
                .iter()
                .map(|column| ColumnSummary {
                    title: column.title.clone(),
                    field: column.field.clone(),
                    required: column.required,
                    max_length: column.max_length,
                    kind: column.kind.clone(),
                })
                .collect(),
        })
        .collect();
    Json(ApiResponse::ok(templates))
}

/// Import query parameters
#[derive(Debug, Deserialize)]
pub struct ImportQuery {
    /// Upload file name; its suffix selects the workbook format
    pub filename: Option<String>,
    #[serde(default)]
    pub mode: BindMode,
}

/// Import response
#[derive(Serialize, Deserialize)]
pub struct ImportResponse {
    pub records: Vec<serde_json::Value>,
    pub rejected: Vec<RejectedRowInfo>,
    pub total_rows: usize,
}

/// Dropped row as reported to API clients
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct RejectedRowInfo {
    pub row: usize,
    pub column: usize,
    pub title: String,
    pub code: String,
    pub message: String,
}

impl From<&RejectedRow> for RejectedRowInfo {
    fn from(rejected: &RejectedRow) -> Self {
        Self {
            row: rejected.row,
            column: rejected.column,
            title: rejected.title.clone(),
            code: rejected.code.as_str().to_string(),
            message: rejected.code.message().to_string(),
        }
    }
}

fn import_records(
    state: &AppState,
    name: &str,
    query: ImportQuery,
    body: Bytes,
) -> SheetbindResult<ImportResponse> {
    let loaded = state.template(name)?;
    let filename = query.filename.as_deref().unwrap_or(DEFAULT_UPLOAD_NAME);
    let workbook = open_workbook_from_bytes(filename, body.to_vec())?;
    let rows = read_first_sheet(&workbook);

    let report = RecordImporter::new(loaded.exporter.template())
        .with_mode(query.mode)
        .import_report(&rows, DynamicRecord::new)?;

    info!(
        template = name,
        filename,
        accepted = report.records.len(),
        rejected = report.rejected.len(),
        "upload imported"
    );

    Ok(ImportResponse {
        records: report.records.iter().map(DynamicRecord::to_json).collect(),
        rejected: report.rejected.iter().map(RejectedRowInfo::from).collect(),
        total_rows: report.total_rows,
    })
}

/// POST /api/v1/templates/:name/import - Import an uploaded workbook
pub async fn import_workbook(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    Query(query): Query<ImportQuery>,
    body: Bytes,
) -> Response {
    match import_records(&state, &name, query, body) {
        Ok(response) => Json(ApiResponse::ok(response)).into_response(),
        Err(e) => error_response(e),
    }
}

/// Export request
#[derive(Debug, Deserialize)]
pub struct ExportRequest {
    pub records: serde_json::Value,
    /// Download name without extension
    pub filename: Option<String>,
    pub sheet: Option<String>,
}

fn export_records(state: &AppState, name: &str, req: ExportRequest) -> SheetbindResult<Response> {
    let loaded = state.template(name)?;
    let records = records_from_json(&req.records)?;

    let mut exporter = loaded.exporter.clone();
    if let Some(filename) = req.filename {
        exporter = exporter.with_filename(filename);
    }
    if let Some(sheet) = req.sheet {
        validate_sheet_name(&sheet)?;
        exporter = exporter.with_sheet_name(sheet);
    }

    let bytes = exporter.export_to_buffer(&records)?;
    let disposition = HeaderValue::from_bytes(exporter.content_disposition().as_bytes())
        .map_err(|e| SheetbindError::Export(format!("Invalid download name: {}", e)))?;

    info!(template = name, records = records.len(), "download rendered");

    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(XLSX_CONTENT_TYPE)),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}

/// POST /api/v1/templates/:name/export - Export records to an .xlsx download
pub async fn export_workbook(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    Json(req): Json<ExportRequest>,
) -> Response {
    export_records(&state, &name, req).unwrap_or_else(error_response)
}
