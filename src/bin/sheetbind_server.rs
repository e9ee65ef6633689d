//! Sheetbind API Server binary
//!
//! HTTP REST API for template-driven spreadsheet import and export.

use clap::Parser;
use sheetbind::api::{run_api_server, ApiConfig};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "sheetbind-server")]
#[command(version)]
#[command(about = "Sheetbind API Server - HTTP import/export for spreadsheet templates")]
#[command(long_about = r#"
Sheetbind API Server

Serves every template given with --template:
  - GET  /api/v1/templates              - List loaded templates
  - POST /api/v1/templates/:name/import - Upload a workbook, receive records
  - POST /api/v1/templates/:name/export - Send records, receive an .xlsx

Additional endpoints:
  - GET  /health           - Health check
  - GET  /version          - Server version info
  - GET  /                 - API documentation

Example usage:
  sheetbind-server --template api.yaml
  sheetbind-server -t api.yaml -t users.yaml --host 0.0.0.0 --port 3000

  curl -X POST 'http://localhost:8080/api/v1/templates/api/import?filename=apis.xlsx' \
    --data-binary @apis.xlsx
"#)]
struct Args {
    /// Template YAML file to serve (repeatable)
    #[arg(short, long = "template", required = true)]
    templates: Vec<PathBuf>,

    /// Host address to bind to (use 0.0.0.0 for all interfaces)
    #[arg(short = 'H', long, default_value = "127.0.0.1", env = "SHEETBIND_HOST")]
    host: String,

    /// Port to listen on
    #[arg(short, long, default_value = "8080", env = "SHEETBIND_PORT")]
    port: u16,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = ApiConfig {
        host: args.host,
        port: args.port,
        templates: args.templates,
    };

    run_api_server(config).await
}
