//! Sheetbind API Server implementation
//!
//! HTTP REST API server using Axum. Serves one import and one export
//! endpoint per loaded template.

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use super::handlers;
use crate::error::{SheetbindError, SheetbindResult};
use crate::excel::ExcelExporter;
use crate::parser::{self, TemplateConfig};

/// Largest accepted workbook upload
pub const MAX_UPLOAD_BYTES: usize = 32 * 1024 * 1024;

/// API Server configuration
#[derive(Clone, Debug)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
    /// Template files served by the API
    pub templates: Vec<PathBuf>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            templates: Vec::new(),
        }
    }
}

/// A template ready to serve: its configuration and export view
#[derive(Debug, Clone)]
pub struct LoadedTemplate {
    pub config: TemplateConfig,
    pub exporter: ExcelExporter,
}

impl LoadedTemplate {
    pub fn new(config: TemplateConfig) -> SheetbindResult<Self> {
        let exporter = config.exporter()?;
        Ok(Self { config, exporter })
    }
}

/// Shared application state
#[derive(Debug, Clone)]
pub struct AppState {
    pub version: String,
    pub templates: BTreeMap<String, LoadedTemplate>,
}

impl AppState {
    /// Build state from parsed templates; names must be unique
    pub fn new(configs: Vec<TemplateConfig>) -> SheetbindResult<Self> {
        let mut templates = BTreeMap::new();
        for config in configs {
            let name = config.name.clone();
            if templates.insert(name.clone(), LoadedTemplate::new(config)?).is_some() {
                return Err(SheetbindError::Template(format!(
                    "Template '{}' is declared more than once",
                    name
                )));
            }
        }
        Ok(Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            templates,
        })
    }

    /// Load every template file
    pub fn load(paths: &[PathBuf]) -> SheetbindResult<Self> {
        let configs = paths
            .iter()
            .map(|path| parser::parse_template(path))
            .collect::<SheetbindResult<Vec<_>>>()?;
        Self::new(configs)
    }

    pub fn template(&self, name: &str) -> SheetbindResult<&LoadedTemplate> {
        self.templates
            .get(name)
            .ok_or_else(|| SheetbindError::UnknownTemplate(name.to_string()))
    }
}

/// Build the router with all endpoints and middleware
pub fn build_router(state: Arc<AppState>) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health and info endpoints
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route("/version", get(handlers::version))
        // Template endpoints
        .route("/api/v1/templates", get(handlers::list_templates))
        .route("/api/v1/templates/:name/import", post(handlers::import_workbook))
        .route("/api/v1/templates/:name/export", post(handlers::export_workbook))
        // State and middleware
        .with_state(state)
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Run the API server
pub async fn run_api_server(config: ApiConfig) -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sheetbind=info,tower_http=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let state = AppState::load(&config.templates)?;
    let names: Vec<&str> = state.templates.keys().map(String::as_str).collect();
    info!("   Templates: {}", names.join(", "));
    let app = build_router(Arc::new(state));

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("📊 Sheetbind API Server starting on http://{}", addr);
    info!("   Endpoints: /api/v1/templates, /api/v1/templates/:name/import, /api/v1/templates/:name/export");
    info!("   Health: /health, Version: /version");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Sheetbind API Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, stopping server...");
}
