//! Sheetbind API Server module
//!
//! HTTP REST API exposing template-driven import and export.
//! Run with `sheetbind-server --template api.yaml`.

pub mod handlers;
pub mod server;

pub use server::{build_router, run_api_server, ApiConfig, AppState};
