//! CLI command handlers

pub mod commands;

pub use commands::{export, import, read, template};
