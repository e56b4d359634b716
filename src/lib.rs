//! Parade - derived state for an issue and agent dashboard.
//!
//! This library provides the core functionality for the `parade` CLI tool:
//! loading issue, agent, cost and workflow snapshots, and deriving the views
//! a dashboard renders from them (lifecycle groups, focus lists, workflow
//! rows, agent problems and throughput).

pub mod cli;
pub mod commands;
pub mod config;
pub mod engine;
pub mod models;
pub mod snapshot;

use std::path::PathBuf;

/// Library-level error type for Parade operations.
///
/// The engine itself is infallible; errors only come from loading snapshots,
/// reading configuration and validating user input.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Invalid snapshot {}: line {line}: {message}", path.display())]
    Snapshot {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type alias for Parade operations.
pub type Result<T> = std::result::Result<T, Error>;
