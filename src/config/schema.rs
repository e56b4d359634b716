//! KDL schema for config.kdl.
//!
//! This module provides:
//! - The [`ParadeConfig`] struct mirroring the file
//! - Parsing from KDL documents
//! - Validation of user-supplied values

use kdl::{KdlDocument, KdlNode};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Output format preference for CLI commands.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// JSON output (default, machine-readable)
    #[default]
    Json,
    /// Plain-text output
    Human,
}

impl OutputFormat {
    /// Parse from string, case-insensitive.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "json" => Some(OutputFormat::Json),
            "human" => Some(OutputFormat::Human),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Human => "human",
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Dashboard preferences stored in config.kdl.
///
/// # KDL Schema
///
/// ```kdl
/// blocking-types "blocks" "parent-child"
/// user "alice"
/// output-format "human"  // or "json"
/// focus-ready-cap 5
/// focus-blocked-cap 3
/// issues ".beads/issues.jsonl"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParadeConfig {
    /// Dependency types that gate work; `None` keeps the built-in set
    pub blocking_types: Option<Vec<String>>,

    /// Operator identity for the focus list
    pub user: Option<String>,

    /// Default output format for CLI commands
    pub output_format: Option<OutputFormat>,

    pub focus_ready_cap: Option<usize>,

    pub focus_blocked_cap: Option<usize>,

    /// Issue snapshot path
    pub issues: Option<PathBuf>,
}

fn first_string(node: &KdlNode) -> Option<String> {
    node.entries()
        .first()
        .and_then(|e| e.value().as_string())
        .map(|s| s.to_string())
}

/// Negative integers map to zero so validation rejects them.
fn first_count(node: &KdlNode) -> Option<usize> {
    node.entries()
        .first()
        .and_then(|e| e.value().as_integer())
        .map(|i| usize::try_from(i).unwrap_or(0))
}

impl ParadeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the config values.
    ///
    /// Returns an error message if any value is invalid.
    pub fn validate(&self) -> Result<(), String> {
        if let Some(types) = &self.blocking_types {
            if types.is_empty() {
                return Err("blocking-types needs at least one type".to_string());
            }
            if types.iter().any(|t| t.trim().is_empty()) {
                return Err("blocking-types must not contain empty names".to_string());
            }
        }
        if self.focus_ready_cap == Some(0) {
            return Err("focus-ready-cap must be at least 1".to_string());
        }
        if self.focus_blocked_cap == Some(0) {
            return Err("focus-blocked-cap must be at least 1".to_string());
        }
        Ok(())
    }

    /// Parse config from a KDL document.
    ///
    /// Unknown nodes and entries of the wrong type are ignored.
    pub fn from_kdl(doc: &KdlDocument) -> Self {
        let mut config = Self::new();

        if let Some(node) = doc.get("blocking-types") {
            let types: Vec<String> = node
                .entries()
                .iter()
                .filter(|e| e.name().is_none())
                .filter_map(|e| e.value().as_string())
                .map(|s| s.to_string())
                .collect();
            config.blocking_types = Some(types);
        }

        config.user = doc.get("user").and_then(first_string);

        config.output_format = doc
            .get("output-format")
            .and_then(first_string)
            .and_then(|s| OutputFormat::parse(&s));

        config.focus_ready_cap = doc.get("focus-ready-cap").and_then(first_count);
        config.focus_blocked_cap = doc.get("focus-blocked-cap").and_then(first_count);

        config.issues = doc.get("issues").and_then(first_string).map(PathBuf::from);

        config
    }
}
