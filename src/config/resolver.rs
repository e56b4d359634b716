//! Precedence resolution for configuration.
//!
//! ## Precedence (highest to lowest)
//!
//! 1. CLI flags (passed at runtime)
//! 2. Environment variables (`PARADE_USER`, `PARADE_ISSUES`)
//! 3. config.kdl
//! 4. Built-in defaults

use serde::Serialize;
use std::path::PathBuf;

use crate::config::{OutputFormat, ParadeConfig, load_config};
use crate::engine::focus::{DEFAULT_BLOCKED_CAP, DEFAULT_READY_CAP};
use crate::engine::{BlockingTypes, FocusCaps};
use crate::{Error, Result};

/// Environment variable naming the operator.
pub const USER_ENV: &str = "PARADE_USER";

/// Environment variable pointing at the issue snapshot.
pub const ISSUES_ENV: &str = "PARADE_ISSUES";

/// Issue snapshot used when nothing else is configured.
pub const DEFAULT_ISSUES_PATH: &str = ".beads/issues.jsonl";

/// Tracks where a resolved value came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueSource {
    /// Value from CLI flag
    CliFlag,
    /// Value from environment variable
    EnvVar(String),
    /// Value from config.kdl
    File,
    /// Built-in default value
    Default,
}

impl std::fmt::Display for ValueSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueSource::CliFlag => write!(f, "cli"),
            ValueSource::EnvVar(name) => write!(f, "env:{}", name),
            ValueSource::File => write!(f, "file"),
            ValueSource::Default => write!(f, "default"),
        }
    }
}

impl Serialize for ValueSource {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A resolved value with its source.
#[derive(Debug, Clone, Serialize)]
pub struct Resolved<T> {
    pub value: T,
    pub source: ValueSource,
}

impl<T> Resolved<T> {
    pub fn new(value: T, source: ValueSource) -> Self {
        Self { value, source }
    }
}

/// Fully resolved configuration with source tracking.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedConfig {
    pub blocking_types: Resolved<Vec<String>>,
    /// Operator identity, unset when no layer provides one
    pub user: Option<Resolved<String>>,
    pub output_format: Resolved<OutputFormat>,
    pub focus_ready_cap: Resolved<usize>,
    pub focus_blocked_cap: Resolved<usize>,
    pub issues: Resolved<PathBuf>,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            blocking_types: Resolved::new(BlockingTypes::default().sorted(), ValueSource::Default),
            user: None,
            output_format: Resolved::new(OutputFormat::Json, ValueSource::Default),
            focus_ready_cap: Resolved::new(DEFAULT_READY_CAP, ValueSource::Default),
            focus_blocked_cap: Resolved::new(DEFAULT_BLOCKED_CAP, ValueSource::Default),
            issues: Resolved::new(PathBuf::from(DEFAULT_ISSUES_PATH), ValueSource::Default),
        }
    }
}

impl ResolvedConfig {
    pub fn blocking_types(&self) -> BlockingTypes {
        BlockingTypes::new(self.blocking_types.value.iter().cloned())
    }

    /// The operator name, or an empty string when unknown.
    pub fn user(&self) -> &str {
        self.user.as_ref().map(|r| r.value.as_str()).unwrap_or("")
    }

    pub fn human(&self) -> bool {
        self.output_format.value == OutputFormat::Human
    }

    pub fn focus_caps(&self) -> FocusCaps {
        FocusCaps::new(self.focus_ready_cap.value, self.focus_blocked_cap.value)
    }

    pub fn issues(&self) -> &std::path::Path {
        &self.issues.value
    }
}

/// CLI overrides for configuration resolution.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// Replaces the configured set when non-empty
    pub blocking_types: Vec<String>,
    pub user: Option<String>,
    pub output_format: Option<OutputFormat>,
    pub focus_ready_cap: Option<usize>,
    pub focus_blocked_cap: Option<usize>,
    pub issues: Option<PathBuf>,
}

impl ConfigOverrides {
    fn validate(&self) -> Result<()> {
        if self.blocking_types.iter().any(|t| t.trim().is_empty()) {
            return Err(Error::InvalidInput("blocking type must not be empty".to_string()));
        }
        if self.focus_ready_cap == Some(0) || self.focus_blocked_cap == Some(0) {
            return Err(Error::InvalidInput("focus caps must be at least 1".to_string()));
        }
        Ok(())
    }
}

fn pick<T>(cli: Option<T>, env: Option<(T, &str)>, file: Option<T>) -> Option<Resolved<T>> {
    if let Some(value) = cli {
        Some(Resolved::new(value, ValueSource::CliFlag))
    } else if let Some((value, name)) = env {
        Some(Resolved::new(value, ValueSource::EnvVar(name.to_string())))
    } else {
        file.map(|value| Resolved::new(value, ValueSource::File))
    }
}

/// Resolve configuration from already-loaded layers.
///
/// `env` looks up an environment variable; empty values count as unset.
pub fn resolve_with<F>(file: &ParadeConfig, overrides: &ConfigOverrides, env: F) -> Result<ResolvedConfig>
where
    F: Fn(&str) -> Option<String>,
{
    overrides.validate()?;
    file.validate().map_err(Error::Config)?;

    let lookup = |name: &'static str| env(name).filter(|v| !v.trim().is_empty()).map(|v| (v, name));
    let mut result = ResolvedConfig::default();

    let cli_types = Some(overrides.blocking_types.clone()).filter(|t| !t.is_empty());
    if let Some(types) = pick(cli_types, None, file.blocking_types.clone()) {
        let set = BlockingTypes::new(types.value);
        result.blocking_types = Resolved::new(set.sorted(), types.source);
    }

    result.user = pick(overrides.user.clone(), lookup(USER_ENV), file.user.clone());

    if let Some(format) = pick(overrides.output_format.clone(), None, file.output_format.clone()) {
        result.output_format = format;
    }
    if let Some(cap) = pick(overrides.focus_ready_cap, None, file.focus_ready_cap) {
        result.focus_ready_cap = cap;
    }
    if let Some(cap) = pick(overrides.focus_blocked_cap, None, file.focus_blocked_cap) {
        result.focus_blocked_cap = cap;
    }

    let env_issues = lookup(ISSUES_ENV).map(|(v, name)| (PathBuf::from(v), name));
    if let Some(issues) = pick(overrides.issues.clone(), env_issues, file.issues.clone()) {
        result.issues = issues;
    }

    Ok(result)
}

/// Resolve configuration with the full precedence chain, reading config.kdl
/// and the process environment.
pub fn resolve_config(overrides: &ConfigOverrides) -> Result<ResolvedConfig> {
    let file = load_config()?;
    resolve_with(&file, overrides, |name| std::env::var(name).ok())
}
