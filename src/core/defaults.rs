use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::clone::{ReplaceMode, TraversalMode, DEFAULT_MARKER, DEFAULT_MAX_DOCUMENTS, DEFAULT_SEPARATOR};
use crate::error::{Error, Result};
use crate::paths;
use crate::utils::io;

/// Root configuration structure for dashclone.json
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DashcloneConfig {
    #[serde(default)]
    pub defaults: Defaults,
}

/// All configurable defaults that can be overridden via dashclone.json
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Defaults {
    #[serde(default = "default_prefix_separator")]
    pub prefix_separator: String,

    #[serde(default = "default_reference_marker")]
    pub reference_marker: String,

    /// Directory holding the source dashboards and saved searches.
    #[serde(default = "default_source_dir")]
    pub source_dir: String,

    /// Directory receiving the cloned artifacts.
    #[serde(default = "default_work_dir")]
    pub work_dir: String,

    /// Parent of the per-run timestamped backup directories.
    #[serde(default = "default_backup_dir")]
    pub backup_dir: String,

    #[serde(default = "default_true")]
    pub backup: bool,

    #[serde(default)]
    pub overwrite: bool,

    #[serde(default)]
    pub traversal: TraversalMode,

    #[serde(default)]
    pub replace: ReplaceMode,

    #[serde(default = "default_max_documents")]
    pub max_documents: usize,

    /// Base URL of a remote artifact endpoint, used instead of `source_dir` when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_url: Option<String>,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            prefix_separator: default_prefix_separator(),
            reference_marker: default_reference_marker(),
            source_dir: default_source_dir(),
            work_dir: default_work_dir(),
            backup_dir: default_backup_dir(),
            backup: default_true(),
            overwrite: false,
            traversal: TraversalMode::default(),
            replace: ReplaceMode::default(),
            max_documents: default_max_documents(),
            remote_url: None,
        }
    }
}

fn default_prefix_separator() -> String {
    DEFAULT_SEPARATOR.to_string()
}

fn default_reference_marker() -> String {
    DEFAULT_MARKER.to_string()
}

fn default_source_dir() -> String {
    ".".to_string()
}

fn default_work_dir() -> String {
    "temp".to_string()
}

fn default_backup_dir() -> String {
    "temp".to_string()
}

fn default_true() -> bool {
    true
}

fn default_max_documents() -> usize {
    DEFAULT_MAX_DOCUMENTS
}

// =============================================================================
// Loading
// =============================================================================

/// Load the full dashclone.json config.
/// A missing file yields built-in defaults; an unreadable or invalid one is an error.
pub fn load_config() -> Result<DashcloneConfig> {
    load_config_from(&paths::dashclone_json()?)
}

/// Load config from an explicit path.
pub fn load_config_from(path: &Path) -> Result<DashcloneConfig> {
    if !path.exists() {
        return Ok(DashcloneConfig::default());
    }

    let content = io::read_file(path, &format!("read {}", path.display()))?;
    let config: DashcloneConfig = serde_json::from_str(&content)
        .map_err(|e| Error::config_invalid_json(path.display().to_string(), e))?;

    if config.defaults.max_documents == 0 {
        return Err(Error::config_invalid_value(
            "defaults.max_documents",
            Some("0".to_string()),
            "max_documents must be at least 1",
        ));
    }

    Ok(config)
}

/// Load defaults, merging file config with built-in defaults.
pub fn load_defaults() -> Result<Defaults> {
    Ok(load_config()?.defaults)
}

/// Get the path to dashclone.json (for display purposes)
pub fn config_path() -> Result<String> {
    Ok(paths::dashclone_json()?.display().to_string())
}

/// Get built-in defaults (ignoring any file config)
pub fn builtin_defaults() -> Defaults {
    Defaults::default()
}
