//! Configuration for sessions, source builders and the filter-map interpreter
//!
//! All keys are optional in the TOML file:
//!
//! ```toml
//! [session]
//! page_limit = 20
//! default_page_size = 20
//! id_field = "id"
//! scroll_keep_alive = "1m"
//!
//! [source]
//! default_size = 10
//!
//! [filters]
//! per_value_term_fields = ["tags"]
//! ```

use crate::error::Error;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Main configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Default)]
pub struct Config {
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub filters: FilterConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SessionConfig {
    /// A cursor is only produced when the total exceeds this
    #[serde(default = "default_page_limit")]
    pub page_limit: u64,
    /// Page size used by `page(n, None)`
    #[serde(default = "default_page_size")]
    pub default_page_size: u64,
    /// Source field identifying a row
    #[serde(default = "default_id_field")]
    pub id_field: String,
    #[serde(default = "default_scroll_keep_alive")]
    pub scroll_keep_alive: String,
}

fn default_page_limit() -> u64 {
    20
}

fn default_page_size() -> u64 {
    20
}

fn default_id_field() -> String {
    "id".to_string()
}

fn default_scroll_keep_alive() -> String {
    "1m".to_string()
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            page_limit: default_page_limit(),
            default_page_size: default_page_size(),
            id_field: default_id_field(),
            scroll_keep_alive: default_scroll_keep_alive(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SourceConfig {
    #[serde(default = "default_source_size")]
    pub default_size: u64,
}

fn default_source_size() -> u64 {
    10
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            default_size: default_source_size(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Default)]
pub struct FilterConfig {
    /// Fields whose array values become one `term` per value instead of a single `terms`
    #[serde(default)]
    pub per_value_term_fields: Vec<String>,
}

impl Config {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(e.to_string()))
    }

    /// Load config from a file path
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Load config from a file path, falling back to defaults when the file is absent
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!(path = %path.display(), "config file not found, using defaults");
            Ok(Config::default())
        }
    }

    /// Save config to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, content)?;
        Ok(())
    }
}
