//! Portal configuration.
//!
//! Loaded from TOML. Every field has a default, so an empty file (or no
//! file at all) yields a working configuration.

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Directory under the user's home that holds trace files
pub const DEFAULT_TRACE_DIR: &str = ".mcportal/traces";

/// Resolve the default trace storage directory (`~/.mcportal/traces`)
///
/// # Errors
///
/// Returns error if the platform reports no home directory
pub fn default_storage_path() -> CoreResult<PathBuf> {
    dirs::home_dir()
        .map(|home| home.join(DEFAULT_TRACE_DIR))
        .ok_or(CoreError::NoHomeDirectory)
}

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortalConfig {
    /// Listener settings
    pub server: ServerSettings,
    /// Trace recording settings
    pub tracing: TracingSettings,
    /// Catalog identities to register at startup
    pub tools: Vec<String>,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            server: ServerSettings::default(),
            tracing: TracingSettings::default(),
            tools: vec!["web_search".to_string()],
        }
    }
}

impl PortalConfig {
    /// Parse configuration from a TOML string
    ///
    /// # Errors
    ///
    /// Returns error if the TOML is malformed or has wrongly typed fields
    pub fn from_toml_str(raw: &str) -> CoreResult<Self> {
        Ok(toml::from_str(raw)?)
    }

    /// Load configuration from a file
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or parsed
    pub fn load(path: &Path) -> CoreResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|err| CoreError::ConfigRead {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })?;
        Self::from_toml_str(&raw)
    }

    /// Load from `path` if given, otherwise return defaults
    ///
    /// # Errors
    ///
    /// Returns error if a given file cannot be read or parsed
    pub fn load_or_default(path: Option<&Path>) -> CoreResult<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}

/// Listener settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Bind host
    pub host: String,
    /// Bind port
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
        }
    }
}

/// Trace recording settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TracingSettings {
    /// Whether requests are recorded at all
    pub enabled: bool,
    /// Storage directory; `None` means [`default_storage_path`]
    pub storage_path: Option<PathBuf>,
}

impl Default for TracingSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            storage_path: None,
        }
    }
}

impl TracingSettings {
    /// Storage directory with the default applied
    ///
    /// # Errors
    ///
    /// Returns error if no path is configured and no home directory exists
    pub fn resolved_storage_path(&self) -> CoreResult<PathBuf> {
        match &self.storage_path {
            Some(path) => Ok(path.clone()),
            None => default_storage_path(),
        }
    }
}
