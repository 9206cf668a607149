//! Configuration schema for tomcat-home
//!
//! Configuration is stored at `~/.config/tomcat-home/config.toml`

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Archive download cache
    pub cache: CacheConfig,

    /// Tomcat layer settings
    pub tomcat: TomcatConfig,
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Enable verbose logging
    pub verbose: bool,

    /// Log format: "text" or "json"
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            verbose: false,
            log_format: "text".to_string(),
        }
    }
}

/// Download cache configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Where archives are stored (default: `~/.cache/tomcat-home/artifacts`)
    pub dir: Option<PathBuf>,

    /// Never download; only cached or local archives are used
    pub offline: bool,
}

/// Tomcat layer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TomcatConfig {
    /// Launch env var pointing at the installation
    pub env_var: String,

    /// Command shared by the task, tomcat and web processes
    pub command: String,

    /// Version written into the plan by detect (none = buildpack default)
    pub default_version: Option<String>,
}

impl Default for TomcatConfig {
    fn default() -> Self {
        Self {
            env_var: crate::home::CATALINA_HOME.to_string(),
            command: crate::home::DEFAULT_COMMAND.to_string(),
            default_version: None,
        }
    }
}
