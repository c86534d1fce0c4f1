//! Configuration for consulta-cnpj.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::ConsultaResult;

/// Default configuration file name.
pub const DEFAULT_CONFIG_FILE: &str = "consulta-cnpj.toml";

/// Main configuration for consulta-cnpj.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Remote registry settings.
    #[serde(default)]
    pub registry: RegistryConfig,

    /// Local record store settings.
    #[serde(default)]
    pub store: StoreConfig,

    /// Connectivity check settings.
    #[serde(default)]
    pub network: NetworkConfig,
}

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log format (text, json).
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

/// Remote registry settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Base URL; the CNPJ is appended as the last path segment.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout (in seconds).
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// User-Agent header sent with each request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

impl RegistryConfig {
    /// Sets the base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

fn default_base_url() -> String {
    "https://open.cnpja.com/office".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_user_agent() -> String {
    concat!("consulta-cnpj/", env!("CARGO_PKG_VERSION")).to_string()
}

/// Local record store settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreConfig {
    /// CSV file path. When absent, the per-user data directory is used.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl StoreConfig {
    /// Resolves the effective store path.
    pub fn resolved_path(&self) -> PathBuf {
        self.path.clone().unwrap_or_else(default_store_path)
    }
}

/// Per-user location of the record file.
pub fn default_store_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("consulta-cnpj")
        .join("consultas.csv")
}

/// Connectivity check settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Checks connectivity before spending quota.
    #[serde(default = "default_true")]
    pub probe_enabled: bool,

    /// Connection attempt timeout (in seconds).
    #[serde(default = "default_probe_timeout")]
    pub probe_timeout_secs: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            probe_enabled: true,
            probe_timeout_secs: default_probe_timeout(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_probe_timeout() -> u64 {
    3
}

impl Config {
    /// Loads configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> ConsultaResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Saves configuration to a TOML file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> ConsultaResult<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Creates default configuration.
    pub fn default_config() -> Self {
        Self {
            general: GeneralConfig::default(),
            registry: RegistryConfig::default(),
            store: StoreConfig::default(),
            network: NetworkConfig::default(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}
