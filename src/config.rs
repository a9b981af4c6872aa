use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::ipc::address::EndpointNamespace;

// =============================================================================
// Endpoint naming constants
// =============================================================================

/// Tag placed between the namespace prefix and the group name of every endpoint
pub const ENDPOINT_TAG: &str = "host-proxy-";

/// Reserved namespace for local IPC endpoints
#[cfg(windows)]
pub const DEFAULT_ENDPOINT_PREFIX: &str = r"\\.\pipe\";

/// Reserved namespace for local IPC endpoints
#[cfg(not(windows))]
pub const DEFAULT_ENDPOINT_PREFIX: &str = "/run/";

/// Default log filter when neither the config nor `RUST_LOG` sets one
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Agent configuration structure
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct AgentConfig {
    pub endpoints: EndpointsConfig,
    pub log: LogConfig,
}

impl AgentConfig {
    /// Load configuration from a JSON file; missing fields use defaults
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Namespace all endpoint addresses are created in
    pub fn namespace(&self) -> EndpointNamespace {
        match &self.endpoints.prefix {
            Some(prefix) => EndpointNamespace::new(prefix.clone()),
            None => EndpointNamespace::default(),
        }
    }
}

/// Endpoint-related configuration
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct EndpointsConfig {
    /// Overrides [`DEFAULT_ENDPOINT_PREFIX`]
    pub prefix: Option<String>,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct LogConfig {
    pub level: String,
    /// Directory for the agent's daily log files; defaults to [`log_dir`]
    pub directory: Option<PathBuf>,
}

impl LogConfig {
    /// The configured log directory, or [`log_dir`] when none is set
    pub fn directory_or_default(&self) -> PathBuf {
        self.directory.clone().unwrap_or_else(log_dir)
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            directory: None,
        }
    }
}

/// Returns the path to the data directory for host-proxy.
/// Uses $XDG_DATA_HOME/host-proxy if XDG_DATA_HOME is set,
/// otherwise falls back to ~/.local/share/host-proxy,
/// or ./host-proxy if neither is available.
pub fn data_dir() -> PathBuf {
    data_dir_with_env(std::env::var("XDG_DATA_HOME").ok(), dirs::home_dir())
}

/// Returns the default directory for log files.
pub fn log_dir() -> PathBuf {
    data_dir().join("logs")
}

fn data_dir_with_env(xdg_data_home: Option<String>, home_dir: Option<PathBuf>) -> PathBuf {
    let data_dir = xdg_data_home
        .map(PathBuf::from)
        .or_else(|| home_dir.map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));

    data_dir.join("host-proxy")
}
