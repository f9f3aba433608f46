use serde::{Deserialize, Serialize};
use std::path::Path;

/// How much to refetch after a mutation is acknowledged or rejected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefreshScope {
    /// Reload only the sub-group(s) the mutation touched.
    #[default]
    Affected,
    /// Reload every cached sub-group.
    All,
}

/// Client configuration, loaded from TOML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    pub api_base_url: String,
    pub user_id: String,
    /// Whether task loads include completed tasks by default.
    #[serde(default)]
    pub contain_done: bool,
    #[serde(default)]
    pub refresh_scope: RefreshScope,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    10
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

impl ClientConfig {
    pub fn load(path: &Path) -> Result<ClientConfig, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&text)?)
    }
}
