use serde::Deserialize;
use std::path::Path;

use crate::aggregator::MAX_RESULTS;

/// Desktop browser identity; some sites refuse requests from obvious bots.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/125.0.0.0 Safari/537.36";

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Transport timeout for every outbound request, in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    /// Cap on the aggregated result list
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

fn default_bind() -> String {
    "0.0.0.0:3000".to_string()
}

fn default_user_agent() -> String {
    BROWSER_USER_AGENT.to_string()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_max_results() -> usize {
    MAX_RESULTS
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            user_agent: default_user_agent(),
            request_timeout_secs: default_request_timeout(),
            max_results: default_max_results(),
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load from `path` if it exists, otherwise fall back to defaults.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse config from a TOML string (useful for testing)
    pub fn from_str(content: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }
}
