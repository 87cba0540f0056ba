use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub const DEFAULT_BASE_URL: &str = "https://api.flow.swiss/";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub const ENV_TOKEN: &str = "FLOW_TOKEN";
pub const ENV_BASE_URL: &str = "FLOW_BASE_URL";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
}

/// Connection settings for the compute API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub token: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_user_agent() -> String {
    format!("tfflow/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            token: String::new(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

impl Config {
    /// Apply FLOW_TOKEN / FLOW_BASE_URL on top of whatever was loaded
    pub fn apply_env_overrides(&mut self) {
        if let Ok(token) = std::env::var(ENV_TOKEN) {
            if !token.is_empty() {
                debug!("Using API token from {}", ENV_TOKEN);
                self.api.token = token;
            }
        }
        if let Ok(base_url) = std::env::var(ENV_BASE_URL) {
            if !base_url.is_empty() {
                info!("Using API base URL from {}: {}", ENV_BASE_URL, base_url);
                self.api.base_url = base_url;
            }
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        let base_url = self.api.base_url.trim();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            bail!("Invalid API base URL '{}': expected http(s) URL", base_url);
        }
        if self.api.timeout_secs == 0 {
            bail!("API timeout must be greater than zero");
        }
        if self.api.token.is_empty() {
            warn!(
                "No API token configured; set {} or api.token in the config file",
                ENV_TOKEN
            );
        }
        Ok(())
    }
}

/// Default location of the config file, `<config dir>/tfflow/config.json`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("tfflow").join("config.json"))
}

pub fn load_from_file(path: &Path) -> anyhow::Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    let config: Config = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse config file {}", path.display()))?;
    Ok(config)
}

pub fn init_from_path(path: &str) -> anyhow::Result<Config> {
    let mut config = load_from_file(Path::new(path))?;
    config.apply_env_overrides();
    config.validate()?;
    Ok(config)
}

pub fn init_default() -> anyhow::Result<Config> {
    let mut config = match default_config_path() {
        Some(path) if path.exists() => {
            info!("Loading config from {}", path.display());
            load_from_file(&path)?
        }
        _ => {
            debug!("No config file found, using built-in defaults");
            Config::default()
        }
    };
    config.apply_env_overrides();
    config.validate()?;
    Ok(config)
}
