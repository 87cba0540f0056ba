use crate::compute::api::ComputeApi;
use crate::compute::client::{ComputeError, FlowClient};
use crate::config::{self, Config};
use crate::provider::host::FlowProvider;
use crate::shared::logging;
use std::path::PathBuf;
use std::sync::Arc;

pub const CONFIG_PATH_ENV: &str = "TFFLOW_CONFIG";

#[derive(Debug, thiserror::Error)]
pub enum TfFlowError {
    #[error("Failed to create compute client: {0}")]
    Client(#[from] ComputeError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Application facade: loaded configuration plus the provider host wired to
/// a compute client.
pub struct TfFlow {
    config: Config,
    provider: Arc<FlowProvider>,
}

impl TfFlow {
    pub fn new(config_path: Option<String>) -> Result<Self, TfFlowError> {
        // Priority for the config file:
        // 1. Command line argument
        // 2. TFFLOW_CONFIG environment variable
        // 3. Default config location
        let config_path = config_path.or_else(|| {
            let env_path = std::env::var(CONFIG_PATH_ENV).ok();
            if let Some(path) = &env_path {
                logging::info(&format!(
                    "Found {} environment variable: {}",
                    CONFIG_PATH_ENV, path
                ));
            }
            env_path
        });

        let config = match config_path {
            Some(path) => {
                let path_buf = PathBuf::from(&path);
                let abs_path = if path_buf.is_absolute() {
                    path_buf
                } else {
                    std::env::current_dir()
                        .map_err(anyhow::Error::from)?
                        .join(path_buf)
                };
                logging::info(&format!("Using config file: {}", abs_path.display()));
                config::init_from_path(&abs_path.to_string_lossy())?
            }
            None => {
                logging::debug("No config path provided, using default configuration");
                config::init_default()?
            }
        };

        let client = FlowClient::new(&config.api)?;
        logging::info(&format!("Using compute API at {}", client.base_url()));

        Ok(Self::with_client(config, Arc::new(client)))
    }

    /// Build around an existing compute client
    pub fn with_client(config: Config, client: Arc<dyn ComputeApi>) -> Self {
        Self {
            config,
            provider: Arc::new(FlowProvider::new(client)),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn provider(&self) -> Arc<FlowProvider> {
        Arc::clone(&self.provider)
    }
}
