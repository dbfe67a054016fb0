use std::path::Path;

use anyhow::{anyhow, Result};
use tracing::info;

use crate::ServiceConfig;
use crate::config::proc_loader::file_to_config;
use crate::utils::constants::DEFAULT_CONFIG_PATH;

/// Loads the service config. Only the default path may be absent, in which
/// case every setting takes its default.
pub fn run(config_path: &str) -> Result<ServiceConfig> {
    let path = Path::new(config_path);
    if !path.exists() && config_path == DEFAULT_CONFIG_PATH {
        info!("no {} found, using default settings", DEFAULT_CONFIG_PATH);
        return Ok(ServiceConfig::default());
    }
    file_to_config(path).map_err(|e| anyhow!("Invalid config '{}': {:#}", config_path, e))
}
