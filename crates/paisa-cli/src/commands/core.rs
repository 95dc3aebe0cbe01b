//! Shared utilities for commands
//!
//! This module contains:
//! - `load_config` - Resolve configuration with CLI overrides
//! - `load_model` - Load the configured model artifact

use std::path::Path;

use anyhow::{Context, Result};
use paisa_core::{ForecastConfig, ForecastModel};

/// Load configuration, letting `--model` win over config and environment
pub fn load_config(config_path: Option<&Path>, model_path: Option<&Path>) -> Result<ForecastConfig> {
    let mut config = ForecastConfig::load(config_path).context("Failed to load configuration")?;
    if let Some(path) = model_path {
        config.model_path = Some(path.to_path_buf());
    }
    Ok(config)
}

/// Load the model artifact named by the configuration
pub fn load_model(config: &ForecastConfig) -> Result<ForecastModel> {
    let path = config
        .model_path
        .as_deref()
        .context("No model configured (use --model or set PAISA_MODEL_PATH)")?;
    ForecastModel::load(path)
        .with_context(|| format!("Failed to load model from {}", path.display()))
}
