//! Forecast service configuration
//!
//! ## Configuration Resolution
//!
//! Config is loaded with a layered resolution:
//! 1. Explicit path (`--config`), if given
//! 2. Override in data dir (~/.local/share/paisa/config/forecast.toml)
//! 3. Embedded defaults (compiled into binary)
//!
//! `PAISA_MODEL_PATH` then overrides the model path from whichever file won.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::forecast::DEFAULT_HORIZON;

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/forecast.toml");

/// Environment variable overriding the model artifact path
pub const MODEL_PATH_ENV: &str = "PAISA_MODEL_PATH";

/// Resolved forecast configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastConfig {
    /// Model artifact to load at startup
    pub model_path: Option<PathBuf>,
    /// Horizon used when a request does not specify one
    pub default_horizon: usize,
    /// Upper bound on requested horizons
    pub max_horizon: usize,
    /// Allowed CORS origins
    pub allowed_origins: Vec<String>,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            model_path: None,
            default_horizon: DEFAULT_HORIZON,
            max_horizon: 24,
            allowed_origins: vec![],
        }
    }
}

impl ForecastConfig {
    /// Load configuration, applying the environment override
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut config = load_config(explicit)?;
        if let Some(path) = std::env::var_os(MODEL_PATH_ENV).filter(|p| !p.is_empty()) {
            config.model_path = Some(PathBuf::from(path));
        }
        Ok(config)
    }

    /// Resolve the horizon for a request
    pub fn resolve_horizon(&self, requested: Option<usize>) -> Result<usize> {
        let horizon = requested.unwrap_or(self.default_horizon);
        if horizon == 0 || horizon > self.max_horizon {
            return Err(Error::MalformedInput(format!(
                "Horizon must be between 1 and {} months (got {})",
                self.max_horizon, horizon
            )));
        }
        Ok(horizon)
    }
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("paisa").join("config").join("forecast.toml"))
}

/// Load configuration (explicit path first, then override, then default)
fn load_config(explicit: Option<&Path>) -> Result<ForecastConfig> {
    let content = match explicit {
        Some(path) => fs::read_to_string(path).map_err(|e| {
            Error::InvalidData(format!("Failed to read config {}: {}", path.display(), e))
        })?,
        None => match default_config_path() {
            Some(path) if path.exists() => fs::read_to_string(&path)
                .map_err(|e| Error::InvalidData(format!("Failed to read config: {}", e)))?,
            _ => DEFAULT_CONFIG.to_string(),
        },
    };

    parse_config(&content)
}

/// Raw config structure for TOML parsing
#[derive(Debug, Deserialize)]
struct RawConfig {
    model: Option<RawModel>,
    forecast: Option<RawForecast>,
    server: Option<RawServer>,
}

#[derive(Debug, Deserialize)]
struct RawModel {
    path: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct RawForecast {
    default_horizon: Option<usize>,
    max_horizon: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct RawServer {
    allowed_origins: Option<Vec<String>>,
}

/// Parse config from TOML content
fn parse_config(content: &str) -> Result<ForecastConfig> {
    let raw: RawConfig = toml::from_str(content)
        .map_err(|e| Error::InvalidData(format!("Invalid config TOML: {}", e)))?;

    let mut config = ForecastConfig::default();

    if let Some(model) = raw.model {
        config.model_path = model.path;
    }

    if let Some(forecast) = raw.forecast {
        if let Some(max) = forecast.max_horizon {
            config.max_horizon = max;
        }
        if let Some(default) = forecast.default_horizon {
            config.default_horizon = default;
        }
    }

    if let Some(server) = raw.server {
        if let Some(origins) = server.allowed_origins {
            config.allowed_origins = origins;
        }
    }

    if config.max_horizon == 0 {
        return Err(Error::InvalidData(
            "forecast.max_horizon must be at least 1".to_string(),
        ));
    }
    if config.default_horizon == 0 || config.default_horizon > config.max_horizon {
        return Err(Error::InvalidData(format!(
            "forecast.default_horizon must be between 1 and {}",
            config.max_horizon
        )));
    }

    Ok(config)
}
