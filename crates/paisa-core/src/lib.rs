//! Paisa Core Library
//!
//! Shared functionality for the Paisa monthly expense forecaster:
//! - Monthly spending series and forecast points
//! - Lag/rolling feature derivation
//! - Pre-trained predictors loaded from JSON artifacts
//! - The autoregressive multi-month forecast loop
//! - Layered TOML configuration

pub mod config;
pub mod error;
pub mod features;
pub mod forecast;
pub mod mock;
pub mod models;
pub mod predictor;

pub use config::ForecastConfig;
pub use error::{Error, Result};
pub use features::{FeatureName, FeatureVector};
pub use forecast::{forecast_monthly, ForecastSteps, Forecaster, DEFAULT_HORIZON};
pub use mock::MockPredictor;
pub use models::{ForecastPoint, MonthlyEntry, MonthlySeries, MIN_HISTORY};
pub use predictor::{ForecastModel, ModelArtifact, ModelSummary, Predictor};
