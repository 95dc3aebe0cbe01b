//! Forecast handlers

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{AppError, AppState, MODEL_NOT_LOADED};
use paisa_core::models::parse_month;
use paisa_core::{ForecastPoint, MonthlyEntry, MonthlySeries};

/// Request body for a monthly forecast
///
/// History is given either as plain amounts ending at `last_month_iso`, or as
/// explicit dated entries in `history`.
#[derive(Debug, Deserialize)]
pub struct ForecastRequest {
    /// Monthly totals, oldest first
    pub monthly_amounts: Option<Vec<f64>>,
    /// Last month covered by `monthly_amounts` (e.g. "2025-10-01")
    pub last_month_iso: Option<String>,
    /// Dated monthly totals, oldest first
    pub history: Option<Vec<HistoryEntry>>,
    /// Months to forecast (defaults to the configured horizon)
    pub horizon: Option<usize>,
}

/// One dated history entry
#[derive(Debug, Deserialize)]
pub struct HistoryEntry {
    pub month: String,
    pub amount: f64,
}

/// Response for a monthly forecast
#[derive(Debug, Serialize)]
pub struct ForecastResponse {
    pub forecast: Vec<ForecastPoint>,
}

impl ForecastRequest {
    fn into_series(self) -> Result<MonthlySeries, AppError> {
        match (self.history, self.monthly_amounts, self.last_month_iso) {
            (Some(history), None, None) => {
                let entries = history
                    .into_iter()
                    .map(|e| -> paisa_core::Result<MonthlyEntry> {
                        Ok(MonthlyEntry {
                            month: parse_month(&e.month)?,
                            amount: e.amount,
                        })
                    })
                    .collect::<paisa_core::Result<Vec<_>>>()
                    .map_err(AppError::from_core)?;
                MonthlySeries::from_entries(entries).map_err(AppError::from_core)
            }
            (None, Some(amounts), Some(last_month)) => {
                let last_month = parse_month(&last_month).map_err(AppError::from_core)?;
                MonthlySeries::from_amounts(&amounts, last_month).map_err(AppError::from_core)
            }
            (None, Some(_), None) => Err(AppError::bad_request(
                "last_month_iso is required with monthly_amounts",
            )),
            (None, None, _) => Err(AppError::bad_request(
                "Provide monthly_amounts with last_month_iso, or history",
            )),
            (Some(_), _, _) => Err(AppError::bad_request(
                "Provide either history or monthly_amounts, not both",
            )),
        }
    }
}

/// POST /api/forecast/monthly - Forecast the next months of spending
///
/// Returns an empty forecast when fewer than three months of history are
/// supplied, and 503 while no model is loaded.
pub async fn forecast_monthly(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ForecastRequest>,
) -> Result<Json<ForecastResponse>, AppError> {
    let Some(model) = state.model.model() else {
        return Err(AppError::service_unavailable(MODEL_NOT_LOADED));
    };

    let requested_horizon = request.horizon;
    let history = request.into_series()?;
    let horizon = state
        .config
        .resolve_horizon(requested_horizon)
        .map_err(AppError::from_core)?;

    debug!(months = history.len(), horizon, "Forecast requested");

    let forecast = paisa_core::forecast_monthly(Some(model), &history, horizon)
        .map_err(AppError::from_core)?;

    info!(
        history = history.len(),
        points = forecast.len(),
        "Monthly forecast served"
    );

    Ok(Json(ForecastResponse { forecast }))
}
