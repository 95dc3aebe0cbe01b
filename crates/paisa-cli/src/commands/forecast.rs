//! Offline forecast command

use anyhow::{Context, Result};
use paisa_core::models::parse_month;
use paisa_core::{forecast_monthly, ForecastConfig, ForecastModel, ForecastPoint, MonthlySeries};
use tracing::debug;

use super::load_model;

/// Run the forecast loop for command-line amounts
pub fn build_forecast(
    model: &ForecastModel,
    config: &ForecastConfig,
    amounts: &[f64],
    last_month: &str,
    horizon: Option<usize>,
) -> Result<Vec<ForecastPoint>> {
    let last_month = parse_month(last_month).context("Invalid --last-month")?;
    let horizon = config.resolve_horizon(horizon)?;
    let history = MonthlySeries::from_amounts(amounts, last_month)?;
    debug!(months = history.len(), horizon, model = model.kind(), "Running forecast");

    Ok(forecast_monthly(Some(model), &history, horizon)?)
}

pub fn cmd_forecast(
    config: &ForecastConfig,
    amounts: &[f64],
    last_month: &str,
    horizon: Option<usize>,
    json: bool,
) -> Result<()> {
    let model = load_model(config)?;
    let forecast = build_forecast(&model, config, amounts, last_month, horizon)?;

    if json {
        let body = serde_json::json!({ "forecast": forecast });
        println!("{}", serde_json::to_string_pretty(&body)?);
        return Ok(());
    }

    if forecast.is_empty() {
        println!(
            "Not enough history to forecast (need at least {} months, got {})",
            paisa_core::MIN_HISTORY,
            amounts.len()
        );
        return Ok(());
    }

    println!(
        "📈 Forecast ({} months, {} model)",
        forecast.len(),
        model.kind()
    );
    println!();
    println!("   {:<12} {:>14}", "Month", "Predicted");
    println!("   {}", "-".repeat(27));
    for point in &forecast {
        println!(
            "   {:<12} {:>14.2}",
            point.month.format("%Y-%m-%d"),
            point.amount
        );
    }

    Ok(())
}
