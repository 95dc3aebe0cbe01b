//! Autoregressive monthly expense forecasting
//!
//! Each step derives lag/rolling features from the three most recent months,
//! asks the model for the next month, clamps the result at zero, rounds it to
//! cents and appends it to a private working copy of the history. Later steps
//! therefore see earlier predictions as their most recent data.
//!
//! ```rust,ignore
//! let model = ForecastModel::load(Path::new("budget_forecast_model.json"))?;
//! let history = MonthlySeries::from_amounts(&[1000.0, 1200.0, 1100.0], last_month)?;
//! let points = Forecaster::new(&model).forecast(&history, 3)?;
//! ```

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::features::FeatureVector;
use crate::models::{next_month, round_cents, ForecastPoint, MonthlySeries, MIN_HISTORY};
use crate::predictor::ForecastModel;

/// Number of months forecast when the caller does not ask for a horizon
pub const DEFAULT_HORIZON: usize = 3;

/// Runs the autoregressive loop against a loaded model
#[derive(Debug, Clone, Copy)]
pub struct Forecaster<'a> {
    model: &'a ForecastModel,
}

impl<'a> Forecaster<'a> {
    pub fn new(model: &'a ForecastModel) -> Self {
        Self { model }
    }

    /// Lazily forecast `horizon` months after the end of `history`.
    ///
    /// The returned iterator owns its own copy of the history and yields at
    /// most `horizon` items. It stops after the first error.
    pub fn steps(&self, history: &MonthlySeries, horizon: usize) -> Result<ForecastSteps<'a>> {
        if horizon == 0 {
            return Err(Error::MalformedInput(
                "Horizon must be at least one month".to_string(),
            ));
        }
        if !history.is_sufficient() {
            return Err(Error::InsufficientHistory {
                found: history.len(),
                required: MIN_HISTORY,
            });
        }

        Ok(ForecastSteps {
            model: self.model,
            working: history.clone(),
            remaining: horizon,
            done: false,
        })
    }

    /// Forecast `horizon` months, all or nothing.
    ///
    /// A failure at any step discards the points computed before it.
    pub fn forecast(&self, history: &MonthlySeries, horizon: usize) -> Result<Vec<ForecastPoint>> {
        self.steps(history, horizon)?.collect()
    }
}

/// Iterator over forecast months
pub struct ForecastSteps<'a> {
    model: &'a ForecastModel,
    working: MonthlySeries,
    remaining: usize,
    done: bool,
}

impl ForecastSteps<'_> {
    /// History including every prediction emitted so far
    pub fn working_history(&self) -> &MonthlySeries {
        &self.working
    }

    fn target_month(&self) -> Result<NaiveDate> {
        match self.working.last_month() {
            Some(last) => next_month(last),
            None => Err(Error::InsufficientHistory {
                found: 0,
                required: MIN_HISTORY,
            }),
        }
    }

    fn step(&mut self) -> Result<ForecastPoint> {
        let target = self.target_month()?;
        let features = FeatureVector::for_month(target, &self.working)?;

        let raw = self.model.predict(&features)?;
        if raw < 0.0 {
            debug!(month = %target, raw, "Clamping negative prediction to zero");
        }
        let amount = round_cents(raw.max(0.0));

        // The rounded value is both reported and fed back as the next lag_1
        let month = self.working.push_next(amount)?;
        debug_assert_eq!(month, target);

        debug!(
            month = %month,
            lag_1 = features.lag_1,
            lag_2 = features.lag_2,
            lag_3 = features.lag_3,
            rolling_3 = features.rolling_3,
            amount,
            "Forecast step"
        );

        Ok(ForecastPoint { month, amount })
    }
}

impl Iterator for ForecastSteps<'_> {
    type Item = Result<ForecastPoint>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.remaining == 0 {
            return None;
        }

        let result = self.step();
        match result {
            Ok(_) => self.remaining -= 1,
            Err(ref e) => {
                warn!(error = %e, "Forecast step failed");
                self.done = true;
            }
        }
        Some(result)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.done {
            (0, Some(0))
        } else {
            (0, Some(self.remaining))
        }
    }
}

impl std::iter::FusedIterator for ForecastSteps<'_> {}

/// Request-level forecasting policy.
///
/// - no model: [`Error::ModelUnavailable`]
/// - fewer than [`MIN_HISTORY`] months: an empty forecast
/// - otherwise the full forecast, or the first error
pub fn forecast_monthly(
    model: Option<&ForecastModel>,
    history: &MonthlySeries,
    horizon: usize,
) -> Result<Vec<ForecastPoint>> {
    let model = model.ok_or(Error::ModelUnavailable)?;

    match Forecaster::new(model).forecast(history, horizon) {
        Err(Error::InsufficientHistory { found, required }) => {
            debug!(found, required, "Not enough history to forecast");
            Ok(Vec::new())
        }
        other => other,
    }
}
