//! Integration tests for paisa-core
//!
//! These tests exercise the full artifact → history → forecast workflow.

use std::path::PathBuf;
use std::sync::Arc;
use std::thread;

use chrono::NaiveDate;
use paisa_core::{
    forecast_monthly, models::parse_month, Error, ForecastModel, Forecaster, MonthlySeries,
};

fn sample_artifact_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../models/budget_forecast_model.json")
}

fn sample_history() -> MonthlySeries {
    let last = parse_month("2025-10-01").expect("valid month");
    MonthlySeries::from_amounts(&[1000.0, 1200.0, 1100.0], last).expect("valid history")
}

// =============================================================================
// Artifact → Forecast
// =============================================================================

#[test]
fn test_sample_artifact_forecast() {
    let model = ForecastModel::load(&sample_artifact_path()).expect("Failed to load sample model");
    assert_eq!(model.kind(), "linear");
    assert_eq!(model.features().len(), 6);

    let points = Forecaster::new(&model)
        .forecast(&sample_history(), 3)
        .expect("Forecast failed");

    assert_eq!(points.len(), 3);
    assert_eq!(points[0].month, NaiveDate::from_ymd_opt(2025, 11, 1).unwrap());
    assert_eq!(points[2].month, NaiveDate::from_ymd_opt(2026, 1, 1).unwrap());

    // 185 + 14.5*11 + 0.52*1100 + 0.18*1200 + 0.08*1000 + 0.12*1100
    assert!((points[0].amount - 1344.5).abs() < 1e-9);

    for point in &points {
        assert!(point.amount >= 0.0);
        assert_eq!(point.amount, (point.amount * 100.0).round() / 100.0);
    }
}

#[test]
fn test_forecast_chain_uses_previous_output() {
    let model = ForecastModel::load(&sample_artifact_path()).unwrap();
    let forecaster = Forecaster::new(&model);
    let history = sample_history();

    let six = forecaster.forecast(&history, 6).unwrap();

    // Two chained three-month calls match one six-month call
    let first = forecaster.forecast(&history, 3).unwrap();
    let extended = history.extended_with(&first).unwrap();
    let second = forecaster.forecast(&extended, 3).unwrap();

    assert_eq!(&six[..3], &first[..]);
    assert_eq!(&six[3..], &second[..]);
}

#[test]
fn test_short_history_and_missing_model() {
    let model = ForecastModel::load(&sample_artifact_path()).unwrap();
    let last = parse_month("2025-10-01").unwrap();
    let short = MonthlySeries::from_amounts(&[500.0], last).unwrap();

    assert!(forecast_monthly(Some(&model), &short, 3).unwrap().is_empty());
    assert!(matches!(
        forecast_monthly(None, &sample_history(), 3),
        Err(Error::ModelUnavailable)
    ));
}

// =============================================================================
// Shared Model
// =============================================================================

#[test]
fn test_model_shared_across_threads() {
    let model = Arc::new(ForecastModel::load(&sample_artifact_path()).unwrap());
    let expected = Forecaster::new(&model).forecast(&sample_history(), 3).unwrap();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let model = Arc::clone(&model);
            thread::spawn(move || {
                Forecaster::new(&model)
                    .forecast(&sample_history(), 3)
                    .unwrap()
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), expected);
    }
}
