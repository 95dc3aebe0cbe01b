//! Lag/rolling feature derivation for the monthly forecaster
//!
//! A [`FeatureVector`] holds every feature by name. The model artifact decides
//! the column order, so vectors are projected into that order with
//! [`FeatureVector::project`] right before a predictor call.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::{MonthlySeries, MIN_HISTORY};

/// Names of the features a model may be trained on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureName {
    /// Calendar month of the target (1-12)
    MonthNum,
    /// Calendar year of the target
    Year,
    #[serde(rename = "lag_1")]
    Lag1,
    #[serde(rename = "lag_2")]
    Lag2,
    #[serde(rename = "lag_3")]
    Lag3,
    /// Mean of lag_1..lag_3
    #[serde(rename = "rolling_3")]
    Rolling3,
}

impl FeatureName {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MonthNum => "month_num",
            Self::Year => "year",
            Self::Lag1 => "lag_1",
            Self::Lag2 => "lag_2",
            Self::Lag3 => "lag_3",
            Self::Rolling3 => "rolling_3",
        }
    }

    /// All features in training order
    pub fn all() -> &'static [FeatureName] {
        &[
            Self::MonthNum,
            Self::Year,
            Self::Lag1,
            Self::Lag2,
            Self::Lag3,
            Self::Rolling3,
        ]
    }
}

impl std::str::FromStr for FeatureName {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim() {
            "month_num" => Ok(Self::MonthNum),
            "year" => Ok(Self::Year),
            "lag_1" => Ok(Self::Lag1),
            "lag_2" => Ok(Self::Lag2),
            "lag_3" => Ok(Self::Lag3),
            "rolling_3" => Ok(Self::Rolling3),
            _ => Err(format!("Unknown feature: {}", s)),
        }
    }
}

impl std::fmt::Display for FeatureName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Features for predicting a single target month
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeatureVector {
    pub month_num: u32,
    pub year: i32,
    pub lag_1: f64,
    pub lag_2: f64,
    pub lag_3: f64,
    pub rolling_3: f64,
}

impl FeatureVector {
    /// Derive features for `target` from the three most recent amounts of
    /// `history`.
    pub fn for_month(target: NaiveDate, history: &MonthlySeries) -> Result<Self> {
        let recent = history.recent_amounts(MIN_HISTORY);
        let [lag_3, lag_2, lag_1] = match recent.as_slice() {
            &[a, b, c] => [a, b, c],
            _ => {
                return Err(Error::InsufficientHistory {
                    found: history.len(),
                    required: MIN_HISTORY,
                })
            }
        };

        Ok(Self {
            month_num: target.month(),
            year: target.year(),
            lag_1,
            lag_2,
            lag_3,
            // Oldest first
            rolling_3: (lag_3 + lag_2 + lag_1) / 3.0,
        })
    }

    /// Look up a feature by name
    pub fn value(&self, name: FeatureName) -> f64 {
        match name {
            FeatureName::MonthNum => f64::from(self.month_num),
            FeatureName::Year => f64::from(self.year),
            FeatureName::Lag1 => self.lag_1,
            FeatureName::Lag2 => self.lag_2,
            FeatureName::Lag3 => self.lag_3,
            FeatureName::Rolling3 => self.rolling_3,
        }
    }

    /// Lay the features out in the column order a model was trained with
    pub fn project(&self, order: &[FeatureName]) -> Vec<f64> {
        order.iter().map(|&name| self.value(name)).collect()
    }
}

/// Parse a declared feature order, rejecting unknown or repeated names
pub fn parse_feature_order<S: AsRef<str>>(names: &[S]) -> Result<Vec<FeatureName>> {
    let mut order = Vec::with_capacity(names.len());

    for raw in names {
        let name: FeatureName = raw.as_ref().parse().map_err(Error::ModelLoad)?;
        if order.contains(&name) {
            return Err(Error::ModelLoad(format!("Duplicate feature: {}", name)));
        }
        order.push(name);
    }

    if order.is_empty() {
        return Err(Error::ModelLoad("Model declares no features".to_string()));
    }

    Ok(order)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_for_month_uses_latest_three() {
        let history =
            MonthlySeries::from_amounts(&[900.0, 1000.0, 1200.0, 1100.0], date(2025, 10, 1))
                .unwrap();
        let fv = FeatureVector::for_month(date(2025, 11, 1), &history).unwrap();

        assert_eq!(fv.month_num, 11);
        assert_eq!(fv.year, 2025);
        assert_eq!(fv.lag_1, 1100.0);
        assert_eq!(fv.lag_2, 1200.0);
        assert_eq!(fv.lag_3, 1000.0);
        assert_eq!(fv.rolling_3, 1100.0);
    }

    #[test]
    fn test_rolling_mean_sums_oldest_first() {
        let history =
            MonthlySeries::from_amounts(&[0.1, 0.2, 0.3], date(2025, 10, 1)).unwrap();
        let fv = FeatureVector::for_month(date(2025, 11, 1), &history).unwrap();

        // 0.1 + 0.2 + 0.3 and 0.3 + 0.2 + 0.1 differ in the last bit
        assert_eq!(fv.rolling_3, (0.1 + 0.2 + 0.3) / 3.0);
        assert_ne!((0.1 + 0.2 + 0.3) / 3.0, (0.3 + 0.2 + 0.1) / 3.0);
    }

    #[test]
    fn test_for_month_short_history() {
        let history = MonthlySeries::from_amounts(&[1.0, 2.0], date(2025, 10, 1)).unwrap();
        let err = FeatureVector::for_month(date(2025, 11, 1), &history).unwrap_err();
        assert!(matches!(
            err,
            Error::InsufficientHistory {
                found: 2,
                required: 3
            }
        ));
    }

    #[test]
    fn test_project_follows_declared_order() {
        let fv = FeatureVector {
            month_num: 1,
            year: 2026,
            lag_1: 10.0,
            lag_2: 20.0,
            lag_3: 30.0,
            rolling_3: 20.0,
        };

        assert_eq!(
            fv.project(FeatureName::all()),
            vec![1.0, 2026.0, 10.0, 20.0, 30.0, 20.0]
        );
        assert_eq!(
            fv.project(&[FeatureName::Rolling3, FeatureName::Lag1]),
            vec![20.0, 10.0]
        );
    }

    #[test]
    fn test_parse_feature_order() {
        let order =
            parse_feature_order(&["month_num", "year", "lag_1", "lag_2", "lag_3", "rolling_3"])
                .unwrap();
        assert_eq!(order, FeatureName::all());

        assert!(matches!(
            parse_feature_order(&["lag_1", "lag_4"]),
            Err(Error::ModelLoad(_))
        ));
        assert!(parse_feature_order(&["lag_1", "lag_1"]).is_err());
        assert!(parse_feature_order::<&str>(&[]).is_err());
    }

    #[test]
    fn test_feature_name_round_trips_through_str() {
        for name in FeatureName::all() {
            assert_eq!(name.as_str().parse::<FeatureName>().unwrap(), *name);
        }
    }
}
