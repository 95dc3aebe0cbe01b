//! Domain models for Paisa

use chrono::{DateTime, Datelike, Months, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Minimum number of months needed to derive lag features (lag_3)
pub const MIN_HISTORY: usize = 3;

/// One month of observed (or forecast) spending
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonthlyEntry {
    /// First day of the month
    pub month: NaiveDate,
    pub amount: f64,
}

/// Contiguous monthly spending totals, oldest first
///
/// Every entry is anchored on the first day of its month and consecutive
/// entries are exactly one calendar month apart.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MonthlySeries {
    entries: Vec<MonthlyEntry>,
}

impl MonthlySeries {
    /// Build a series from plain amounts ending at `last_month`.
    ///
    /// `last_month` may be any day of the month; the series is anchored on
    /// month starts. Fewer than [`MIN_HISTORY`] amounts is allowed here so the
    /// caller can decide what an insufficient history means.
    pub fn from_amounts(amounts: &[f64], last_month: NaiveDate) -> Result<Self> {
        let last = month_start(last_month);
        let mut entries = Vec::with_capacity(amounts.len());

        for (i, &amount) in amounts.iter().enumerate() {
            check_amount(i, amount)?;
            let back = (amounts.len() - 1 - i) as u32;
            let month = last.checked_sub_months(Months::new(back)).ok_or_else(|| {
                Error::MalformedInput(format!("History reaches before {}", NaiveDate::MIN))
            })?;
            entries.push(MonthlyEntry { month, amount });
        }

        Ok(Self { entries })
    }

    /// Build a series from explicit dated entries, rejecting gaps and
    /// out-of-order months.
    pub fn from_entries(entries: Vec<MonthlyEntry>) -> Result<Self> {
        let mut series = Self {
            entries: Vec::with_capacity(entries.len()),
        };

        for (i, entry) in entries.into_iter().enumerate() {
            check_amount(i, entry.amount)?;
            let month = month_start(entry.month);

            if let Some(prev) = series.last_month() {
                let expected = next_month(prev)?;
                if month != expected {
                    return Err(Error::MalformedInput(format!(
                        "Entry {} is {} but {} was expected (history must be contiguous and ascending)",
                        i,
                        month.format("%Y-%m-%d"),
                        expected.format("%Y-%m-%d")
                    )));
                }
            }

            series.entries.push(MonthlyEntry {
                month,
                amount: entry.amount,
            });
        }

        Ok(series)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[MonthlyEntry] {
        &self.entries
    }

    /// Month of the most recent entry
    pub fn last_month(&self) -> Option<NaiveDate> {
        self.entries.last().map(|e| e.month)
    }

    /// The `n` most recent amounts, oldest first (fewer if the series is short)
    pub fn recent_amounts(&self, n: usize) -> Vec<f64> {
        let start = self.entries.len().saturating_sub(n);
        self.entries[start..].iter().map(|e| e.amount).collect()
    }

    /// Whether the series is long enough to forecast from
    pub fn is_sufficient(&self) -> bool {
        self.entries.len() >= MIN_HISTORY
    }

    /// Append the month following the current last entry.
    pub fn push_next(&mut self, amount: f64) -> Result<NaiveDate> {
        let month = match self.last_month() {
            Some(prev) => next_month(prev)?,
            None => {
                return Err(Error::MalformedInput(
                    "Cannot extend an empty series without an anchor month".to_string(),
                ))
            }
        };
        self.entries.push(MonthlyEntry { month, amount });
        Ok(month)
    }

    /// A copy of this series extended with previously forecast points.
    ///
    /// The points must continue the series month by month.
    pub fn extended_with(&self, points: &[ForecastPoint]) -> Result<Self> {
        let mut entries = self.entries.clone();
        entries.extend(points.iter().map(|p| MonthlyEntry {
            month: p.month,
            amount: p.amount,
        }));
        Self::from_entries(entries)
    }
}

/// A single forecast month
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    /// First day of the forecast month (serialized as YYYY-MM-DD)
    pub month: NaiveDate,
    /// Non-negative predicted spending, rounded to cents
    #[serde(rename = "predicted_expense")]
    pub amount: f64,
}

/// First day of the month containing `date`
pub fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// First day of the month after `date`
pub fn next_month(date: NaiveDate) -> Result<NaiveDate> {
    month_start(date)
        .checked_add_months(Months::new(1))
        .ok_or_else(|| Error::MalformedInput(format!("No month after {}", date)))
}

/// Parse a month marker.
///
/// Accepts `YYYY-MM-DD`, `YYYY-MM`, naive `YYYY-MM-DDTHH:MM:SS` and RFC 3339
/// timestamps. The result is always the first day of that month.
pub fn parse_month(input: &str) -> Result<NaiveDate> {
    let s = input.trim();

    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(&format!("{}-01", s), "%Y-%m-%d"))
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive()))
        .or_else(|| {
            NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|dt| dt.date())
        })
        .ok_or_else(|| {
            Error::MalformedInput(format!(
                "Invalid month '{}' (expected an ISO date such as 2025-10-01)",
                input
            ))
        })?;

    Ok(month_start(date))
}

/// Round to two decimal places, exact halves to even
///
/// Values too large to scale are returned unchanged; at that magnitude they
/// have no fractional part left to round.
pub fn round_cents(value: f64) -> f64 {
    let scaled = value * 100.0;
    if !scaled.is_finite() {
        return value;
    }
    scaled.round_ties_even() / 100.0
}

fn check_amount(index: usize, amount: f64) -> Result<()> {
    if amount.is_finite() {
        Ok(())
    } else {
        Err(Error::MalformedInput(format!(
            "Amount at position {} is not a finite number",
            index
        )))
    }
}
