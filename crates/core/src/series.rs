//! Price and return series.
//!
//! `PriceSeries` is the validated, time-ordered input every component reads.
//! `ReturnSeries` carries dated daily returns, for a strategy or for a market
//! benchmark, and is what the analytics engine aligns on.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{BacktestError, Result};

/// One daily bar. Only `date` and `close` are required by the core.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub date: NaiveDate,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: f64,
    pub volume: Option<f64>,
}

impl Bar {
    /// Creates a close-only bar.
    #[must_use]
    pub const fn close_only(date: NaiveDate, close: f64) -> Self {
        Self {
            date,
            open: None,
            high: None,
            low: None,
            close,
            volume: None,
        }
    }
}

/// Time-ordered daily bars with strictly increasing dates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceSeries {
    bars: Vec<Bar>,
}

impl PriceSeries {
    /// Validates and wraps a list of bars.
    ///
    /// # Errors
    ///
    /// Returns `BacktestError::Data` if:
    /// - `bars` is empty
    /// - dates are not strictly increasing (duplicates included)
    /// - a close is not a finite positive number
    pub fn new(bars: Vec<Bar>) -> Result<Self> {
        if bars.is_empty() {
            return Err(BacktestError::data("price series is empty"));
        }

        for (i, bar) in bars.iter().enumerate() {
            if !(bar.close.is_finite() && bar.close > 0.0) {
                return Err(BacktestError::data(format!(
                    "invalid close {} on {}",
                    bar.close, bar.date
                )));
            }
            if i > 0 && bar.date <= bars[i - 1].date {
                return Err(BacktestError::data(format!(
                    "dates must be strictly increasing: {} follows {}",
                    bar.date,
                    bars[i - 1].date
                )));
            }
        }

        Ok(Self { bars })
    }

    /// Builds a close-only series from parallel date and close slices.
    ///
    /// # Errors
    ///
    /// Returns `BacktestError::Data` if the slices differ in length or the
    /// resulting bars fail [`PriceSeries::new`] validation.
    pub fn from_closes(dates: &[NaiveDate], closes: &[f64]) -> Result<Self> {
        if dates.len() != closes.len() {
            return Err(BacktestError::data(format!(
                "{} dates but {} closes",
                dates.len(),
                closes.len()
            )));
        }
        let bars = dates
            .iter()
            .zip(closes)
            .map(|(&date, &close)| Bar::close_only(date, close))
            .collect();
        Self::new(bars)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    /// Always false for a constructed series; provided for clippy's `len_without_is_empty`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    #[must_use]
    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    #[must_use]
    pub fn close(&self, i: usize) -> f64 {
        self.bars[i].close
    }

    #[must_use]
    pub fn date(&self, i: usize) -> NaiveDate {
        self.bars[i].date
    }

    #[must_use]
    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    #[must_use]
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.bars.iter().map(|b| b.date).collect()
    }

    /// Calendar days between the first and last bar.
    #[must_use]
    pub fn span_days(&self) -> i64 {
        (self.bars[self.bars.len() - 1].date - self.bars[0].date).num_days()
    }

    /// Percent-change returns of the close, 0 on the first bar.
    #[must_use]
    pub fn returns(&self) -> ReturnSeries {
        ReturnSeries::from_values(&self.dates(), &self.closes())
    }
}

/// Dated daily returns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnSeries {
    dates: Vec<NaiveDate>,
    values: Vec<f64>,
}

impl ReturnSeries {
    /// Wraps pre-computed returns.
    ///
    /// # Errors
    ///
    /// Returns `BacktestError::Data` if the slices differ in length or the
    /// dates are not strictly increasing.
    pub fn new(dates: Vec<NaiveDate>, values: Vec<f64>) -> Result<Self> {
        if dates.len() != values.len() {
            return Err(BacktestError::data(format!(
                "{} dates but {} returns",
                dates.len(),
                values.len()
            )));
        }
        if let Some(pair) = dates.windows(2).find(|w| w[1] <= w[0]) {
            return Err(BacktestError::data(format!(
                "return dates must be strictly increasing: {} follows {}",
                pair[1], pair[0]
            )));
        }
        Ok(Self { dates, values })
    }

    /// Derives `value[t] / value[t-1] - 1` returns, with 0 at t = 0.
    ///
    /// Callers pass equal-length slices of already ordered dates, as held by
    /// `PriceSeries` and `PortfolioState`; extra entries in the longer one are
    /// ignored.
    #[must_use]
    pub fn from_values(dates: &[NaiveDate], levels: &[f64]) -> Self {
        let n = dates.len().min(levels.len());
        let values = (0..n)
            .map(|t| {
                if t == 0 {
                    0.0
                } else {
                    levels[t] / levels[t - 1] - 1.0
                }
            })
            .collect();
        Self {
            dates: dates[..n].to_vec(),
            values,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[must_use]
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Finite values only, in order.
    #[must_use]
    pub fn finite_values(&self) -> Vec<f64> {
        self.values.iter().copied().filter(|v| v.is_finite()).collect()
    }

    /// Pairs of values on dates present in both series, in date order.
    ///
    /// Pairs where either side is non-finite are dropped.
    #[must_use]
    pub fn align(&self, other: &Self) -> Vec<(f64, f64)> {
        let mut pairs = Vec::new();
        let (mut i, mut j) = (0, 0);
        while i < self.dates.len() && j < other.dates.len() {
            match self.dates[i].cmp(&other.dates[j]) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    let (a, b) = (self.values[i], other.values[j]);
                    if a.is_finite() && b.is_finite() {
                        pairs.push((a, b));
                    }
                    i += 1;
                    j += 1;
                }
            }
        }
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn empty_series_is_a_data_error() {
        let err = PriceSeries::new(vec![]).unwrap_err();
        assert!(matches!(err, BacktestError::Data(_)));
    }

    #[test]
    fn duplicate_dates_are_rejected() {
        let result = PriceSeries::from_closes(&[day(1), day(1)], &[100.0, 101.0]);
        assert!(matches!(result, Err(BacktestError::Data(_))));
    }

    #[test]
    fn non_positive_close_is_rejected() {
        let result = PriceSeries::from_closes(&[day(1), day(2)], &[100.0, 0.0]);
        assert!(result.is_err());
    }

    #[test]
    fn returns_start_at_zero() {
        let prices = PriceSeries::from_closes(&[day(1), day(2), day(3)], &[100.0, 110.0, 99.0])
            .unwrap();
        let returns = prices.returns();
        assert_eq!(returns.values()[0], 0.0);
        assert!((returns.values()[1] - 0.10).abs() < 1e-12);
        assert!((returns.values()[2] + 0.10).abs() < 1e-12);
    }

    #[test]
    fn span_days_counts_calendar_days() {
        let prices = PriceSeries::from_closes(&[day(1), day(31)], &[1.0, 2.0]).unwrap();
        assert_eq!(prices.span_days(), 30);
    }

    #[test]
    fn align_keeps_only_common_dates() {
        let a = ReturnSeries::new(vec![day(1), day(2), day(4)], vec![0.1, 0.2, 0.4]).unwrap();
        let b = ReturnSeries::new(vec![day(2), day(3), day(4)], vec![2.0, 3.0, 4.0]).unwrap();
        assert_eq!(a.align(&b), vec![(0.2, 2.0), (0.4, 4.0)]);
    }

    #[test]
    fn align_drops_non_finite_pairs() {
        let a = ReturnSeries::new(vec![day(1), day(2)], vec![f64::NAN, 0.2]).unwrap();
        let b = ReturnSeries::new(vec![day(1), day(2)], vec![1.0, 2.0]).unwrap();
        assert_eq!(a.align(&b), vec![(0.2, 2.0)]);
    }

    #[test]
    fn return_dates_must_increase() {
        let unsorted = ReturnSeries::new(vec![day(2), day(1)], vec![0.1, 0.2]);
        assert!(matches!(unsorted, Err(BacktestError::Data(_))));
        let repeated = ReturnSeries::new(vec![day(1), day(1)], vec![0.1, 0.2]);
        assert!(matches!(repeated, Err(BacktestError::Data(_))));
        assert!(ReturnSeries::new(vec![], vec![]).is_ok());
    }
}
