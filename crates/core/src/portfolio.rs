//! Portfolio value series produced by the simulators.
//!
//! Only cash, holdings, and position are stored per bar. Total value and
//! returns are always derived, so `total == cash + holdings` cannot drift.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{BacktestError, Result};
use crate::series::ReturnSeries;

/// Portfolio state at the close of one bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PortfolioRow {
    pub date: NaiveDate,
    pub cash: f64,
    /// Mark-to-market value of the stock position.
    pub holdings: f64,
    /// Shares held.
    pub position: f64,
}

impl PortfolioRow {
    #[must_use]
    pub fn total(&self) -> f64 {
        self.cash + self.holdings
    }
}

/// Date-indexed portfolio rows for one completed run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioState {
    rows: Vec<PortfolioRow>,
}

impl PortfolioState {
    /// Wraps simulator output.
    ///
    /// # Errors
    ///
    /// Returns `BacktestError::Data` if `rows` is empty.
    pub fn new(rows: Vec<PortfolioRow>) -> Result<Self> {
        if rows.is_empty() {
            return Err(BacktestError::data("portfolio has no rows"));
        }
        Ok(Self { rows })
    }

    #[must_use]
    pub fn rows(&self) -> &[PortfolioRow] {
        &self.rows
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[must_use]
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.rows.iter().map(|r| r.date).collect()
    }

    #[must_use]
    pub fn totals(&self) -> Vec<f64> {
        self.rows.iter().map(PortfolioRow::total).collect()
    }

    #[must_use]
    pub fn first_total(&self) -> f64 {
        self.rows[0].total()
    }

    #[must_use]
    pub fn last_total(&self) -> f64 {
        self.rows[self.rows.len() - 1].total()
    }

    /// Calendar days between the first and last row.
    #[must_use]
    pub fn span_days(&self) -> i64 {
        (self.rows[self.rows.len() - 1].date - self.rows[0].date).num_days()
    }

    /// `total[t] / total[t-1] - 1`, 0 on the first bar.
    #[must_use]
    pub fn returns(&self) -> ReturnSeries {
        ReturnSeries::from_values(&self.dates(), &self.totals())
    }

    /// Returns the same portfolio with every monetary column multiplied by `factor`.
    #[must_use]
    pub fn scaled(&self, factor: f64) -> Self {
        let rows = self
            .rows
            .iter()
            .map(|r| PortfolioRow {
                date: r.date,
                cash: r.cash * factor,
                holdings: r.holdings * factor,
                position: r.position,
            })
            .collect();
        Self { rows }
    }
}
