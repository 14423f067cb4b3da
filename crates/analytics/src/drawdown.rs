//! Drawdown and recovery-time analysis of a portfolio value series.

use quantbt_core::PortfolioState;
use serde::{Deserialize, Serialize};

use crate::stats::mean;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawdownAnalysis {
    /// `(total - peak) / peak` per bar; always `<= 0`.
    pub drawdowns: Vec<f64>,
    /// Most negative drawdown.
    pub max_drawdown: f64,
    /// Mean of the strictly negative drawdowns, `NaN` if there are none.
    pub avg_drawdown: f64,
    /// Calendar days of each recorded recovery.
    pub recoveries: Vec<i64>,
    /// Mean recovery in days, `NaN` if nothing recovered.
    pub avg_recovery_days: f64,
}

impl DrawdownAnalysis {
    /// Measures drawdowns against the running peak of `portfolio` totals.
    ///
    /// A recovery is recorded whenever a bar is back at its running peak and
    /// above the tracked trough; its length runs from the date the trough was
    /// last lowered. After recording, only the trough value is raised to the
    /// current total; the trough date stays put until a new low is set.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn from_portfolio(portfolio: &PortfolioState) -> Self {
        let rows = portfolio.rows();
        let mut drawdowns = Vec::with_capacity(rows.len());
        let mut recoveries = Vec::new();

        let mut peak = f64::NEG_INFINITY;
        let mut trough = rows[0].total();
        let mut trough_date = rows[0].date;

        for row in rows {
            let value = row.total();
            peak = peak.max(value);
            drawdowns.push((value - peak) / peak);

            if value < trough {
                trough = value;
                trough_date = row.date;
            }
            if value >= peak && trough < value {
                recoveries.push((row.date - trough_date).num_days());
                trough = value;
            }
        }

        let max_drawdown = drawdowns.iter().copied().fold(0.0_f64, f64::min);
        let negative: Vec<f64> = drawdowns.iter().copied().filter(|d| *d < 0.0).collect();
        let days: Vec<f64> = recoveries.iter().map(|&d| d as f64).collect();

        Self {
            max_drawdown,
            avg_drawdown: mean(&negative),
            avg_recovery_days: mean(&days),
            drawdowns,
            recoveries,
        }
    }
}
