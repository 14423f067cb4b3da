//! Return and risk-adjusted performance ratios.
//!
//! Daily statistics are annualized with [`TRADING_DAYS_PER_YEAR`]; compounding
//! of the total return uses [`CALENDAR_DAYS_PER_YEAR`].

use quantbt_core::constants::{CALENDAR_DAYS_PER_YEAR, EPSILON, TRADING_DAYS_PER_YEAR};
use quantbt_core::PortfolioState;

use crate::stats::{mean, sample_std};

fn excess(returns: &[f64], risk_free_rate: f64) -> Vec<f64> {
    let daily_rf = risk_free_rate / TRADING_DAYS_PER_YEAR;
    returns.iter().map(|r| r - daily_rf).collect()
}

/// `sqrt(252) * mean(r - rf/252) / (std(r) + EPSILON)`.
///
/// `NaN` with fewer than two returns.
#[must_use]
pub fn sharpe_ratio(returns: &[f64], risk_free_rate: f64) -> f64 {
    let excess = excess(returns, risk_free_rate);
    TRADING_DAYS_PER_YEAR.sqrt() * mean(&excess) / (sample_std(returns) + EPSILON)
}

/// Like [`sharpe_ratio`] but divides by the deviation of negative excess
/// returns only. `NaN` unless at least two excess returns are negative.
#[must_use]
pub fn sortino_ratio(returns: &[f64], risk_free_rate: f64) -> f64 {
    let excess = excess(returns, risk_free_rate);
    let downside: Vec<f64> = excess.iter().copied().filter(|r| *r < 0.0).collect();
    TRADING_DAYS_PER_YEAR.sqrt() * mean(&excess) / (sample_std(&downside) + EPSILON)
}

/// Annualized return over the absolute maximum drawdown; `NaN` when the
/// portfolio never drew down.
#[must_use]
pub fn calmar_ratio(annualized_return: f64, max_drawdown: f64) -> f64 {
    if max_drawdown == 0.0 {
        f64::NAN
    } else {
        annualized_return / max_drawdown.abs()
    }
}

/// `last / first - 1` over the portfolio totals.
#[must_use]
pub fn total_return(portfolio: &PortfolioState) -> f64 {
    let first = portfolio.first_total();
    (portfolio.last_total() - first) / first
}

/// Compounds `total_return` to a yearly rate over `days` calendar days.
/// `NaN` when `days` is not positive.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn annualized_return(total_return: f64, days: i64) -> f64 {
    if days <= 0 {
        return f64::NAN;
    }
    (1.0 + total_return).powf(CALENDAR_DAYS_PER_YEAR / days as f64) - 1.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};
    use quantbt_core::PortfolioRow;

    fn portfolio(totals: &[f64]) -> PortfolioState {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let rows = totals
            .iter()
            .enumerate()
            .map(|(i, &t)| PortfolioRow {
                date: start + Duration::days(i as i64),
                cash: t * 0.25,
                holdings: t * 0.75,
                position: 1.0,
            })
            .collect();
        PortfolioState::new(rows).unwrap()
    }

    // ============================================================
    // Sharpe / Sortino
    // ============================================================

    #[test]
    fn sharpe_matches_formula() {
        let r = [0.01, -0.02, 0.015, 0.005];
        let m = (0.01 - 0.02 + 0.015 + 0.005) / 4.0;
        let expected = 252.0_f64.sqrt() * m / (sample_std(&r) + EPSILON);
        assert!((sharpe_ratio(&r, 0.0) - expected).abs() < 1e-12);
    }

    #[test]
    fn risk_free_rate_lowers_sharpe() {
        let r = [0.01, -0.02, 0.015, 0.005, 0.002];
        assert!(sharpe_ratio(&r, 0.05) < sharpe_ratio(&r, 0.0));
    }

    #[test]
    fn sortino_needs_two_negative_returns() {
        assert!(sortino_ratio(&[0.01, -0.02, 0.03], 0.0).is_nan());
        let s = sortino_ratio(&[0.01, -0.02, 0.03, -0.01], 0.0);
        assert!(s.is_finite());
        assert!(s > 0.0);
    }

    #[test]
    fn ratios_are_scale_invariant() {
        let base = portfolio(&[100.0, 103.0, 99.0, 101.0, 97.0, 104.0, 108.0]);
        let scaled = base.scaled(3.7);
        let r1 = base.returns().finite_values();
        let r2 = scaled.returns().finite_values();
        let close = |a: f64, b: f64| (a - b).abs() < 1e-9 * a.abs().max(1.0);

        assert!(close(sharpe_ratio(&r1, 0.02), sharpe_ratio(&r2, 0.02)));
        assert!(close(sortino_ratio(&r1, 0.02), sortino_ratio(&r2, 0.02)));

        let ann1 = annualized_return(total_return(&base), base.span_days());
        let ann2 = annualized_return(total_return(&scaled), scaled.span_days());
        assert!(close(ann1, ann2));
    }

    // ============================================================
    // Returns and Calmar
    // ============================================================

    #[test]
    fn total_and_annualized_return() {
        let p = portfolio(&[100.0, 110.0]);
        assert!((total_return(&p) - 0.1).abs() < 1e-12);
        // one calendar day held: 1.1^365 - 1
        let ann = annualized_return(0.1, 1);
        assert!((ann - (1.1_f64.powf(365.0) - 1.0)).abs() / ann < 1e-12);
        assert!((annualized_return(0.1, 365) - 0.1).abs() < 1e-12);
    }

    #[test]
    fn zero_span_annualized_is_nan() {
        assert!(annualized_return(0.1, 0).is_nan());
    }

    #[test]
    fn calmar_uses_absolute_drawdown() {
        assert_eq!(calmar_ratio(0.2, -0.1), 2.0);
        assert!(calmar_ratio(0.2, 0.0).is_nan());
    }
}
