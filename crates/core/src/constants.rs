//! Named numeric constants shared across the workspace.

/// Additive guard used in ratio denominators (Sharpe, Sortino, RSI).
pub const EPSILON: f64 = 1e-9;

/// Trading days used to annualize daily statistics.
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Calendar days used for annualized return and option theta.
pub const CALENDAR_DAYS_PER_YEAR: f64 = 365.0;

/// RSI value reported before the averaging window has filled.
pub const RSI_NEUTRAL: f64 = 50.0;

/// Number of autocorrelation lags reported by the statistical tests.
pub const DEFAULT_ACF_LAGS: usize = 20;
