use thiserror::Error;

/// Errors raised by signal generation, simulation, and analytics.
///
/// All three kinds are fatal for the run that raised them: the computations
/// are pure, so nothing is retried.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BacktestError {
    /// Empty, unordered, or misaligned input series.
    #[error("data error: {0}")]
    Data(String),

    /// Out-of-range or inconsistent parameters.
    #[error("config error: {0}")]
    Config(String),

    /// Option-chain problems: no expirations, empty quote tables.
    #[error("simulation error: {0}")]
    Simulation(String),
}

impl BacktestError {
    pub fn data(msg: impl Into<String>) -> Self {
        Self::Data(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn simulation(msg: impl Into<String>) -> Self {
        Self::Simulation(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, BacktestError>;

/// Fails with `ConfigError` unless `value` is finite and strictly positive.
///
/// # Errors
///
/// Returns `BacktestError::Config` naming `field` when the check fails.
pub fn ensure_positive(field: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(BacktestError::config(format!(
            "{field} must be a finite value > 0, got {value}"
        )))
    }
}

/// Fails with `ConfigError` unless `value` lies in the open interval (0, 1).
///
/// # Errors
///
/// Returns `BacktestError::Config` naming `field` when the check fails.
pub fn ensure_unit_interval(field: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 && value < 1.0 {
        Ok(())
    } else {
        Err(BacktestError::config(format!(
            "{field} must lie in (0, 1), got {value}"
        )))
    }
}

/// Fails with `ConfigError` when an integer window or count is zero.
///
/// # Errors
///
/// Returns `BacktestError::Config` naming `field` when `value == 0`.
pub fn ensure_nonzero(field: &str, value: usize) -> Result<()> {
    if value == 0 {
        Err(BacktestError::config(format!("{field} must be > 0")))
    } else {
        Ok(())
    }
}
