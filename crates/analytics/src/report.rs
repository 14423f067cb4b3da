//! Flat metric → value report for one run.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskMetric {
    TotalReturnPct,
    AnnualizedReturnPct,
    SharpeRatio,
    SortinoRatio,
    CalmarRatio,
    MaxDrawdownPct,
    AvgDrawdownPct,
    AvgRecoveryDays,
    PortfolioBeta,
    ValueAtRisk,
    ConditionalValueAtRisk,
    BlowupProbabilityPct,
}

impl RiskMetric {
    pub const ALL: [Self; 12] = [
        Self::TotalReturnPct,
        Self::AnnualizedReturnPct,
        Self::SharpeRatio,
        Self::SortinoRatio,
        Self::CalmarRatio,
        Self::MaxDrawdownPct,
        Self::AvgDrawdownPct,
        Self::AvgRecoveryDays,
        Self::PortfolioBeta,
        Self::ValueAtRisk,
        Self::ConditionalValueAtRisk,
        Self::BlowupProbabilityPct,
    ];

    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::TotalReturnPct => "Total Return (%)",
            Self::AnnualizedReturnPct => "Annualized Return (%)",
            Self::SharpeRatio => "Sharpe Ratio",
            Self::SortinoRatio => "Sortino Ratio",
            Self::CalmarRatio => "Calmar Ratio",
            Self::MaxDrawdownPct => "Max Drawdown (%)",
            Self::AvgDrawdownPct => "Average Drawdown (%)",
            Self::AvgRecoveryDays => "Average Recovery Time (days)",
            Self::PortfolioBeta => "Portfolio Beta",
            Self::ValueAtRisk => "VaR",
            Self::ConditionalValueAtRisk => "CVaR",
            Self::BlowupProbabilityPct => "Blowup Probability (%)",
        }
    }
}

impl std::fmt::Display for RiskMetric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Ordered metrics; built once by the risk engine and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskReport {
    entries: Vec<(RiskMetric, f64)>,
}

impl RiskReport {
    /// Keeps the first value given for each metric, in order of appearance.
    #[must_use]
    pub fn new(entries: impl IntoIterator<Item = (RiskMetric, f64)>) -> Self {
        let mut unique: Vec<(RiskMetric, f64)> = Vec::new();
        for (metric, value) in entries {
            if !unique.iter().any(|(m, _)| *m == metric) {
                unique.push((metric, value));
            }
        }
        Self { entries: unique }
    }

    #[must_use]
    pub fn entries(&self) -> &[(RiskMetric, f64)] {
        &self.entries
    }

    #[must_use]
    pub fn get(&self, metric: RiskMetric) -> Option<f64> {
        self.entries
            .iter()
            .find(|(m, _)| *m == metric)
            .map(|(_, v)| *v)
    }

    /// Header row of the one-row tabular export.
    #[must_use]
    pub fn headers(&self) -> Vec<&'static str> {
        self.entries.iter().map(|(m, _)| m.label()).collect()
    }

    /// Value row of the one-row tabular export; undefined metrics are `NaN`.
    #[must_use]
    pub fn values(&self) -> Vec<String> {
        self.entries.iter().map(|(_, v)| v.to_string()).collect()
    }
}

impl std::fmt::Display for RiskReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (metric, value) in &self.entries {
            writeln!(f, "{:<30} {value:>14.4}", metric.label())?;
        }
        Ok(())
    }
}
