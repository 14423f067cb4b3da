//! Option-chain snapshot types.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{BacktestError, Result};

/// Put or call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionSide {
    Call,
    Put,
}

impl std::fmt::Display for OptionSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Call => write!(f, "call"),
            Self::Put => write!(f, "put"),
        }
    }
}

impl std::str::FromStr for OptionSide {
    type Err = BacktestError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "call" | "c" => Ok(Self::Call),
            "put" | "p" => Ok(Self::Put),
            other => Err(BacktestError::config(format!("unknown option side: {other}"))),
        }
    }
}

/// A single strike and its last traded premium.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OptionQuote {
    pub strike: f64,
    pub premium: f64,
}

impl OptionQuote {
    #[must_use]
    pub const fn new(strike: f64, premium: f64) -> Self {
        Self { strike, premium }
    }
}

/// Quotes for one side of one expiration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OptionTable {
    quotes: Vec<OptionQuote>,
}

impl OptionTable {
    #[must_use]
    pub fn new(quotes: Vec<OptionQuote>) -> Self {
        Self { quotes }
    }

    #[must_use]
    pub fn quotes(&self) -> &[OptionQuote] {
        &self.quotes
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }

    /// The quote whose strike is closest to `target`; the first one wins ties.
    ///
    /// # Errors
    ///
    /// Returns `BacktestError::Simulation` if the table is empty.
    pub fn nearest(&self, target: f64) -> Result<&OptionQuote> {
        let mut best: Option<&OptionQuote> = None;
        for quote in &self.quotes {
            let better = match best {
                None => true,
                Some(b) => (quote.strike - target).abs() < (b.strike - target).abs(),
            };
            if better {
                best = Some(quote);
            }
        }
        best.ok_or_else(|| BacktestError::simulation("nearest-strike lookup on an empty option table"))
    }
}

/// Puts and calls for a single expiration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionChainSnapshot {
    pub expiration: NaiveDate,
    pub puts: OptionTable,
    pub calls: OptionTable,
}

impl OptionChainSnapshot {
    #[must_use]
    pub fn table(&self, side: OptionSide) -> &OptionTable {
        match side {
            OptionSide::Call => &self.calls,
            OptionSide::Put => &self.puts,
        }
    }

    /// Fails unless the table for `side` has at least one quote.
    ///
    /// # Errors
    ///
    /// Returns `BacktestError::Simulation` when the table is empty.
    pub fn require(&self, side: OptionSide) -> Result<&OptionTable> {
        let table = self.table(side);
        if table.is_empty() {
            return Err(BacktestError::simulation(format!(
                "no {side} quotes for expiration {}",
                self.expiration
            )));
        }
        Ok(table)
    }
}
