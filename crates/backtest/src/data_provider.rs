//! File-backed and in-memory data providers.
//!
//! Price CSV format: `date,open,high,low,close,volume` with ISO dates; only
//! `date` and `close` are required, the other columns may be empty.
//!
//! Option-chain CSV format: `expiration,side,strike,last_price` with `side`
//! either `put` or `call`.

use std::collections::BTreeMap;
use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use quantbt_core::{
    BacktestError, Bar, OptionChainProvider, OptionChainSnapshot, OptionQuote, OptionSide,
    OptionTable, PriceProvider, PriceSeries, Result,
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct PriceRecord {
    date: NaiveDate,
    #[serde(default)]
    open: Option<f64>,
    #[serde(default)]
    high: Option<f64>,
    #[serde(default)]
    low: Option<f64>,
    close: f64,
    #[serde(default)]
    volume: Option<f64>,
}

/// Reads daily bars from a CSV file.
#[derive(Debug, Clone)]
pub struct CsvPriceProvider {
    path: PathBuf,
}

impl CsvPriceProvider {
    #[must_use]
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Parses bars from any reader, sorting them chronologically.
    ///
    /// # Errors
    ///
    /// Returns `BacktestError::Data` if:
    /// - a row cannot be parsed
    /// - no rows are present
    /// - the sorted bars contain duplicate dates or invalid closes
    pub fn from_reader<R: Read>(reader: R) -> Result<PriceSeries> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut bars = Vec::new();

        for (line, result) in csv_reader.deserialize::<PriceRecord>().enumerate() {
            let record = result
                .map_err(|e| BacktestError::data(format!("price row {}: {e}", line + 1)))?;
            bars.push(Bar {
                date: record.date,
                open: record.open,
                high: record.high,
                low: record.low,
                close: record.close,
                volume: record.volume,
            });
        }

        bars.sort_by_key(|b| b.date);
        PriceSeries::new(bars)
    }
}

impl PriceProvider for CsvPriceProvider {
    fn fetch(&self) -> Result<PriceSeries> {
        let file = std::fs::File::open(&self.path).map_err(|e| {
            BacktestError::data(format!("cannot open {}: {e}", self.path.display()))
        })?;
        let series = Self::from_reader(file)?;
        tracing::info!(
            path = %self.path.display(),
            bars = series.len(),
            "Loaded price series"
        );
        Ok(series)
    }
}

/// In-memory chain holding pre-built snapshots.
#[derive(Debug, Clone, Default)]
pub struct StaticOptionChain {
    snapshots: Vec<OptionChainSnapshot>,
}

impl StaticOptionChain {
    /// Snapshots are ordered by expiration, nearest first.
    #[must_use]
    pub fn new(mut snapshots: Vec<OptionChainSnapshot>) -> Self {
        snapshots.sort_by_key(|s| s.expiration);
        Self { snapshots }
    }
}

impl OptionChainProvider for StaticOptionChain {
    fn expirations(&self) -> Vec<NaiveDate> {
        self.snapshots.iter().map(|s| s.expiration).collect()
    }

    fn snapshot(&self, expiration: NaiveDate) -> Result<OptionChainSnapshot> {
        self.snapshots
            .iter()
            .find(|s| s.expiration == expiration)
            .cloned()
            .ok_or_else(|| BacktestError::simulation(format!("no chain for expiration {expiration}")))
    }
}

#[derive(Debug, Deserialize)]
struct ChainRecord {
    expiration: NaiveDate,
    side: OptionSide,
    strike: f64,
    last_price: f64,
}

/// Option chain loaded from a CSV file.
#[derive(Debug, Clone)]
pub struct CsvOptionChain {
    inner: StaticOptionChain,
}

impl CsvOptionChain {
    /// # Errors
    ///
    /// Returns `BacktestError::Data` if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)
            .map_err(|e| BacktestError::data(format!("cannot open {}: {e}", path.display())))?;
        let chain = Self::from_reader(file)?;
        tracing::info!(
            path = %path.display(),
            expirations = chain.expirations().len(),
            "Loaded option chain"
        );
        Ok(chain)
    }

    /// # Errors
    ///
    /// Returns `BacktestError::Data` if a row cannot be parsed.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut grouped: BTreeMap<NaiveDate, (Vec<OptionQuote>, Vec<OptionQuote>)> =
            BTreeMap::new();

        for (line, result) in csv_reader.deserialize::<ChainRecord>().enumerate() {
            let record = result
                .map_err(|e| BacktestError::data(format!("chain row {}: {e}", line + 1)))?;
            let entry = grouped.entry(record.expiration).or_default();
            let quote = OptionQuote::new(record.strike, record.last_price);
            match record.side {
                OptionSide::Put => entry.0.push(quote),
                OptionSide::Call => entry.1.push(quote),
            }
        }

        let snapshots = grouped
            .into_iter()
            .map(|(expiration, (puts, calls))| OptionChainSnapshot {
                expiration,
                puts: OptionTable::new(puts),
                calls: OptionTable::new(calls),
            })
            .collect();

        Ok(Self {
            inner: StaticOptionChain::new(snapshots),
        })
    }
}

impl OptionChainProvider for CsvOptionChain {
    fn expirations(&self) -> Vec<NaiveDate> {
        self.inner.expirations()
    }

    fn snapshot(&self, expiration: NaiveDate) -> Result<OptionChainSnapshot> {
        self.inner.snapshot(expiration)
    }
}
