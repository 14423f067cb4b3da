use chrono::{Duration, NaiveDate};
use quantbt_core::{
    OptionChainSnapshot, OptionQuote, OptionTable, PriceSeries, Signal, SignalSeries,
};

use crate::data_provider::StaticOptionChain;

pub fn start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
}

/// Consecutive daily bars starting 2024-01-01.
pub fn prices(closes: &[f64]) -> PriceSeries {
    let dates: Vec<NaiveDate> = (0..closes.len())
        .map(|i| start_date() + Duration::days(i as i64))
        .collect();
    PriceSeries::from_closes(&dates, closes).unwrap()
}

pub fn signals(prices: &PriceSeries, bits: &[u8]) -> SignalSeries {
    let signals: Vec<Signal> = bits.iter().map(|&b| Signal::from_bool(b == 1)).collect();
    SignalSeries::from_signals(&prices.dates(), &signals).unwrap()
}

pub fn table(quotes: &[(f64, f64)]) -> OptionTable {
    OptionTable::new(
        quotes
            .iter()
            .map(|&(strike, premium)| OptionQuote::new(strike, premium))
            .collect(),
    )
}

pub fn chain(puts: &[(f64, f64)], calls: &[(f64, f64)]) -> StaticOptionChain {
    StaticOptionChain::new(vec![OptionChainSnapshot {
        expiration: NaiveDate::from_ymd_opt(2024, 2, 16).unwrap(),
        puts: table(puts),
        calls: table(calls),
    }])
}
