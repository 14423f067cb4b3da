use chrono::{Duration, NaiveDate};
use quantbt_core::PriceSeries;

/// Consecutive daily bars starting 2024-01-01.
pub fn prices(closes: &[f64]) -> PriceSeries {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let dates: Vec<NaiveDate> = (0..closes.len())
        .map(|i| start + Duration::days(i as i64))
        .collect();
    PriceSeries::from_closes(&dates, closes).unwrap()
}
