//! CSV price file adapter.
//!
//! Expects a header row. The price column is `price` or `close`; an optional
//! `timestamp`, `date` or `time` column supplies timestamps.

use crate::domain::error::EpitomeError;
use crate::domain::price::PriceSeries;
use crate::ports::data_port::PriceDataPort;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::fs;

const PRICE_COLUMNS: [&str; 2] = ["price", "close"];
const TIME_COLUMNS: [&str; 3] = ["timestamp", "date", "time"];

/// Reads `source` as a file path.
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvPriceAdapter;

impl PriceDataPort for CsvPriceAdapter {
    fn load_prices(&self, source: &str) -> Result<PriceSeries, EpitomeError> {
        let content = fs::read_to_string(source).map_err(|e| {
            EpitomeError::invalid_data(format!("failed to read {source}: {e}"))
        })?;
        parse_prices(&content)
    }
}

/// Parse CSV text into a validated series. Rows are ordered by timestamp
/// when a timestamp column is present.
pub fn parse_prices(content: &str) -> Result<PriceSeries, EpitomeError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let headers = rdr
        .headers()
        .map_err(|e| EpitomeError::invalid_data(format!("CSV header error: {}", e)))?
        .clone();
    let find = |names: &[&str]| -> Option<usize> {
        headers
            .iter()
            .position(|h| names.iter().any(|n| h.eq_ignore_ascii_case(n)))
    };

    let price_col = find(&PRICE_COLUMNS).ok_or_else(|| {
        EpitomeError::invalid_data("missing price column (expected 'price' or 'close')")
    })?;
    let time_col = find(&TIME_COLUMNS);

    let mut rows: Vec<(Option<NaiveDateTime>, f64)> = Vec::new();
    for (line, result) in rdr.records().enumerate() {
        let record = result
            .map_err(|e| EpitomeError::invalid_data(format!("CSV parse error: {}", e)))?;
        let row = line + 2;

        let raw_price = record
            .get(price_col)
            .ok_or_else(|| EpitomeError::invalid_data(format!("row {row}: missing price")))?;
        let price: f64 = raw_price.parse().map_err(|_| {
            EpitomeError::invalid_data(format!("row {row}: invalid price '{raw_price}'"))
        })?;

        let timestamp = match time_col {
            Some(col) => {
                let raw = record.get(col).unwrap_or_default();
                Some(parse_timestamp(raw).ok_or_else(|| {
                    EpitomeError::invalid_data(format!("row {row}: invalid timestamp '{raw}'"))
                })?)
            }
            None => None,
        };
        rows.push((timestamp, price));
    }

    if time_col.is_none() {
        return PriceSeries::new(rows.into_iter().map(|(_, p)| p).collect());
    }

    rows.sort_by_key(|(ts, _)| *ts);
    let (timestamps, prices): (Vec<_>, Vec<_>) = rows
        .into_iter()
        .map(|(ts, p)| (ts.unwrap_or_default(), p))
        .unzip();
    PriceSeries::with_timestamps(prices, timestamps)
}

/// `%Y-%m-%d`, `%Y-%m-%d %H:%M:%S` or RFC 3339 (converted to UTC).
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(ts) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(ts);
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.naive_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}
