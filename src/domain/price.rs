//! Price history owned by the caller, and borrowed windows over it.

use chrono::NaiveDateTime;

use super::error::EpitomeError;
use super::numeric::log_returns;

/// Ordered price history. Prices are finite and strictly positive;
/// timestamps, when present, are strictly increasing and match prices 1:1.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    prices: Vec<f64>,
    timestamps: Option<Vec<NaiveDateTime>>,
}

impl PriceSeries {
    pub fn new(prices: Vec<f64>) -> Result<Self, EpitomeError> {
        validate_prices(&prices)?;
        Ok(PriceSeries {
            prices,
            timestamps: None,
        })
    }

    pub fn with_timestamps(
        prices: Vec<f64>,
        timestamps: Vec<NaiveDateTime>,
    ) -> Result<Self, EpitomeError> {
        validate_prices(&prices)?;
        if timestamps.len() != prices.len() {
            return Err(EpitomeError::invalid_data(format!(
                "{} timestamps for {} prices",
                timestamps.len(),
                prices.len()
            )));
        }
        if let Some(i) = timestamps.windows(2).position(|w| w[1] <= w[0]) {
            return Err(EpitomeError::invalid_data(format!(
                "timestamps not strictly increasing at index {}: {} then {}",
                i + 1,
                timestamps[i],
                timestamps[i + 1]
            )));
        }
        Ok(PriceSeries {
            prices,
            timestamps: Some(timestamps),
        })
    }

    pub fn prices(&self) -> &[f64] {
        &self.prices
    }

    pub fn timestamps(&self) -> Option<&[NaiveDateTime]> {
        self.timestamps.as_deref()
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    /// View over the whole series.
    pub fn as_window(&self) -> PriceWindow<'_> {
        PriceWindow {
            prices: &self.prices,
            timestamps: self.timestamps.as_deref(),
        }
    }

    /// View over `prices[0..=end]`. `end` is clamped to the last index.
    pub fn window_through(&self, end: usize) -> PriceWindow<'_> {
        let stop = (end + 1).min(self.prices.len());
        PriceWindow {
            prices: &self.prices[..stop],
            timestamps: self.timestamps.as_deref().map(|ts| &ts[..stop]),
        }
    }

    pub fn timestamp_at(&self, index: usize) -> Option<NaiveDateTime> {
        self.timestamps.as_ref().and_then(|ts| ts.get(index).copied())
    }
}

fn validate_prices(prices: &[f64]) -> Result<(), EpitomeError> {
    if let Some(i) = prices.iter().position(|p| !p.is_finite() || *p <= 0.0) {
        return Err(EpitomeError::invalid_data(format!(
            "price at index {} must be finite and positive, got {}",
            i, prices[i]
        )));
    }
    Ok(())
}

/// Borrowed view of the history available at one evaluation point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceWindow<'a> {
    pub prices: &'a [f64],
    pub timestamps: Option<&'a [NaiveDateTime]>,
}

impl<'a> PriceWindow<'a> {
    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    pub fn last_price(&self) -> Option<f64> {
        self.prices.last().copied()
    }

    pub fn last_timestamp(&self) -> Option<NaiveDateTime> {
        self.timestamps.and_then(|ts| ts.last().copied())
    }

    pub fn log_returns(&self) -> Vec<f64> {
        log_returns(self.prices)
    }
}
