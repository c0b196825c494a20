//! Price data access port trait.

use crate::domain::error::EpitomeError;
use crate::domain::price::PriceSeries;

pub trait PriceDataPort {
    /// Load a validated price history from `source` (a path, symbol or key,
    /// depending on the adapter).
    fn load_prices(&self, source: &str) -> Result<PriceSeries, EpitomeError>;
}
