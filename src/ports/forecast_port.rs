//! Forecast provider port.

use crate::domain::error::ProviderError;
use crate::domain::price::PriceWindow;
use crate::domain::quantiles::BaseForecast;

/// Minimum prices a forecast provider accepts.
pub const MIN_FORECAST_PRICES: usize = 60;

/// Produces per-step base quantiles for `horizon` future steps, plus
/// calibration residuals (actual minus predicted median) from a held-out
/// block of the window.
pub trait ForecastProvider {
    fn forecast(
        &self,
        window: PriceWindow<'_>,
        horizon: usize,
    ) -> Result<BaseForecast, ProviderError>;
}
