//! Log-normal random walk with drift.
//!
//! Drift and volatility come from the window's log-returns; the base
//! quantile at step `h` is `p0 * exp(mu*h + z_p * sigma * sqrt(h))`.
//! Calibration residuals are the errors of the drift-only median over a
//! holdout tail, with the drift refitted on the part before it.

use super::standard_normal;
use crate::domain::error::ProviderError;
use crate::domain::numeric::{log_returns, mean, sample_std};
use crate::domain::price::PriceWindow;
use crate::domain::quantiles::BaseForecast;
use crate::ports::forecast_port::{ForecastProvider, MIN_FORECAST_PRICES};
use statrs::distribution::ContinuousCDF;

const MIN_SPLIT: usize = 30;
const MAX_CALIBRATION: usize = 400;

#[derive(Debug, Clone, Copy, Default)]
pub struct RandomWalkForecaster;

impl RandomWalkForecaster {
    pub fn new() -> Self {
        Self
    }
}

/// `(train_end, calibration_len)` for a history of `n` prices.
pub fn calibration_split(n: usize) -> (usize, usize) {
    let mut calib_len = (n / 3).clamp(MIN_SPLIT, MAX_CALIBRATION);
    let mut train_end = n.saturating_sub(calib_len);
    if train_end < MIN_SPLIT {
        train_end = MIN_SPLIT.max(n.saturating_sub(MIN_SPLIT));
        calib_len = n.saturating_sub(train_end);
    }
    (train_end, calib_len)
}

fn holdout_residuals(prices: &[f64]) -> Vec<f64> {
    let (train_end, calib_len) = calibration_split(prices.len());
    if train_end == 0 || calib_len == 0 {
        return Vec::new();
    }

    let train = &prices[..train_end];
    let drift = mean(&log_returns(train));
    let anchor = train[train_end - 1];

    prices[train_end..train_end + calib_len]
        .iter()
        .enumerate()
        .map(|(k, actual)| actual - anchor * (drift * (k + 1) as f64).exp())
        .collect()
}

impl ForecastProvider for RandomWalkForecaster {
    fn forecast(
        &self,
        window: PriceWindow<'_>,
        horizon: usize,
    ) -> Result<BaseForecast, ProviderError> {
        let n = window.len();
        if n < MIN_FORECAST_PRICES {
            return Err(ProviderError::InsufficientHistory {
                have: n,
                need: MIN_FORECAST_PRICES,
            });
        }
        let p0 = window.prices[n - 1];

        let returns = window.log_returns();
        let drift = mean(&returns);
        let vol = sample_std(&returns);
        if !drift.is_finite() || !vol.is_finite() {
            return Err(ProviderError::Failed(
                "non-finite drift or volatility".to_string(),
            ));
        }

        let normal = standard_normal()?;
        let [z05, z10, z90, z95] = [0.05, 0.10, 0.90, 0.95].map(|p| normal.inverse_cdf(p));
        let mut base = BaseForecast {
            q05: Vec::with_capacity(horizon),
            q10: Vec::with_capacity(horizon),
            q50: Vec::with_capacity(horizon),
            q90: Vec::with_capacity(horizon),
            q95: Vec::with_capacity(horizon),
            residuals: holdout_residuals(window.prices),
        };

        for h in 1..=horizon {
            let centre = drift * h as f64;
            let spread = vol * (h as f64).sqrt();
            let at = |z: f64| p0 * (centre + z * spread).exp();
            base.q05.push(at(z05));
            base.q10.push(at(z10));
            base.q50.push(at(0.0));
            base.q90.push(at(z90));
            base.q95.push(at(z95));
        }

        Ok(base)
    }
}
