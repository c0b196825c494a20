//! Per-call time limit around any provider.
//!
//! The wrapped call runs on its own thread with owned copies of its inputs.
//! When the limit expires the caller gets `ProviderError::TimedOut` and the
//! worker is left to finish in the background; its result is discarded.

use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use chrono::NaiveDateTime;

use crate::domain::error::ProviderError;
use crate::domain::price::PriceWindow;
use crate::domain::quantiles::BaseForecast;
use crate::domain::regime::RegimeBelief;
use crate::domain::risk::RiskEstimate;
use crate::ports::forecast_port::ForecastProvider;
use crate::ports::regime_port::RegimeProvider;
use crate::ports::risk_port::RiskProvider;

pub struct TimeLimited<P: ?Sized> {
    inner: Arc<P>,
    timeout: Duration,
}

impl<P: ?Sized> TimeLimited<P> {
    pub fn new(inner: Arc<P>, timeout: Duration) -> Self {
        Self { inner, timeout }
    }
}

fn run_with_timeout<T, F>(timeout: Duration, call: F) -> Result<T, ProviderError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, ProviderError> + Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    thread::Builder::new()
        .name("epitome-provider".to_string())
        .spawn(move || {
            // The receiver is gone once the caller has timed out.
            let _ = tx.send(call());
        })
        .map_err(|e| ProviderError::Failed(format!("failed to spawn provider thread: {e}")))?;

    match rx.recv_timeout(timeout) {
        Ok(result) => result,
        Err(RecvTimeoutError::Timeout) => Err(ProviderError::TimedOut(timeout)),
        Err(RecvTimeoutError::Disconnected) => {
            Err(ProviderError::Failed("provider thread panicked".to_string()))
        }
    }
}

impl<P> ForecastProvider for TimeLimited<P>
where
    P: ForecastProvider + Send + Sync + ?Sized + 'static,
{
    fn forecast(
        &self,
        window: PriceWindow<'_>,
        horizon: usize,
    ) -> Result<BaseForecast, ProviderError> {
        let inner = Arc::clone(&self.inner);
        let prices = window.prices.to_vec();
        let timestamps: Option<Vec<NaiveDateTime>> = window.timestamps.map(<[_]>::to_vec);
        run_with_timeout(self.timeout, move || {
            let owned = PriceWindow {
                prices: &prices,
                timestamps: timestamps.as_deref(),
            };
            inner.forecast(owned, horizon)
        })
    }
}

impl<P> RegimeProvider for TimeLimited<P>
where
    P: RegimeProvider + Send + Sync + ?Sized + 'static,
{
    fn classify(&self, log_returns: &[f64]) -> Result<RegimeBelief, ProviderError> {
        let inner = Arc::clone(&self.inner);
        let returns = log_returns.to_vec();
        run_with_timeout(self.timeout, move || inner.classify(&returns))
    }
}

impl<P> RiskProvider for TimeLimited<P>
where
    P: RiskProvider + Send + Sync + ?Sized + 'static,
{
    fn estimate(&self, log_returns: &[f64], alpha: f64) -> Result<RiskEstimate, ProviderError> {
        let inner = Arc::clone(&self.inner);
        let returns = log_returns.to_vec();
        run_with_timeout(self.timeout, move || inner.estimate(&returns, alpha))
    }
}
