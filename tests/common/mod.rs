#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use epitome::domain::backtest::BacktestStep;
use epitome::domain::error::{EpitomeError, ProviderError};
use epitome::domain::price::{PriceSeries, PriceWindow};
use epitome::domain::quantiles::BaseForecast;
use epitome::domain::regime::RegimeBelief;
use epitome::domain::risk::RiskEstimate;
use epitome::domain::signal::Decision;
use epitome::ports::data_port::PriceDataPort;
use epitome::ports::forecast_port::ForecastProvider;
use epitome::ports::observer_port::DecisionObserver;
use epitome::ports::regime_port::RegimeProvider;
use epitome::ports::risk_port::RiskProvider;
use std::cell::RefCell;
use std::collections::HashMap;

/// Forecast whose median sits at `p0 * ratio` for every step, with fixed
/// calibration residuals. Records the length of every window it sees.
pub struct MockForecast {
    pub ratio: f64,
    pub residuals: Vec<f64>,
    pub error: Option<ProviderError>,
    pub seen: RefCell<Vec<usize>>,
}

impl MockForecast {
    pub fn new(ratio: f64) -> Self {
        Self {
            ratio,
            residuals: vec![-0.5, -0.25, 0.0, 0.25, 0.5],
            error: None,
            seen: RefCell::new(Vec::new()),
        }
    }

    pub fn with_residuals(mut self, residuals: Vec<f64>) -> Self {
        self.residuals = residuals;
        self
    }

    pub fn with_error(mut self, error: ProviderError) -> Self {
        self.error = Some(error);
        self
    }
}

impl ForecastProvider for MockForecast {
    fn forecast(
        &self,
        window: PriceWindow<'_>,
        horizon: usize,
    ) -> Result<BaseForecast, ProviderError> {
        self.seen.borrow_mut().push(window.len());
        if let Some(err) = &self.error {
            return Err(err.clone());
        }
        let p0 = window.last_price().unwrap_or(1.0);
        let q50 = vec![p0 * self.ratio; horizon];
        Ok(BaseForecast {
            q05: q50.clone(),
            q10: q50.clone(),
            q50: q50.clone(),
            q90: q50.clone(),
            q95: q50,
            residuals: self.residuals.clone(),
        })
    }
}

pub struct MockRegime {
    pub belief: Result<RegimeBelief, ProviderError>,
}

impl MockRegime {
    pub fn fixed(p_bull: f64, p_bear: f64, p_chop: f64) -> Self {
        Self {
            belief: Ok(RegimeBelief::from_probabilities(p_bull, p_bear, p_chop)),
        }
    }

    pub fn bull() -> Self {
        Self::fixed(0.6, 0.2, 0.2)
    }

    pub fn bear() -> Self {
        Self::fixed(0.2, 0.6, 0.2)
    }

    pub fn failing(error: ProviderError) -> Self {
        Self { belief: Err(error) }
    }
}

impl RegimeProvider for MockRegime {
    fn classify(&self, _log_returns: &[f64]) -> Result<RegimeBelief, ProviderError> {
        self.belief.clone()
    }
}

pub struct MockRisk {
    pub es: f64,
    pub error: Option<ProviderError>,
}

impl MockRisk {
    pub fn fixed(es: f64) -> Self {
        Self { es, error: None }
    }

    pub fn failing(error: ProviderError) -> Self {
        Self {
            es: 0.0,
            error: Some(error),
        }
    }
}

impl RiskProvider for MockRisk {
    fn estimate(&self, _log_returns: &[f64], alpha: f64) -> Result<RiskEstimate, ProviderError> {
        if let Some(err) = &self.error {
            return Err(err.clone());
        }
        Ok(RiskEstimate {
            mu: 0.0,
            sigma: self.es.abs() / 2.0,
            var: self.es * 0.8,
            es: self.es,
            alpha,
        })
    }
}

pub struct MockPriceData {
    pub series: HashMap<String, PriceSeries>,
}

impl MockPriceData {
    pub fn new() -> Self {
        Self {
            series: HashMap::new(),
        }
    }

    pub fn with_series(mut self, source: &str, series: PriceSeries) -> Self {
        self.series.insert(source.to_string(), series);
        self
    }
}

impl PriceDataPort for MockPriceData {
    fn load_prices(&self, source: &str) -> Result<PriceSeries, EpitomeError> {
        self.series
            .get(source)
            .cloned()
            .ok_or_else(|| EpitomeError::invalid_data(format!("unknown source {source}")))
    }
}

#[derive(Default)]
pub struct RecordingObserver {
    pub decisions: RefCell<Vec<Decision>>,
    pub steps: RefCell<Vec<BacktestStep>>,
    pub completed: RefCell<usize>,
}

impl DecisionObserver for RecordingObserver {
    fn on_decision(&self, decision: &Decision) {
        self.decisions.borrow_mut().push(decision.clone());
    }

    fn on_backtest_step(&self, step: &BacktestStep) {
        self.steps.borrow_mut().push(step.clone());
    }

    fn on_backtest_complete(&self, _result: &epitome::domain::backtest::BacktestResult) {
        *self.completed.borrow_mut() += 1;
    }
}

pub fn constant_prices(n: usize, price: f64) -> Vec<f64> {
    vec![price; n]
}

/// `p_i = start * exp(growth * i)`.
pub fn trending_prices(n: usize, start: f64, growth: f64) -> Vec<f64> {
    (0..n).map(|i| start * (growth * i as f64).exp()).collect()
}

/// Deterministic, noisy-looking series around 100.
pub fn wavy_prices(n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| {
            let x = i as f64;
            100.0 * (0.0004 * x).exp() + 2.0 * (x * 0.37).sin() + 1.5 * (x * 0.11).cos()
        })
        .collect()
}

pub fn daily_timestamps(n: usize) -> Vec<NaiveDateTime> {
    let start = NaiveDate::from_ymd_opt(2022, 1, 3)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    (0..n)
        .map(|i| start + chrono::Duration::days(i as i64))
        .collect()
}

pub fn prices_csv(prices: &[f64]) -> String {
    let mut out = String::from("date,close\n");
    for (ts, p) in daily_timestamps(prices.len()).iter().zip(prices) {
        out.push_str(&format!("{},{}\n", ts.format("%Y-%m-%d"), p));
    }
    out
}
