//! Risk-aware signal policy.
//!
//! Fuses the calibrated forecast band at the decision horizon, the regime
//! belief and the horizon-projected expected shortfall into one decision:
//!
//! 1. `r_hat = ln(q50h / p0)`, `width_r = ln(q90h / q10h)` (floored),
//!    `thr = gate_frac * width_r`, `snr = r_hat / width_r`
//! 2. long iff `r_hat > thr` and bull is a (tied) most likely regime;
//!    short iff `r_hat < -thr` and bear is a (tied) most likely regime;
//!    otherwise flat
//! 3. stops and take-profits from the outer quantiles, target at the median
//! 4. `position_size = |r_hat| / es_h`, capped to `[0, 1]`

use chrono::NaiveDateTime;
use serde::Serialize;
use std::fmt;

use super::calibration::ConformalCalibrator;
use super::error::{EpitomeError, Stage};
use super::numeric::safe_ln;
use super::price::PriceWindow;
use super::quantiles::{BandPoint, QuantileBand};
use super::regime::RegimeBelief;
use super::risk::RiskEstimate;
use super::scaling::{HorizonScaling, SqrtTime};
use crate::ports::forecast_port::ForecastProvider;
use crate::ports::observer_port::{DecisionObserver, NoopObserver};
use crate::ports::regime_port::RegimeProvider;
use crate::ports::risk_port::RiskProvider;

/// Minimum prices for a decision.
pub const MIN_SIGNAL_PRICES: usize = 120;
/// Upper bound accepted for `horizon`.
pub const MAX_HORIZON: usize = 500;

const WIDTH_FLOOR: f64 = 1e-8;
const ES_FLOOR: f64 = 1e-8;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SignalConfig {
    /// Tail probability for VaR/ES.
    pub alpha: f64,
    /// Forecast steps; the decision is taken at the last one.
    pub horizon: usize,
    /// Directional threshold as a fraction of the q10-q90 log width.
    pub gate_frac: f64,
}

impl Default for SignalConfig {
    fn default() -> Self {
        SignalConfig {
            alpha: 0.05,
            horizon: 24,
            gate_frac: 0.15,
        }
    }
}

impl SignalConfig {
    pub fn validate(&self) -> Result<(), EpitomeError> {
        validate_alpha("signal", self.alpha)?;
        validate_horizon("signal", self.horizon)?;
        validate_gate_frac("signal", self.gate_frac)
    }
}

pub(crate) fn validate_alpha(section: &str, alpha: f64) -> Result<(), EpitomeError> {
    if !(alpha > 0.0 && alpha < 0.5) {
        return Err(EpitomeError::invalid_config(
            section,
            "alpha",
            format!("alpha must be in (0, 0.5), got {alpha}"),
        ));
    }
    Ok(())
}

pub(crate) fn validate_horizon(section: &str, horizon: usize) -> Result<(), EpitomeError> {
    if horizon == 0 || horizon > MAX_HORIZON {
        return Err(EpitomeError::invalid_config(
            section,
            "horizon",
            format!("horizon must be between 1 and {MAX_HORIZON}, got {horizon}"),
        ));
    }
    Ok(())
}

pub(crate) fn validate_gate_frac(section: &str, gate_frac: f64) -> Result<(), EpitomeError> {
    if !(0.0..1.0).contains(&gate_frac) {
        return Err(EpitomeError::invalid_config(
            section,
            "gate_frac",
            format!("gate_frac must be in [0, 1), got {gate_frac}"),
        ));
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Long,
    Short,
    Flat,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Action::Long => "long",
            Action::Short => "short",
            Action::Flat => "flat",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DecisionMetrics {
    pub r_hat: f64,
    pub snr: f64,
    pub width_r: f64,
    pub thr: f64,
    pub es_h: f64,
    pub alpha: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Decision {
    pub action: Action,
    pub horizon: usize,
    pub price0: f64,
    pub target: f64,
    pub stop: f64,
    pub takeprofit: f64,
    pub confidence: f64,
    pub position_size: f64,
    pub timestamp: Option<NaiveDateTime>,
    pub regime: RegimeBelief,
    pub risk: RiskEstimate,
    pub metrics: DecisionMetrics,
    pub quantiles: QuantileBand,
}

/// Turn calibrated inputs into a decision. Pure; never fails.
pub fn resolve(
    price0: f64,
    quantiles: QuantileBand,
    regime: RegimeBelief,
    risk: RiskEstimate,
    cfg: &SignalConfig,
    scaling: &dyn HorizonScaling,
) -> Decision {
    let horizon = cfg.horizon.max(1);
    let es_h = risk.es.abs() * scaling.factor(horizon);

    let h_idx = (horizon - 1).min(quantiles.len().saturating_sub(1));
    let at = quantiles.at(h_idx).unwrap_or(BandPoint {
        q05: price0,
        q10: price0,
        q50: price0,
        q90: price0,
        q95: price0,
    });

    let r_hat = safe_ln(at.q50 / price0);
    let width_r = safe_ln(at.q90 / at.q10).max(WIDTH_FLOOR);
    let thr = cfg.gate_frac * width_r;
    let snr = r_hat / width_r;

    let action = if r_hat > thr && regime.favours_bull() {
        Action::Long
    } else if r_hat < -thr && regime.favours_bear() {
        Action::Short
    } else {
        Action::Flat
    };

    let (stop, takeprofit, regime_prob) = match action {
        Action::Long => (at.q10.min(at.q05), at.q90.max(at.q95), regime.p_bull),
        Action::Short => (at.q90.max(at.q95), at.q10.min(at.q05), regime.p_bear),
        Action::Flat => (price0, price0, regime.p_chop),
    };

    let confidence = (0.6 * regime_prob + 0.4 * snr.abs().min(1.0)).clamp(0.0, 1.0);
    let position_size = (r_hat.abs() / es_h.max(ES_FLOOR)).clamp(0.0, 1.0);

    Decision {
        action,
        horizon,
        price0,
        target: at.q50,
        stop,
        takeprofit,
        confidence,
        position_size,
        timestamp: None,
        regime,
        risk,
        metrics: DecisionMetrics {
            r_hat,
            snr,
            width_r,
            thr,
            es_h,
            alpha: cfg.alpha,
        },
        quantiles,
    }
}

/// Decision pipeline over injected providers. Holds no state between calls.
pub struct SignalPolicy<'a> {
    forecast: &'a dyn ForecastProvider,
    regime: &'a dyn RegimeProvider,
    risk: &'a dyn RiskProvider,
    calibrator: ConformalCalibrator,
    scaling: &'a dyn HorizonScaling,
    observer: &'a dyn DecisionObserver,
}

impl<'a> SignalPolicy<'a> {
    pub fn new(
        forecast: &'a dyn ForecastProvider,
        regime: &'a dyn RegimeProvider,
        risk: &'a dyn RiskProvider,
    ) -> Self {
        SignalPolicy {
            forecast,
            regime,
            risk,
            calibrator: ConformalCalibrator::default(),
            scaling: &SqrtTime,
            observer: &NoopObserver,
        }
    }

    pub fn with_calibrator(mut self, calibrator: ConformalCalibrator) -> Self {
        self.calibrator = calibrator;
        self
    }

    pub fn with_scaling(mut self, scaling: &'a dyn HorizonScaling) -> Self {
        self.scaling = scaling;
        self
    }

    pub fn with_observer(mut self, observer: &'a dyn DecisionObserver) -> Self {
        self.observer = observer;
        self
    }

    pub fn observer(&self) -> &'a dyn DecisionObserver {
        self.observer
    }

    /// Decide on the history in `window`, using nothing beyond its last price.
    pub fn decide(
        &self,
        window: PriceWindow<'_>,
        cfg: &SignalConfig,
    ) -> Result<Decision, EpitomeError> {
        cfg.validate()?;

        let n = window.len();
        if n < MIN_SIGNAL_PRICES {
            return Err(EpitomeError::InsufficientHistory {
                stage: Stage::Signal,
                have: n,
                need: MIN_SIGNAL_PRICES,
            });
        }
        let price0 = window.prices[n - 1];

        let base = self
            .forecast
            .forecast(window, cfg.horizon)
            .map_err(|e| e.at(Stage::Forecast))?;
        base.validate(cfg.horizon)
            .map_err(|reason| EpitomeError::ProviderFailure {
                stage: Stage::Forecast,
                reason,
            })?;
        let band = self.calibrator.apply(&base, self.scaling);

        let returns = window.log_returns();

        let regime = self
            .regime
            .classify(&returns)
            .map_err(|e| e.at(Stage::Regime))?;
        regime
            .validate()
            .map_err(|reason| EpitomeError::ProviderFailure {
                stage: Stage::Regime,
                reason,
            })?;

        let risk = self
            .risk
            .estimate(&returns, cfg.alpha)
            .map_err(|e| e.at(Stage::Risk))?;
        risk.validate()
            .map_err(|reason| EpitomeError::ProviderFailure {
                stage: Stage::Risk,
                reason,
            })?;

        let mut decision = resolve(price0, band, regime, risk, cfg, self.scaling);
        decision.timestamp = window.last_timestamp();

        self.observer.on_decision(&decision);
        Ok(decision)
    }
}
