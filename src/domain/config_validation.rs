//! Configuration validation.
//!
//! Reads each INI section through the typed [`ConfigPort`] getters. Absent
//! keys take the default; malformed or out-of-range values are rejected.

use std::time::Duration;

use crate::domain::backtest::{BacktestConfig, Rebalance};
use crate::domain::error::EpitomeError;
use crate::domain::signal::SignalConfig;
use crate::ports::config_port::ConfigPort;

/// Tunables for the reference providers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProviderSettings {
    /// Per-call limit; `None` runs providers inline.
    pub timeout: Option<Duration>,
    pub ewma_lambda: f64,
    pub regime_stay_prob: f64,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        ProviderSettings {
            timeout: None,
            ewma_lambda: 0.94,
            regime_stay_prob: 0.95,
        }
    }
}

pub fn signal_config(config: &dyn ConfigPort) -> Result<SignalConfig, EpitomeError> {
    let defaults = SignalConfig::default();
    let cfg = SignalConfig {
        alpha: config.get_double("signal", "alpha")?.unwrap_or(defaults.alpha),
        horizon: config.get_usize("signal", "horizon")?.unwrap_or(defaults.horizon),
        gate_frac: config.get_double("signal", "gate_frac")?.unwrap_or(defaults.gate_frac),
    };
    cfg.validate()?;
    Ok(cfg)
}

pub fn backtest_config(config: &dyn ConfigPort) -> Result<BacktestConfig, EpitomeError> {
    const SECTION: &str = "backtest";
    let defaults = BacktestConfig::default();

    let rebalance = match config.get_value(SECTION, "rebalance") {
        Some(s) => s
            .parse::<Rebalance>()
            .map_err(|reason| EpitomeError::invalid_config(SECTION, "rebalance", reason))?,
        None => defaults.rebalance,
    };

    let cfg = BacktestConfig {
        horizon: config.get_usize(SECTION, "horizon")?.unwrap_or(defaults.horizon),
        alpha: config.get_double(SECTION, "alpha")?.unwrap_or(defaults.alpha),
        gate_frac: config.get_double(SECTION, "gate_frac")?.unwrap_or(defaults.gate_frac),
        stride: config.get_usize(SECTION, "stride")?.unwrap_or(defaults.stride),
        lookback_min: config
            .get_usize(SECTION, "lookback_min")?
            .unwrap_or(defaults.lookback_min),
        fees: config.get_double(SECTION, "fees")?.unwrap_or(defaults.fees),
        slippage: config.get_double(SECTION, "slippage")?.unwrap_or(defaults.slippage),
        rebalance,
        annualization: config
            .get_double(SECTION, "annualization")?
            .unwrap_or(defaults.annualization),
    };
    cfg.validate()?;
    Ok(cfg)
}

pub fn provider_settings(config: &dyn ConfigPort) -> Result<ProviderSettings, EpitomeError> {
    const SECTION: &str = "providers";
    let defaults = ProviderSettings::default();

    let timeout_ms = config.get_usize(SECTION, "timeout_ms")?.unwrap_or(0);
    let ewma_lambda = config
        .get_double(SECTION, "ewma_lambda")?
        .unwrap_or(defaults.ewma_lambda);
    if !(ewma_lambda > 0.0 && ewma_lambda < 1.0) {
        return Err(EpitomeError::invalid_config(
            SECTION,
            "ewma_lambda",
            format!("ewma_lambda must be in (0, 1), got {ewma_lambda}"),
        ));
    }
    let regime_stay_prob = config
        .get_double(SECTION, "regime_stay_prob")?
        .unwrap_or(defaults.regime_stay_prob);
    if !(regime_stay_prob > 0.0 && regime_stay_prob < 1.0) {
        return Err(EpitomeError::invalid_config(
            SECTION,
            "regime_stay_prob",
            format!("regime_stay_prob must be in (0, 1), got {regime_stay_prob}"),
        ));
    }

    Ok(ProviderSettings {
        timeout: (timeout_ms > 0).then(|| Duration::from_millis(timeout_ms as u64)),
        ewma_lambda,
        regime_stay_prob,
    })
}

/// `[data] prices`, required unless overridden on the command line.
pub fn prices_path(config: &dyn ConfigPort) -> Result<String, EpitomeError> {
    config
        .get_value("data", "prices")
        .ok_or_else(|| EpitomeError::ConfigMissing {
            section: "data".to_string(),
            key: "prices".to_string(),
        })
}

/// Validate every section, as the `validate` subcommand does.
pub fn validate_all(config: &dyn ConfigPort) -> Result<(), EpitomeError> {
    prices_path(config)?;
    signal_config(config)?;
    backtest_config(config)?;
    provider_settings(config)?;
    Ok(())
}
