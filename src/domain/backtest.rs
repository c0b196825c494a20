//! Walk-forward backtest engine.
//!
//! Starting at `t0 = max(lookback_min, 120)`, the policy decides on
//! `prices[0..=t]`, the position is held for `min(stride, n-1-t)` bars and
//! the engine advances to the exit bar. Costs are charged once per
//! evaluation on non-flat positions.

use chrono::NaiveDateTime;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use super::error::{EpitomeError, Stage};
use super::metrics::PerformanceMetrics;
use super::numeric::log_return;
use super::price::PriceSeries;
use super::signal::{
    validate_alpha, validate_gate_frac, validate_horizon, Action, SignalConfig, SignalPolicy,
    MIN_SIGNAL_PRICES,
};

/// When positions are revised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Rebalance {
    /// Hold until the next evaluation point.
    #[default]
    #[serde(rename = "next")]
    HoldUntilNextEvaluation,
}

impl FromStr for Rebalance {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "next" => Ok(Rebalance::HoldUntilNextEvaluation),
            other => Err(format!("unknown rebalance policy '{other}', expected 'next'")),
        }
    }
}

impl fmt::Display for Rebalance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rebalance::HoldUntilNextEvaluation => f.write_str("next"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BacktestConfig {
    pub horizon: usize,
    pub alpha: f64,
    pub gate_frac: f64,
    /// Bars between evaluations.
    pub stride: usize,
    pub lookback_min: usize,
    /// Proportional fee per rebalance.
    pub fees: f64,
    /// Proportional slippage per rebalance.
    pub slippage: f64,
    pub rebalance: Rebalance,
    /// Periods per year, one evaluation step per period.
    pub annualization: f64,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        BacktestConfig {
            horizon: 24,
            alpha: 0.05,
            gate_frac: 0.15,
            stride: 5,
            lookback_min: 300,
            fees: 0.0002,
            slippage: 0.0001,
            rebalance: Rebalance::HoldUntilNextEvaluation,
            annualization: 252.0,
        }
    }
}

impl BacktestConfig {
    pub fn validate(&self) -> Result<(), EpitomeError> {
        const SECTION: &str = "backtest";
        validate_alpha(SECTION, self.alpha)?;
        validate_horizon(SECTION, self.horizon)?;
        validate_gate_frac(SECTION, self.gate_frac)?;

        if self.stride == 0 {
            return Err(EpitomeError::invalid_config(
                SECTION,
                "stride",
                "stride must be at least 1",
            ));
        }
        for (key, value) in [("fees", self.fees), ("slippage", self.slippage)] {
            if !value.is_finite() || value < 0.0 {
                return Err(EpitomeError::invalid_config(
                    SECTION,
                    key,
                    format!("{key} must be non-negative, got {value}"),
                ));
            }
        }
        if !self.annualization.is_finite() || self.annualization <= 0.0 {
            return Err(EpitomeError::invalid_config(
                SECTION,
                "annualization",
                format!("annualization must be positive, got {}", self.annualization),
            ));
        }
        Ok(())
    }

    pub fn signal_config(&self) -> SignalConfig {
        SignalConfig {
            alpha: self.alpha,
            horizon: self.horizon,
            gate_frac: self.gate_frac,
        }
    }

    pub fn costs(&self) -> f64 {
        self.fees + self.slippage
    }

    /// First evaluation index and the minimum series length.
    pub fn first_index(&self) -> usize {
        self.lookback_min.max(MIN_SIGNAL_PRICES)
    }
}

/// One evaluation of the walk-forward loop.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BacktestStep {
    pub index: usize,
    pub exit_index: usize,
    pub timestamp: Option<NaiveDateTime>,
    pub action: Action,
    pub position_size: f64,
    /// Log price change over the holding period.
    pub raw_return: f64,
    /// Position log-return after costs.
    pub step_return: f64,
    pub equity: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ActionCounts {
    pub long: usize,
    pub short: usize,
    pub flat: usize,
}

impl ActionCounts {
    pub fn record(&mut self, action: Action) {
        match action {
            Action::Long => self.long += 1,
            Action::Short => self.short += 1,
            Action::Flat => self.flat += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.long + self.short + self.flat
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EquityCurve {
    /// Bar index each equity value is marked at.
    pub index: Vec<usize>,
    pub equity: Vec<f64>,
    pub timestamps: Option<Vec<NaiveDateTime>>,
}

impl EquityCurve {
    pub fn len(&self) -> usize {
        self.equity.len()
    }

    pub fn is_empty(&self) -> bool {
        self.equity.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BacktestResult {
    pub metrics: PerformanceMetrics,
    pub config: BacktestConfig,
    pub counts: ActionCounts,
    pub equity_curve: EquityCurve,
    pub steps: Vec<BacktestStep>,
}

impl BacktestResult {
    pub fn final_equity(&self) -> f64 {
        self.equity_curve.equity.last().copied().unwrap_or(1.0)
    }
}

/// Run the walk-forward loop over `series`. Any decision error ends the run.
pub fn run_backtest(
    policy: &SignalPolicy<'_>,
    series: &PriceSeries,
    cfg: &BacktestConfig,
) -> Result<BacktestResult, EpitomeError> {
    cfg.validate()?;

    let n = series.len();
    let t0 = cfg.first_index();
    if n < t0 {
        return Err(EpitomeError::InsufficientHistory {
            stage: Stage::Backtest,
            have: n,
            need: t0,
        });
    }

    let prices = series.prices();
    let signal_cfg = cfg.signal_config();
    let costs = cfg.costs();
    let observer = policy.observer();

    let mut counts = ActionCounts::default();
    let mut curve = EquityCurve {
        timestamps: series.timestamps().map(|_| Vec::new()),
        ..EquityCurve::default()
    };
    let mut steps = Vec::new();
    let mut step_returns = Vec::new();
    let mut equity = 1.0_f64;

    let mut t = t0;
    while t < n - 1 {
        let hold = cfg.stride.min(n - 1 - t);
        let exit = t + hold;

        let decision = policy.decide(series.window_through(t), &signal_cfg)?;

        let raw_return = log_return(prices[t], prices[exit]);
        let size = decision.position_size;
        let step_return = match decision.action {
            Action::Long => size * (raw_return - costs),
            Action::Short => size * (-raw_return - costs),
            Action::Flat => 0.0,
        };
        equity *= step_return.exp();
        counts.record(decision.action);

        curve.index.push(exit);
        curve.equity.push(equity);
        if let (Some(ts), Some(stamp)) = (curve.timestamps.as_mut(), series.timestamp_at(exit)) {
            ts.push(stamp);
        }

        let step = BacktestStep {
            index: t,
            exit_index: exit,
            timestamp: decision.timestamp,
            action: decision.action,
            position_size: size,
            raw_return,
            step_return,
            equity,
        };
        observer.on_backtest_step(&step);
        steps.push(step);
        step_returns.push(step_return);

        t = exit;
    }

    let result = BacktestResult {
        metrics: PerformanceMetrics::compute(&step_returns, cfg.annualization),
        config: cfg.clone(),
        counts,
        equity_curve: curve,
        steps,
    };
    observer.on_backtest_complete(&result);
    Ok(result)
}
