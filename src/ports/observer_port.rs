//! Observer port for decisions and backtest progress.
//!
//! Replaces process-wide counters: callers inject an observer and decide
//! what to record.

use crate::domain::backtest::{BacktestResult, BacktestStep};
use crate::domain::signal::Decision;

pub trait DecisionObserver {
    fn on_decision(&self, _decision: &Decision) {}

    fn on_backtest_step(&self, _step: &BacktestStep) {}

    fn on_backtest_complete(&self, _result: &BacktestResult) {}
}

/// Observer that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl DecisionObserver for NoopObserver {}
