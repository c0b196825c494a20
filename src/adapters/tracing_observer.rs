//! Observer that emits `tracing` events.

use tracing::{debug, info};

use crate::domain::backtest::{BacktestResult, BacktestStep};
use crate::domain::signal::Decision;
use crate::ports::observer_port::DecisionObserver;

#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl DecisionObserver for TracingObserver {
    fn on_decision(&self, decision: &Decision) {
        debug!(
            action = %decision.action,
            regime = %decision.regime.label,
            price0 = decision.price0,
            r_hat = decision.metrics.r_hat,
            thr = decision.metrics.thr,
            size = decision.position_size,
            "decision"
        );
    }

    fn on_backtest_step(&self, step: &BacktestStep) {
        debug!(
            index = step.index,
            exit = step.exit_index,
            action = %step.action,
            step_return = step.step_return,
            equity = step.equity,
            "backtest step"
        );
    }

    fn on_backtest_complete(&self, result: &BacktestResult) {
        info!(
            steps = result.metrics.n_steps,
            long = result.counts.long,
            short = result.counts.short,
            flat = result.counts.flat,
            cagr = result.metrics.cagr,
            sharpe = result.metrics.sharpe,
            max_drawdown = result.metrics.max_drawdown,
            "backtest complete"
        );
    }
}
