//! Performance metrics over a walk-forward run's per-step log-returns.

use serde::Serialize;

use super::numeric::{mean, sample_std};

const YEARS_FLOOR: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceMetrics {
    pub cagr: f64,
    pub sharpe: f64,
    pub sortino: f64,
    /// Worst peak-to-trough fraction, `<= 0`.
    pub max_drawdown: f64,
    pub hit_rate: f64,
    pub total_return: f64,
    pub n_steps: usize,
}

impl PerformanceMetrics {
    /// Metrics for a sequence of per-step log-returns. One evaluation step
    /// counts as one period of `annualization`.
    pub fn compute(log_returns: &[f64], annualization: f64) -> Self {
        let n_steps = log_returns.len();
        if n_steps == 0 {
            return PerformanceMetrics::empty();
        }

        let equity = equity_path(log_returns);
        let final_equity = equity.last().copied().unwrap_or(1.0);

        let years = (n_steps as f64 / annualization).max(YEARS_FLOOR);
        let cagr = final_equity.powf(1.0 / years) - 1.0;

        let (sharpe, sortino) = compute_risk_adjusted(log_returns, annualization);

        let wins = log_returns.iter().filter(|&&r| r > 0.0).count();

        PerformanceMetrics {
            cagr,
            sharpe,
            sortino,
            max_drawdown: compute_drawdown(&equity),
            hit_rate: wins as f64 / n_steps as f64,
            total_return: final_equity - 1.0,
            n_steps,
        }
    }

    pub fn empty() -> Self {
        PerformanceMetrics {
            cagr: 0.0,
            sharpe: 0.0,
            sortino: 0.0,
            max_drawdown: 0.0,
            hit_rate: 0.0,
            total_return: 0.0,
            n_steps: 0,
        }
    }
}

/// `exp(cumsum(lr))`, starting from the first step's equity.
pub fn equity_path(log_returns: &[f64]) -> Vec<f64> {
    let mut acc = 0.0;
    log_returns
        .iter()
        .map(|r| {
            acc += r;
            acc.exp()
        })
        .collect()
}

fn compute_drawdown(equity: &[f64]) -> f64 {
    let mut peak = f64::NEG_INFINITY;
    let mut max_dd = 0.0_f64;

    for &e in equity {
        peak = peak.max(e);
        if peak > 0.0 {
            let dd = (e - peak) / peak;
            if dd < max_dd {
                max_dd = dd;
            }
        }
    }

    max_dd
}

fn compute_risk_adjusted(returns: &[f64], annualization: f64) -> (f64, f64) {
    if returns.len() < 2 {
        return (0.0, 0.0);
    }

    let avg = mean(returns);
    let std = sample_std(returns);
    let scale = annualization.sqrt();

    let sharpe = if std > 0.0 { avg / std * scale } else { 0.0 };

    let downside_sq: f64 = returns
        .iter()
        .filter(|&&r| r < 0.0)
        .map(|r| r * r)
        .sum();
    let downside_dev = (downside_sq / returns.len() as f64).sqrt();
    let sortino = if downside_dev > 0.0 {
        avg / downside_dev * scale
    } else {
        0.0
    };

    (sharpe, sortino)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn empty_returns_give_zero_metrics() {
        let m = PerformanceMetrics::compute(&[], 252.0);
        assert_eq!(m, PerformanceMetrics::empty());
    }

    #[test]
    fn flat_returns() {
        let m = PerformanceMetrics::compute(&[0.0; 10], 252.0);
        assert_eq!(m.n_steps, 10);
        assert_eq!(m.cagr, 0.0);
        assert_eq!(m.sharpe, 0.0);
        assert_eq!(m.sortino, 0.0);
        assert_eq!(m.max_drawdown, 0.0);
        assert_eq!(m.hit_rate, 0.0);
        assert_eq!(m.total_return, 0.0);
    }

    #[test]
    fn single_step_has_no_sharpe() {
        let m = PerformanceMetrics::compute(&[0.01], 252.0);
        assert_eq!(m.sharpe, 0.0);
        assert_eq!(m.hit_rate, 1.0);
        assert_abs_diff_eq!(m.total_return, 0.01_f64.exp() - 1.0, epsilon = 1e-12);
    }

    #[test]
    fn drawdown_is_non_positive() {
        let lr = [0.10, -0.20, 0.05, -0.05, 0.30];
        let m = PerformanceMetrics::compute(&lr, 252.0);
        // Peak exp(0.10), trough exp(-0.10).
        let expected = ((-0.10_f64).exp() - 0.10_f64.exp()) / 0.10_f64.exp();
        assert_abs_diff_eq!(m.max_drawdown, expected, epsilon = 1e-12);
        assert!(m.max_drawdown <= 0.0);
    }

    #[test]
    fn first_step_loss_counts_from_its_own_equity() {
        let m = PerformanceMetrics::compute(&[-0.1, -0.1], 252.0);
        let expected = (-0.1_f64).exp() - 1.0;
        assert_abs_diff_eq!(m.max_drawdown, expected, epsilon = 1e-12);
    }

    #[test]
    fn sharpe_uses_sample_std() {
        let lr = [0.01, 0.03, -0.01, 0.02];
        let m = PerformanceMetrics::compute(&lr, 252.0);
        let avg = 0.0125;
        let var = ((0.01_f64 - avg).powi(2)
            + (0.03_f64 - avg).powi(2)
            + (-0.01_f64 - avg).powi(2)
            + (0.02_f64 - avg).powi(2))
            / 3.0;
        assert_abs_diff_eq!(m.sharpe, avg / var.sqrt() * 252.0_f64.sqrt(), epsilon = 1e-9);
        assert_abs_diff_eq!(m.hit_rate, 0.75);
    }

    #[test]
    fn sortino_uses_downside_only() {
        let lr = [0.02, -0.01, 0.03, -0.02];
        let m = PerformanceMetrics::compute(&lr, 252.0);
        let avg = 0.005;
        let dd = ((0.0001 + 0.0004) / 4.0_f64).sqrt();
        assert_abs_diff_eq!(m.sortino, avg / dd * 252.0_f64.sqrt(), epsilon = 1e-9);
    }

    #[test]
    fn cagr_annualises_by_steps() {
        let lr = vec![0.001; 252];
        let m = PerformanceMetrics::compute(&lr, 252.0);
        assert_abs_diff_eq!(m.cagr, 0.252_f64.exp() - 1.0, epsilon = 1e-9);
        assert_abs_diff_eq!(m.total_return, m.cagr, epsilon = 1e-9);
    }

    #[test]
    fn equity_path_compounds() {
        let e = equity_path(&[0.1, 0.2]);
        assert_abs_diff_eq!(e[0], 0.1_f64.exp(), epsilon = 1e-12);
        assert_abs_diff_eq!(e[1], 0.3_f64.exp(), epsilon = 1e-12);
    }
}
