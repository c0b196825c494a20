//! Shared numeric helpers: floored logs, empirical quantiles and moments.

/// Smallest argument passed to `ln` by [`safe_ln`].
pub const LOG_FLOOR: f64 = 1e-12;

/// `ln(max(LOG_FLOOR, x))`. Never returns NaN for finite or NaN-free input.
pub fn safe_ln(x: f64) -> f64 {
    x.max(LOG_FLOOR).ln()
}

/// Floored log-return between two prices.
pub fn log_return(from: f64, to: f64) -> f64 {
    (to.max(LOG_FLOOR) / from.max(LOG_FLOOR)).ln()
}

/// `r_t = ln(p_t / p_{t-1})` for consecutive prices. Empty for fewer than two.
pub fn log_returns(prices: &[f64]) -> Vec<f64> {
    prices.windows(2).map(|w| log_return(w[0], w[1])).collect()
}

/// Empirical quantile with linear interpolation between order statistics
/// (position `p * (n - 1)`). Non-finite values are ignored; returns 0.0 when
/// nothing finite remains.
pub fn quantile(values: &[f64], p: f64) -> f64 {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if sorted.is_empty() {
        return 0.0;
    }
    sorted.sort_by(f64::total_cmp);

    let p = p.clamp(0.0, 1.0);
    let pos = p * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n - 1 denominator). 0.0 for fewer than two values.
pub fn sample_std(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let ss: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    (ss / (values.len() - 1) as f64).sqrt()
}
