//! EWMA volatility with Gaussian VaR/ES.

use super::standard_normal;
use crate::domain::error::ProviderError;
use crate::domain::numeric::{mean, sample_std};
use crate::domain::risk::RiskEstimate;
use crate::ports::risk_port::{RiskProvider, MIN_RISK_RETURNS};
use statrs::distribution::{Continuous, ContinuousCDF};

const SIGMA_FLOOR: f64 = 1e-8;

/// One-step risk from an exponentially weighted variance seeded with the
/// sample variance:
///
/// - `VaR = mu + sigma * z_alpha`
/// - `ES  = mu - sigma * phi(z_alpha) / alpha`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EwmaRiskEstimator {
    pub lambda: f64,
}

impl Default for EwmaRiskEstimator {
    fn default() -> Self {
        EwmaRiskEstimator { lambda: 0.94 }
    }
}

impl EwmaRiskEstimator {
    pub fn new(lambda: f64) -> Self {
        EwmaRiskEstimator { lambda }
    }
}

impl RiskProvider for EwmaRiskEstimator {
    fn estimate(&self, log_returns: &[f64], alpha: f64) -> Result<RiskEstimate, ProviderError> {
        if !(alpha > 0.0 && alpha < 1.0) {
            return Err(ProviderError::Failed(format!(
                "alpha must be in (0, 1), got {alpha}"
            )));
        }
        if !(self.lambda > 0.0 && self.lambda < 1.0) {
            return Err(ProviderError::Failed(format!(
                "lambda must be in (0, 1), got {}",
                self.lambda
            )));
        }

        let r: Vec<f64> = log_returns.iter().copied().filter(|x| x.is_finite()).collect();
        if r.len() < MIN_RISK_RETURNS {
            return Err(ProviderError::InsufficientHistory {
                have: r.len(),
                need: MIN_RISK_RETURNS,
            });
        }

        let mu = mean(&r);
        let variance = r.iter().fold(sample_std(&r).powi(2), |v, x| {
            self.lambda * v + (1.0 - self.lambda) * (x - mu).powi(2)
        });
        let sigma = variance.sqrt().max(SIGMA_FLOOR);

        let normal = standard_normal()?;
        let z = normal.inverse_cdf(alpha);
        Ok(RiskEstimate {
            mu,
            sigma,
            var: mu + sigma * z,
            es: mu - sigma * normal.pdf(z) / alpha,
            alpha,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn alternating(n: usize, amp: f64) -> Vec<f64> {
        (0..n).map(|i| if i % 2 == 0 { amp } else { -amp }).collect()
    }

    #[test]
    fn needs_one_hundred_finite_returns() {
        let mut r = alternating(99, 0.01);
        r.push(f64::NAN);
        let err = EwmaRiskEstimator::default().estimate(&r, 0.05).unwrap_err();
        assert_eq!(err, ProviderError::InsufficientHistory { have: 99, need: 100 });
    }

    #[test]
    fn es_is_beyond_var() {
        let est = EwmaRiskEstimator::default()
            .estimate(&alternating(200, 0.01), 0.05)
            .unwrap();
        assert!(est.validate().is_ok());
        assert!(est.var < 0.0);
        assert!(est.es < est.var);
        assert_abs_diff_eq!(est.mu, 0.0, epsilon = 1e-15);
    }

    #[test]
    fn gaussian_tail_constants() {
        let est = EwmaRiskEstimator::default()
            .estimate(&alternating(200, 0.01), 0.05)
            .unwrap();
        let z = standard_normal().unwrap().inverse_cdf(0.05);
        assert_abs_diff_eq!(z, -1.6448536, epsilon = 1e-6);
        assert_abs_diff_eq!(est.var, est.sigma * z, epsilon = 1e-15);
        assert_abs_diff_eq!(est.es / est.sigma, -2.0627128, epsilon = 1e-6);
    }

    #[test]
    fn constant_returns_floor_sigma() {
        let est = EwmaRiskEstimator::default()
            .estimate(&vec![0.0; 150], 0.05)
            .unwrap();
        assert_eq!(est.sigma, SIGMA_FLOOR);
        assert!(est.es.is_finite());
    }

    #[test]
    fn recent_shocks_raise_sigma() {
        let calm = alternating(200, 0.005);
        let mut shocked = calm.clone();
        shocked.extend(alternating(10, 0.05));
        let e = EwmaRiskEstimator::default();
        let s_calm = e.estimate(&calm, 0.05).unwrap().sigma;
        let s_shock = e.estimate(&shocked, 0.05).unwrap().sigma;
        assert!(s_shock > 2.0 * s_calm);
    }

    #[test]
    fn invalid_alpha_fails() {
        let err = EwmaRiskEstimator::default()
            .estimate(&alternating(120, 0.01), 0.0)
            .unwrap_err();
        assert!(matches!(err, ProviderError::Failed(_)));
    }
}
