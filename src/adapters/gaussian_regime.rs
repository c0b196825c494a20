//! Three-state Gaussian forward filter over log-returns.
//!
//! States are bear, chop and bull with means `-d`, `0` and `+d`, where
//! `d = drift_multiple * sigma` and `sigma` is the sample standard deviation
//! of the returns. All states share `sigma`. The transition matrix keeps the
//! current state with probability `stay_prob` and splits the rest evenly.
//! The belief is the filtered distribution after the last return.

use super::standard_normal;
use crate::domain::error::ProviderError;
use crate::domain::numeric::sample_std;
use crate::domain::regime::RegimeBelief;
use crate::ports::regime_port::{RegimeProvider, MIN_REGIME_RETURNS};
use statrs::distribution::{Continuous, Normal};

const SIGMA_FLOOR: f64 = 1e-8;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaussianRegimeFilter {
    pub stay_prob: f64,
    pub drift_multiple: f64,
}

impl Default for GaussianRegimeFilter {
    fn default() -> Self {
        GaussianRegimeFilter {
            stay_prob: 0.95,
            drift_multiple: 0.5,
        }
    }
}

impl GaussianRegimeFilter {
    pub fn with_stay_prob(stay_prob: f64) -> Self {
        GaussianRegimeFilter {
            stay_prob,
            ..Self::default()
        }
    }

    /// Filtered `[bear, chop, bull]` probabilities after the last return.
    fn filter(&self, returns: &[f64], normal: &Normal) -> [f64; 3] {
        let sigma = sample_std(returns).max(SIGMA_FLOOR);
        let d = self.drift_multiple * sigma;
        let means = [-d, 0.0, d];
        let stay = self.stay_prob;
        let move_prob = (1.0 - stay) / 2.0;

        let mut belief = [1.0 / 3.0; 3];
        for &r in returns {
            let mut predicted = [0.0; 3];
            for (j, p) in predicted.iter_mut().enumerate() {
                *p = (0..3)
                    .map(|i| belief[i] * if i == j { stay } else { move_prob })
                    .sum();
            }

            let mut posterior = [0.0; 3];
            for j in 0..3 {
                posterior[j] = predicted[j] * normal.pdf((r - means[j]) / sigma);
            }
            let total: f64 = posterior.iter().sum();

            belief = if total > 0.0 && total.is_finite() {
                posterior.map(|p| p / total)
            } else {
                // Every likelihood underflowed; carry the prediction forward.
                predicted
            };
        }
        belief
    }
}

impl RegimeProvider for GaussianRegimeFilter {
    fn classify(&self, log_returns: &[f64]) -> Result<RegimeBelief, ProviderError> {
        if !(self.stay_prob > 0.0 && self.stay_prob < 1.0) {
            return Err(ProviderError::Failed(format!(
                "stay_prob must be in (0, 1), got {}",
                self.stay_prob
            )));
        }

        let finite: Vec<f64> = log_returns.iter().copied().filter(|r| r.is_finite()).collect();
        if finite.len() < MIN_REGIME_RETURNS {
            return Ok(RegimeBelief::unknown());
        }

        let normal = standard_normal()?;
        let [bear, chop, bull] = self.filter(&finite, &normal);
        Ok(RegimeBelief::from_probabilities(bull, bear, chop))
    }
}
