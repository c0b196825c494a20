//! Risk provider port.

use crate::domain::error::ProviderError;
use crate::domain::risk::RiskEstimate;

/// Minimum returns a risk provider accepts.
pub const MIN_RISK_RETURNS: usize = 100;

/// One-step conditional mean, volatility and left-tail VaR/ES at tail
/// probability `alpha`.
pub trait RiskProvider {
    fn estimate(&self, log_returns: &[f64], alpha: f64) -> Result<RiskEstimate, ProviderError>;
}
