//! Regime provider port.

use crate::domain::error::ProviderError;
use crate::domain::regime::RegimeBelief;

/// Below this many returns a regime provider answers
/// [`RegimeBelief::unknown`] instead of failing.
pub const MIN_REGIME_RETURNS: usize = 60;

pub trait RegimeProvider {
    fn classify(&self, log_returns: &[f64]) -> Result<RegimeBelief, ProviderError>;
}
