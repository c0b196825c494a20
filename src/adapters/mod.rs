//! Concrete adapter implementations for ports.

pub mod csv_adapter;
pub mod csv_report_adapter;
pub mod ewma_risk;
pub mod file_config_adapter;
pub mod gaussian_regime;
pub mod random_walk_forecast;
pub mod time_limited;
pub mod tracing_observer;

use crate::domain::error::ProviderError;
use statrs::distribution::Normal;

/// N(0, 1) shared by the Gaussian providers.
pub(crate) fn standard_normal() -> Result<Normal, ProviderError> {
    Normal::new(0.0, 1.0).map_err(|e| ProviderError::Failed(format!("standard normal: {e}")))
}
