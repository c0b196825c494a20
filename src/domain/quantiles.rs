//! Forecast quantile containers.

use serde::Serialize;

/// Raw provider forecast: per-step base quantiles plus the residuals
/// (actual minus predicted median) of a held-out calibration block.
#[derive(Debug, Clone, PartialEq)]
pub struct BaseForecast {
    pub q05: Vec<f64>,
    pub q10: Vec<f64>,
    pub q50: Vec<f64>,
    pub q90: Vec<f64>,
    pub q95: Vec<f64>,
    pub residuals: Vec<f64>,
}

impl BaseForecast {
    pub fn horizon(&self) -> usize {
        self.q50.len()
    }

    /// Boundary check applied once to every provider result.
    /// Residuals may contain non-finite values; the calibrator skips them.
    pub fn validate(&self, horizon: usize) -> Result<(), String> {
        let series = [
            ("q05", &self.q05),
            ("q10", &self.q10),
            ("q50", &self.q50),
            ("q90", &self.q90),
            ("q95", &self.q95),
        ];
        for (name, values) in series {
            if values.len() != horizon {
                return Err(format!(
                    "{name} has {} steps, expected {horizon}",
                    values.len()
                ));
            }
            if let Some(i) = values.iter().position(|v| !v.is_finite()) {
                return Err(format!("{name} is not finite at step {}", i + 1));
            }
        }
        Ok(())
    }
}

/// Calibrated, non-crossing band: `q05[i] <= q10[i] <= q50[i] <= q90[i] <= q95[i]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuantileBand {
    pub q05: Vec<f64>,
    pub q10: Vec<f64>,
    pub q50: Vec<f64>,
    pub q90: Vec<f64>,
    pub q95: Vec<f64>,
}

/// The five band values at one horizon step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandPoint {
    pub q05: f64,
    pub q10: f64,
    pub q50: f64,
    pub q90: f64,
    pub q95: f64,
}

impl QuantileBand {
    pub fn len(&self) -> usize {
        self.q50.len()
    }

    pub fn is_empty(&self) -> bool {
        self.q50.is_empty()
    }

    /// `None` past the end of any of the five series.
    pub fn at(&self, index: usize) -> Option<BandPoint> {
        Some(BandPoint {
            q05: *self.q05.get(index)?,
            q10: *self.q10.get(index)?,
            q50: *self.q50.get(index)?,
            q90: *self.q90.get(index)?,
            q95: *self.q95.get(index)?,
        })
    }

    pub fn is_monotonic(&self) -> bool {
        (0..self.len()).all(|i| {
            self.at(i).is_some_and(|p| {
                p.q05 <= p.q10 && p.q10 <= p.q50 && p.q50 <= p.q90 && p.q90 <= p.q95
            })
        })
    }
}
