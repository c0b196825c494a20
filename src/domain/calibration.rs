//! Conformal-style calibration of forecast quantiles.
//!
//! Empirical quantiles of the calibration residuals are grown with the
//! horizon step and added to the base median. The five values at each step
//! are then sorted so the band never crosses. Sorting can relabel which
//! offset ends up as q05 and which as q10 when offsets invert; downstream
//! stop placement and width read q10/q90 by position, so the sort is part of
//! the contract and must not become a clamp.

use super::numeric::quantile;
use super::quantiles::{BaseForecast, QuantileBand};
use super::scaling::{HorizonScaling, SqrtTime};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConformalCalibrator {
    pub alpha_low: f64,
    pub alpha_high: f64,
}

impl Default for ConformalCalibrator {
    fn default() -> Self {
        ConformalCalibrator {
            alpha_low: 0.05,
            alpha_high: 0.95,
        }
    }
}

/// Residual quantile offsets before horizon scaling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResidualOffsets {
    pub e05: f64,
    pub e10: f64,
    pub e90: f64,
    pub e95: f64,
}

impl ConformalCalibrator {
    pub fn offsets(&self, residuals: &[f64]) -> ResidualOffsets {
        ResidualOffsets {
            e05: quantile(residuals, self.alpha_low),
            e10: quantile(residuals, 0.10),
            e90: quantile(residuals, 0.90),
            e95: quantile(residuals, self.alpha_high),
        }
    }

    /// Calibrated band over `base.horizon()` steps. Only the base median
    /// anchors the band; the base outer quantiles are not consulted.
    pub fn apply(&self, base: &BaseForecast, scaling: &dyn HorizonScaling) -> QuantileBand {
        let h = base.horizon();
        let e = self.offsets(&base.residuals);

        let mut band = QuantileBand {
            q05: Vec::with_capacity(h),
            q10: Vec::with_capacity(h),
            q50: Vec::with_capacity(h),
            q90: Vec::with_capacity(h),
            q95: Vec::with_capacity(h),
        };

        for (i, &median) in base.q50.iter().enumerate() {
            let s = scaling.factor(i + 1);
            let mut step = [
                median + e.e05 * s,
                median + e.e10 * s,
                median,
                median + e.e90 * s,
                median + e.e95 * s,
            ];
            step.sort_by(f64::total_cmp);

            band.q05.push(step[0]);
            band.q10.push(step[1]);
            band.q50.push(step[2]);
            band.q90.push(step[3]);
            band.q95.push(step[4]);
        }

        band
    }
}

/// Default calibration: 5%/95% outer levels, square-root-of-time growth.
pub fn calibrate(base: &BaseForecast) -> QuantileBand {
    ConformalCalibrator::default().apply(base, &SqrtTime)
}
