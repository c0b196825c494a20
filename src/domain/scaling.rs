//! Horizon scaling of one-step uncertainty.
//!
//! Both the calibrator (residual offsets per step) and the policy (ES
//! projection to the decision horizon) grow one-step quantities with the
//! number of steps through this trait.

pub trait HorizonScaling: Send + Sync {
    /// Multiplier for a quantity measured over one step when projected over
    /// `steps` steps. Callers pass `steps >= 1`.
    fn factor(&self, steps: usize) -> f64;
}

/// Square-root-of-time scaling, exact for i.i.d. increments.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SqrtTime;

impl HorizonScaling for SqrtTime {
    fn factor(&self, steps: usize) -> f64 {
        (steps.max(1) as f64).sqrt()
    }
}

/// Linear scaling, for perfectly autocorrelated increments.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LinearTime;

impl HorizonScaling for LinearTime {
    fn factor(&self, steps: usize) -> f64 {
        steps.max(1) as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sqrt_time_factors() {
        assert_eq!(SqrtTime.factor(1), 1.0);
        assert_eq!(SqrtTime.factor(4), 2.0);
        assert_eq!(SqrtTime.factor(0), 1.0);
    }

    #[test]
    fn linear_time_factors() {
        assert_eq!(LinearTime.factor(1), 1.0);
        assert_eq!(LinearTime.factor(24), 24.0);
        assert_eq!(LinearTime.factor(0), 1.0);
    }
}
