//! One-step conditional risk estimate.

use serde::Serialize;

/// Conditional moments and left-tail measures for the next step, in decimal
/// return units. `var` and `es` are signed returns: for the left tail
/// `es <= var`, both usually negative.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RiskEstimate {
    pub mu: f64,
    pub sigma: f64,
    pub var: f64,
    pub es: f64,
    pub alpha: f64,
}

impl RiskEstimate {
    pub fn validate(&self) -> Result<(), String> {
        let fields = [
            ("mu", self.mu),
            ("sigma", self.sigma),
            ("var", self.var),
            ("es", self.es),
            ("alpha", self.alpha),
        ];
        for (name, value) in fields {
            if !value.is_finite() {
                return Err(format!("{name} is not finite"));
            }
        }
        if self.sigma < 0.0 {
            return Err(format!("sigma must be non-negative, got {}", self.sigma));
        }
        if self.es > self.var {
            return Err(format!(
                "es must not exceed var, got es {} > var {}",
                self.es, self.var
            ));
        }
        Ok(())
    }
}
