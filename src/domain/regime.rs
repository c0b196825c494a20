//! Market regime belief.

use serde::Serialize;
use std::fmt;

/// Tolerance on the sum of the three regime probabilities.
pub const PROBABILITY_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RegimeLabel {
    Bull,
    Bear,
    Chop,
    Unknown,
}

impl fmt::Display for RegimeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RegimeLabel::Bull => "bull",
            RegimeLabel::Bear => "bear",
            RegimeLabel::Chop => "chop",
            RegimeLabel::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RegimeBelief {
    pub label: RegimeLabel,
    pub p_bull: f64,
    pub p_bear: f64,
    pub p_chop: f64,
}

impl RegimeBelief {
    /// Belief used when there is not enough history to classify.
    pub fn unknown() -> Self {
        RegimeBelief {
            label: RegimeLabel::Unknown,
            p_bull: 0.34,
            p_bear: 0.33,
            p_chop: 0.33,
        }
    }

    /// Belief labelled by the most probable regime. Ties resolve bull, then
    /// bear, then chop.
    pub fn from_probabilities(p_bull: f64, p_bear: f64, p_chop: f64) -> Self {
        let max = p_bull.max(p_bear).max(p_chop);
        let label = if p_bull == max {
            RegimeLabel::Bull
        } else if p_bear == max {
            RegimeLabel::Bear
        } else {
            RegimeLabel::Chop
        };
        RegimeBelief {
            label,
            p_bull,
            p_bear,
            p_chop,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        let probs = [
            ("p_bull", self.p_bull),
            ("p_bear", self.p_bear),
            ("p_chop", self.p_chop),
        ];
        for (name, p) in probs {
            if !p.is_finite() || !(0.0..=1.0).contains(&p) {
                return Err(format!("{name} must be in [0, 1], got {p}"));
            }
        }
        let sum = self.p_bull + self.p_bear + self.p_chop;
        if (sum - 1.0).abs() > PROBABILITY_TOLERANCE {
            return Err(format!("regime probabilities sum to {sum}, expected 1"));
        }
        Ok(())
    }

    /// `p_bull >= max(p_bear, p_chop)`.
    pub fn favours_bull(&self) -> bool {
        self.p_bull >= self.p_bear.max(self.p_chop)
    }

    /// `p_bear >= max(p_bull, p_chop)`.
    pub fn favours_bear(&self) -> bool {
        self.p_bear >= self.p_bull.max(self.p_chop)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_fallback_distribution() {
        let b = RegimeBelief::unknown();
        assert_eq!(b.label, RegimeLabel::Unknown);
        assert!(b.validate().is_ok());
        assert!(b.favours_bull());
        assert!(!b.favours_bear());
    }

    #[test]
    fn label_follows_argmax() {
        assert_eq!(
            RegimeBelief::from_probabilities(0.2, 0.7, 0.1).label,
            RegimeLabel::Bear
        );
        assert_eq!(
            RegimeBelief::from_probabilities(0.2, 0.2, 0.6).label,
            RegimeLabel::Chop
        );
    }

    #[test]
    fn tie_prefers_bull_then_bear() {
        assert_eq!(
            RegimeBelief::from_probabilities(0.4, 0.4, 0.2).label,
            RegimeLabel::Bull
        );
        assert_eq!(
            RegimeBelief::from_probabilities(0.2, 0.4, 0.4).label,
            RegimeLabel::Bear
        );
    }

    #[test]
    fn tied_maximum_favours_both() {
        let b = RegimeBelief::from_probabilities(0.45, 0.45, 0.10);
        assert!(b.favours_bull());
        assert!(b.favours_bear());
    }

    #[test]
    fn validate_rejects_bad_sum() {
        let b = RegimeBelief::from_probabilities(0.5, 0.5, 0.5);
        assert!(b.validate().unwrap_err().contains("sum"));
    }

    #[test]
    fn validate_rejects_negative_probability() {
        let b = RegimeBelief::from_probabilities(1.2, -0.2, 0.0);
        assert!(b.validate().is_err());
    }

    #[test]
    fn label_serializes_lowercase() {
        let json = serde_json::to_string(&RegimeLabel::Chop).unwrap();
        assert_eq!(json, "\"chop\"");
    }
}
