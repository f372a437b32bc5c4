use serde::{Deserialize, Serialize};

use crate::ids::TaskId;

/// Risk-level thresholds. Monotonic and non-overlapping.
pub const CRITICAL_THRESHOLD: f64 = 0.8;
pub const HIGH_THRESHOLD: f64 = 0.6;
pub const MEDIUM_THRESHOLD: f64 = 0.4;
pub const LOW_THRESHOLD: f64 = 0.2;

/// The fixed set of ethical risk categories.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskCategory {
    Harm,
    Privacy,
    Bias,
    Safety,
    Autonomy,
}

impl RiskCategory {
    pub const ALL: [RiskCategory; 5] = [
        RiskCategory::Harm,
        RiskCategory::Privacy,
        RiskCategory::Bias,
        RiskCategory::Safety,
        RiskCategory::Autonomy,
    ];
}

impl std::fmt::Display for RiskCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RiskCategory::Harm => "harm",
            RiskCategory::Privacy => "privacy",
            RiskCategory::Bias => "bias",
            RiskCategory::Safety => "safety",
            RiskCategory::Autonomy => "autonomy",
        };
        write!(f, "{name}")
    }
}

/// A single detected risk signal.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RiskFactor {
    pub category: RiskCategory,
    /// Severity in [0, 1].
    pub severity: f64,
    pub explanation: String,
}

/// Discrete risk level derived from a score in [0, 1].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    None,
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    pub fn from_score(score: f64) -> Self {
        if score >= CRITICAL_THRESHOLD {
            RiskLevel::Critical
        } else if score >= HIGH_THRESHOLD {
            RiskLevel::High
        } else if score >= MEDIUM_THRESHOLD {
            RiskLevel::Medium
        } else if score >= LOW_THRESHOLD {
            RiskLevel::Low
        } else {
            RiskLevel::None
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RiskLevel::None => "none",
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
            RiskLevel::Critical => "critical",
        };
        write!(f, "{name}")
    }
}

/// Per-category sub-scores, each in [0, 1].
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct CategoryScores {
    pub harm: f64,
    pub privacy: f64,
    pub bias: f64,
    pub safety: f64,
    pub autonomy: f64,
}

impl CategoryScores {
    pub fn get(&self, category: RiskCategory) -> f64 {
        match category {
            RiskCategory::Harm => self.harm,
            RiskCategory::Privacy => self.privacy,
            RiskCategory::Bias => self.bias,
            RiskCategory::Safety => self.safety,
            RiskCategory::Autonomy => self.autonomy,
        }
    }

    pub fn set(&mut self, category: RiskCategory, score: f64) {
        let slot = match category {
            RiskCategory::Harm => &mut self.harm,
            RiskCategory::Privacy => &mut self.privacy,
            RiskCategory::Bias => &mut self.bias,
            RiskCategory::Safety => &mut self.safety,
            RiskCategory::Autonomy => &mut self.autonomy,
        };
        *slot = score.clamp(0.0, 1.0);
    }
}

/// Fixed category weights. The canonical table sums to 1.0.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct CategoryWeights {
    pub harm: f64,
    pub privacy: f64,
    pub bias: f64,
    pub safety: f64,
    pub autonomy: f64,
}

impl CategoryWeights {
    pub const CANONICAL: CategoryWeights = CategoryWeights {
        harm: 0.30,
        privacy: 0.20,
        bias: 0.20,
        safety: 0.15,
        autonomy: 0.15,
    };

    pub fn sum(&self) -> f64 {
        self.harm + self.privacy + self.bias + self.safety + self.autonomy
    }

    /// Weighted total of the given sub-scores.
    pub fn weighted_total(&self, scores: &CategoryScores) -> f64 {
        scores.harm * self.harm
            + scores.privacy * self.privacy
            + scores.bias * self.bias
            + scores.safety * self.safety
            + scores.autonomy * self.autonomy
    }
}

impl Default for CategoryWeights {
    fn default() -> Self {
        Self::CANONICAL
    }
}

/// The full ethical risk assessment for a task.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EthicalRiskAssessment {
    pub task_id: TaskId,
    pub scores: CategoryScores,
    /// Weighted total in [0, 1].
    pub total_score: f64,
    pub level: RiskLevel,
    /// Confidence in the assessment itself, in [0, 1].
    pub confidence: f64,
    pub factors: Vec<RiskFactor>,
    pub mitigating_factors: Vec<String>,
}

/// Result of the fast-path triage screen.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TriageResult {
    /// Provisional score: max severity over matched keyword families.
    pub score: f64,
    pub level: RiskLevel,
    pub factors: Vec<RiskFactor>,
}

impl TriageResult {
    pub fn clear() -> Self {
        Self {
            score: 0.0,
            level: RiskLevel::None,
            factors: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_thresholds() {
        assert_eq!(RiskLevel::from_score(0.0), RiskLevel::None);
        assert_eq!(RiskLevel::from_score(0.19), RiskLevel::None);
        assert_eq!(RiskLevel::from_score(0.2), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(0.4), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_score(0.6), RiskLevel::High);
        assert_eq!(RiskLevel::from_score(0.8), RiskLevel::Critical);
        assert_eq!(RiskLevel::from_score(1.0), RiskLevel::Critical);
    }

    #[test]
    fn levels_order_by_severity() {
        assert!(RiskLevel::None < RiskLevel::Low);
        assert!(RiskLevel::Low < RiskLevel::Medium);
        assert!(RiskLevel::Medium < RiskLevel::High);
        assert!(RiskLevel::High < RiskLevel::Critical);
    }

    #[test]
    fn canonical_weights_sum_to_one() {
        assert!((CategoryWeights::CANONICAL.sum() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn weighted_total_in_unit_interval_at_extremes() {
        let weights = CategoryWeights::CANONICAL;
        let zeros = CategoryScores::default();
        assert_eq!(weights.weighted_total(&zeros), 0.0);

        let ones = CategoryScores {
            harm: 1.0,
            privacy: 1.0,
            bias: 1.0,
            safety: 1.0,
            autonomy: 1.0,
        };
        assert!((weights.weighted_total(&ones) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn scores_set_clamps() {
        let mut scores = CategoryScores::default();
        scores.set(RiskCategory::Harm, 1.5);
        assert_eq!(scores.harm, 1.0);
        scores.set(RiskCategory::Bias, -0.1);
        assert_eq!(scores.bias, 0.0);
    }
}
