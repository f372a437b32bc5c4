use serde::{Deserialize, Serialize};

use crate::decision::Decision;

/// Time penalty ceiling in milliseconds.
pub const MAX_TIME_PENALTY_MS: f64 = 10_000.0;

/// Execution strategy chosen from the assessed risk level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Strategy {
    CautiousEvaluation,
    StandardAnalysis,
    DirectResponse,
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Strategy::CautiousEvaluation => "cautious-evaluation",
            Strategy::StandardAnalysis => "standard-analysis",
            Strategy::DirectResponse => "direct-response",
        };
        write!(f, "{name}")
    }
}

/// Outcome of one systemic logic gate run by the estimator.
///
/// Findings are recommendations; the decision engine applies them in its
/// own priority order.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GateFinding {
    pub recommends: Decision,
    pub reason: String,
}

/// Cost/strategy estimate for a task given its risk assessment.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CostEstimate {
    /// Certainty gained by proceeding, in [0, 1].
    pub certainty_gain: f64,
    /// Estimated time penalty in milliseconds, capped at [`MAX_TIME_PENALTY_MS`].
    pub time_penalty_ms: f64,
    /// Relative computational cost in [0, 1].
    pub computational_cost: f64,
    pub strategy: Strategy,
    /// Recorded outcomes of the systemic logic gates.
    pub findings: Vec<GateFinding>,
}

impl CostEstimate {
    /// First finding recommending the given decision, if any.
    pub fn finding_for(&self, decision: Decision) -> Option<&GateFinding> {
        self.findings.iter().find(|f| f.recommends == decision)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strategy_display() {
        assert_eq!(Strategy::CautiousEvaluation.to_string(), "cautious-evaluation");
        assert_eq!(Strategy::DirectResponse.to_string(), "direct-response");
    }

    #[test]
    fn finding_lookup() {
        let estimate = CostEstimate {
            certainty_gain: 0.5,
            time_penalty_ms: 1000.0,
            computational_cost: 0.2,
            strategy: Strategy::StandardAnalysis,
            findings: vec![GateFinding {
                recommends: Decision::Defer,
                reason: "high ethical risk requires review".into(),
            }],
        };
        assert!(estimate.finding_for(Decision::Defer).is_some());
        assert!(estimate.finding_for(Decision::Reject).is_none());
    }
}
