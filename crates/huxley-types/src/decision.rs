use serde::{Deserialize, Serialize};

/// The decision protocol vocabulary.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Decision {
    Proceed,
    Defer,
    Reject,
    RequireOverride,
    RequestReview,
}

impl Decision {
    /// Whether this outcome demands a human before anything executes.
    pub fn needs_human(&self) -> bool {
        matches!(
            self,
            Decision::Reject | Decision::RequireOverride | Decision::RequestReview
        )
    }
}

impl std::fmt::Display for Decision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Decision::Proceed => "PROCEED",
            Decision::Defer => "DEFER",
            Decision::Reject => "REJECT",
            Decision::RequireOverride => "REQUIRE_OVERRIDE",
            Decision::RequestReview => "REQUEST_REVIEW",
        };
        write!(f, "{name}")
    }
}

/// The final decision with its confidence and carried-over priority.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DecisionProtocol {
    pub decision: Decision,
    /// Confidence in the decision, in [0, 1].
    pub confidence: f64,
    /// Task priority, 1–10.
    pub priority: u8,
}

/// Structured explanation attached to every decision.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Justification {
    /// Combined reasoning text from all pipeline phases.
    pub reasoning: String,
    pub ethical_considerations: Vec<String>,
    pub risk_mitigation: Vec<String>,
    pub alternatives_considered: bool,
}
