use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cost::CostEstimate;
use crate::decision::{DecisionProtocol, Justification};
use crate::ids::{TaskId, TraceId};
use crate::risk::{EthicalRiskAssessment, TriageResult};

/// Audit record for one task evaluation.
///
/// Created once per evaluation and never mutated. The estimate and CCRR are
/// absent when the triage screen short-circuited the pipeline.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DecisionTrace {
    pub trace_id: TraceId,
    pub task_id: TaskId,
    pub triage: TriageResult,
    pub assessment: EthicalRiskAssessment,
    pub estimate: Option<CostEstimate>,
    /// Certainty-Cost-Risk Ratio, when the full pipeline ran.
    pub ccrr: Option<f64>,
    pub decision: DecisionProtocol,
    pub justification: Justification,
    pub alternative_paths: Vec<String>,
    pub human_review_required: bool,
    pub recorded_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decision::Decision;
    use crate::risk::{CategoryScores, RiskLevel};
    use chrono::TimeZone;

    fn sample_trace() -> DecisionTrace {
        let task_id = TaskId::new();
        DecisionTrace {
            trace_id: TraceId::new(),
            task_id: task_id.clone(),
            triage: TriageResult::clear(),
            assessment: EthicalRiskAssessment {
                task_id,
                scores: CategoryScores::default(),
                total_score: 0.0,
                level: RiskLevel::None,
                confidence: 0.5,
                factors: vec![],
                mitigating_factors: vec![],
            },
            estimate: None,
            ccrr: None,
            decision: DecisionProtocol {
                decision: Decision::Proceed,
                confidence: 0.5,
                priority: 5,
            },
            justification: Justification {
                reasoning: "no risk indicators".into(),
                ethical_considerations: vec![],
                risk_mitigation: vec![],
                alternatives_considered: false,
            },
            alternative_paths: vec![],
            human_review_required: false,
            recorded_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn trace_serialization_round_trip() {
        let trace = sample_trace();
        let json = serde_json::to_string(&trace).unwrap();
        let restored: DecisionTrace = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.trace_id, trace.trace_id);
        assert_eq!(restored.decision.decision, trace.decision.decision);
    }
}
