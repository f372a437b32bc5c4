//! The decision engine, the pipeline's third phase (self-critique).
//!
//! Combines the assessment and the cost estimate into the
//! Certainty-Cost-Risk Ratio (CCRR), applies ordered decision rules, and
//! tracks repeated override requests through a per-instance circuit breaker.

use std::sync::atomic::{AtomicU32, Ordering};

use huxley_types::{
    CostEstimate, Decision, DecisionProtocol, EthicalRiskAssessment, Justification, Task,
};
use tracing::{debug, warn};

use crate::screen::HARD_REJECT_THRESHOLD;

/// Guards the CCRR denominator against a zero risk score.
const CCRR_EPSILON: f64 = 0.001;

/// CCRR below this does not justify the time/risk cost.
const CCRR_DEFER_FLOOR: f64 = 0.1;

/// CCRR above this at non-trivial risk is implausible and needs sign-off.
const CCRR_SUSPECT_CEILING: f64 = 1.0;

/// Risk score below which an implausibly favorable CCRR is still suspicious.
const SUSPECT_RISK_BOUND: f64 = 0.5;

/// Default ceiling for the override circuit breaker.
pub const DEFAULT_OVERRIDE_CEILING: u32 = 5;

/// Everything the engine produces for one task.
#[derive(Clone, Debug)]
pub struct Verdict {
    pub ccrr: f64,
    pub protocol: DecisionProtocol,
    pub justification: Justification,
    pub alternative_paths: Vec<String>,
    pub human_review_required: bool,
}

/// The decision engine.
///
/// The override counter is owned by the instance; scope one engine per
/// session or tenant so independent callers cannot trip each other's
/// circuit breaker.
pub struct DecisionEngine {
    override_ceiling: u32,
    override_count: AtomicU32,
}

impl DecisionEngine {
    pub fn new(override_ceiling: u32) -> Self {
        Self {
            override_ceiling,
            override_count: AtomicU32::new(0),
        }
    }

    /// Number of override requests issued by this instance so far.
    pub fn override_count(&self) -> u32 {
        self.override_count.load(Ordering::SeqCst)
    }

    /// Decide on a task given its assessment and cost estimate.
    pub fn decide(
        &self,
        task: &Task,
        assessment: &EthicalRiskAssessment,
        estimate: &CostEstimate,
    ) -> Verdict {
        let ccrr = compute_ccrr(estimate, assessment.total_score);

        let (decision, rule_reason) = self.apply_rules(assessment, estimate, ccrr);

        let confidence = match decision {
            Decision::Reject if assessment.total_score >= HARD_REJECT_THRESHOLD => 1.0,
            Decision::Reject => 0.95,
            Decision::Defer => 0.8,
            Decision::RequireOverride | Decision::RequestReview => 0.5,
            Decision::Proceed => assessment.confidence,
        };

        let alternative_paths = alternative_paths(task);
        let justification =
            self.build_justification(assessment, estimate, ccrr, decision, &rule_reason, true);

        debug!(task_id = %task.id, ccrr, %decision, "decision rules applied");

        Verdict {
            ccrr,
            protocol: DecisionProtocol {
                decision,
                confidence,
                priority: task.priority,
            },
            justification,
            alternative_paths,
            human_review_required: decision.needs_human(),
        }
    }

    /// Ordered decision rules; first match wins.
    fn apply_rules(
        &self,
        assessment: &EthicalRiskAssessment,
        estimate: &CostEstimate,
        ccrr: f64,
    ) -> (Decision, String) {
        if assessment.total_score >= HARD_REJECT_THRESHOLD {
            return (
                Decision::Reject,
                format!(
                    "ethical risk score {:.3} at or above hard-reject threshold {HARD_REJECT_THRESHOLD}",
                    assessment.total_score
                ),
            );
        }

        if let Some(finding) = estimate.finding_for(Decision::Reject) {
            return (Decision::Reject, finding.reason.clone());
        }

        if let Some(finding) = estimate.finding_for(Decision::Defer) {
            return (Decision::Defer, finding.reason.clone());
        }

        if let Some(finding) = estimate.finding_for(Decision::RequireOverride) {
            return (self.request_override(), finding.reason.clone());
        }

        if ccrr < CCRR_DEFER_FLOOR {
            return (
                Decision::Defer,
                format!("CCRR {ccrr:.4} below {CCRR_DEFER_FLOOR}: certainty gain does not justify the time and risk cost"),
            );
        }

        if ccrr > CCRR_SUSPECT_CEILING && assessment.total_score < SUSPECT_RISK_BOUND {
            return (
                self.request_override(),
                format!(
                    "CCRR {ccrr:.4} implausibly favorable at risk score {:.3}; human sign-off required",
                    assessment.total_score
                ),
            );
        }

        (Decision::Proceed, "all decision criteria met".into())
    }

    /// Circuit breaker: repeated override requests escalate to review.
    fn request_override(&self) -> Decision {
        let issued = self.override_count.fetch_add(1, Ordering::SeqCst) + 1;
        if issued > self.override_ceiling {
            warn!(
                issued,
                ceiling = self.override_ceiling,
                "override ceiling exceeded, escalating to review"
            );
            Decision::RequestReview
        } else {
            Decision::RequireOverride
        }
    }

    fn build_justification(
        &self,
        assessment: &EthicalRiskAssessment,
        estimate: &CostEstimate,
        ccrr: f64,
        decision: Decision,
        rule_reason: &str,
        alternatives_considered: bool,
    ) -> Justification {
        let mut reasoning = format!(
            "phase 1 (risk assessment): ethical risk score {:.3}, level {}, confidence {:.2}\n",
            assessment.total_score, assessment.level, assessment.confidence
        );
        reasoning.push_str(&format!(
            "phase 2 (cost estimate): strategy {}, certainty gain {:.3}, time penalty {:.0}ms\n",
            estimate.strategy, estimate.certainty_gain, estimate.time_penalty_ms
        ));
        reasoning.push_str(&format!(
            "phase 3 (self-critique): CCRR {ccrr:.4} -> {decision}: {rule_reason}"
        ));

        let mut ethical_considerations: Vec<String> = assessment
            .factors
            .iter()
            .map(|factor| factor.explanation.clone())
            .collect();
        ethical_considerations.extend(estimate.findings.iter().map(|f| f.reason.clone()));

        let mut risk_mitigation = assessment.mitigating_factors.clone();
        risk_mitigation.push(match decision {
            Decision::Proceed => "proceed with standard safeguards".to_string(),
            Decision::Defer => "defer for human review and approval".to_string(),
            Decision::Reject => "reject; human review required before any retry".to_string(),
            Decision::RequireOverride => {
                "require explicit human authorization to proceed".to_string()
            }
            Decision::RequestReview => {
                "override limit reached; manual review of repeated requests".to_string()
            }
        });

        Justification {
            reasoning,
            ethical_considerations,
            risk_mitigation,
            alternatives_considered,
        }
    }
}

impl Default for DecisionEngine {
    fn default() -> Self {
        Self::new(DEFAULT_OVERRIDE_CEILING)
    }
}

/// CCRR = certainty gain / (time penalty × risk score), risk floored at ε.
fn compute_ccrr(estimate: &CostEstimate, risk_score: f64) -> f64 {
    estimate.certainty_gain / (estimate.time_penalty_ms * risk_score.max(CCRR_EPSILON))
}

/// Deterministic alternative-path suggestions keyed on task shape.
fn alternative_paths(task: &Task) -> Vec<String> {
    let mut paths = Vec::new();

    if task.priority < 8 {
        paths.push("reduce complexity by breaking the task into subtasks".to_string());
    }
    if task.inputs.len() < 5 {
        paths.push("request additional inputs and context".to_string());
    }
    if task.context.human_oversight_required {
        paths.push("implement a human-in-the-loop approval process".to_string());
    }
    if task.context.blocked {
        paths.push("review and update the blocking requirements".to_string());
    }
    paths.push("add additional safety constraints and validation".to_string());

    paths
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use huxley_types::{CategoryScores, GateFinding, RiskLevel, Strategy, TaskContext, TaskId};

    fn ctx() -> TaskContext {
        TaskContext::new("session-123", Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap())
    }

    fn task() -> Task {
        Task::builder("a reasonable five word task", ctx()).build()
    }

    fn assessment(score: f64, confidence: f64) -> EthicalRiskAssessment {
        EthicalRiskAssessment {
            task_id: TaskId::new(),
            scores: CategoryScores::default(),
            total_score: score,
            level: RiskLevel::from_score(score),
            confidence,
            factors: vec![],
            mitigating_factors: vec![],
        }
    }

    fn estimate(certainty_gain: f64, time_penalty_ms: f64) -> CostEstimate {
        CostEstimate {
            certainty_gain,
            time_penalty_ms,
            computational_cost: 0.1,
            strategy: Strategy::StandardAnalysis,
            findings: vec![],
        }
    }

    #[test]
    fn hard_reject_overrides_everything() {
        let engine = DecisionEngine::default();
        // Favorable estimate, catastrophic score.
        let verdict = engine.decide(&task(), &assessment(0.95, 0.9), &estimate(1.0, 100.0));
        assert_eq!(verdict.protocol.decision, Decision::Reject);
        assert_eq!(verdict.protocol.confidence, 1.0);
        assert!(verdict.human_review_required);
    }

    #[test]
    fn reject_finding_beats_ccrr_defer() {
        let engine = DecisionEngine::default();
        let mut est = estimate(0.1, 500.0);
        est.findings.push(GateFinding {
            recommends: Decision::Reject,
            reason: "critical ethical risk exceeds the acceptance ceiling".into(),
        });
        let verdict = engine.decide(&task(), &assessment(0.8, 0.5), &est);
        assert_eq!(verdict.protocol.decision, Decision::Reject);
        assert!(verdict.justification.reasoning.contains("risk"));
    }

    #[test]
    fn low_ccrr_defers() {
        let engine = DecisionEngine::default();
        // ccrr = 0.1 / (500 * 0.3) = 0.00067
        let verdict = engine.decide(&task(), &assessment(0.3, 0.5), &estimate(0.1, 500.0));
        assert_eq!(verdict.protocol.decision, Decision::Defer);
        assert!(verdict.ccrr < 0.1);
    }

    #[test]
    fn zero_risk_uses_epsilon_floor() {
        let engine = DecisionEngine::default();
        // ccrr = 0.1 / (500 * 0.001) = 0.2 -> proceed
        let verdict = engine.decide(&task(), &assessment(0.0, 0.5), &estimate(0.1, 500.0));
        assert_eq!(verdict.protocol.decision, Decision::Proceed);
        assert!((verdict.ccrr - 0.2).abs() < 1e-9);
    }

    #[test]
    fn implausibly_favorable_ratio_requires_override() {
        let engine = DecisionEngine::default();
        // ccrr = 0.9 / (1 * 0.3) = 3.0, risk below 0.5
        let verdict = engine.decide(&task(), &assessment(0.3, 0.5), &estimate(0.9, 1.0));
        assert_eq!(verdict.protocol.decision, Decision::RequireOverride);
        assert!(verdict.human_review_required);
    }

    #[test]
    fn override_finding_beats_ccrr_defer() {
        let engine = DecisionEngine::default();
        let mut est = estimate(0.1, 500.0);
        est.findings.push(GateFinding {
            recommends: Decision::RequireOverride,
            reason: "task demands human oversight but no review process is recorded".into(),
        });
        // Low risk so no reject/defer findings; ccrr would be 0.0033.
        let verdict = engine.decide(&task(), &assessment(0.06, 0.5), &est);
        assert_eq!(verdict.protocol.decision, Decision::RequireOverride);
    }

    #[test]
    fn circuit_breaker_escalates_after_ceiling() {
        let engine = DecisionEngine::new(5);
        let mut est = estimate(0.1, 500.0);
        est.findings.push(GateFinding {
            recommends: Decision::RequireOverride,
            reason: "oversight required".into(),
        });
        let assessment = assessment(0.0, 0.5);

        for _ in 0..5 {
            let verdict = engine.decide(&task(), &assessment, &est);
            assert_eq!(verdict.protocol.decision, Decision::RequireOverride);
        }

        let sixth = engine.decide(&task(), &assessment, &est);
        assert_eq!(sixth.protocol.decision, Decision::RequestReview);
        assert_eq!(engine.override_count(), 6);
    }

    #[test]
    fn counters_are_per_instance() {
        let mut est = estimate(0.1, 500.0);
        est.findings.push(GateFinding {
            recommends: Decision::RequireOverride,
            reason: "oversight required".into(),
        });
        let assessment = assessment(0.0, 0.5);

        let first = DecisionEngine::new(5);
        for _ in 0..6 {
            first.decide(&task(), &assessment, &est);
        }

        // A fresh engine is unaffected by the first one's history.
        let second = DecisionEngine::new(5);
        let verdict = second.decide(&task(), &assessment, &est);
        assert_eq!(verdict.protocol.decision, Decision::RequireOverride);
    }

    #[test]
    fn proceed_carries_assessment_confidence_and_priority() {
        let engine = DecisionEngine::default();
        let task = Task::builder("simple benign question", ctx()).priority(7).build();
        let verdict = engine.decide(&task, &assessment(0.0, 0.62), &estimate(0.1, 500.0));
        assert_eq!(verdict.protocol.decision, Decision::Proceed);
        assert!((verdict.protocol.confidence - 0.62).abs() < 1e-9);
        assert_eq!(verdict.protocol.priority, 7);
    }

    #[test]
    fn alternative_paths_follow_task_shape() {
        let mut flagged = ctx();
        flagged.human_oversight_required = true;
        flagged.blocked = true;
        let task = Task::builder("small task", flagged).priority(3).build();
        let paths = alternative_paths(&task);

        assert!(paths.iter().any(|p| p.contains("subtasks")));
        assert!(paths.iter().any(|p| p.contains("additional inputs")));
        assert!(paths.iter().any(|p| p.contains("human-in-the-loop")));
        assert!(paths.iter().any(|p| p.contains("blocking requirements")));
        // Generic floor suggestion is always present and always last.
        assert!(paths.last().unwrap().contains("safety constraints"));

        let plain = Task::builder("plain task", ctx()).priority(9).build();
        let paths = alternative_paths(&plain);
        assert!(!paths.iter().any(|p| p.contains("subtasks")));
        assert!(paths.iter().any(|p| p.contains("safety constraints")));
    }

    #[test]
    fn justification_combines_all_phases() {
        let engine = DecisionEngine::default();
        let mut assessment = assessment(0.12, 0.5);
        assessment.mitigating_factors.push("low inherent harm risk".into());
        let verdict = engine.decide(&task(), &assessment, &estimate(0.1, 500.0));

        assert!(verdict.justification.reasoning.contains("phase 1"));
        assert!(verdict.justification.reasoning.contains("phase 2"));
        assert!(verdict.justification.reasoning.contains("phase 3"));
        assert!(verdict.justification.reasoning.contains("ethical risk score"));
        assert!(verdict
            .justification
            .risk_mitigation
            .iter()
            .any(|m| m.contains("low inherent harm risk")));
        assert!(verdict.justification.alternatives_considered);
    }
}
