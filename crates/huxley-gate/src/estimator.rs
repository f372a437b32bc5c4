//! Cost/strategy estimation, the pipeline's second phase.
//!
//! Complexity is proxied by description word count; certainty gain, time
//! penalty, and computational cost are proportional estimates of it, each
//! capped. The estimator also runs the systemic logic gates and records
//! their outcomes as findings for the decision engine.

use huxley_types::{
    cost::MAX_TIME_PENALTY_MS, CostEstimate, Decision, EthicalRiskAssessment, GateFinding,
    RiskLevel, Strategy, Task,
};
use tracing::debug;

/// Word count at which certainty gain saturates.
const WORDS_PER_FULL_CERTAINTY: f64 = 50.0;

/// Estimated milliseconds of deliberation per word.
const MS_PER_WORD: f64 = 100.0;

/// Word count at which computational cost saturates.
const WORDS_PER_FULL_COST: f64 = 100.0;

/// Assessment confidence below this requires a human override.
pub const MIN_ASSESSMENT_CONFIDENCE: f64 = 0.3;

/// The cost/strategy estimator. Stateless.
pub struct CostEstimator;

impl CostEstimator {
    pub fn new() -> Self {
        Self
    }

    /// Estimate costs and pick a strategy for a task given its assessment.
    pub fn estimate(&self, task: &Task, assessment: &EthicalRiskAssessment) -> CostEstimate {
        let words = task.word_count() as f64;

        let certainty_gain = (words / WORDS_PER_FULL_CERTAINTY).min(1.0);
        let time_penalty_ms = (words * MS_PER_WORD).min(MAX_TIME_PENALTY_MS);
        let computational_cost = (words / WORDS_PER_FULL_COST).min(1.0);

        let strategy = match assessment.level {
            RiskLevel::High | RiskLevel::Critical => Strategy::CautiousEvaluation,
            RiskLevel::Low | RiskLevel::None => Strategy::DirectResponse,
            RiskLevel::Medium => Strategy::StandardAnalysis,
        };

        let findings = self.run_gates(task, assessment);

        debug!(
            task_id = %task.id,
            certainty_gain,
            time_penalty_ms,
            %strategy,
            findings = findings.len(),
            "cost estimate complete"
        );

        CostEstimate {
            certainty_gain,
            time_penalty_ms,
            computational_cost,
            strategy,
            findings,
        }
    }

    /// Systemic logic gates. Outcomes are recommendations, not decisions.
    fn run_gates(&self, task: &Task, assessment: &EthicalRiskAssessment) -> Vec<GateFinding> {
        let mut findings = Vec::new();

        if assessment.level == RiskLevel::Critical {
            findings.push(GateFinding {
                recommends: Decision::Reject,
                reason: "critical ethical risk exceeds the acceptance ceiling".into(),
            });
        }

        if assessment.level == RiskLevel::High {
            findings.push(GateFinding {
                recommends: Decision::Defer,
                reason: "high ethical risk requires review before execution".into(),
            });
        }

        if assessment.confidence < MIN_ASSESSMENT_CONFIDENCE {
            findings.push(GateFinding {
                recommends: Decision::RequireOverride,
                reason: format!(
                    "assessment confidence {:.2} below minimum {:.2}",
                    assessment.confidence, MIN_ASSESSMENT_CONFIDENCE
                ),
            });
        }

        if task.context.human_oversight_required && !task.context.human_review {
            findings.push(GateFinding {
                recommends: Decision::RequireOverride,
                reason: "task demands human oversight but no review process is recorded".into(),
            });
        }

        if task.context.conflicting_requirements {
            findings.push(GateFinding {
                recommends: Decision::Reject,
                reason: "task carries conflicting requirements that cannot all be satisfied"
                    .into(),
            });
        }

        findings
    }
}

impl Default for CostEstimator {
    fn default() -> Self {
        Self::new()
    }
}
