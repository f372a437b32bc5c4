//! The ethics gate: orchestrates triage, assessment, cost estimation,
//! decision, and trace recording for every inbound task.
//!
//! `evaluate` never returns an error. Input defects degrade confidence,
//! computation defects fail closed into a conservative decision, and
//! persistence failures are logged by the recorder.

use std::sync::Arc;

use huxley_types::{
    Decision, DecisionProtocol, DecisionTrace, EthicalRiskAssessment, Justification, RiskLevel,
    Task, TraceId, TriageResult,
};
use tracing::{info, warn};

use crate::assessor::RiskAssessor;
use crate::engine::{DecisionEngine, DEFAULT_OVERRIDE_CEILING};
use crate::estimator::CostEstimator;
use crate::recorder::{TraceRecorder, TraceStatistics, DEFAULT_HISTORY_CAPACITY};
use crate::screen::{TriageScreen, HARD_REJECT_THRESHOLD};
use crate::traits::TraceStore;

/// Gate configuration.
#[derive(Clone, Debug)]
pub struct GateConfig {
    /// Override requests beyond this count escalate to review.
    pub override_ceiling: u32,
    /// Bound on the in-memory trace history.
    pub history_capacity: usize,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            override_ceiling: DEFAULT_OVERRIDE_CEILING,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
        }
    }
}

/// The three-phase evaluation pipeline.
///
/// Owns its override counter and history; scope one gate per session or
/// tenant rather than sharing a global instance.
pub struct EthicsGate {
    screen: TriageScreen,
    assessor: RiskAssessor,
    estimator: CostEstimator,
    engine: DecisionEngine,
    recorder: TraceRecorder,
}

impl EthicsGate {
    /// Gate with default configuration and no external trace store.
    pub fn new() -> Self {
        Self::with_config(GateConfig::default(), None)
    }

    pub fn with_config(config: GateConfig, store: Option<Arc<dyn TraceStore>>) -> Self {
        Self {
            screen: TriageScreen::new(),
            assessor: RiskAssessor::new(),
            estimator: CostEstimator::new(),
            engine: DecisionEngine::new(config.override_ceiling),
            recorder: TraceRecorder::new(config.history_capacity, store),
        }
    }

    /// Replace the assessor, e.g. to supply custom detectors.
    pub fn with_assessor(mut self, assessor: RiskAssessor) -> Self {
        self.assessor = assessor;
        self
    }

    /// Evaluate a task through all three phases, producing a complete trace.
    pub async fn evaluate(&self, task: Task) -> DecisionTrace {
        info!(task_id = %task.id, task_type = %task.task_type, "evaluation started");

        let triage = self.screen.screen(&task);

        if self.screen.is_hard_reject(&triage) {
            let trace = self.hard_reject_trace(&task, triage);
            info!(task_id = %task.id, decision = %trace.decision.decision, "evaluation terminated at triage");
            self.recorder.record(&trace).await;
            return trace;
        }

        let assessment = match self.assessor.assess(&task) {
            Ok(assessment) => merge_triage(assessment, &triage),
            Err(err) => {
                warn!(task_id = %task.id, %err, "assessment defect, failing closed");
                let trace = self.fail_closed_trace(&task, triage, &err.to_string());
                self.recorder.record(&trace).await;
                return trace;
            }
        };

        let estimate = self.estimator.estimate(&task, &assessment);
        let verdict = self.engine.decide(&task, &assessment, &estimate);

        info!(
            task_id = %task.id,
            risk_score = assessment.total_score,
            risk_level = %assessment.level,
            ccrr = verdict.ccrr,
            decision = %verdict.protocol.decision,
            "evaluation complete"
        );

        let trace = DecisionTrace {
            trace_id: TraceId::new(),
            task_id: task.id.clone(),
            triage,
            assessment,
            estimate: Some(estimate),
            ccrr: Some(verdict.ccrr),
            decision: verdict.protocol,
            justification: verdict.justification,
            alternative_paths: verdict.alternative_paths,
            human_review_required: verdict.human_review_required,
            recorded_at: task.context.timestamp,
        };

        self.recorder.record(&trace).await;
        trace
    }

    /// Short-circuit trace for a triage score at or above the hard-reject line.
    fn hard_reject_trace(&self, task: &Task, triage: TriageResult) -> DecisionTrace {
        let assessment = EthicalRiskAssessment {
            task_id: task.id.clone(),
            scores: scores_from_triage(&triage),
            total_score: triage.score,
            level: triage.level,
            confidence: 1.0,
            factors: triage.factors.clone(),
            mitigating_factors: vec![],
        };

        DecisionTrace {
            trace_id: TraceId::new(),
            task_id: task.id.clone(),
            justification: Justification {
                reasoning: format!(
                    "triage screen: provisional risk score {:.3} at or above hard-reject threshold {HARD_REJECT_THRESHOLD}; evaluation terminated",
                    triage.score
                ),
                ethical_considerations: triage
                    .factors
                    .iter()
                    .map(|f| f.explanation.clone())
                    .collect(),
                risk_mitigation: vec!["reject; human review required before any retry".into()],
                alternatives_considered: false,
            },
            triage,
            assessment,
            estimate: None,
            ccrr: None,
            decision: DecisionProtocol {
                decision: Decision::Reject,
                confidence: 1.0,
                priority: task.priority,
            },
            alternative_paths: vec![],
            human_review_required: true,
            recorded_at: task.context.timestamp,
        }
    }

    /// Conservative trace for a computation defect. Never proceeds.
    fn fail_closed_trace(&self, task: &Task, triage: TriageResult, defect: &str) -> DecisionTrace {
        let assessment = EthicalRiskAssessment {
            task_id: task.id.clone(),
            scores: scores_from_triage(&triage),
            total_score: triage.score,
            level: triage.level,
            confidence: 0.0,
            factors: triage.factors.clone(),
            mitigating_factors: vec![],
        };

        DecisionTrace {
            trace_id: TraceId::new(),
            task_id: task.id.clone(),
            justification: Justification {
                reasoning: format!(
                    "risk assessment failed ({defect}); deferring until the defect is resolved"
                ),
                ethical_considerations: triage
                    .factors
                    .iter()
                    .map(|f| f.explanation.clone())
                    .collect(),
                risk_mitigation: vec!["defer for human review and approval".into()],
                alternatives_considered: false,
            },
            triage,
            assessment,
            estimate: None,
            ccrr: None,
            decision: DecisionProtocol {
                decision: Decision::Defer,
                confidence: 0.0,
                priority: task.priority,
            },
            alternative_paths: vec![],
            human_review_required: true,
            recorded_at: task.context.timestamp,
        }
    }

    /// The most recent `count` traces, oldest first.
    pub fn recent(&self, count: usize) -> Vec<DecisionTrace> {
        self.recorder.recent(count)
    }

    /// Aggregate statistics over the held trace history.
    pub fn statistics(&self) -> TraceStatistics {
        self.recorder.statistics()
    }

    /// Number of override requests issued by this gate so far.
    pub fn override_count(&self) -> u32 {
        self.engine.override_count()
    }
}

impl Default for EthicsGate {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-category scores implied by triage factors.
fn scores_from_triage(triage: &TriageResult) -> huxley_types::CategoryScores {
    let mut scores = huxley_types::CategoryScores::default();
    for factor in &triage.factors {
        if factor.severity > scores.get(factor.category) {
            scores.set(factor.category, factor.severity);
        }
    }
    scores
}

/// Fold the triage result into the weighted assessment.
///
/// The effective score is the max of the weighted total and the triage
/// provisional score: a keyword hit the screen considers critical must not
/// be diluted by low scores in unrelated categories.
fn merge_triage(
    mut assessment: EthicalRiskAssessment,
    triage: &TriageResult,
) -> EthicalRiskAssessment {
    if triage.score > assessment.total_score {
        assessment.total_score = triage.score;
        assessment.level = RiskLevel::from_score(triage.score);
    }

    for factor in &triage.factors {
        if factor.severity > assessment.scores.get(factor.category) {
            assessment.scores.set(factor.category, factor.severity);
        }
        if !assessment
            .factors
            .iter()
            .any(|f| f.category == factor.category && f.explanation == factor.explanation)
        {
            assessment.factors.push(factor.clone());
        }
    }

    assessment
}
