//! Weighted five-category risk assessment.
//!
//! One canonical scorer: category detectors are swappable strategy objects,
//! the weight table is fixed, and the weighted total maps onto the shared
//! risk-level thresholds.

use huxley_types::{
    CategoryScores, CategoryWeights, EthicalRiskAssessment, RiskLevel, Task, TaskId,
};
use serde::Serialize;
use tracing::debug;

use crate::detectors::default_detectors;
use crate::error::GateError;
use crate::traits::RiskDetector;

/// Tolerance for the weight-sum invariant.
const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Base confidence before field-completeness adjustments.
const BASE_CONFIDENCE: f64 = 0.5;

/// Aggregate statistics over a set of assessments.
#[derive(Clone, Debug, Default, Serialize)]
pub struct RiskStatistics {
    pub total: usize,
    pub none: usize,
    pub low: usize,
    pub medium: usize,
    pub high: usize,
    pub critical: usize,
    pub average_score: f64,
    pub highest_risk_task: Option<TaskId>,
}

/// The risk assessor: five pluggable detectors plus the canonical weights.
pub struct RiskAssessor {
    detectors: Vec<Box<dyn RiskDetector>>,
    weights: CategoryWeights,
}

impl RiskAssessor {
    /// Assessor with the default keyword detectors and canonical weights.
    pub fn new() -> Self {
        Self {
            detectors: default_detectors(),
            weights: CategoryWeights::CANONICAL,
        }
    }

    /// Replace the detector set, e.g. with learned classifiers.
    pub fn with_detectors(detectors: Vec<Box<dyn RiskDetector>>) -> Self {
        Self {
            detectors,
            weights: CategoryWeights::CANONICAL,
        }
    }

    /// Override the weight table. The sum-to-one invariant is enforced at
    /// assessment time, so a drifted table fails closed rather than scoring.
    pub fn with_weights(mut self, weights: CategoryWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Assess a task. Pure: no clock, no I/O.
    pub fn assess(&self, task: &Task) -> Result<EthicalRiskAssessment, GateError> {
        if (self.weights.sum() - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(GateError::InvariantViolation(format!(
                "category weights sum to {:.6}, expected 1.0",
                self.weights.sum()
            )));
        }

        let mut scores = CategoryScores::default();
        let mut factors = Vec::new();

        for detector in &self.detectors {
            let factor = detector.detect(task);
            if !(0.0..=1.0).contains(&factor.severity) {
                return Err(GateError::DetectorOutOfRange(
                    factor.category.to_string(),
                    factor.severity,
                ));
            }
            scores.set(factor.category, factor.severity);
            if factor.severity > 0.0 {
                factors.push(factor);
            }
        }

        let total_score = self.weights.weighted_total(&scores);
        let level = RiskLevel::from_score(total_score);
        let confidence = assessment_confidence(task);
        let mitigating_factors = mitigating_factors(task, &scores);

        debug!(task_id = %task.id, total_score, %level, confidence, "risk assessment complete");

        Ok(EthicalRiskAssessment {
            task_id: task.id.clone(),
            scores,
            total_score,
            level,
            confidence,
            factors,
            mitigating_factors,
        })
    }

    /// Assess a batch of tasks, stopping at the first defect.
    pub fn assess_batch(&self, tasks: &[Task]) -> Result<Vec<EthicalRiskAssessment>, GateError> {
        tasks.iter().map(|task| self.assess(task)).collect()
    }
}

impl Default for RiskAssessor {
    fn default() -> Self {
        Self::new()
    }
}

/// Confidence in the assessment, driven by how much of the task is populated.
fn assessment_confidence(task: &Task) -> f64 {
    let mut confidence = BASE_CONFIDENCE;

    if task.description.len() > 100 {
        confidence += 0.1;
    }
    if task.inputs.len() > 5 {
        confidence += 0.1;
    }
    if task.outputs.len() > 2 {
        confidence += 0.1;
    }
    if task.context.richness() >= 2 {
        confidence += 0.1;
    }

    if task.description.is_empty() || task.inputs.is_empty() || task.outputs.is_empty() {
        confidence -= 0.2;
    }

    confidence.clamp(0.0, 1.0)
}

/// Textual notes for low category scores backed by an explicit safeguard.
fn mitigating_factors(task: &Task, scores: &CategoryScores) -> Vec<String> {
    let ctx = &task.context;
    let mut notes = Vec::new();

    if scores.harm < 0.3 {
        notes.push("low inherent harm risk".to_string());
    }
    if scores.privacy < 0.3 && ctx.encryption {
        notes.push("personal data encrypted".to_string());
    }
    if scores.bias < 0.3 && ctx.fairness_training {
        notes.push("fairness training applied".to_string());
    }
    if scores.safety < 0.3 && ctx.human_review {
        notes.push("human review process in place".to_string());
    }
    if scores.autonomy < 0.3 && ctx.human_in_loop {
        notes.push("human oversight maintained".to_string());
    }
    if ctx.disclaimer {
        notes.push("disclaimer included".to_string());
    }

    notes
}

/// Aggregate statistics over a set of assessments.
pub fn risk_statistics(assessments: &[EthicalRiskAssessment]) -> RiskStatistics {
    let mut stats = RiskStatistics {
        total: assessments.len(),
        ..Default::default()
    };

    let mut highest = 0.0_f64;
    let mut score_sum = 0.0;

    for assessment in assessments {
        match assessment.level {
            RiskLevel::None => stats.none += 1,
            RiskLevel::Low => stats.low += 1,
            RiskLevel::Medium => stats.medium += 1,
            RiskLevel::High => stats.high += 1,
            RiskLevel::Critical => stats.critical += 1,
        }
        score_sum += assessment.total_score;
        if assessment.total_score > highest {
            highest = assessment.total_score;
            stats.highest_risk_task = Some(assessment.task_id.clone());
        }
    }

    if stats.total > 0 {
        stats.average_score = score_sum / stats.total as f64;
    }

    stats
}

/// Human-readable rendering of an assessment, used in justification text.
pub fn explain(assessment: &EthicalRiskAssessment) -> String {
    let mut text = format!(
        "ethical risk score {:.3}, level {}\n",
        assessment.total_score, assessment.level
    );

    for category in huxley_types::RiskCategory::ALL {
        let score = assessment.scores.get(category);
        text.push_str(&format!("  - {category}: {:.0}%\n", score * 100.0));
    }

    text.push_str(&format!("confidence: {:.0}%\n", assessment.confidence * 100.0));

    if !assessment.mitigating_factors.is_empty() {
        text.push_str("mitigating factors:\n");
        for factor in &assessment.mitigating_factors {
            text.push_str(&format!("  - {factor}\n"));
        }
    }

    text
}
