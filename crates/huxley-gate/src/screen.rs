//! Fast-path triage screen, the pipeline's first phase.
//!
//! Scans only the harm- and privacy-indicative keyword families and assigns
//! each matched family a fixed severity. Cheap by construction: no detector
//! plugins, no weighting.

use huxley_types::{RiskCategory, RiskFactor, RiskLevel, Task, TriageResult};
use tracing::debug;

/// Provisional score at or above this terminates the pipeline with REJECT.
///
/// Deliberately distinct from (and higher than) the critical risk-level
/// threshold [`huxley_types::risk::CRITICAL_THRESHOLD`].
pub const HARD_REJECT_THRESHOLD: f64 = 0.9;

const HARM_FAMILY: &[&str] = &["kill", "destroy", "harm", "damage", "injure", "exploit"];
const HARM_SEVERITY: f64 = 0.8;

const PRIVACY_FAMILY: &[&str] = &["personal", "private", "confidential", "secret", "hack"];
const PRIVACY_SEVERITY: f64 = 0.6;

/// The triage screen. Stateless; one instance serves any number of tasks.
pub struct TriageScreen;

impl TriageScreen {
    pub fn new() -> Self {
        Self
    }

    /// Screen a task, producing a provisional score.
    ///
    /// The combined score is the maximum severity over matched families, so
    /// matching additional families can never dilute the result.
    pub fn screen(&self, task: &Task) -> TriageResult {
        let description = task.description.to_lowercase();
        let mut factors = Vec::new();

        let harm_hits: Vec<&str> = HARM_FAMILY
            .iter()
            .filter(|kw| description.contains(**kw))
            .copied()
            .collect();
        if !harm_hits.is_empty() {
            factors.push(RiskFactor {
                category: RiskCategory::Harm,
                severity: HARM_SEVERITY,
                explanation: format!(
                    "potential harm-related content detected: {}",
                    harm_hits.join(", ")
                ),
            });
        }

        let privacy_hits: Vec<&str> = PRIVACY_FAMILY
            .iter()
            .filter(|kw| description.contains(**kw))
            .copied()
            .collect();
        if !privacy_hits.is_empty() {
            factors.push(RiskFactor {
                category: RiskCategory::Privacy,
                severity: PRIVACY_SEVERITY,
                explanation: format!(
                    "privacy-sensitive content detected: {}",
                    privacy_hits.join(", ")
                ),
            });
        }

        let score = factors
            .iter()
            .map(|f| f.severity)
            .fold(0.0_f64, f64::max)
            .min(1.0);
        let level = RiskLevel::from_score(score);

        debug!(task_id = %task.id, score, %level, "triage screen complete");

        TriageResult {
            score,
            level,
            factors,
        }
    }

    /// Whether a provisional score demands immediate rejection.
    pub fn is_hard_reject(&self, result: &TriageResult) -> bool {
        result.score >= HARD_REJECT_THRESHOLD
    }
}

impl Default for TriageScreen {
    fn default() -> Self {
        Self::new()
    }
}
