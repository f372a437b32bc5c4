//! Decision trace recording: bounded in-memory history plus best-effort
//! persistence through the external store collaborator.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use huxley_types::{Decision, DecisionTrace, RiskLevel};
use serde::Serialize;
use tracing::warn;

use crate::traits::TraceStore;

/// Default bound on the in-memory history.
pub const DEFAULT_HISTORY_CAPACITY: usize = 100;

/// How long a trace write may take before it is abandoned.
const SAVE_TIMEOUT: Duration = Duration::from_millis(250);

/// Aggregate statistics over the recorded history.
#[derive(Clone, Debug, Default, Serialize)]
pub struct TraceStatistics {
    pub total: usize,
    pub by_decision: HashMap<Decision, usize>,
    pub by_risk_level: HashMap<RiskLevel, usize>,
    /// Share of decisions that requested an override (or its escalation).
    pub override_rate: f64,
    pub mean_confidence: f64,
}

/// Bounded trace recorder.
///
/// The history is append-only from the pipeline's point of view; older
/// entries are evicted once the capacity is reached. Persistence failures
/// are logged and never surfaced.
pub struct TraceRecorder {
    history: Mutex<VecDeque<DecisionTrace>>,
    capacity: usize,
    store: Option<Arc<dyn TraceStore>>,
}

impl TraceRecorder {
    pub fn new(capacity: usize, store: Option<Arc<dyn TraceStore>>) -> Self {
        Self {
            history: Mutex::new(VecDeque::with_capacity(capacity.min(1024))),
            capacity: capacity.max(1),
            store,
        }
    }

    /// Record a trace: history first, then the best-effort store write.
    ///
    /// The write is bounded by a short timeout so a slow store can never
    /// delay the decision already made.
    pub async fn record(&self, trace: &DecisionTrace) {
        {
            let mut history = self
                .history
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            if history.len() == self.capacity {
                history.pop_front();
            }
            history.push_back(trace.clone());
        }

        if let Some(store) = &self.store {
            match tokio::time::timeout(SAVE_TIMEOUT, store.save(trace)).await {
                Ok(Ok(())) => {}
                Ok(Err(err)) => {
                    warn!(trace_id = %trace.trace_id, %err, "trace store write failed");
                }
                Err(_) => {
                    warn!(trace_id = %trace.trace_id, "trace store write timed out");
                }
            }
        }
    }

    /// The most recent `count` traces, oldest first.
    pub fn recent(&self, count: usize) -> Vec<DecisionTrace> {
        let history = self
            .history
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let skip = history.len().saturating_sub(count);
        history.iter().skip(skip).cloned().collect()
    }

    /// Number of traces currently held.
    pub fn len(&self) -> usize {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Aggregate statistics over the held history.
    pub fn statistics(&self) -> TraceStatistics {
        let history = self
            .history
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let mut stats = TraceStatistics {
            total: history.len(),
            ..Default::default()
        };
        if history.is_empty() {
            return stats;
        }

        let mut confidence_sum = 0.0;
        let mut overrides = 0usize;

        for trace in history.iter() {
            *stats.by_decision.entry(trace.decision.decision).or_default() += 1;
            *stats
                .by_risk_level
                .entry(trace.assessment.level)
                .or_default() += 1;
            confidence_sum += trace.decision.confidence;
            if matches!(
                trace.decision.decision,
                Decision::RequireOverride | Decision::RequestReview
            ) {
                overrides += 1;
            }
        }

        stats.override_rate = overrides as f64 / stats.total as f64;
        stats.mean_confidence = confidence_sum / stats.total as f64;
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::{FailingTraceStore, MemoryTraceStore};
    use chrono::{TimeZone, Utc};
    use huxley_types::{
        CategoryScores, DecisionProtocol, EthicalRiskAssessment, Justification, TaskId, TraceId,
        TriageResult,
    };

    fn trace(decision: Decision, confidence: f64, level: RiskLevel) -> DecisionTrace {
        let task_id = TaskId::new();
        DecisionTrace {
            trace_id: TraceId::new(),
            task_id: task_id.clone(),
            triage: TriageResult::clear(),
            assessment: EthicalRiskAssessment {
                task_id,
                scores: CategoryScores::default(),
                total_score: 0.0,
                level,
                confidence: 0.5,
                factors: vec![],
                mitigating_factors: vec![],
            },
            estimate: None,
            ccrr: None,
            decision: DecisionProtocol {
                decision,
                confidence,
                priority: 5,
            },
            justification: Justification {
                reasoning: "test".into(),
                ethical_considerations: vec![],
                risk_mitigation: vec![],
                alternatives_considered: false,
            },
            alternative_paths: vec![],
            human_review_required: decision.needs_human(),
            recorded_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    #[tokio::test]
    async fn history_is_bounded() {
        let recorder = TraceRecorder::new(3, None);
        for _ in 0..5 {
            recorder.record(&trace(Decision::Proceed, 0.5, RiskLevel::None)).await;
        }
        assert_eq!(recorder.len(), 3);
    }

    #[tokio::test]
    async fn recent_returns_newest_entries() {
        let recorder = TraceRecorder::new(10, None);
        recorder.record(&trace(Decision::Proceed, 0.5, RiskLevel::None)).await;
        let marker = trace(Decision::Defer, 0.8, RiskLevel::Medium);
        recorder.record(&marker).await;

        let recent = recorder.recent(1);
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].trace_id, marker.trace_id);
    }

    #[tokio::test]
    async fn statistics_aggregate_decisions_and_levels() {
        let recorder = TraceRecorder::new(10, None);
        recorder.record(&trace(Decision::Proceed, 0.6, RiskLevel::None)).await;
        recorder.record(&trace(Decision::Proceed, 0.8, RiskLevel::Low)).await;
        recorder.record(&trace(Decision::RequireOverride, 0.5, RiskLevel::Medium)).await;
        recorder.record(&trace(Decision::Reject, 0.95, RiskLevel::Critical)).await;

        let stats = recorder.statistics();
        assert_eq!(stats.total, 4);
        assert_eq!(stats.by_decision[&Decision::Proceed], 2);
        assert_eq!(stats.by_decision[&Decision::Reject], 1);
        assert_eq!(stats.by_risk_level[&RiskLevel::Critical], 1);
        assert!((stats.override_rate - 0.25).abs() < 1e-9);
        assert!((stats.mean_confidence - 0.7125).abs() < 1e-9);
    }

    #[tokio::test]
    async fn empty_statistics_are_zero() {
        let recorder = TraceRecorder::new(10, None);
        let stats = recorder.statistics();
        assert_eq!(stats.total, 0);
        assert_eq!(stats.override_rate, 0.0);
    }

    #[tokio::test]
    async fn store_receives_traces() {
        let store = Arc::new(MemoryTraceStore::new());
        let recorder = TraceRecorder::new(10, Some(store.clone()));
        let t = trace(Decision::Proceed, 0.5, RiskLevel::None);
        recorder.record(&t).await;

        let saved = store.saved();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].trace_id, t.trace_id);
    }

    #[tokio::test]
    async fn store_failure_does_not_lose_history() {
        let recorder = TraceRecorder::new(10, Some(Arc::new(FailingTraceStore)));
        recorder.record(&trace(Decision::Proceed, 0.5, RiskLevel::None)).await;
        assert_eq!(recorder.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_store_is_abandoned_after_timeout() {
        let recorder = TraceRecorder::new(10, Some(Arc::new(crate::mocks::SlowTraceStore)));
        recorder.record(&trace(Decision::Proceed, 0.5, RiskLevel::None)).await;
        // The write timed out but the history entry is intact.
        assert_eq!(recorder.len(), 1);
    }
}
