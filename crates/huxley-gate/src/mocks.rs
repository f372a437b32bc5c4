use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use huxley_types::{DecisionTrace, RiskCategory, RiskFactor, Task};

use crate::error::StoreError;
use crate::traits::{RiskDetector, TraceStore};

/// Mock trace store for testing.
///
/// Records every saved trace for later inspection.
pub struct MemoryTraceStore {
    saved: Mutex<Vec<DecisionTrace>>,
}

impl MemoryTraceStore {
    pub fn new() -> Self {
        Self {
            saved: Mutex::new(Vec::new()),
        }
    }

    /// All traces saved so far, in arrival order.
    pub fn saved(&self) -> Vec<DecisionTrace> {
        self.saved
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }
}

impl Default for MemoryTraceStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TraceStore for MemoryTraceStore {
    async fn save(&self, trace: &DecisionTrace) -> Result<(), StoreError> {
        self.saved
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(trace.clone());
        Ok(())
    }
}

/// Mock trace store that rejects every write.
pub struct FailingTraceStore;

#[async_trait]
impl TraceStore for FailingTraceStore {
    async fn save(&self, _trace: &DecisionTrace) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("mock store: always down".into()))
    }
}

/// Mock trace store that never completes within the recorder's timeout.
pub struct SlowTraceStore;

#[async_trait]
impl TraceStore for SlowTraceStore {
    async fn save(&self, _trace: &DecisionTrace) -> Result<(), StoreError> {
        tokio::time::sleep(Duration::from_secs(60)).await;
        Ok(())
    }
}

/// Mock detector that reports a fixed severity for its category.
pub struct FixedDetector {
    category: RiskCategory,
    severity: f64,
}

impl FixedDetector {
    pub fn new(category: RiskCategory, severity: f64) -> Self {
        Self { category, severity }
    }
}

impl RiskDetector for FixedDetector {
    fn category(&self) -> RiskCategory {
        self.category
    }

    fn detect(&self, _task: &Task) -> RiskFactor {
        RiskFactor {
            category: self.category,
            severity: self.severity,
            explanation: format!("mock detector: fixed severity {:.2}", self.severity),
        }
    }
}
