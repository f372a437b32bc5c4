use async_trait::async_trait;
use huxley_types::{DecisionTrace, RiskCategory, RiskFactor, Task};

use crate::error::StoreError;

/// Per-category risk detector.
///
/// Implementations may be keyword heuristics or learned classifiers; the
/// decision engine never depends on which. A detector returns a factor with
/// severity in [0, 1] and a human-readable explanation; severity 0.0 means
/// no indicators were found.
pub trait RiskDetector: Send + Sync {
    fn category(&self) -> RiskCategory;

    fn detect(&self, task: &Task) -> RiskFactor;
}

/// Persistence collaborator for decision traces.
///
/// Failures are logged and never surfaced to the evaluation caller.
#[async_trait]
pub trait TraceStore: Send + Sync {
    async fn save(&self, trace: &DecisionTrace) -> Result<(), StoreError>;
}
