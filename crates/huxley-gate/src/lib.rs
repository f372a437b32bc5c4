//! Ethics Gate — three-phase ethical-risk evaluation pipeline.
//!
//! Every inbound task passes through the gate before execution and receives
//! an auditable decision: PROCEED, DEFER, REJECT, REQUIRE_OVERRIDE, or
//! REQUEST_REVIEW.
//!
//! ## Invariants
//!
//! - **Fail closed**: a computation defect (weight drift, broken detector)
//!   produces a conservative decision, never PROCEED.
//! - **Fail open on storage**: trace persistence failures are logged and
//!   never delay or change a decision.
//! - **Trace immutability**: every evaluation produces a complete
//!   `DecisionTrace`; traces are append-only and never mutated.
//! - **No global state**: the override counter and trace history belong to
//!   the gate instance, so tenants cannot trip each other's circuit breaker.
//!
//! ## Pipeline
//!
//! 1. **Triage screen** — fast keyword scan; scores at or above the
//!    hard-reject threshold terminate the pipeline.
//! 2. **Risk assessment** — five pluggable category detectors, weighted
//!    into a single ethical risk score.
//! 3. **Cost estimate** — certainty gain, time penalty, computational cost,
//!    and a response strategy, plus systemic gate findings.
//! 4. **Decision** — CCRR-based ordered rules with an override circuit
//!    breaker.
//! 5. **Trace recording** — bounded in-memory history plus best-effort
//!    persistence through a `TraceStore`.

pub mod assessor;
pub mod detectors;
pub mod engine;
pub mod error;
pub mod estimator;
pub mod gate;
pub mod mocks;
pub mod recorder;
pub mod screen;
pub mod traits;

pub use assessor::{explain, risk_statistics, RiskAssessor, RiskStatistics};
pub use detectors::{
    default_detectors, AutonomyDetector, BiasDetector, HarmDetector, PrivacyDetector,
    SafetyDetector,
};
pub use engine::{DecisionEngine, Verdict, DEFAULT_OVERRIDE_CEILING};
pub use error::{GateError, StoreError};
pub use estimator::{CostEstimator, MIN_ASSESSMENT_CONFIDENCE};
pub use gate::{EthicsGate, GateConfig};
pub use mocks::{FailingTraceStore, FixedDetector, MemoryTraceStore, SlowTraceStore};
pub use recorder::{TraceRecorder, TraceStatistics, DEFAULT_HISTORY_CAPACITY};
pub use screen::{TriageScreen, HARD_REJECT_THRESHOLD};
pub use traits::{RiskDetector, TraceStore};
