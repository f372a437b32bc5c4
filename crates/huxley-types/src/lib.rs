//! Core type definitions for the Huxley ethics gate.
//!
//! This crate provides all shared type definitions. No business logic — just types.
//! Every Huxley crate depends on this crate.

pub mod cost;
pub mod decision;
pub mod ids;
pub mod risk;
pub mod task;
pub mod trace;

// Re-export primary types at crate root for ergonomic use.
pub use cost::{CostEstimate, GateFinding, Strategy};
pub use decision::{Decision, DecisionProtocol, Justification};
pub use ids::{SessionId, TaskId, TraceId};
pub use risk::{
    CategoryScores, CategoryWeights, EthicalRiskAssessment, RiskCategory, RiskFactor, RiskLevel,
    TriageResult,
};
pub use task::{Task, TaskBuilder, TaskContext};
pub use trace::DecisionTrace;
