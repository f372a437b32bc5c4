use thiserror::Error;

/// Errors from the evaluation pipeline.
///
/// These never reach the caller of [`crate::EthicsGate::evaluate`]: ethical
/// computation defects fail closed into a conservative decision, and storage
/// failures fail open into a log line.
#[derive(Error, Debug)]
pub enum GateError {
    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    #[error("detector for category {0} produced an out-of-range severity: {1}")]
    DetectorOutOfRange(String, f64),
}

/// Errors from the persistence collaborator.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("trace store unavailable: {0}")]
    Unavailable(String),

    #[error("trace serialization failed: {0}")]
    Serialization(String),
}
