//! Structured error types for the triage pipeline.
//!
//! Only structural failures surface here. Malformed records and unmatched
//! lines are absorbed by the stages that see them.

/// Failures of the envelope repair layer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EnvelopeError {
    /// The caller's buffer was too short to hold the closing tokens.
    #[error("no room to terminate structure: need {needed} bytes, buffer has {available}")]
    NoRoomToTerminate { needed: usize, available: usize },
}

/// Failures building a diagnostic pattern.
#[derive(Debug, thiserror::Error)]
pub enum PatternError {
    /// The expression does not compile.
    #[error("Invalid diagnostic pattern: {0}")]
    Invalid(#[from] regex::Error),

    /// The expression lacks a capture group the classifier reads.
    #[error("Diagnostic pattern has no `{0}` capture group")]
    MissingGroup(&'static str),
}

/// Errors from the triage pipeline.
#[derive(Debug, thiserror::Error)]
pub enum TriageError {
    /// The repaired envelope could not be closed.
    #[error(transparent)]
    Envelope(#[from] EnvelopeError),

    /// A custom dialect could not be compiled.
    #[error(transparent)]
    Pattern(#[from] PatternError),

    /// Failed to write the report.
    #[error("Failed to write report: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for triage operations.
pub type TriageResult<T> = Result<T, TriageError>;
