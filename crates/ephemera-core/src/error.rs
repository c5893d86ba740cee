//! Engine error types.

use thiserror::Error;

/// Top-level engine error type.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A renderer could not honour an awaited request.
    #[error("presentation error: {0}")]
    Presentation(String),

    /// A scripted phase failed while running. Fatal to its moment.
    #[error("phase {phase} of moment {moment} failed: {reason}")]
    PhaseFailed {
        /// Name of the moment the phase belongs to.
        moment: &'static str,
        /// Index of the failing phase.
        phase: usize,
        /// What went wrong.
        reason: String,
    },

    /// A component was built with settings it cannot run with.
    #[error("configuration error: {0}")]
    Configuration(String),
}
