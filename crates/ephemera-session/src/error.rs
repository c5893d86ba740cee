//! Session error types.

use ephemera_core::error::EngineError;
use thiserror::Error;

/// Errors surfaced by the orchestrator.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The active moment's phase failed. The playthrough cannot go on.
    #[error("moment failed: {0}")]
    MomentFailed(#[source] EngineError),

    /// The session could not be assembled.
    #[error(transparent)]
    Engine(#[from] EngineError),
}
