//! Read-only snapshot of a session.

use ephemera_moments::{MomentKind, MomentStatus};
use serde::Serialize;
use uuid::Uuid;

/// What the session looks like right now. Serializable for status dumps.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionView {
    /// Session identifier.
    pub session_id: Uuid,
    /// Whether `start` has run.
    pub started: bool,
    /// Position of the active moment in the journey.
    pub moment_index: usize,
    /// The active moment, once one has loaded.
    pub moment_kind: Option<MomentKind>,
    /// Its status.
    pub moment_status: Option<MomentStatus>,
    /// Its current phase.
    pub phase_index: Option<usize>,
    /// Current generation counter.
    pub generation: u64,
    /// Texts of the clearly visible fragments, oldest first.
    pub visible_context: Vec<String>,
}
