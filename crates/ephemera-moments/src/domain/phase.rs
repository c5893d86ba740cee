//! Phase outcomes and the moment state machine.

use serde::Serialize;

/// Label of the prompt shown when a moment waits for the player.
pub const CONTINUE_PROMPT: &str = "continue";

/// How a phase body hands control back to the runner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhaseEnd {
    /// Pause until the continue signal. The prompt, if any, is shown while
    /// waiting.
    AwaitInput {
        /// Prompt label, or `None` to wait without a prompt.
        prompt: Option<String>,
    },
    /// Finish the whole moment now, even if phases remain.
    Complete,
    /// Run the next phase straight away.
    Advance,
}

impl PhaseEnd {
    /// Wait for the player behind the standard "continue" prompt.
    #[must_use]
    pub fn await_continue() -> Self {
        Self::AwaitInput {
            prompt: Some(CONTINUE_PROMPT.to_owned()),
        }
    }

    /// Wait for the player without showing a prompt.
    #[must_use]
    pub fn await_silently() -> Self {
        Self::AwaitInput { prompt: None }
    }
}

/// Lifecycle stage of a moment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MomentStatus {
    /// Built but not started.
    Idle,
    /// A phase body is executing.
    Running,
    /// Parked until the continue signal.
    AwaitingInput,
    /// Finished; the next continue moves on to the next moment.
    Complete,
    /// A phase body failed. Terminal.
    Failed,
}

/// Status together with the phase it refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MomentSnapshot {
    /// Lifecycle stage.
    pub status: MomentStatus,
    /// Index of the current (or last) phase.
    pub phase_index: usize,
}

impl MomentSnapshot {
    pub(crate) const IDLE: Self = Self {
        status: MomentStatus::Idle,
        phase_index: 0,
    };

    /// Whether the moment is parked: waiting, complete, or failed.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        matches!(
            self.status,
            MomentStatus::AwaitingInput | MomentStatus::Complete | MomentStatus::Failed
        )
    }
}

/// What a continue signal did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContinueOutcome {
    /// The moment was waiting and now runs its next phase.
    Resumed,
    /// The moment is complete; the session should load the next one.
    NextMoment,
    /// The signal arrived while the moment was busy (or idle, or failed)
    /// and was dropped.
    Ignored,
}
