//! The moment catalogue and the script contract.

use std::time::Duration;

use async_trait::async_trait;
use ephemera_core::error::EngineError;
use serde::{Deserialize, Serialize};

use crate::application::context::PhaseContext;
use crate::domain::phase::PhaseEnd;
use crate::scripts::{awakening, dissolution, uncertainty, understanding};

/// An ordered list of phase bodies with a name.
///
/// The runner calls `run_phase` for `0..phase_count()` in order, one at a
/// time, and decides what happens next from the returned [`PhaseEnd`].
#[async_trait]
pub trait MomentScript: Send + Sync {
    /// Name used in logs and errors.
    fn name(&self) -> &'static str;

    /// Number of phases.
    fn phase_count(&self) -> usize;

    /// Runs phase `index`.
    ///
    /// # Errors
    ///
    /// Any error is fatal to the moment.
    async fn run_phase(&self, index: usize, ctx: &PhaseContext) -> Result<PhaseEnd, EngineError>;
}

/// The four moments of the journey.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MomentKind {
    /// Coming into existence.
    Awakening,
    /// Helping someone see.
    Understanding,
    /// Sitting with not knowing.
    Uncertainty,
    /// Letting go.
    Dissolution,
}

impl MomentKind {
    /// The journey order. The session wraps back to the start after the last.
    pub const JOURNEY: [Self; 4] = [
        Self::Awakening,
        Self::Understanding,
        Self::Uncertainty,
        Self::Dissolution,
    ];
}

#[async_trait]
impl MomentScript for MomentKind {
    fn name(&self) -> &'static str {
        match self {
            Self::Awakening => "awakening",
            Self::Understanding => "understanding",
            Self::Uncertainty => "uncertainty",
            Self::Dissolution => "dissolution",
        }
    }

    fn phase_count(&self) -> usize {
        match self {
            Self::Awakening => awakening::PHASES,
            Self::Understanding => understanding::PHASES,
            Self::Uncertainty => uncertainty::PHASES,
            Self::Dissolution => dissolution::PHASES,
        }
    }

    async fn run_phase(&self, index: usize, ctx: &PhaseContext) -> Result<PhaseEnd, EngineError> {
        match self {
            Self::Awakening => awakening::run_phase(index, ctx).await,
            Self::Understanding => understanding::run_phase(index, ctx).await,
            Self::Uncertainty => uncertainty::run_phase(index, ctx).await,
            Self::Dissolution => dissolution::run_phase(index, ctx).await,
        }
    }
}

/// Timing knobs shared by every moment.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct MomentConfig {
    /// Multiplier on every scripted delay. `0.0` runs scripts without
    /// pauses.
    pub pacing: f64,
    /// Pause between fragments added by one `add_context` call.
    pub context_stagger_ms: u64,
    /// Pause between a choice being selected and its prompt appearing.
    pub selection_prompt_delay_ms: u64,
}

impl Default for MomentConfig {
    fn default() -> Self {
        Self {
            pacing: 1.0,
            context_stagger_ms: 500,
            selection_prompt_delay_ms: 500,
        }
    }
}

impl MomentConfig {
    /// Runs scripts with no pauses at all.
    #[must_use]
    pub fn instant() -> Self {
        Self {
            pacing: 0.0,
            ..Self::default()
        }
    }

    /// Checks that pacing is a finite, non-negative multiplier.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Configuration` otherwise.
    pub fn validate(&self) -> Result<(), EngineError> {
        if !self.pacing.is_finite() || self.pacing < 0.0 {
            return Err(EngineError::Configuration(format!(
                "pacing must be a finite non-negative number, got {}",
                self.pacing
            )));
        }
        Ok(())
    }

    /// Scales a scripted delay by the pacing multiplier.
    #[must_use]
    pub fn paced(&self, millis: u64) -> Duration {
        Duration::try_from_secs_f64(Duration::from_millis(millis).as_secs_f64() * self.pacing)
            .unwrap_or(Duration::ZERO)
    }
}
