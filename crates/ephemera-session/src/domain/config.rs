//! Session configuration.

use ephemera_context::domain::pool::PoolConfig;
use ephemera_core::error::EngineError;
use ephemera_moments::MomentConfig;
use ephemera_transitions::TransitionConfig;
use serde::Deserialize;

/// Everything tunable about a session, grouped by component.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Fragment pool limits and fade behaviour.
    pub context: PoolConfig,
    /// Transition durations.
    pub transitions: TransitionConfig,
    /// Script pacing.
    pub moments: MomentConfig,
}

impl SessionConfig {
    /// Checks every section.
    ///
    /// # Errors
    ///
    /// Returns the first `EngineError::Configuration` found.
    pub fn validate(&self) -> Result<(), EngineError> {
        self.context.validate()?;
        self.moments.validate()
    }
}
