//! The four scripted moments.

use ephemera_core::error::EngineError;

pub(crate) mod awakening;
pub(crate) mod dissolution;
pub(crate) mod uncertainty;
pub(crate) mod understanding;

fn no_such_phase(moment: &'static str, phase: usize) -> EngineError {
    EngineError::PhaseFailed {
        moment,
        phase,
        reason: "no such phase".to_owned(),
    }
}
