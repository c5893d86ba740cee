//! Ephemera — moments.
//!
//! A moment is one scripted narrative segment made of ordered phases. This
//! crate holds the phase runner state machine, the context handed to phase
//! bodies, and the four scripted moments of the journey.

pub mod application;
pub mod domain;
mod scripts;

pub use application::context::PhaseContext;
pub use application::runner::{Moment, MomentDeps};
pub use domain::kind::{MomentConfig, MomentKind, MomentScript};
pub use domain::phase::{ContinueOutcome, MomentSnapshot, MomentStatus, PhaseEnd};
