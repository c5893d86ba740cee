//! Ephemera — session orchestration.
//!
//! The [`Orchestrator`] owns the journey: which moment is active, how the
//! next one is loaded through a transition, and where continue and choice
//! signals go. The [`FrameDriver`] ages the shared context layer once per
//! frame, independently of the moment.

pub mod application;
pub mod domain;
pub mod error;

pub use application::frame::FrameDriver;
pub use application::orchestrator::{Orchestrator, SessionCollaborators};
pub use domain::config::SessionConfig;
pub use domain::view::SessionView;
pub use error::SessionError;
