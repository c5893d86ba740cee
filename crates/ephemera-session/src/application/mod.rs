//! Application layer for the session.

pub mod frame;
pub mod orchestrator;
