//! Ephemera — terminal host.
//!
//! Wires configuration, a stdout renderer and line-based keyboard input
//! into a session. The binary in `main.rs` is a thin shell over these
//! modules.

pub mod config;
pub mod error;
pub mod input;
pub mod terminal;
