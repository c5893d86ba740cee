//! Domain layer for moments.

pub mod kind;
pub mod phase;
