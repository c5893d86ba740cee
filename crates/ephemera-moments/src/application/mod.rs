//! Application layer for moments: the phase runner and its context.

pub mod context;
pub mod runner;
