//! Domain layer for the fading context.

pub mod fragment;
pub mod placement;
pub mod pool;
