//! Application layer for the fading context.

pub mod layer;
