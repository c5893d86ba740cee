//! Ephemera — fading context.
//!
//! Responsible for the pool of transient context fragments that drift
//! around the moment text: admitting them, aging them, fading them out and
//! evicting the oldest when the pool is full.

pub mod application;
pub mod domain;
