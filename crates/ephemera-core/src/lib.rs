//! Ephemera Core — shared abstractions.
//!
//! This crate defines the traits and small value types every other crate
//! depends on: time, randomness, the generation guard for deferred work, and
//! the contracts of the presentation and audio collaborators. It draws
//! nothing and plays nothing itself.

pub mod animation;
pub mod audio;
pub mod clock;
pub mod error;
pub mod generation;
pub mod presentation;
pub mod rng;
