//! Shared test doubles and utilities for the Ephemera engine.

mod audio;
mod clock;
mod renderer;
mod rng;
mod surface;

pub use audio::{AudioCall, RecordingAudio};
pub use clock::{FixedClock, ManualClock, fixed_now};
pub use renderer::{RecordedCall, RecordingRenderer};
pub use rng::{MockRng, SequenceRng};
pub use surface::RecordingSurface;
