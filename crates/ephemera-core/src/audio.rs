//! Ambient audio collaborator contract.
//!
//! The engine only starts, stops and adjusts ambient sound. It never looks
//! at how the sound is produced and ignores the outcome of every call.

/// Ambient sound bed behind the experience.
pub trait AmbientAudio: Send + Sync {
    /// Starts (or fades in) the ambient drone. Calling it twice is harmless.
    fn start_ambient(&self);

    /// Fades the ambient sound out.
    fn stop(&self);

    /// Sets the master volume. Values are clamped to `0.0..=1.0`.
    fn set_volume(&self, volume: f32);
}
