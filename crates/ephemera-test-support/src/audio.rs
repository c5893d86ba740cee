//! Test audio — records every call made to the ambient audio collaborator.

use std::sync::Mutex;

use ephemera_core::audio::AmbientAudio;

/// One call received by [`RecordingAudio`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AudioCall {
    /// `start_ambient` was called.
    StartAmbient,
    /// `stop` was called.
    Stop,
    /// `set_volume` was called with the clamped value.
    SetVolume(f32),
}

/// An audio collaborator that records calls instead of making sound.
#[derive(Debug, Default)]
pub struct RecordingAudio {
    calls: Mutex<Vec<AudioCall>>,
}

impl RecordingAudio {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of all calls.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn calls(&self) -> Vec<AudioCall> {
        self.calls.lock().unwrap().clone()
    }
}

impl AmbientAudio for RecordingAudio {
    fn start_ambient(&self) {
        self.calls.lock().unwrap().push(AudioCall::StartAmbient);
    }

    fn stop(&self) {
        self.calls.lock().unwrap().push(AudioCall::Stop);
    }

    fn set_volume(&self, volume: f32) {
        self.calls
            .lock()
            .unwrap()
            .push(AudioCall::SetVolume(volume.clamp(0.0, 1.0)));
    }
}
