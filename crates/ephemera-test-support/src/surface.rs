//! Test surface — an `Animatable` that records every state change.

use std::sync::Mutex;
use std::time::Duration;

use ephemera_core::animation::{Animatable, VisualState};

/// An animatable element that remembers what it was asked to do.
#[derive(Debug)]
pub struct RecordingSurface {
    state: Mutex<VisualState>,
    history: Mutex<Vec<(VisualState, Duration)>>,
}

impl RecordingSurface {
    /// Creates a surface resting in `state`.
    #[must_use]
    pub fn new(state: VisualState) -> Self {
        Self {
            state: Mutex::new(state),
            history: Mutex::new(Vec::new()),
        }
    }

    /// Creates a fully visible surface.
    #[must_use]
    pub fn shown() -> Self {
        Self::new(VisualState::SHOWN)
    }

    /// Every snap (duration zero) and animation, oldest first.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn history(&self) -> Vec<(VisualState, Duration)> {
        self.history.lock().unwrap().clone()
    }
}

impl Animatable for RecordingSurface {
    fn visual_state(&self) -> VisualState {
        *self.state.lock().unwrap()
    }

    fn snap_to(&self, state: VisualState) {
        *self.state.lock().unwrap() = state;
        self.history.lock().unwrap().push((state, Duration::ZERO));
    }

    fn animate_to(&self, state: VisualState, duration: Duration) {
        *self.state.lock().unwrap() = state;
        self.history.lock().unwrap().push((state, duration));
    }
}
