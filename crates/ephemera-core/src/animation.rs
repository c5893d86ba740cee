//! Animation target contract.
//!
//! A visual element the transition choreographer can move between states.
//! Implementations start the animation and return at once; the choreographer
//! owns the timing.

use std::time::Duration;

/// Opacity and vertical offset of an element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisualState {
    /// Opacity in `0.0..=1.0`.
    pub opacity: f64,
    /// Vertical offset in pixels; negative is up.
    pub offset_y: f64,
}

impl VisualState {
    /// Fully visible, at rest.
    pub const SHOWN: Self = Self {
        opacity: 1.0,
        offset_y: 0.0,
    };

    /// Fully transparent, at rest.
    pub const HIDDEN: Self = Self {
        opacity: 0.0,
        offset_y: 0.0,
    };

    /// Same state with a different opacity.
    #[must_use]
    pub fn with_opacity(self, opacity: f64) -> Self {
        Self { opacity, ..self }
    }

    /// Same state with a different offset.
    #[must_use]
    pub fn with_offset(self, offset_y: f64) -> Self {
        Self { offset_y, ..self }
    }
}

/// Something that can be animated between visual states.
pub trait Animatable: Send + Sync {
    /// The state the element currently rests in or is heading towards.
    fn visual_state(&self) -> VisualState;

    /// Jumps to `state` without animating.
    fn snap_to(&self, state: VisualState);

    /// Starts an eased animation to `state` over `duration`.
    fn animate_to(&self, state: VisualState, duration: Duration);
}
