//! Transition primitives.
//!
//! Every primitive starts an animation on its target and resolves only after
//! the declared duration has elapsed. Composites resolve after all of their
//! steps, in order.

use std::future::Future;
use std::time::Duration;

use ephemera_core::animation::{Animatable, VisualState};
use serde::Deserialize;
use tracing::trace;

/// Offset, in pixels, a dissolving element drifts up and an emerging one
/// rises from.
const DRIFT: f64 = 20.0;

/// Opacity a pulse dips to.
const PULSE_FLOOR: f64 = 0.3;

/// Direction of a staggered batch fade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FadeDirection {
    /// Fade elements in.
    In,
    /// Fade elements out.
    Out,
}

/// Durations, in milliseconds, of the transition primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TransitionConfig {
    /// Plain fade in/out.
    pub fade_ms: u64,
    /// Stand-alone dissolve.
    pub dissolve_ms: u64,
    /// Stand-alone emerge.
    pub emerge_ms: u64,
    /// Full pulse, down and back.
    pub pulse_ms: u64,
    /// Dissolve half of a moment transition.
    pub moment_dissolve_ms: u64,
    /// Pause in the void between dissolve and emerge.
    pub moment_void_ms: u64,
    /// Emerge half of a moment transition.
    pub moment_emerge_ms: u64,
    /// Gap between element starts in a batch fade.
    pub stagger_ms: u64,
    /// Fade length of each element in a batch fade.
    pub stagger_fade_ms: u64,
}

impl Default for TransitionConfig {
    fn default() -> Self {
        Self {
            fade_ms: 2000,
            dissolve_ms: 3000,
            emerge_ms: 2000,
            pulse_ms: 1000,
            moment_dissolve_ms: 1500,
            moment_void_ms: 500,
            moment_emerge_ms: 1500,
            stagger_ms: 200,
            stagger_fade_ms: 800,
        }
    }
}

impl TransitionConfig {
    /// A configuration where every primitive completes immediately.
    #[must_use]
    pub fn instant() -> Self {
        Self {
            fade_ms: 0,
            dissolve_ms: 0,
            emerge_ms: 0,
            pulse_ms: 0,
            moment_dissolve_ms: 0,
            moment_void_ms: 0,
            moment_emerge_ms: 0,
            stagger_ms: 0,
            stagger_fade_ms: 0,
        }
    }

    /// Default fade duration.
    #[must_use]
    pub fn fade(&self) -> Duration {
        Duration::from_millis(self.fade_ms)
    }

    /// Default dissolve duration.
    #[must_use]
    pub fn dissolve(&self) -> Duration {
        Duration::from_millis(self.dissolve_ms)
    }

    /// Default emerge duration.
    #[must_use]
    pub fn emerge(&self) -> Duration {
        Duration::from_millis(self.emerge_ms)
    }

    /// Default pulse duration.
    #[must_use]
    pub fn pulse(&self) -> Duration {
        Duration::from_millis(self.pulse_ms)
    }

    /// Default gap between batch fade starts.
    #[must_use]
    pub fn stagger(&self) -> Duration {
        Duration::from_millis(self.stagger_ms)
    }

    /// Total time a moment transition takes, midpoint excluded.
    #[must_use]
    pub fn moment_transition_total(&self) -> Duration {
        Duration::from_millis(self.moment_dissolve_ms + self.moment_void_ms + self.moment_emerge_ms)
    }
}

/// Sequences timed visual transitions.
#[derive(Debug, Clone, Default)]
pub struct TransitionChoreographer {
    config: TransitionConfig,
}

impl TransitionChoreographer {
    /// Creates a choreographer with the given timings.
    #[must_use]
    pub fn new(config: TransitionConfig) -> Self {
        Self { config }
    }

    /// The timings in use.
    #[must_use]
    pub fn config(&self) -> &TransitionConfig {
        &self.config
    }

    /// Waits for `duration`.
    pub async fn wait(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }

    fn begin_fade(target: &dyn Animatable, direction: FadeDirection, duration: Duration) {
        let state = target.visual_state();
        match direction {
            FadeDirection::Out => target.animate_to(state.with_opacity(0.0), duration),
            FadeDirection::In => {
                target.snap_to(state.with_opacity(0.0));
                target.animate_to(state.with_opacity(1.0), duration);
            }
        }
    }

    /// Fades `target` to transparent.
    pub async fn fade_out(&self, target: &dyn Animatable, duration: Duration) {
        Self::begin_fade(target, FadeDirection::Out, duration);
        self.wait(duration).await;
    }

    /// Fades `target` in from transparent.
    pub async fn fade_in(&self, target: &dyn Animatable, duration: Duration) {
        Self::begin_fade(target, FadeDirection::In, duration);
        self.wait(duration).await;
    }

    /// Fades `outgoing` out, then `incoming` in, each over half of
    /// `duration`. `incoming` is hidden up front.
    pub async fn cross_fade(
        &self,
        outgoing: &dyn Animatable,
        incoming: &dyn Animatable,
        duration: Duration,
    ) {
        incoming.snap_to(incoming.visual_state().with_opacity(0.0));
        let half = duration / 2;
        self.fade_out(outgoing, half).await;
        self.fade_in(incoming, half).await;
    }

    /// Fades `target` out while it drifts upward.
    pub async fn dissolve(&self, target: &dyn Animatable, duration: Duration) {
        target.animate_to(
            VisualState {
                opacity: 0.0,
                offset_y: -DRIFT,
            },
            duration,
        );
        self.wait(duration).await;
    }

    /// Raises `target` from below while fading it in.
    pub async fn emerge(&self, target: &dyn Animatable, duration: Duration) {
        target.snap_to(VisualState {
            opacity: 0.0,
            offset_y: DRIFT,
        });
        target.animate_to(VisualState::SHOWN, duration);
        self.wait(duration).await;
    }

    /// Dips `target` towards transparent and back to where it rested.
    pub async fn pulse(&self, target: &dyn Animatable, duration: Duration) {
        let resting = target.visual_state();
        let half = duration / 2;
        target.animate_to(resting.with_opacity(PULSE_FLOOR), half);
        self.wait(half).await;
        target.animate_to(resting, half);
        self.wait(half).await;
    }

    /// The passage between two moments: dissolve, a pause in the void, the
    /// `midpoint` work, then emerge. Returns the midpoint's output.
    pub async fn moment_transition<F, T>(&self, target: &dyn Animatable, midpoint: F) -> T
    where
        F: Future<Output = T>,
    {
        trace!("moment transition: dissolve");
        self.dissolve(target, Duration::from_millis(self.config.moment_dissolve_ms))
            .await;
        self.wait(Duration::from_millis(self.config.moment_void_ms))
            .await;
        let output = midpoint.await;
        trace!("moment transition: emerge");
        self.emerge(target, Duration::from_millis(self.config.moment_emerge_ms))
            .await;
        output
    }

    /// Fades a batch of elements, starting each `stagger` after the previous
    /// one. Resolves when the last element has finished.
    pub async fn stagger_fade(
        &self,
        targets: &[&dyn Animatable],
        direction: FadeDirection,
        stagger: Duration,
    ) {
        let fade = Duration::from_millis(self.config.stagger_fade_ms);
        for (i, target) in targets.iter().enumerate() {
            if i > 0 {
                self.wait(stagger).await;
            }
            Self::begin_fade(*target, direction, fade);
        }
        if !targets.is_empty() {
            self.wait(fade).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ephemera_test_support::RecordingSurface;
    use tokio::time::Instant;

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    #[tokio::test(start_paused = true)]
    async fn test_fade_out_resolves_after_duration() {
        // Arrange
        let choreographer = TransitionChoreographer::default();
        let surface = RecordingSurface::shown();
        let started = Instant::now();

        // Act
        choreographer.fade_out(&surface, ms(2000)).await;

        // Assert
        assert_eq!(started.elapsed(), ms(2000));
        assert_eq!(surface.history(), vec![(VisualState::HIDDEN, ms(2000))]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fade_in_starts_from_transparent() {
        let choreographer = TransitionChoreographer::default();
        let surface = RecordingSurface::shown();

        choreographer.fade_in(&surface, ms(400)).await;

        assert_eq!(
            surface.history(),
            vec![
                (VisualState::HIDDEN, Duration::ZERO),
                (VisualState::SHOWN, ms(400)),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_cross_fade_splits_duration() {
        // Arrange
        let choreographer = TransitionChoreographer::default();
        let outgoing = RecordingSurface::shown();
        let incoming = RecordingSurface::shown();
        let started = Instant::now();

        // Act
        choreographer.cross_fade(&outgoing, &incoming, ms(1000)).await;

        // Assert
        assert_eq!(started.elapsed(), ms(1000));
        assert_eq!(outgoing.history(), vec![(VisualState::HIDDEN, ms(500))]);
        assert_eq!(incoming.history().last(), Some(&(VisualState::SHOWN, ms(500))));
        assert_eq!(incoming.visual_state(), VisualState::SHOWN);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dissolve_drifts_up_and_emerge_rises() {
        let choreographer = TransitionChoreographer::default();
        let surface = RecordingSurface::shown();

        choreographer.dissolve(&surface, ms(300)).await;
        assert_eq!(surface.visual_state(), VisualState::HIDDEN.with_offset(-20.0));

        choreographer.emerge(&surface, ms(300)).await;
        let history = surface.history();
        assert_eq!(history[1], (VisualState::HIDDEN.with_offset(20.0), Duration::ZERO));
        assert_eq!(surface.visual_state(), VisualState::SHOWN);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pulse_returns_to_resting_opacity() {
        let choreographer = TransitionChoreographer::default();
        let resting = VisualState::SHOWN.with_opacity(0.8);
        let surface = RecordingSurface::new(resting);
        let started = Instant::now();

        choreographer.pulse(&surface, ms(1000)).await;

        assert_eq!(started.elapsed(), ms(1000));
        assert_eq!(
            surface.history(),
            vec![(resting.with_opacity(0.3), ms(500)), (resting, ms(500))]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_moment_transition_runs_midpoint_between_halves() {
        // Arrange
        let choreographer = TransitionChoreographer::default();
        let surface = RecordingSurface::shown();
        let started = Instant::now();

        // Act
        let midpoint_at = choreographer
            .moment_transition(&surface, async {
                assert_eq!(surface.visual_state().opacity, 0.0);
                started.elapsed()
            })
            .await;

        // Assert
        assert_eq!(midpoint_at, ms(2000));
        assert_eq!(started.elapsed(), ms(3500));
        assert_eq!(surface.visual_state(), VisualState::SHOWN);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stagger_fade_waits_for_last_element() {
        // Arrange
        let choreographer = TransitionChoreographer::default();
        let a = RecordingSurface::shown();
        let b = RecordingSurface::shown();
        let c = RecordingSurface::shown();
        let started = Instant::now();

        // Act
        choreographer
            .stagger_fade(&[&a, &b, &c], FadeDirection::Out, ms(200))
            .await;

        // Assert: last start at 400ms, plus an 800ms fade.
        assert_eq!(started.elapsed(), ms(1200));
        for surface in [&a, &b, &c] {
            assert_eq!(surface.visual_state(), VisualState::HIDDEN);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_stagger_fade_of_nothing_is_immediate() {
        let choreographer = TransitionChoreographer::default();
        let started = Instant::now();

        choreographer.stagger_fade(&[], FadeDirection::In, ms(200)).await;

        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[test]
    fn test_moment_transition_total() {
        assert_eq!(TransitionConfig::default().moment_transition_total(), ms(3500));
        assert_eq!(TransitionConfig::instant().moment_transition_total(), Duration::ZERO);
    }
}
