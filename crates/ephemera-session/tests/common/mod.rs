//! Shared helpers for session integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use ephemera_context::domain::pool::PoolConfig;
use ephemera_moments::{MomentConfig, MomentSnapshot};
use ephemera_session::{Orchestrator, SessionCollaborators, SessionConfig};
use ephemera_test_support::{ManualClock, MockRng, RecordingRenderer, RecordingSurface};
use ephemera_transitions::TransitionConfig;

/// A session wired to recording collaborators.
pub struct Harness {
    pub orchestrator: Orchestrator,
    pub renderer: Arc<RecordingRenderer>,
    pub clock: Arc<ManualClock>,
}

/// Scripts and transitions without pauses.
pub fn instant_config() -> SessionConfig {
    SessionConfig {
        transitions: TransitionConfig::instant(),
        moments: MomentConfig::instant(),
        ..SessionConfig::default()
    }
}

/// Instant transitions, original script pacing.
pub fn paced_config() -> SessionConfig {
    SessionConfig {
        transitions: TransitionConfig::instant(),
        ..SessionConfig::default()
    }
}

/// Instant everything, with a pool that fades fragments quickly.
pub fn fast_fade_config() -> SessionConfig {
    SessionConfig {
        context: PoolConfig {
            capacity: 2,
            fade_delay_ms: 1000,
            fade_rate: 0.5,
            ..PoolConfig::default()
        },
        ..instant_config()
    }
}

pub fn build_session(config: SessionConfig) -> Harness {
    let renderer = Arc::new(RecordingRenderer::new());
    let clock = Arc::new(ManualClock::starting_now());
    let orchestrator = Orchestrator::new(
        SessionCollaborators {
            renderer: renderer.clone(),
            audio: None,
            container: Arc::new(RecordingSurface::shown()),
            clock: clock.clone(),
            rng: Box::new(MockRng),
        },
        config,
    )
    .unwrap();
    Harness {
        orchestrator,
        renderer,
        clock,
    }
}

/// Waits until the active moment is waiting, complete, or failed.
pub async fn settle(orchestrator: &Orchestrator) -> MomentSnapshot {
    let mut rx = orchestrator
        .active_moment()
        .expect("no active moment")
        .subscribe();
    *rx.wait_for(MomentSnapshot::is_settled).await.unwrap()
}
