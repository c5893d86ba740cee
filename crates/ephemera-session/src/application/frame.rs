//! Per-frame aging of the context layer.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use ephemera_context::application::layer::ContextLayer;
use tokio::time::{self, MissedTickBehavior};
use tracing::trace;

/// Ticks the context layer once per frame after the session has started.
///
/// Cheap to clone; the host runs it on its own task so fragments keep
/// fading while the orchestrator is busy with a transition.
#[derive(Debug, Clone)]
pub struct FrameDriver {
    context: Arc<ContextLayer>,
    started: Arc<AtomicBool>,
}

impl FrameDriver {
    pub(crate) fn new(context: Arc<ContextLayer>, started: Arc<AtomicBool>) -> Self {
        Self { context, started }
    }

    /// One frame. A no-op before the session starts. Returns how many
    /// fragments faded out.
    pub fn tick(&self) -> usize {
        if !self.started.load(Ordering::Acquire) {
            return 0;
        }
        let removed = self.context.tick();
        if removed > 0 {
            trace!(removed, "fragments faded out");
        }
        removed
    }

    /// Ticks every `period` forever.
    pub async fn run(self, period: Duration) {
        let mut ticker = time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            self.tick();
        }
    }
}
