//! The shared context layer.
//!
//! Wraps the [`FragmentPool`] for use by the session and the active moment:
//! places fragments, schedules staggered additions, ticks the pool against
//! the clock, and projects every pool change onto the renderer. The pool lock
//! is only held for synchronous pool work, never while rendering or waiting.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use ephemera_core::clock::Clock;
use ephemera_core::error::EngineError;
use ephemera_core::generation::GenerationTicket;
use ephemera_core::presentation::{FragmentId, FragmentPosition, Renderer};
use ephemera_core::rng::RandomSource;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

use crate::domain::fragment::FragmentChange;
use crate::domain::placement::{CLUSTER_SPREAD, jitter, random_position};
use crate::domain::pool::{FragmentPool, PoolConfig};

/// Default pause between fragments of a cluster.
pub const CLUSTER_STAGGER: Duration = Duration::from_millis(300);

/// A fragment addition scheduled at an offset from now.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledFragment {
    /// Delay before the fragment is added.
    pub offset: Duration,
    /// Fragment text.
    pub text: String,
    /// Fixed position, or `None` for a random peripheral one.
    pub position: Option<FragmentPosition>,
}

/// Shared owner of the fragment pool.
pub struct ContextLayer {
    pool: Mutex<FragmentPool>,
    renderer: Arc<dyn Renderer>,
    clock: Arc<dyn Clock>,
    rng: Mutex<Box<dyn RandomSource>>,
}

impl std::fmt::Debug for ContextLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContextLayer")
            .field("pool", &self.pool)
            .finish_non_exhaustive()
    }
}

impl ContextLayer {
    /// Creates a layer with an empty pool.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Configuration` if `config` is invalid.
    pub fn new(
        config: PoolConfig,
        renderer: Arc<dyn Renderer>,
        clock: Arc<dyn Clock>,
        rng: Box<dyn RandomSource>,
    ) -> Result<Self, EngineError> {
        Ok(Self {
            pool: Mutex::new(FragmentPool::new(config)?),
            renderer,
            clock,
            rng: Mutex::new(rng),
        })
    }

    fn pool(&self) -> MutexGuard<'_, FragmentPool> {
        self.pool.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn rng(&self) -> MutexGuard<'_, Box<dyn RandomSource>> {
        self.rng.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn project(&self, changes: Vec<FragmentChange>) {
        for change in changes {
            match change {
                FragmentChange::Added(view) => self.renderer.show_fragment(&view),
                FragmentChange::Faded { id, opacity } => {
                    self.renderer.set_fragment_opacity(id, opacity);
                }
                FragmentChange::Removed { id, reason } => {
                    trace!(%id, ?reason, "fragment removed");
                    self.renderer.remove_fragment(id, reason);
                }
            }
        }
    }

    /// Adds a fragment now. Without a position, one is drawn from the
    /// peripheral zones.
    pub fn add_fragment(&self, text: &str, position: Option<FragmentPosition>) -> FragmentId {
        let position = position.unwrap_or_else(|| random_position(self.rng().as_mut()));
        let now = self.clock.now();
        let (id, changes) = {
            let mut pool = self.pool();
            let id = pool.add(text, position, now);
            (id, pool.take_changes())
        };
        debug!(%id, text, "context fragment added");
        self.project(changes);
        id
    }

    /// Adds a fragment only if `ticket` is still live. Liveness is checked
    /// while the pool lock is held, so an addition racing a teardown that
    /// advances the generation before clearing either lands before the
    /// clear or not at all.
    pub fn add_fragment_if_live(
        &self,
        ticket: &GenerationTicket,
        text: &str,
        position: Option<FragmentPosition>,
    ) -> Option<FragmentId> {
        let position = position.unwrap_or_else(|| random_position(self.rng().as_mut()));
        let now = self.clock.now();
        let (id, changes) = {
            let mut pool = self.pool();
            if !ticket.is_live() {
                drop(pool);
                trace!(generation = %ticket.generation(), text, "stale fragment dropped");
                return None;
            }
            let id = pool.add(text, position, now);
            (id, pool.take_changes())
        };
        debug!(%id, text, "context fragment added");
        self.project(changes);
        Some(id)
    }

    /// Schedules fragments at their offsets. Entries with a zero offset are
    /// added before this returns; the rest run as background tasks that
    /// drop their fragment if `ticket` has expired by the time they fire.
    pub fn schedule(
        self: &Arc<Self>,
        entries: Vec<ScheduledFragment>,
        ticket: &GenerationTicket,
    ) -> Vec<JoinHandle<()>> {
        let mut handles = Vec::new();
        for entry in entries {
            if entry.offset.is_zero() {
                self.add_fragment_if_live(ticket, &entry.text, entry.position);
                continue;
            }
            let layer = Arc::clone(self);
            let ticket = ticket.clone();
            handles.push(tokio::spawn(async move {
                tokio::time::sleep(entry.offset).await;
                layer.add_fragment_if_live(&ticket, &entry.text, entry.position);
            }));
        }
        handles
    }

    /// Adds `texts` one after another, `stagger` apart, each at its own
    /// random position.
    pub fn add_staggered(
        self: &Arc<Self>,
        texts: &[&str],
        stagger: Duration,
        ticket: &GenerationTicket,
    ) -> Vec<JoinHandle<()>> {
        let entries = (0u32..)
            .zip(texts)
            .map(|(i, text)| ScheduledFragment {
                offset: stagger * i,
                text: (*text).to_owned(),
                position: None,
            })
            .collect();
        self.schedule(entries, ticket)
    }

    /// Adds a cluster of related fragments jittered around `base` (random
    /// when `None`), `stagger` apart.
    pub fn add_cluster(
        self: &Arc<Self>,
        texts: &[&str],
        base: Option<FragmentPosition>,
        stagger: Duration,
        ticket: &GenerationTicket,
    ) -> Vec<JoinHandle<()>> {
        let entries = {
            let mut rng = self.rng();
            let base = base.unwrap_or_else(|| random_position(rng.as_mut()));
            (0u32..)
                .zip(texts)
                .map(|(i, text)| ScheduledFragment {
                    offset: stagger * i,
                    text: (*text).to_owned(),
                    position: Some(jitter(base, CLUSTER_SPREAD, rng.as_mut())),
                })
                .collect()
        };
        self.schedule(entries, ticket)
    }

    /// Ages the pool to the clock's current time. Returns how many fragments
    /// faded out.
    pub fn tick(&self) -> usize {
        let now = self.clock.now();
        let (removed, changes) = {
            let mut pool = self.pool();
            let removed = pool.tick(now);
            (removed, pool.take_changes())
        };
        self.project(changes);
        removed
    }

    /// Removes a fragment by id; unknown ids are ignored.
    pub fn remove(&self, id: FragmentId) -> bool {
        let (removed, changes) = {
            let mut pool = self.pool();
            let removed = pool.remove(id);
            (removed, pool.take_changes())
        };
        self.project(changes);
        removed
    }

    /// Drops every fragment without fading. Callers tearing down a
    /// generation advance it first, so no stale addition survives the clear.
    pub fn clear(&self) -> usize {
        let (cleared, changes) = {
            let mut pool = self.pool();
            let cleared = pool.clear();
            (cleared, pool.take_changes())
        };
        if cleared > 0 {
            debug!(cleared, "context cleared");
        }
        self.project(changes);
        cleared
    }

    /// Texts of fragments above the configured visibility threshold.
    #[must_use]
    pub fn visible_texts(&self) -> Vec<String> {
        self.pool()
            .visible_texts_default()
            .into_iter()
            .map(str::to_owned)
            .collect()
    }

    /// Whether visible context mentions `query`, ignoring case.
    #[must_use]
    pub fn contains(&self, query: &str) -> bool {
        self.pool().contains_default(query)
    }

    /// Number of live fragments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pool().len()
    }

    /// Whether no fragments are live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pool().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;

    use super::*;
    use chrono::{DateTime, Utc};
    use ephemera_core::generation::GenerationGuard;
    use ephemera_core::presentation::RemovalReason;
    use ephemera_test_support::{ManualClock, MockRng, RecordingRenderer, fixed_now};

    /// Parks every `now()` until the test releases it.
    struct GatedClock {
        entered: Mutex<mpsc::Sender<()>>,
        release: Mutex<mpsc::Receiver<()>>,
    }

    impl Clock for GatedClock {
        fn now(&self) -> DateTime<Utc> {
            self.entered.lock().unwrap().send(()).unwrap();
            self.release.lock().unwrap().recv().unwrap();
            fixed_now()
        }
    }

    struct Fixture {
        layer: Arc<ContextLayer>,
        renderer: Arc<RecordingRenderer>,
        clock: Arc<ManualClock>,
    }

    fn fixture(config: PoolConfig) -> Fixture {
        let renderer = Arc::new(RecordingRenderer::new());
        let clock = Arc::new(ManualClock::starting_now());
        let layer = Arc::new(
            ContextLayer::new(config, renderer.clone(), clock.clone(), Box::new(MockRng)).unwrap(),
        );
        Fixture {
            layer,
            renderer,
            clock,
        }
    }

    #[test]
    fn test_add_fragment_projects_onto_renderer() {
        // Arrange
        let f = fixture(PoolConfig::default());

        // Act
        let id = f.layer.add_fragment("...now...", None);

        // Assert
        let shown = f.renderer.fragments_shown();
        assert_eq!(shown.len(), 1);
        assert_eq!(shown[0].id, id);
        assert_eq!(shown[0].text, "...now...");
        // MockRng always draws zone 0 at its top-left corner.
        assert_eq!(shown[0].position, FragmentPosition::new(5.0, 10.0));
        assert!(f.layer.contains("NOW"));
    }

    #[test]
    fn test_tick_projects_fade_and_removal() {
        // Arrange
        let f = fixture(PoolConfig {
            fade_delay_ms: 1000,
            fade_rate: 0.25,
            baseline_opacity: 0.5,
            ..PoolConfig::default()
        });
        let id = f.layer.add_fragment("...edges...", None);
        f.clock.advance_millis(1001);

        // Act
        f.layer.tick();
        let removed = f.layer.tick();

        // Assert
        assert_eq!(removed, 1);
        assert!(f.layer.is_empty());
        assert_eq!(
            f.renderer.fragments_removed(),
            vec![(id, RemovalReason::Faded)]
        );
    }

    #[test]
    fn test_clear_removes_everything() {
        let f = fixture(PoolConfig::default());
        f.layer.add_fragment("a", None);
        f.layer.add_fragment("b", None);

        assert_eq!(f.layer.clear(), 2);

        assert!(f.layer.visible_texts().is_empty());
        assert_eq!(f.renderer.fragments_removed().len(), 2);
    }

    #[test]
    fn test_remove_twice_is_a_no_op() {
        let f = fixture(PoolConfig::default());
        let id = f.layer.add_fragment("a", None);

        assert!(f.layer.remove(id));
        assert!(!f.layer.remove(id));
        assert_eq!(f.renderer.fragments_removed(), vec![(id, RemovalReason::Withdrawn)]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_add_staggered_spaces_fragments_out() {
        // Arrange
        let f = fixture(PoolConfig::default());
        let ticket = GenerationTicket::detached();

        // Act
        let handles = f.layer.add_staggered(
            &["...presence...", "...now...", "...here..."],
            Duration::from_millis(500),
            &ticket,
        );

        // Assert
        assert_eq!(f.layer.visible_texts(), vec!["...presence..."]);
        tokio::time::sleep(Duration::from_millis(600)).await;
        assert_eq!(f.layer.visible_texts(), vec!["...presence...", "...now..."]);
        for handle in handles {
            handle.await.unwrap();
        }
        assert_eq!(f.layer.len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_ticket_drops_scheduled_fragments() {
        // Arrange
        let f = fixture(PoolConfig::default());
        let guard = GenerationGuard::new();
        guard.advance();
        let ticket = guard.ticket();
        let handles = f.layer.add_cluster(
            &["...bridge...", "...connection...", "...complete..."],
            Some(FragmentPosition::new(50.0, 50.0)),
            CLUSTER_STAGGER,
            &ticket,
        );
        assert_eq!(f.layer.len(), 1);

        // Act: the issuing moment is torn down before the rest fire.
        guard.advance();
        f.layer.clear();
        for handle in handles {
            handle.await.unwrap();
        }

        // Assert
        assert!(f.layer.is_empty());
    }

    #[test]
    fn test_teardown_during_an_addition_keeps_the_stale_fragment_out() {
        // Arrange: the addition is parked after its early liveness window.
        let (entered_tx, entered_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel();
        let renderer = Arc::new(RecordingRenderer::new());
        let clock = Arc::new(GatedClock {
            entered: Mutex::new(entered_tx),
            release: Mutex::new(release_rx),
        });
        let layer = Arc::new(
            ContextLayer::new(PoolConfig::default(), renderer.clone(), clock, Box::new(MockRng))
                .unwrap(),
        );
        let guard = GenerationGuard::new();
        let ticket = guard.ticket();
        let adder = {
            let layer = Arc::clone(&layer);
            std::thread::spawn(move || layer.add_fragment_if_live(&ticket, "...stale...", None))
        };
        entered_rx.recv().unwrap();

        // Act: tear down the way a moment load does.
        guard.advance();
        layer.clear();
        release_tx.send(()).unwrap();
        let added = adder.join().unwrap();

        // Assert
        assert_eq!(added, None);
        assert!(layer.is_empty());
        assert!(renderer.fragments_shown().is_empty());
    }

    #[test]
    fn test_add_fragment_if_live_adds_for_a_live_ticket() {
        let f = fixture(PoolConfig::default());

        let id = f
            .layer
            .add_fragment_if_live(&GenerationTicket::detached(), "...here...", None);

        assert!(id.is_some());
        assert_eq!(f.layer.visible_texts(), vec!["...here..."]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cluster_jitters_around_base() {
        let f = fixture(PoolConfig::default());
        let base = FragmentPosition::new(50.0, 50.0);

        let handles = f.layer.add_cluster(
            &["...knowing...", "...feeling..."],
            Some(base),
            CLUSTER_STAGGER,
            &GenerationTicket::detached(),
        );
        for handle in handles {
            handle.await.unwrap();
        }

        // MockRng draws 0.0, the far corner of the jitter square.
        for view in f.renderer.fragments_shown() {
            assert_eq!(view.position, FragmentPosition::new(45.0, 45.0));
        }
        assert_eq!(f.layer.len(), 2);
    }
}
