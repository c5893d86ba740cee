//! The phase runner.
//!
//! A [`Moment`] owns one background task that runs the script's phases in
//! order. Between phases the task parks on a resume signal until the
//! session delivers a continue. Status lives in a `watch` channel so the
//! session and tests can observe transitions without polling.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use ephemera_context::application::layer::ContextLayer;
use ephemera_core::error::EngineError;
use ephemera_core::generation::GenerationTicket;
use ephemera_core::presentation::Renderer;
use tokio::sync::{Notify, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, trace, warn};

use crate::application::context::PhaseContext;
use crate::domain::kind::{MomentConfig, MomentScript};
use crate::domain::phase::{
    CONTINUE_PROMPT, ContinueOutcome, MomentSnapshot, MomentStatus, PhaseEnd,
};

/// Collaborators a moment is launched with.
#[derive(Clone)]
pub struct MomentDeps {
    /// Where text, choices and prompts go.
    pub renderer: Arc<dyn Renderer>,
    /// The shared fragment layer.
    pub context: Arc<ContextLayer>,
    /// Generation this moment belongs to.
    pub ticket: GenerationTicket,
    /// Timing knobs.
    pub config: MomentConfig,
}

#[derive(Debug, Default)]
pub(crate) struct MomentDetails {
    pub(crate) selection: Option<usize>,
    pub(crate) choice_count: usize,
    pub(crate) selection_prompt: Option<String>,
    pub(crate) failure: Option<String>,
}

/// State shared between a [`Moment`] handle and its runner task.
pub(crate) struct MomentShared {
    snapshot: watch::Sender<MomentSnapshot>,
    resume: Notify,
    details: Mutex<MomentDetails>,
    scheduled: Mutex<Vec<JoinHandle<()>>>,
}

impl MomentShared {
    pub(crate) fn new() -> Self {
        Self {
            snapshot: watch::Sender::new(MomentSnapshot::IDLE),
            resume: Notify::new(),
            details: Mutex::new(MomentDetails::default()),
            scheduled: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn snapshot(&self) -> MomentSnapshot {
        *self.snapshot.borrow()
    }

    fn set(&self, status: MomentStatus, phase_index: usize) {
        self.snapshot.send_replace(MomentSnapshot {
            status,
            phase_index,
        });
    }

    pub(crate) fn details(&self) -> MutexGuard<'_, MomentDetails> {
        self.details.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Keeps handles of deferred work so it dies with the moment.
    pub(crate) fn track(&self, handles: impl IntoIterator<Item = JoinHandle<()>>) {
        let mut scheduled = self.scheduled.lock().unwrap_or_else(PoisonError::into_inner);
        scheduled.retain(|handle| !handle.is_finished());
        scheduled.extend(handles);
    }

    fn abort_scheduled(&self) {
        let mut scheduled = self.scheduled.lock().unwrap_or_else(PoisonError::into_inner);
        for handle in scheduled.drain(..) {
            handle.abort();
        }
    }
}

/// A running (or runnable) instance of a moment script.
pub struct Moment {
    script: Arc<dyn MomentScript>,
    shared: Arc<MomentShared>,
    renderer: Arc<dyn Renderer>,
    ticket: GenerationTicket,
    config: MomentConfig,
    pending: Option<PhaseContext>,
    task: Option<JoinHandle<()>>,
}

impl std::fmt::Debug for Moment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Moment")
            .field("script", &self.script.name())
            .field("snapshot", &self.shared.snapshot())
            .field("generation", &self.ticket.generation())
            .finish_non_exhaustive()
    }
}

impl Moment {
    /// Builds an idle moment. Nothing runs until [`Moment::start`].
    #[must_use]
    pub fn launch(script: Arc<dyn MomentScript>, deps: MomentDeps) -> Self {
        let shared = Arc::new(MomentShared::new());
        let ctx = PhaseContext::new(script.name(), &deps, Arc::clone(&shared));
        Self {
            script,
            shared,
            renderer: deps.renderer,
            ticket: deps.ticket,
            config: deps.config,
            pending: Some(ctx),
            task: None,
        }
    }

    /// Spawns the runner task. Returns `false` if the moment was already
    /// started.
    pub fn start(&mut self) -> bool {
        let Some(ctx) = self.pending.take() else {
            trace!(moment = self.script.name(), "start ignored, already running");
            return false;
        };
        self.shared.set(MomentStatus::Running, 0);
        debug!(moment = self.script.name(), generation = %self.ticket.generation(), "moment started");
        self.task = Some(tokio::spawn(run(
            Arc::clone(&self.script),
            ctx,
            Arc::clone(&self.shared),
        )));
        true
    }

    /// The single advancement signal.
    ///
    /// Resumes a waiting moment, reports a complete one as ready for the next
    /// moment, and ignores everything else.
    pub fn continue_signal(&self) -> ContinueOutcome {
        let mut resumed_at = None;
        self.shared.snapshot.send_if_modified(|snapshot| {
            if snapshot.status == MomentStatus::AwaitingInput {
                snapshot.status = MomentStatus::Running;
                snapshot.phase_index += 1;
                resumed_at = Some(snapshot.phase_index);
                true
            } else {
                false
            }
        });

        if let Some(phase) = resumed_at {
            self.shared.details().choice_count = 0;
            self.renderer.hide_prompt();
            self.shared.resume.notify_one();
            debug!(moment = self.script.name(), phase, "moment resumed");
            return ContinueOutcome::Resumed;
        }

        let snapshot = self.shared.snapshot();
        if snapshot.status == MomentStatus::Complete {
            return ContinueOutcome::NextMoment;
        }
        trace!(moment = self.script.name(), ?snapshot, "continue ignored");
        ContinueOutcome::Ignored
    }

    /// Records a choice among the options the current phase offered.
    ///
    /// Only honoured while awaiting input and for an offered index. When the
    /// phase supplied a selection prompt, it appears after a short pause.
    pub fn select_choice(&self, index: usize) -> bool {
        let snapshot = self.shared.snapshot();
        if snapshot.status != MomentStatus::AwaitingInput {
            trace!(moment = self.script.name(), index, ?snapshot, "selection ignored");
            return false;
        }

        let prompt = {
            let mut details = self.shared.details();
            if index >= details.choice_count {
                warn!(
                    moment = self.script.name(),
                    index,
                    offered = details.choice_count,
                    "selection out of range"
                );
                return false;
            }
            details.selection = Some(index);
            details.selection_prompt.clone()
        };
        debug!(moment = self.script.name(), index, "choice selected");

        if let Some(label) = prompt {
            let shared = Arc::clone(&self.shared);
            let renderer = Arc::clone(&self.renderer);
            let ticket = self.ticket.clone();
            let delay = self.config.paced(self.config.selection_prompt_delay_ms);
            let handle = tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                if ticket.is_live() && shared.snapshot() == snapshot {
                    renderer.show_prompt(&label);
                }
            });
            self.shared.track([handle]);
        }
        true
    }

    /// Current status and phase.
    #[must_use]
    pub fn snapshot(&self) -> MomentSnapshot {
        self.shared.snapshot()
    }

    /// Current lifecycle stage.
    #[must_use]
    pub fn status(&self) -> MomentStatus {
        self.shared.snapshot().status
    }

    /// Index of the current (or last) phase.
    #[must_use]
    pub fn phase_index(&self) -> usize {
        self.shared.snapshot().phase_index
    }

    /// The choice recorded by [`Moment::select_choice`], if any.
    #[must_use]
    pub fn selection(&self) -> Option<usize> {
        self.shared.details().selection
    }

    /// Name of the script this moment runs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.script.name()
    }

    /// Watches status transitions.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<MomentSnapshot> {
        self.shared.snapshot.subscribe()
    }

    /// The error that failed this moment, if it failed.
    #[must_use]
    pub fn failure(&self) -> Option<EngineError> {
        let snapshot = self.shared.snapshot();
        let reason = self.shared.details().failure.clone()?;
        Some(EngineError::PhaseFailed {
            moment: self.script.name(),
            phase: snapshot.phase_index,
            reason,
        })
    }
}

impl Drop for Moment {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
        self.shared.abort_scheduled();
    }
}

async fn run(script: Arc<dyn MomentScript>, ctx: PhaseContext, shared: Arc<MomentShared>) {
    let name = script.name();
    let total = script.phase_count();
    let mut index = 0;

    loop {
        if index >= total {
            finish(&ctx, &shared, index);
            return;
        }

        shared.set(MomentStatus::Running, index);
        debug!(moment = name, phase = index, "phase started");

        match script.run_phase(index, &ctx).await {
            Ok(PhaseEnd::AwaitInput { prompt }) => {
                if let Some(label) = prompt {
                    ctx.show_prompt(&label);
                }
                shared.set(MomentStatus::AwaitingInput, index);
                debug!(moment = name, phase = index, "awaiting input");
                shared.resume.notified().await;
                index += 1;
            }
            Ok(PhaseEnd::Complete) => {
                finish(&ctx, &shared, index);
                return;
            }
            Ok(PhaseEnd::Advance) => index += 1,
            Err(err) => {
                error!(moment = name, phase = index, error = %err, "phase failed");
                shared.details().failure = Some(err.to_string());
                shared.set(MomentStatus::Failed, index);
                return;
            }
        }
    }
}

fn finish(ctx: &PhaseContext, shared: &MomentShared, phase_index: usize) {
    ctx.show_prompt(CONTINUE_PROMPT);
    shared.set(MomentStatus::Complete, phase_index);
    debug!(moment = ctx.moment_name(), "moment complete");
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use ephemera_context::domain::pool::PoolConfig;
    use ephemera_core::generation::GenerationGuard;
    use ephemera_test_support::{FixedClock, MockRng, RecordingRenderer, fixed_now};

    use super::*;

    /// Phase 0 waits behind a prompt, phase 1 completes.
    struct WaitThenComplete;

    #[async_trait]
    impl MomentScript for WaitThenComplete {
        fn name(&self) -> &'static str {
            "wait-then-complete"
        }

        fn phase_count(&self) -> usize {
            2
        }

        async fn run_phase(&self, index: usize, ctx: &PhaseContext) -> Result<PhaseEnd, EngineError> {
            ctx.text(&format!("phase {index}"));
            ctx.wait(1000).await;
            Ok(match index {
                0 => PhaseEnd::await_continue(),
                _ => PhaseEnd::Complete,
            })
        }
    }

    /// Every phase gates on input; the runner completes past the end.
    struct Gated(usize);

    #[async_trait]
    impl MomentScript for Gated {
        fn name(&self) -> &'static str {
            "gated"
        }

        fn phase_count(&self) -> usize {
            self.0
        }

        async fn run_phase(&self, _index: usize, _ctx: &PhaseContext) -> Result<PhaseEnd, EngineError> {
            Ok(PhaseEnd::await_continue())
        }
    }

    /// Counts phases and chains them without gating.
    struct Chained(Arc<AtomicUsize>);

    #[async_trait]
    impl MomentScript for Chained {
        fn name(&self) -> &'static str {
            "chained"
        }

        fn phase_count(&self) -> usize {
            3
        }

        async fn run_phase(&self, _index: usize, _ctx: &PhaseContext) -> Result<PhaseEnd, EngineError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(PhaseEnd::Advance)
        }
    }

    struct Broken;

    #[async_trait]
    impl MomentScript for Broken {
        fn name(&self) -> &'static str {
            "broken"
        }

        fn phase_count(&self) -> usize {
            2
        }

        async fn run_phase(&self, index: usize, _ctx: &PhaseContext) -> Result<PhaseEnd, EngineError> {
            if index == 1 {
                return Err(EngineError::Presentation("surface gone".to_owned()));
            }
            Ok(PhaseEnd::Advance)
        }
    }

    /// Offers two choices, then reads the selection back.
    struct Choosing;

    #[async_trait]
    impl MomentScript for Choosing {
        fn name(&self) -> &'static str {
            "choosing"
        }

        fn phase_count(&self) -> usize {
            2
        }

        async fn run_phase(&self, index: usize, ctx: &PhaseContext) -> Result<PhaseEnd, EngineError> {
            if index == 0 {
                ctx.choices(&["left", "right"], "connect");
                return Ok(PhaseEnd::await_silently());
            }
            ctx.text(&format!("picked {}", ctx.selection().unwrap_or(0)));
            Ok(PhaseEnd::Complete)
        }
    }

    fn deps(renderer: &Arc<RecordingRenderer>, ticket: GenerationTicket) -> MomentDeps {
        let context = ContextLayer::new(
            PoolConfig::default(),
            renderer.clone(),
            Arc::new(FixedClock(fixed_now())),
            Box::new(MockRng),
        )
        .unwrap();
        MomentDeps {
            renderer: renderer.clone(),
            context: Arc::new(context),
            ticket,
            config: MomentConfig::default(),
        }
    }

    async fn settle(moment: &Moment) -> MomentSnapshot {
        let mut rx = moment.subscribe();
        *rx.wait_for(MomentSnapshot::is_settled).await.unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_two_phase_moment_waits_then_completes() {
        // Arrange
        let renderer = Arc::new(RecordingRenderer::new());
        let mut moment = Moment::launch(
            Arc::new(WaitThenComplete),
            deps(&renderer, GenerationTicket::detached()),
        );
        assert_eq!(moment.status(), MomentStatus::Idle);

        // Act
        assert!(moment.start());
        let first = settle(&moment).await;

        // Assert
        assert_eq!(first.status, MomentStatus::AwaitingInput);
        assert_eq!(first.phase_index, 0);
        assert!(renderer.prompt_visible());
        assert_eq!(renderer.prompts_shown().last().map(String::as_str), Some("continue"));

        // Act
        assert_eq!(moment.continue_signal(), ContinueOutcome::Resumed);
        assert!(!renderer.prompt_visible());
        let second = settle(&moment).await;

        // Assert
        assert_eq!(second.status, MomentStatus::Complete);
        assert_eq!(second.phase_index, 1);
        assert!(renderer.prompt_visible());
        assert_eq!(renderer.prompts_shown().last().map(String::as_str), Some("continue"));
        assert_eq!(moment.continue_signal(), ContinueOutcome::NextMoment);
        assert_eq!(renderer.moment_texts(), vec!["phase 0", "phase 1"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_continue_while_running_is_ignored() {
        // Arrange
        let renderer = Arc::new(RecordingRenderer::new());
        let mut moment = Moment::launch(
            Arc::new(WaitThenComplete),
            deps(&renderer, GenerationTicket::detached()),
        );
        moment.start();
        tokio::task::yield_now().await;

        // Act
        let outcome = moment.continue_signal();

        // Assert
        assert_eq!(outcome, ContinueOutcome::Ignored);
        assert_eq!(moment.status(), MomentStatus::Running);
        assert_eq!(moment.phase_index(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_moment_ignores_continue() {
        let renderer = Arc::new(RecordingRenderer::new());
        let moment = Moment::launch(Arc::new(Gated(1)), deps(&renderer, GenerationTicket::detached()));

        assert_eq!(moment.continue_signal(), ContinueOutcome::Ignored);
        assert_eq!(moment.status(), MomentStatus::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_n_gating_phases_need_n_continues() {
        // Arrange
        let renderer = Arc::new(RecordingRenderer::new());
        let mut moment = Moment::launch(Arc::new(Gated(3)), deps(&renderer, GenerationTicket::detached()));
        moment.start();

        // Act
        let mut continues = 0;
        loop {
            let snapshot = settle(&moment).await;
            if snapshot.status == MomentStatus::Complete {
                break;
            }
            assert_eq!(snapshot.phase_index, continues);
            assert_eq!(moment.continue_signal(), ContinueOutcome::Resumed);
            continues += 1;
        }

        // Assert
        assert_eq!(continues, 3);
        assert_eq!(moment.phase_index(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_twice_is_noop() {
        let counter = Arc::new(AtomicUsize::new(0));
        let renderer = Arc::new(RecordingRenderer::new());
        let mut moment = Moment::launch(
            Arc::new(Chained(Arc::clone(&counter))),
            deps(&renderer, GenerationTicket::detached()),
        );

        assert!(moment.start());
        assert!(!moment.start());
        settle(&moment).await;

        assert_eq!(counter.load(Ordering::SeqCst), 3);
        assert_eq!(moment.status(), MomentStatus::Complete);
    }

    #[tokio::test(start_paused = true)]
    async fn test_phase_error_fails_the_moment() {
        // Arrange
        let renderer = Arc::new(RecordingRenderer::new());
        let mut moment = Moment::launch(Arc::new(Broken), deps(&renderer, GenerationTicket::detached()));

        // Act
        moment.start();
        let snapshot = settle(&moment).await;

        // Assert
        assert_eq!(snapshot.status, MomentStatus::Failed);
        assert_eq!(moment.continue_signal(), ContinueOutcome::Ignored);
        match moment.failure() {
            Some(EngineError::PhaseFailed { moment, phase, reason }) => {
                assert_eq!(moment, "broken");
                assert_eq!(phase, 1);
                assert!(reason.contains("surface gone"));
            }
            other => panic!("expected PhaseFailed, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_selection_shows_prompt_after_pause() {
        // Arrange
        let renderer = Arc::new(RecordingRenderer::new());
        let mut moment = Moment::launch(Arc::new(Choosing), deps(&renderer, GenerationTicket::detached()));
        moment.start();
        settle(&moment).await;
        assert!(!renderer.prompt_visible());

        // Act
        assert!(moment.select_choice(1));
        tokio::time::sleep(Duration::from_millis(499)).await;
        let before = renderer.prompt_visible();
        tokio::time::sleep(Duration::from_millis(2)).await;

        // Assert
        assert!(!before);
        assert_eq!(renderer.prompts_shown(), vec!["connect"]);
        assert_eq!(moment.selection(), Some(1));

        moment.continue_signal();
        settle(&moment).await;
        assert!(renderer.moment_texts().contains(&"picked 1".to_owned()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_out_of_range_selection_is_rejected() {
        let renderer = Arc::new(RecordingRenderer::new());
        let mut moment = Moment::launch(Arc::new(Choosing), deps(&renderer, GenerationTicket::detached()));
        moment.start();
        settle(&moment).await;

        assert!(!moment.select_choice(2));
        assert_eq!(moment.selection(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_selection_after_phase_moves_on_is_rejected() {
        let renderer = Arc::new(RecordingRenderer::new());
        let mut moment = Moment::launch(Arc::new(Choosing), deps(&renderer, GenerationTicket::detached()));
        moment.start();
        settle(&moment).await;
        moment.continue_signal();
        settle(&moment).await;

        assert!(!moment.select_choice(0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_generation_drops_delayed_prompt() {
        // Arrange
        let guard = GenerationGuard::new();
        let renderer = Arc::new(RecordingRenderer::new());
        let mut moment = Moment::launch(Arc::new(Choosing), deps(&renderer, guard.ticket()));
        moment.start();
        settle(&moment).await;
        moment.select_choice(0);

        // Act
        guard.advance();
        tokio::time::sleep(Duration::from_secs(1)).await;

        // Assert
        assert!(renderer.prompts_shown().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_moment_stops_its_phases() {
        // Arrange
        let renderer = Arc::new(RecordingRenderer::new());
        let mut moment = Moment::launch(
            Arc::new(WaitThenComplete),
            deps(&renderer, GenerationTicket::detached()),
        );
        moment.start();
        tokio::task::yield_now().await;

        // Act
        drop(moment);
        tokio::time::sleep(Duration::from_secs(5)).await;

        // Assert
        assert_eq!(renderer.moment_texts(), vec!["phase 0"]);
        assert!(!renderer.prompt_visible());
    }
}
