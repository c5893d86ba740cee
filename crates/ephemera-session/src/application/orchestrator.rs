//! The session controller.
//!
//! Owns the active moment and the order of the journey. Loading a moment
//! runs the moment transition on the container: the previous moment is torn
//! down and the next one built at the transition's midpoint, while the
//! container is invisible.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use ephemera_context::application::layer::ContextLayer;
use ephemera_core::animation::Animatable;
use ephemera_core::audio::AmbientAudio;
use ephemera_core::clock::Clock;
use ephemera_core::generation::GenerationGuard;
use ephemera_core::presentation::{FragmentId, FragmentPosition, Renderer, Surface};
use ephemera_core::rng::RandomSource;
use ephemera_moments::{ContinueOutcome, Moment, MomentConfig, MomentDeps, MomentKind};
use ephemera_transitions::TransitionChoreographer;
use tracing::{debug, info, instrument, trace};
use uuid::Uuid;

use crate::application::frame::FrameDriver;
use crate::domain::config::SessionConfig;
use crate::domain::view::SessionView;
use crate::error::SessionError;

/// Collaborators a session is assembled from.
pub struct SessionCollaborators {
    /// Draws text, choices, prompts and fragments.
    pub renderer: Arc<dyn Renderer>,
    /// Ambient sound, if the host has any.
    pub audio: Option<Arc<dyn AmbientAudio>>,
    /// The visual container moments are drawn into; transitions animate it.
    pub container: Arc<dyn Animatable>,
    /// Time source for fragment aging.
    pub clock: Arc<dyn Clock>,
    /// Randomness for fragment placement.
    pub rng: Box<dyn RandomSource>,
}

/// Drives one playthrough of the journey.
pub struct Orchestrator {
    session_id: Uuid,
    sequence: Vec<MomentKind>,
    renderer: Arc<dyn Renderer>,
    audio: Option<Arc<dyn AmbientAudio>>,
    container: Arc<dyn Animatable>,
    context: Arc<ContextLayer>,
    choreographer: TransitionChoreographer,
    moment_config: MomentConfig,
    generation: GenerationGuard,
    started: Arc<AtomicBool>,
    active_index: usize,
    active: Option<Moment>,
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("session_id", &self.session_id)
            .field("active_index", &self.active_index)
            .field("active", &self.active)
            .finish_non_exhaustive()
    }
}

impl Orchestrator {
    /// Assembles a session. Nothing is shown until [`Orchestrator::start`].
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Engine` if `config` is invalid.
    pub fn new(collaborators: SessionCollaborators, config: SessionConfig) -> Result<Self, SessionError> {
        config.validate()?;
        let SessionCollaborators {
            renderer,
            audio,
            container,
            clock,
            rng,
        } = collaborators;
        let context = ContextLayer::new(config.context, Arc::clone(&renderer), clock, rng)?;

        Ok(Self {
            session_id: Uuid::new_v4(),
            sequence: MomentKind::JOURNEY.to_vec(),
            renderer,
            audio,
            container,
            context: Arc::new(context),
            choreographer: TransitionChoreographer::new(config.transitions),
            moment_config: config.moments,
            generation: GenerationGuard::new(),
            started: Arc::new(AtomicBool::new(false)),
            active_index: 0,
            active: None,
        })
    }

    /// Session identifier.
    #[must_use]
    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// Whether `start` has run.
    #[must_use]
    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::Acquire)
    }

    /// Starts ambient sound and loads the first moment. Returns `false` if
    /// the session had already started.
    #[instrument(skip(self), fields(session_id = %self.session_id))]
    pub async fn start(&mut self) -> bool {
        if self.started.swap(true, Ordering::AcqRel) {
            trace!("start ignored, already started");
            return false;
        }
        info!("session started");

        match &self.audio {
            Some(audio) => audio.start_ambient(),
            None => debug!("no ambient audio, continuing in silence"),
        }

        self.load_moment(0).await;
        true
    }

    /// Transitions to the moment at `index`, wrapping to the first one when
    /// `index` is past the end.
    #[instrument(skip(self), fields(session_id = %self.session_id))]
    pub async fn load_moment(&mut self, index: usize) {
        let index = if index >= self.sequence.len() { 0 } else { index };
        let kind = self.sequence[index];

        let previous = self.active.take();
        let context = Arc::clone(&self.context);
        let renderer = Arc::clone(&self.renderer);
        let generation = self.generation.clone();
        let config = self.moment_config;

        let midpoint = async move {
            let current = generation.advance();
            drop(previous);
            context.clear();
            renderer.hide_prompt();
            let moment = Moment::launch(
                Arc::new(kind),
                MomentDeps {
                    renderer: Arc::clone(&renderer),
                    context,
                    ticket: generation.ticket(),
                    config,
                },
            );
            renderer.clear(Surface::Moment);
            debug!(generation = %current, "moment constructed");
            moment
        };

        let mut moment = self
            .choreographer
            .moment_transition(self.container.as_ref(), midpoint)
            .await;

        moment.start();
        info!(moment = ?kind, index, "moment loaded");
        self.active_index = index;
        self.active = Some(moment);
    }

    /// Delivers the continue signal to the active moment, loading the next
    /// moment once the active one is complete.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::MomentFailed` if the active moment's phase
    /// failed.
    #[instrument(skip(self), fields(session_id = %self.session_id))]
    pub async fn handle_continue(&mut self) -> Result<(), SessionError> {
        if !self.is_started() {
            trace!("continue ignored, session not started");
            return Ok(());
        }
        let Some(moment) = &self.active else {
            trace!("continue ignored, no active moment");
            return Ok(());
        };
        if let Some(err) = moment.failure() {
            return Err(SessionError::MomentFailed(err));
        }

        if moment.continue_signal() == ContinueOutcome::NextMoment {
            self.load_moment(self.active_index + 1).await;
        }
        Ok(())
    }

    /// Forwards a choice selection to the active moment. Returns whether it
    /// was accepted.
    #[instrument(skip(self), fields(session_id = %self.session_id))]
    pub fn select_choice(&self, index: usize) -> bool {
        self.active
            .as_ref()
            .is_some_and(|moment| moment.select_choice(index))
    }

    /// Adds a fragment to the context layer directly.
    pub fn add_context_fragment(&self, text: &str, position: Option<FragmentPosition>) -> FragmentId {
        self.context.add_fragment(text, position)
    }

    /// Ages the context layer by one frame. A no-op before `start`.
    pub fn tick(&self) -> usize {
        self.frame_driver().tick()
    }

    /// A handle that ticks the context layer from another task.
    #[must_use]
    pub fn frame_driver(&self) -> FrameDriver {
        FrameDriver::new(Arc::clone(&self.context), Arc::clone(&self.started))
    }

    /// Stops ambient sound.
    #[instrument(skip(self), fields(session_id = %self.session_id))]
    pub fn stop(&self) {
        if let Some(audio) = &self.audio {
            audio.stop();
        }
        info!("session stopped");
    }

    /// The active moment, if one has loaded.
    #[must_use]
    pub fn active_moment(&self) -> Option<&Moment> {
        self.active.as_ref()
    }

    /// A read-only snapshot of the session.
    #[must_use]
    pub fn snapshot(&self) -> SessionView {
        let moment = self.active.as_ref().map(Moment::snapshot);
        SessionView {
            session_id: self.session_id,
            started: self.is_started(),
            moment_index: self.active_index,
            moment_kind: self.active.as_ref().map(|_| self.sequence[self.active_index]),
            moment_status: moment.map(|snapshot| snapshot.status),
            phase_index: moment.map(|snapshot| snapshot.phase_index),
            generation: self.generation.current().value(),
            visible_context: self.context.visible_texts(),
        }
    }
}
