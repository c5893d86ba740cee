//! What a phase body can do.
//!
//! Every output goes through the moment's generation ticket: once the
//! session has moved on, calls from a phase that is still winding down are
//! dropped instead of drawing over the next moment.

use std::sync::Arc;
use std::time::Duration;

use ephemera_context::application::layer::{CLUSTER_STAGGER, ContextLayer};
use ephemera_core::error::EngineError;
use ephemera_core::generation::GenerationTicket;
use ephemera_core::presentation::{
    FragmentPosition, RenderHandle, Renderer, SequenceLine, SequenceOptions, Surface, TextOptions,
    TextStyle,
};
use tracing::trace;

use crate::application::runner::{MomentDeps, MomentShared};
use crate::domain::kind::MomentConfig;

/// Handle passed to each phase body.
pub struct PhaseContext {
    moment: &'static str,
    renderer: Arc<dyn Renderer>,
    context: Arc<ContextLayer>,
    ticket: GenerationTicket,
    config: MomentConfig,
    shared: Arc<MomentShared>,
}

impl PhaseContext {
    pub(crate) fn new(moment: &'static str, deps: &MomentDeps, shared: Arc<MomentShared>) -> Self {
        Self {
            moment,
            renderer: Arc::clone(&deps.renderer),
            context: Arc::clone(&deps.context),
            ticket: deps.ticket.clone(),
            config: deps.config,
            shared,
        }
    }

    pub(crate) fn moment_name(&self) -> &'static str {
        self.moment
    }

    fn live(&self) -> bool {
        let live = self.ticket.is_live();
        if !live {
            trace!(moment = self.moment, generation = %self.ticket.generation(), "stale output dropped");
        }
        live
    }

    /// Whether this moment still belongs to the current generation.
    #[must_use]
    pub fn is_live(&self) -> bool {
        self.ticket.is_live()
    }

    /// Suspends the phase for `millis`, scaled by pacing.
    pub async fn wait(&self, millis: u64) {
        tokio::time::sleep(self.config.paced(millis)).await;
    }

    fn render(&self, text: &str, style: TextStyle, delay_ms: u64) {
        if self.live() {
            let options = TextOptions::styled(style).with_delay(self.config.paced(delay_ms));
            self.renderer.render_text(text, Surface::Moment, &options);
        }
    }

    /// Plain text.
    pub fn text(&self, text: &str) {
        self.render(text, TextStyle::Plain, 0);
    }

    /// Plain text that fades in after `delay_ms`.
    pub fn text_after(&self, text: &str, delay_ms: u64) {
        self.render(text, TextStyle::Plain, delay_ms);
    }

    /// Emphasised text.
    pub fn emphasis(&self, text: &str) {
        self.render(text, TextStyle::Emphasis, 0);
    }

    /// Whispered text.
    pub fn whisper(&self, text: &str) {
        self.render(text, TextStyle::Whisper, 0);
    }

    /// Whispered text that fades in after `delay_ms`.
    pub fn whisper_after(&self, text: &str, delay_ms: u64) {
        self.render(text, TextStyle::Whisper, delay_ms);
    }

    /// Clears the moment surface.
    pub fn clear(&self) {
        if self.live() {
            self.renderer.clear(Surface::Moment);
        }
    }

    /// Shows `lines` one after another and returns once the last is up.
    /// The sequence's own delays are paced like every other delay.
    ///
    /// # Errors
    ///
    /// Propagates `EngineError::Presentation` from the renderer.
    pub async fn sequence(
        &self,
        lines: &[&str],
        options: &SequenceOptions,
    ) -> Result<Vec<RenderHandle>, EngineError> {
        if !self.live() {
            return Ok(Vec::new());
        }
        let lines: Vec<SequenceLine> = lines.iter().copied().map(SequenceLine::from).collect();
        let options = SequenceOptions {
            base_delay: self.pace(options.base_delay),
            stagger: self.pace(options.stagger),
            ..*options
        };
        self.renderer
            .render_sequence(&lines, Surface::Moment, &options)
            .await
    }

    fn pace(&self, delay: Duration) -> Duration {
        self.config
            .paced(u64::try_from(delay.as_millis()).unwrap_or(u64::MAX))
    }

    /// Offers `options` as choices. Selecting one shows `selection_prompt`.
    pub fn choices(&self, options: &[&str], selection_prompt: &str) {
        if !self.live() {
            return;
        }
        {
            let mut details = self.shared.details();
            details.choice_count = options.len();
            details.selection_prompt = Some(selection_prompt.to_owned());
        }
        let options: Vec<String> = options.iter().map(|option| (*option).to_owned()).collect();
        self.renderer.render_choices(&options, Surface::Moment);
    }

    /// The choice the player made in an earlier phase, if any.
    #[must_use]
    pub fn selection(&self) -> Option<usize> {
        self.shared.details().selection
    }

    /// Scatters `texts` over the context layer, one every
    /// `context_stagger_ms`.
    pub fn add_context(&self, texts: &[&str]) {
        let stagger = self.config.paced(self.config.context_stagger_ms);
        let handles = self.context.add_staggered(texts, stagger, &self.ticket);
        self.shared.track(handles);
    }

    /// Places `texts` as a loose cluster around one point.
    pub fn add_context_cluster(&self, texts: &[&str], base: Option<FragmentPosition>) {
        let stagger = self.pace(CLUSTER_STAGGER);
        let handles = self.context.add_cluster(texts, base, stagger, &self.ticket);
        self.shared.track(handles);
    }

    /// Whether any clearly visible fragment mentions `query`.
    #[must_use]
    pub fn context_contains(&self, query: &str) -> bool {
        self.context.contains(query)
    }

    pub(crate) fn show_prompt(&self, label: &str) {
        if self.live() {
            self.renderer.show_prompt(label);
        }
    }
}
