//! Presentation collaborator contract.
//!
//! The engine never draws anything itself. It asks a [`Renderer`] to show
//! moment text, choices, the continue prompt and context fragments, and keeps
//! only the handles it gets back. Everything except [`Renderer::render_sequence`]
//! is fire-and-forget from the engine's point of view.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Where a render request lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Surface {
    /// The central container holding the active moment's content.
    Moment,
    /// The layer behind the moment where context fragments drift.
    Context,
}

/// Opaque handle to something a renderer produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RenderHandle(pub u64);

/// Visual register of a line of text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextStyle {
    /// Ordinary moment text.
    #[default]
    Plain,
    /// Larger, glowing text.
    Emphasis,
    /// Smaller, faded text.
    Whisper,
}

/// Options for a single line of text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TextOptions {
    /// Visual register.
    pub style: TextStyle,
    /// Presentation delay applied by the renderer before the line shows.
    pub delay: Duration,
}

impl TextOptions {
    /// Options for the given style with no delay.
    #[must_use]
    pub fn styled(style: TextStyle) -> Self {
        Self {
            style,
            delay: Duration::ZERO,
        }
    }

    /// Returns these options with a presentation delay.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// One line of a staggered sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceLine {
    /// The text to show.
    pub text: String,
    /// Per-line style, falling back to the sequence style.
    pub style: Option<TextStyle>,
}

impl From<&str> for SequenceLine {
    fn from(text: &str) -> Self {
        Self {
            text: text.to_owned(),
            style: None,
        }
    }
}

/// Timing and styling of a staggered sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequenceOptions {
    /// Pause before the first line.
    pub base_delay: Duration,
    /// Pause between consecutive lines.
    pub stagger: Duration,
    /// Style for lines that do not carry their own.
    pub style: TextStyle,
    /// Retire the line two places behind the newest once more than two are
    /// showing.
    pub fade_old_lines: bool,
}

impl Default for SequenceOptions {
    fn default() -> Self {
        Self {
            base_delay: Duration::ZERO,
            stagger: Duration::from_millis(1000),
            style: TextStyle::Plain,
            fade_old_lines: false,
        }
    }
}

/// Identifier of a context fragment. Assigned by the fragment pool and never
/// reused within it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FragmentId(pub u64);

impl fmt::Display for FragmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fragment-{}", self.0)
    }
}

/// Position of a fragment, in percent of the context layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FragmentPosition {
    /// Horizontal offset in percent.
    pub x: f64,
    /// Vertical offset in percent.
    pub y: f64,
}

impl FragmentPosition {
    /// Creates a position.
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// What the renderer receives when a fragment appears.
#[derive(Debug, Clone, PartialEq)]
pub struct FragmentView {
    /// Fragment identifier.
    pub id: FragmentId,
    /// Fragment text.
    pub text: String,
    /// Where to place it.
    pub position: FragmentPosition,
    /// Opacity to fade in to.
    pub opacity: f64,
}

/// Why a fragment left the context layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemovalReason {
    /// Opacity decayed to zero.
    Faded,
    /// Pushed out by a newer fragment at capacity. Renderers may quick-fade.
    Evicted,
    /// Removed explicitly by id.
    Withdrawn,
    /// Dropped with the rest of the pool.
    Cleared,
}

/// The presentation collaborator.
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Shows one line of text.
    fn render_text(&self, text: &str, surface: Surface, options: &TextOptions) -> RenderHandle;

    /// Shows emphasised text.
    fn render_emphasis(&self, text: &str, surface: Surface, delay: Duration) -> RenderHandle {
        self.render_text(
            text,
            surface,
            &TextOptions::styled(TextStyle::Emphasis).with_delay(delay),
        )
    }

    /// Shows whispered text.
    fn render_whisper(&self, text: &str, surface: Surface, delay: Duration) -> RenderHandle {
        self.render_text(
            text,
            surface,
            &TextOptions::styled(TextStyle::Whisper).with_delay(delay),
        )
    }

    /// Shows `lines` one after another and resolves once the last is shown.
    ///
    /// The default waits `base_delay` before the first line and `stagger`
    /// between the rest.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Presentation` if the renderer cannot show the
    /// sequence. The default implementation never fails.
    async fn render_sequence(
        &self,
        lines: &[SequenceLine],
        surface: Surface,
        options: &SequenceOptions,
    ) -> Result<Vec<RenderHandle>, EngineError> {
        let mut handles: Vec<RenderHandle> = Vec::with_capacity(lines.len());
        for (i, line) in lines.iter().enumerate() {
            let pause = if i == 0 {
                options.base_delay
            } else {
                options.stagger
            };
            tokio::time::sleep(pause).await;

            if options.fade_old_lines && handles.len() > 2 {
                self.retire(handles[handles.len() - 2]);
            }

            let style = line.style.unwrap_or(options.style);
            handles.push(self.render_text(&line.text, surface, &TextOptions::styled(style)));
        }
        Ok(handles)
    }

    /// Fades out and drops a previously rendered element.
    fn retire(&self, _handle: RenderHandle) {}

    /// Offers a set of choices. The selection comes back to the session as a
    /// choice event carrying the option index.
    fn render_choices(&self, options: &[String], surface: Surface) -> RenderHandle;

    /// Shows a free-text input field.
    fn render_input(&self, placeholder: &str, surface: Surface) -> RenderHandle;

    /// Removes everything rendered on `surface`.
    fn clear(&self, surface: Surface);

    /// Places a new context fragment.
    fn show_fragment(&self, fragment: &FragmentView);

    /// Updates a fragment's opacity.
    fn set_fragment_opacity(&self, id: FragmentId, opacity: f64);

    /// Takes a fragment off the context layer.
    fn remove_fragment(&self, id: FragmentId, reason: RemovalReason);

    /// Shows the continue prompt with the given label.
    fn show_prompt(&self, label: &str);

    /// Hides the continue prompt.
    fn hide_prompt(&self);
}
