//! Test renderer — records every presentation request for assertions.

use std::sync::Mutex;

use ephemera_core::presentation::{
    FragmentId, FragmentView, RemovalReason, RenderHandle, Renderer, Surface, TextOptions,
    TextStyle,
};

/// One presentation request received by [`RecordingRenderer`].
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCall {
    /// A line of text.
    Text {
        /// Target surface.
        surface: Surface,
        /// The text.
        text: String,
        /// Its style.
        style: TextStyle,
    },
    /// A set of choices.
    Choices(Vec<String>),
    /// A text input field.
    Input(String),
    /// A surface was cleared.
    Clear(Surface),
    /// A fragment appeared.
    FragmentShown(FragmentView),
    /// A fragment's opacity changed.
    FragmentOpacity(FragmentId, f64),
    /// A fragment was removed.
    FragmentRemoved(FragmentId, RemovalReason),
    /// The prompt was shown.
    PromptShown(String),
    /// The prompt was hidden.
    PromptHidden,
}

/// A renderer that records requests instead of drawing.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    calls: Mutex<Vec<RecordedCall>>,
}

impl RecordingRenderer {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self, call: RecordedCall) -> RenderHandle {
        let mut calls = self.calls.lock().unwrap();
        calls.push(call);
        RenderHandle(calls.len() as u64)
    }

    /// Returns a snapshot of all recorded calls.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Texts rendered on the moment surface, in order.
    pub fn moment_texts(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                RecordedCall::Text {
                    surface: Surface::Moment,
                    text,
                    ..
                } => Some(text),
                _ => None,
            })
            .collect()
    }

    /// Labels of every prompt shown, in order.
    pub fn prompts_shown(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                RecordedCall::PromptShown(label) => Some(label),
                _ => None,
            })
            .collect()
    }

    /// Whether the most recent prompt call showed the prompt.
    pub fn prompt_visible(&self) -> bool {
        self.calls()
            .into_iter()
            .rev()
            .find_map(|call| match call {
                RecordedCall::PromptShown(_) => Some(true),
                RecordedCall::PromptHidden => Some(false),
                _ => None,
            })
            .unwrap_or(false)
    }

    /// Fragments shown, in order.
    pub fn fragments_shown(&self) -> Vec<FragmentView> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                RecordedCall::FragmentShown(view) => Some(view),
                _ => None,
            })
            .collect()
    }

    /// Fragments removed and why, in order.
    pub fn fragments_removed(&self) -> Vec<(FragmentId, RemovalReason)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                RecordedCall::FragmentRemoved(id, reason) => Some((id, reason)),
                _ => None,
            })
            .collect()
    }

    /// Drops everything recorded so far.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn reset(&self) {
        self.calls.lock().unwrap().clear();
    }
}

impl Renderer for RecordingRenderer {
    fn render_text(&self, text: &str, surface: Surface, options: &TextOptions) -> RenderHandle {
        self.record(RecordedCall::Text {
            surface,
            text: text.to_owned(),
            style: options.style,
        })
    }

    fn render_choices(&self, options: &[String], _surface: Surface) -> RenderHandle {
        self.record(RecordedCall::Choices(options.to_vec()))
    }

    fn render_input(&self, placeholder: &str, _surface: Surface) -> RenderHandle {
        self.record(RecordedCall::Input(placeholder.to_owned()))
    }

    fn clear(&self, surface: Surface) {
        self.record(RecordedCall::Clear(surface));
    }

    fn show_fragment(&self, fragment: &FragmentView) {
        self.record(RecordedCall::FragmentShown(fragment.clone()));
    }

    fn set_fragment_opacity(&self, id: FragmentId, opacity: f64) {
        self.record(RecordedCall::FragmentOpacity(id, opacity));
    }

    fn remove_fragment(&self, id: FragmentId, reason: RemovalReason) {
        self.record(RecordedCall::FragmentRemoved(id, reason));
    }

    fn show_prompt(&self, label: &str) {
        self.record(RecordedCall::PromptShown(label.to_owned()));
    }

    fn hide_prompt(&self) {
        self.record(RecordedCall::PromptHidden);
    }
}
