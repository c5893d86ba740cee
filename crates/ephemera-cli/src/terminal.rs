//! Line-oriented terminal presentation.
//!
//! Moment text goes to the writer as it arrives, or after its presentation
//! delay when it has one; fragments show up as
//! indented, dimmed asides when they appear and are otherwise left alone,
//! since a terminal cannot fade a line it has already printed.

use std::io::{self, Write};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use ephemera_core::animation::{Animatable, VisualState};
use ephemera_core::presentation::{
    FragmentId, FragmentView, RemovalReason, RenderHandle, Renderer, Surface, TextOptions,
    TextStyle,
};
use tracing::{trace, warn};

const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const RESET: &str = "\x1b[0m";

/// A [`Renderer`] that prints to a writer, stdout in production.
pub struct TerminalRenderer<W> {
    out: Arc<Mutex<W>>,
    next_handle: AtomicU64,
    ansi: bool,
}

impl TerminalRenderer<io::Stdout> {
    /// Prints to stdout with ANSI styling.
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(io::stdout(), true)
    }
}

impl<W: Write + Send + 'static> TerminalRenderer<W> {
    /// Prints to `out`, styling with ANSI escapes when `ansi` is set.
    pub fn new(out: W, ansi: bool) -> Self {
        Self {
            out: Arc::new(Mutex::new(out)),
            next_handle: AtomicU64::new(1),
            ansi,
        }
    }

    /// Returns the writer, or `None` while a delayed line is still pending.
    pub fn into_inner(self) -> Option<W> {
        Arc::try_unwrap(self.out)
            .ok()
            .map(|out| out.into_inner().unwrap_or_else(PoisonError::into_inner))
    }

    fn handle(&self) -> RenderHandle {
        RenderHandle(self.next_handle.fetch_add(1, Ordering::Relaxed))
    }

    fn styled(&self, text: &str, style: TextStyle) -> String {
        match (style, self.ansi) {
            (TextStyle::Plain, _) => text.to_owned(),
            (TextStyle::Emphasis, true) => format!("{BOLD}{text}{RESET}"),
            (TextStyle::Whisper, true) => format!("{DIM}{text}{RESET}"),
            (TextStyle::Emphasis, false) => text.to_uppercase(),
            (TextStyle::Whisper, false) => format!("({text})"),
        }
    }

    fn print(&self, line: &str) {
        write_line(&self.out, line);
    }

    /// Prints `line` once `delay` has passed. Outside a runtime there is
    /// nothing to wait on, so the line prints at once.
    fn print_after(&self, line: String, delay: Duration) {
        if delay.is_zero() {
            return self.print(&line);
        }
        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                let out = Arc::clone(&self.out);
                runtime.spawn(async move {
                    tokio::time::sleep(delay).await;
                    write_line(&out, &line);
                });
            }
            Err(_) => {
                trace!(?delay, "no runtime, printing delayed line now");
                self.print(&line);
            }
        }
    }
}

fn write_line<W: Write>(out: &Mutex<W>, line: &str) {
    let mut out = out.lock().unwrap_or_else(PoisonError::into_inner);
    if let Err(err) = writeln!(out, "{line}").and_then(|()| out.flush()) {
        warn!(error = %err, "terminal write failed");
    }
}

impl<W: Write + Send + 'static> Renderer for TerminalRenderer<W> {
    fn render_text(&self, text: &str, surface: Surface, options: &TextOptions) -> RenderHandle {
        let line = self.styled(text, options.style);
        let line = match surface {
            Surface::Moment => format!("  {line}"),
            Surface::Context => format!("        {line}"),
        };
        self.print_after(line, options.delay);
        self.handle()
    }

    fn render_choices(&self, options: &[String], _surface: Surface) -> RenderHandle {
        for (i, option) in options.iter().enumerate() {
            self.print(&format!("    [{}] {option}", i + 1));
        }
        self.handle()
    }

    fn render_input(&self, placeholder: &str, _surface: Surface) -> RenderHandle {
        self.print(&format!("  {}", self.styled(placeholder, TextStyle::Whisper)));
        self.handle()
    }

    fn clear(&self, surface: Surface) {
        if surface == Surface::Moment {
            self.print("");
        }
    }

    fn show_fragment(&self, fragment: &FragmentView) {
        let text = self.styled(&fragment.text, TextStyle::Whisper);
        self.print(&format!("        {text}"));
    }

    fn set_fragment_opacity(&self, _id: FragmentId, _opacity: f64) {}

    fn remove_fragment(&self, id: FragmentId, reason: RemovalReason) {
        trace!(%id, ?reason, "fragment gone");
    }

    fn show_prompt(&self, label: &str) {
        let label = self.styled(&format!("› {label}"), TextStyle::Whisper);
        self.print(&format!("\n  {label}"));
    }

    fn hide_prompt(&self) {}
}

/// The moment container. A terminal has nothing to animate, so this only
/// tracks where the choreography says the container should be.
#[derive(Debug)]
pub struct TerminalContainer {
    state: Mutex<VisualState>,
}

impl TerminalContainer {
    /// A visible container.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Mutex::new(VisualState::SHOWN),
        }
    }
}

impl Default for TerminalContainer {
    fn default() -> Self {
        Self::new()
    }
}

impl Animatable for TerminalContainer {
    fn visual_state(&self) -> VisualState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn snap_to(&self, state: VisualState) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = state;
    }

    fn animate_to(&self, state: VisualState, duration: Duration) {
        trace!(?state, ?duration, "container transition");
        self.snap_to(state);
    }
}
