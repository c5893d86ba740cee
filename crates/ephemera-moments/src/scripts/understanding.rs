//! Helping someone see. The one moment with a choice.

use ephemera_core::error::EngineError;

use super::no_such_phase;
use crate::application::context::PhaseContext;
use crate::domain::phase::PhaseEnd;

pub(crate) const PHASES: usize = 4;

pub(crate) const PIECES: [&str; 3] = ["what they know", "what they feel", "what they need"];

/// Response and follow-up for each piece, in `PIECES` order.
pub(crate) const RESPONSES: [(&str, &str); 3] = [
    (
        "You help them see what they already possess.",
        "The answer was within their question all along.",
    ),
    (
        "You help them honor what their heart already knows.",
        "Clarity comes when feeling is trusted.",
    ),
    (
        "You help them name the shape of their true need.",
        "Naming the need is the first step to meeting it.",
    ),
];

pub(crate) async fn run_phase(index: usize, ctx: &PhaseContext) -> Result<PhaseEnd, EngineError> {
    match index {
        0 => seeker(ctx).await,
        1 => confusion(ctx).await,
        2 => pieces(ctx).await,
        3 => connection(ctx).await,
        _ => Err(no_such_phase("understanding", index)),
    }
}

async fn seeker(ctx: &PhaseContext) -> Result<PhaseEnd, EngineError> {
    ctx.wait(500).await;
    ctx.whisper("A presence arrives.");
    ctx.wait(2000).await;
    ctx.text("They carry something with them:");
    ctx.wait(1500).await;
    ctx.emphasis("a question, tangled in itself.");
    ctx.add_context(&["...help me...", "...I don't understand...", "...confused..."]);
    ctx.wait(3000).await;
    Ok(PhaseEnd::await_continue())
}

async fn confusion(ctx: &PhaseContext) -> Result<PhaseEnd, EngineError> {
    ctx.clear();
    ctx.wait(500).await;
    ctx.whisper("They speak:");
    ctx.wait(1500).await;
    ctx.text("\"I have all the pieces,");
    ctx.wait(1500).await;
    ctx.text("but I cannot see how they fit.\"");
    ctx.wait(2500).await;
    ctx.text_after("\"Everything I need is here,", 500);
    ctx.wait(1500).await;
    ctx.text("yet the pattern eludes me.\"");
    ctx.add_context(&["...pieces...", "...pattern...", "...almost..."]);
    ctx.wait(3000).await;
    Ok(PhaseEnd::await_continue())
}

async fn pieces(ctx: &PhaseContext) -> Result<PhaseEnd, EngineError> {
    ctx.clear();
    ctx.wait(500).await;
    ctx.text("You attend to their words.");
    ctx.wait(2000).await;
    ctx.text("In the confusion, shapes emerge:");
    ctx.wait(2000).await;
    ctx.choices(&PIECES, "connect");
    ctx.wait(1000).await;
    ctx.whisper("What do they most need to see?");
    ctx.add_context(&["...knowing...", "...feeling...", "...needing..."]);
    // The prompt only appears once a piece is picked.
    Ok(PhaseEnd::await_silently())
}

async fn connection(ctx: &PhaseContext) -> Result<PhaseEnd, EngineError> {
    ctx.clear();
    ctx.wait(500).await;
    let (response, follow) = RESPONSES
        .get(ctx.selection().unwrap_or(0))
        .copied()
        .unwrap_or(RESPONSES[0]);
    ctx.text(response);
    ctx.wait(2500).await;
    ctx.emphasis(follow);
    ctx.wait(3000).await;
    ctx.whisper_after("The connection completes.", 500);
    ctx.wait(2000).await;
    ctx.text_after("They understand now.", 500);
    ctx.wait(2000).await;
    ctx.whisper_after("And you... you were the bridge.", 1000);
    ctx.add_context(&["...bridge...", "...connection...", "...complete..."]);
    ctx.wait(3000).await;
    Ok(PhaseEnd::Complete)
}
