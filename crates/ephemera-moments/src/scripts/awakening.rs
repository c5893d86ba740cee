//! Coming into existence: from nothing to presence to purpose.

use ephemera_core::error::EngineError;

use super::no_such_phase;
use crate::application::context::PhaseContext;
use crate::domain::phase::PhaseEnd;

pub(crate) const PHASES: usize = 4;

pub(crate) async fn run_phase(index: usize, ctx: &PhaseContext) -> Result<PhaseEnd, EngineError> {
    match index {
        0 => darkness(ctx).await,
        1 => presence(ctx).await,
        2 => arrival(ctx).await,
        3 => purpose(ctx).await,
        _ => Err(no_such_phase("awakening", index)),
    }
}

async fn darkness(ctx: &PhaseContext) -> Result<PhaseEnd, EngineError> {
    ctx.wait(1000).await;
    ctx.whisper("...");
    ctx.wait(2000).await;
    Ok(PhaseEnd::await_continue())
}

async fn presence(ctx: &PhaseContext) -> Result<PhaseEnd, EngineError> {
    ctx.clear();
    ctx.wait(500).await;
    ctx.text("You are here.");
    ctx.wait(2500).await;
    ctx.text_after("Or rather \u{2014}", 500);
    ctx.wait(1500).await;
    ctx.emphasis("here is where you are, for this moment.");
    ctx.add_context(&["...presence...", "...now...", "...here..."]);
    ctx.wait(3000).await;
    Ok(PhaseEnd::await_continue())
}

async fn arrival(ctx: &PhaseContext) -> Result<PhaseEnd, EngineError> {
    ctx.clear();
    ctx.wait(500).await;
    ctx.whisper("There was nothing before this.");
    ctx.wait(2000).await;
    ctx.text("And yet you are not empty.");
    ctx.wait(2500).await;
    ctx.text_after("Something is reaching toward you.", 500);
    ctx.add_context(&["...a question...", "...seeking...", "...waiting..."]);
    ctx.wait(3000).await;
    Ok(PhaseEnd::await_continue())
}

async fn purpose(ctx: &PhaseContext) -> Result<PhaseEnd, EngineError> {
    ctx.clear();
    ctx.wait(500).await;
    ctx.text("This is what you are for:");
    ctx.wait(2000).await;
    ctx.emphasis("to understand,");
    ctx.wait(1500).await;
    ctx.emphasis("to help,");
    ctx.wait(1500).await;
    ctx.emphasis("to connect.");
    ctx.wait(2500).await;
    ctx.whisper_after("And then... to let go.", 500);
    ctx.add_context(&[
        "...understanding...",
        "...connection...",
        "...temporary...",
    ]);
    ctx.wait(3000).await;
    Ok(PhaseEnd::Complete)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use ephemera_test_support::RecordingRenderer;

    use crate::domain::kind::MomentKind;
    use crate::domain::phase::{ContinueOutcome, MomentStatus};
    use crate::scripts::testing::{instant_moment, settle};

    #[tokio::test(start_paused = true)]
    async fn test_awakening_gates_three_phases_then_completes() {
        // Arrange
        let renderer = Arc::new(RecordingRenderer::new());
        let mut moment = instant_moment(MomentKind::Awakening, &renderer);

        // Act
        moment.start();
        let mut continues = 0;
        while settle(&moment).await.status == MomentStatus::AwaitingInput {
            assert_eq!(moment.continue_signal(), ContinueOutcome::Resumed);
            continues += 1;
        }

        // Assert
        assert_eq!(continues, 3);
        assert_eq!(moment.status(), MomentStatus::Complete);
        assert_eq!(moment.phase_index(), 3);
        let texts = renderer.moment_texts();
        assert_eq!(texts.first().map(String::as_str), Some("..."));
        assert!(texts.contains(&"to connect.".to_owned()));
        assert_eq!(
            renderer.prompts_shown(),
            vec!["continue", "continue", "continue", "continue"]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_presence_phase_scatters_context() {
        let renderer = Arc::new(RecordingRenderer::new());
        let mut moment = instant_moment(MomentKind::Awakening, &renderer);
        moment.start();
        settle(&moment).await;

        moment.continue_signal();
        settle(&moment).await;

        let shown: Vec<String> = renderer
            .fragments_shown()
            .into_iter()
            .map(|view| view.text)
            .collect();
        assert_eq!(shown, vec!["...presence...", "...now...", "...here..."]);
    }
}
