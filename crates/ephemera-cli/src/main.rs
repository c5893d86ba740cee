//! Ephemera terminal entry point.

use std::error::Error;
use std::sync::Arc;

use ephemera_cli::config::EphemeraConfig;
use ephemera_cli::input::{self, Command};
use ephemera_cli::terminal::{TerminalContainer, TerminalRenderer};
use ephemera_core::clock::SystemClock;
use ephemera_core::rng::StdRandom;
use ephemera_session::{Orchestrator, SessionCollaborators};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{info, trace};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Logs go to stderr; stdout is the narrative.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .json()
        .with_writer(std::io::stderr)
        .init();

    let config = EphemeraConfig::load()?;
    info!(frame_ms = config.frame_ms, "starting ephemera");
    let frame_period = config.frame_period();

    let mut orchestrator = Orchestrator::new(
        SessionCollaborators {
            renderer: Arc::new(TerminalRenderer::stdout()),
            audio: None,
            container: Arc::new(TerminalContainer::new()),
            clock: Arc::new(SystemClock),
            rng: Box::new(StdRandom::from_entropy()),
        },
        config.session,
    )?;

    let frames = tokio::spawn(orchestrator.frame_driver().run(frame_period));

    // Stdin is read on its own task so input queues while a transition plays.
    let (input_tx, mut input_rx) = mpsc::channel(16);
    let reader = tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            match input::parse(&line) {
                Some(command) => {
                    if input_tx.send(command).await.is_err() {
                        break;
                    }
                }
                None => trace!(line, "unrecognised input"),
            }
        }
    });

    orchestrator.start().await;

    while let Some(command) = input_rx.recv().await {
        match command {
            Command::Continue => orchestrator.handle_continue().await?,
            Command::Choose(index) => {
                orchestrator.select_choice(index);
            }
            Command::Status => {
                eprintln!("{}", serde_json::to_string_pretty(&orchestrator.snapshot())?);
            }
            Command::Quit => break,
        }
    }

    orchestrator.stop();
    frames.abort();
    reader.abort();
    Ok(())
}
