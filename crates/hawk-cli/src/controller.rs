// SPDX-License-Identifier: MIT OR Apache-2.0
//! The controller: owns the store, wires the ingest and render tasks on
//! one cooperative executor, runs the tick clock, and handles shutdown.

use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{Event, EventStream, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use futures::StreamExt;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::warn;

use hawk_ingest::{IngestOptions, ReplyWriter, run_ingest};
use hawk_store::Store;
use hawk_ui::{Ui, UiAction};

/// Terminal write failures persisting this long abort the alt-screen
/// teardown and exit with code 1.
const RENDER_FAILURE_WINDOW: Duration = Duration::from_secs(1);

/// Settings the argument/environment collaborator hands to the core.
#[derive(Debug, Clone)]
pub struct RuntimeOptions {
    /// Application name shown in the header.
    pub app_name: String,
    /// Render tick rate in frames per second, already clamped to [1, 120].
    pub refresh_rate: u32,
}

/// How the run ended; main maps this to an exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The user quit; exit 0.
    Quit,
    /// A termination signal arrived; exit 130.
    Interrupted,
    /// Terminal writes kept failing; alt-screen teardown was skipped,
    /// exit 1.
    RenderFailed,
}

/// Run the renderer until quit, signal, or persistent render failure.
pub async fn run(options: RuntimeOptions) -> Result<RunOutcome> {
    let store = Arc::new(Store::new());
    let replies = Arc::new(ReplyWriter::new(tokio::io::stdout()));
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let ingest = tokio::spawn(run_ingest(
        tokio::io::stdin(),
        Arc::clone(&store),
        Arc::clone(&replies),
        IngestOptions::default(),
        shutdown_rx,
    ));

    // The reply channel owns stdout, so the terminal lives on stderr.
    enable_raw_mode().context("failed to enable raw mode")?;
    execute!(io::stderr(), EnterAlternateScreen).context("failed to enter alternate screen")?;
    let mut terminal =
        Terminal::new(CrosstermBackend::new(io::stderr())).context("failed to open terminal")?;

    let outcome = render_loop(&mut terminal, &store, &replies, &options).await;

    // Soft shutdown: stop the ingest task, flush outstanding replies, then
    // tear the terminal down (unless the terminal itself is the problem).
    let _ = shutdown_tx.send(true);
    if let Ok(Err(e)) = ingest.await {
        warn!(error = %e, "ingest task ended with error");
    }
    if let Err(e) = replies.flush().await {
        warn!(error = %e, "failed to flush outbound pipe");
    }

    // Persistent render failure skips the alt-screen teardown: the
    // terminal is the thing that is broken.
    if !matches!(outcome, Ok(RunOutcome::RenderFailed)) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stderr(), LeaveAlternateScreen);
    }
    outcome
}

/// The render task: tick-driven drawing plus key dispatch.
async fn render_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stderr>>,
    store: &Arc<Store>,
    replies: &Arc<ReplyWriter<tokio::io::Stdout>>,
    options: &RuntimeOptions,
) -> Result<RunOutcome> {
    let mut ui = Ui::new(options.app_name.clone());
    let mut events = EventStream::new();

    let mut interval =
        tokio::time::interval(Duration::from_millis(1000 / u64::from(options.refresh_rate)));
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let terminated = terminate_signal();
    tokio::pin!(terminated);

    // First write failure within the window is retried on the next tick;
    // persisting failures end the run.
    let mut failing_since: Option<Instant> = None;

    loop {
        tokio::select! {
            _ = interval.tick() => {
                ui.on_tick(store);
                match terminal.draw(|frame| ui.draw(frame, store)) {
                    Ok(_) => failing_since = None,
                    Err(e) => {
                        warn!(error = %e, "terminal write failed");
                        let since = *failing_since.get_or_insert_with(Instant::now);
                        if since.elapsed() >= RENDER_FAILURE_WINDOW {
                            return Ok(RunOutcome::RenderFailed);
                        }
                    }
                }
            }

            maybe_event = events.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                        match ui.handle_key(key, store) {
                            UiAction::Quit => return Ok(RunOutcome::Quit),
                            UiAction::Emit(message) => {
                                if let Err(e) = replies.send(&message).await {
                                    warn!(error = %e, "failed to write outbound message");
                                }
                            }
                            UiAction::None => {}
                        }
                    }
                    Some(Ok(_)) => {} // resize and the like repaint next tick
                    Some(Err(e)) => warn!(error = %e, "terminal event error"),
                    None => return Ok(RunOutcome::Quit),
                }
            }

            _ = &mut terminated => return Ok(RunOutcome::Interrupted),
        }
    }
}

/// Resolves when the process receives a termination signal.
async fn terminate_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};
        let mut sigterm = match signal(SignalKind::terminate()) {
            Ok(sigterm) => sigterm,
            Err(e) => {
                warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
                return;
            }
        };
        tokio::select! {
            _ = sigterm.recv() => {}
            _ = tokio::signal::ctrl_c() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
