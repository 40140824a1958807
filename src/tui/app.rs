//! TUI application runner.
//!
//! Handles the main event loop and terminal setup/teardown. Pipeline runs
//! execute on a tokio runtime owned by the loop; their results arrive over a
//! channel and are fed to the engine between key presses.

use std::io::{self, stdout};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event as TermEvent, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc::{self, UnboundedReceiver};

use super::{draw, handle_key};
use crate::ai::AiPipeline;
use crate::core::{Event, TaskRunner};
use crate::App;

/// Run the wizard until it quits. Returns the message to print, if the
/// user picked one.
pub fn run_tui(mut app: App, pipeline: Arc<AiPipeline>) -> Result<Option<String>> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .context("failed to start the async runtime")?;

    let (tx, rx) = mpsc::unbounded_channel();
    let runner = TaskRunner::new(runtime.handle().clone(), pipeline, app.resolver(), tx);

    setup_terminal()?;

    let backend = CrosstermBackend::new(stdout());
    let mut terminal = match Terminal::new(backend) {
        Ok(terminal) => terminal,
        Err(e) => {
            restore_terminal()?;
            return Err(e.into());
        }
    };

    let result = run_main_loop(&mut terminal, &mut app, &runner, rx);

    restore_terminal()?;
    // In-flight requests are abandoned with the runtime.
    runtime.shutdown_background();

    result?;
    Ok(app.final_message.take())
}

/// Setup the terminal for TUI mode.
fn setup_terminal() -> Result<()> {
    enable_raw_mode()?;
    execute!(stdout(), EnterAlternateScreen)?;

    // Restore the terminal before the panic message is printed
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = restore_terminal();
        original_hook(panic_info);
    }));

    Ok(())
}

/// Restore the terminal to normal mode.
fn restore_terminal() -> Result<()> {
    disable_raw_mode()?;
    execute!(stdout(), LeaveAlternateScreen)?;
    Ok(())
}

/// Main event loop.
fn run_main_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    runner: &TaskRunner,
    mut results: UnboundedReceiver<Event>,
) -> Result<()> {
    let tick_rate = Duration::from_millis(100);

    loop {
        terminal.draw(|frame| draw(frame, app))?;

        if event::poll(tick_rate)? {
            match event::read()? {
                TermEvent::Key(key) if key.kind == KeyEventKind::Press => {
                    let tasks = handle_key(key, app);
                    runner.spawn_all(tasks);
                }
                TermEvent::Resize(width, height) => {
                    app.dispatch(Event::Resize { width, height });
                }
                _ => {}
            }
        }

        while let Ok(result) = results.try_recv() {
            let tasks = app.dispatch(result);
            runner.spawn_all(tasks);
        }

        if app.should_quit {
            break;
        }

        app.dispatch(Event::Tick);
    }

    Ok(())
}
