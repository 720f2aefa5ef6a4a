//! Interactive chat dashboard for a planning session.

pub mod app;
mod ui;

use std::io;
use std::sync::Arc;

use anyhow::Result;
use crossterm::event::{self, Event};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use vitafit_core::api::Backend;
use vitafit_core::chat::{ChatController, Viewport};

use app::{App, Outcome, Request};

/// Rows from the bottom within which new messages auto-scroll.
pub const SCROLL_THRESHOLD_ROWS: u32 = 3;

/// Launch the chat dashboard for `chat`'s session.
pub async fn run_chat(backend: Arc<dyn Backend>, mut chat: ChatController) -> Result<()> {
    *chat.viewport_mut() = Viewport::with_threshold(SCROLL_THRESHOLD_ROWS);

    // Set up terminal.
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let term_backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(term_backend)?;

    let cancel = CancellationToken::new();
    let mut app = App::new(chat);
    let result = run_event_loop(&mut terminal, &mut app, &backend, &cancel).await;

    // Abandon anything still in flight.
    cancel.cancel();

    // Restore terminal.
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

/// Run `request` on its own task and deliver the outcome over `tx`.
fn spawn_request(
    backend: &Arc<dyn Backend>,
    request: Request,
    tx: &mpsc::Sender<Outcome>,
    cancel: &CancellationToken,
) {
    let backend = Arc::clone(backend);
    let tx = tx.clone();
    let cancel = cancel.clone();
    tokio::spawn(async move {
        let outcome = tokio::select! {
            _ = cancel.cancelled() => return,
            outcome = request.run(backend.as_ref()) => outcome,
        };
        // The receiver is gone once the dashboard has exited.
        let _ = tx.send(outcome).await;
    });
}

async fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    backend: &Arc<dyn Backend>,
    cancel: &CancellationToken,
) -> Result<()> {
    let (tx, mut rx) = mpsc::channel::<Outcome>(16);
    let tick_rate = app.tick_rate;

    if let Some(request) = app.start() {
        spawn_request(backend, request, &tx, cancel);
    }

    loop {
        // Apply finished requests (non-blocking).
        while let Ok(outcome) = rx.try_recv() {
            app.apply(outcome);
        }

        terminal.draw(|f| ui::render(f, app))?;

        if event::poll(tick_rate)? {
            if let Event::Key(key) = event::read()? {
                if let Some(request) = app.handle_key(key) {
                    spawn_request(backend, request, &tx, cancel);
                }
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}
