use std::io;
use std::sync::Arc;

use anyhow::{Context, Result};
use crossterm::{
    event::{Event, EventStream, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::api::TaskApi;
use crate::app::App;
use crate::protocol::{execute as execute_request, Request, Response};
use crate::ui::draw;

/// Raw mode plus alternate screen for as long as it lives.
struct TerminalGuard {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
}

impl TerminalGuard {
    fn enter() -> Result<Self> {
        enable_raw_mode().context("enable raw mode")?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen).context("enter alternate screen")?;
        let mut terminal = Terminal::new(CrosstermBackend::new(stdout)).context("create terminal")?;
        terminal.clear().context("clear terminal")?;
        Ok(Self { terminal })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
    }
}

fn dispatch(api: &Arc<dyn TaskApi>, tx: &mpsc::UnboundedSender<Response>, request: Request) {
    debug!(?request, "dispatching");
    let api = Arc::clone(api);
    let tx = tx.clone();
    tokio::spawn(async move {
        let response = execute_request(api.as_ref(), request).await;
        // The receiver is gone only when the UI has already quit.
        let _ = tx.send(response);
    });
}

/// Drives the UI until the user quits. Each backend call runs on its own
/// task; responses are applied in whatever order they arrive.
pub async fn run(mut app: App, api: Arc<dyn TaskApi>) -> Result<()> {
    let mut guard = TerminalGuard::enter()?;
    let (tx, mut rx) = mpsc::unbounded_channel::<Response>();
    let mut events = EventStream::new();
    info!("ui started");

    loop {
        for request in app.take_requests() {
            dispatch(&api, &tx, request);
        }

        guard
            .terminal
            .draw(|f| draw(f, &app))
            .context("draw frame")?;

        if app.should_quit {
            break;
        }

        tokio::select! {
            Some(response) = rx.recv() => app.handle_response(response),
            event = events.next() => match event {
                Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => app.handle_key(key),
                Some(Ok(_)) => {}
                Some(Err(err)) => return Err(err).context("read terminal event"),
                None => break,
            },
        }
    }

    info!("ui stopped");
    Ok(())
}
