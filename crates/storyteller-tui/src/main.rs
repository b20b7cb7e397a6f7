use anyhow::Result;
use log::{info, warn};
use storyteller_core::{ChannelRenderer, ChatClient, ChatWidget, Config, Timings};
use tokio::sync::mpsc;

mod app;
mod handler;
mod logging;
mod tui;
mod ui;

use app::App;
use tui::{EventHandler, Tui};

#[tokio::main]
async fn main() -> Result<()> {
    if let Err(e) = logging::init() {
        eprintln!("Logging disabled: {}", e);
    }

    let config = Config::load().unwrap_or_else(|e| {
        warn!("Could not read config, using defaults: {}", e);
        Config::new()
    });
    info!("Chat endpoint base URL: {}", config.base_url());

    // Widget -> UI render calls, UI -> widget submissions
    let (ui_tx, ui_rx) = mpsc::unbounded_channel();
    let (submit_tx, submit_rx) = mpsc::unbounded_channel();

    let widget = ChatWidget::new(
        ChatClient::from_config(&config),
        ChannelRenderer::new(ui_tx),
        Timings::from(&config),
    );
    let mut app = App::new(widget.session_id().clone(), submit_tx, config.sound_enabled());
    let widget_task = tokio::spawn(widget.run(submit_rx));

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = EventHandler::new(ui_rx, config.typewriter_interval());

    let result = run(&mut terminal, &mut app, &mut events).await;

    // Cancels any pending startup timer or in-flight request
    widget_task.abort();
    tui::restore()?;
    result
}

async fn run(terminal: &mut Tui, app: &mut App, events: &mut EventHandler) -> Result<()> {
    let mut redraw = true;
    while !app.should_quit {
        if redraw {
            terminal.draw(|frame| ui::render(app, frame))?;
        }

        if std::mem::take(&mut app.bell_pending) {
            tui::bell()?;
        }

        redraw = match events.next().await {
            Some(event) => handler::handle_event(app, event),
            None => break,
        };
    }
    Ok(())
}
