mod app;

use std::io;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, DisableBracketedPaste, EnableBracketedPaste},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::{error, info};

use termreq_core::logging;
use termreq_http::{HttpTool, settings::Settings};

use app::App;

fn main() -> Result<()> {
    // Logging is best-effort: the composer works without it
    let log_error = logging::init_logging().err();

    let settings = Settings::default();
    info!(timeout_ms = settings.timeout.as_millis() as u64, "starting termreq");
    let tool = HttpTool::new(settings)?;
    let mut app = App::new(Box::new(tool));

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Main event loop
    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableBracketedPaste
    )?;
    terminal.show_cursor()?;

    if let Some(err) = log_error {
        eprintln!("Warning: logging disabled: {err:#}");
    }
    if let Err(err) = result {
        error!("event loop failed: {err:#}");
        eprintln!("Error: {err:?}");
    }

    Ok(())
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    const TICK_RATE: Duration = Duration::from_millis(50);

    loop {
        terminal.draw(|frame| {
            app.render(frame);
        })?;

        if app.should_quit {
            return Ok(());
        }

        // Poll with timeout so the tool can pick up finished requests
        if event::poll(TICK_RATE)? {
            let ev = event::read()?;
            app.handle_event(ev);
        }

        app.tick();
    }
}
