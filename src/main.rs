// src/main.rs

use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind,
    },
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::prelude::*;
use std::io::stdout;
use std::time::Duration;
use tracing::{info, warn};
use vanguard_recon::core::report::export_to_csv;
use vanguard_recon::logging::initialize_logging;
use vanguard_recon::{Orchestrator, ScanConfig};

mod app;
mod ui;

use app::{App, AppState, ExportStatus, ScanRequest};

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    initialize_logging()?;
    let config = ScanConfig::load()?;
    info!(workers = config.worker_count(), "Configuration loaded.");
    let orchestrator = Orchestrator::new(config);

    // --- Setup ---
    stdout().execute(EnterAlternateScreen)?;
    stdout().execute(EnableMouseCapture)?;
    enable_raw_mode()?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
    terminal.clear()?;

    let mut app = App::new();

    while !app.should_quit {
        terminal.draw(|frame| ui::render(&mut app, orchestrator.config(), frame))?;

        if event::poll(Duration::from_millis(100))? {
            handle_events(&mut app, &orchestrator)?;
        }

        app.on_tick();
        if app.state == AppState::Scanning {
            app.apply_snapshot(orchestrator.snapshot());
        }
    }

    // --- Restore Terminal ---
    stdout().execute(LeaveAlternateScreen)?;
    stdout().execute(DisableMouseCapture)?;
    disable_raw_mode()?;
    Ok(())
}

fn handle_events(app: &mut App, orchestrator: &Orchestrator) -> color_eyre::Result<()> {
    if let Event::Key(key) = event::read()? {
        if key.kind != KeyEventKind::Press {
            return Ok(());
        }
        if app.show_disclaimer {
            match key.code {
                KeyCode::Enter => app.show_disclaimer = false,
                KeyCode::Char('q') | KeyCode::Char('Q') => app.quit(),
                _ => {}
            }
            return Ok(());
        }
        match app.state {
            AppState::Idle => handle_idle_input(app, key.code, orchestrator),
            AppState::Finished => handle_finished_input(app, key.code, orchestrator),
            AppState::Scanning => {
                if matches!(key.code, KeyCode::Char('q') | KeyCode::Char('Q')) {
                    app.quit();
                }
            }
        }
    }
    Ok(())
}

fn handle_idle_input(app: &mut App, key_code: KeyCode, orchestrator: &Orchestrator) {
    match key_code {
        KeyCode::Char('Q') => app.quit(),
        KeyCode::Char('q') if app.input.is_empty() => app.quit(),
        KeyCode::Char(c) => app.input.push(c),
        KeyCode::Backspace => {
            app.input.pop();
        }
        KeyCode::Enter => {
            let started = ScanRequest::parse(&app.input).and_then(|request| match request {
                ScanRequest::Hosts(subnet) => orchestrator.start_host_scan(subnet),
                ScanRequest::Web(url) => orchestrator.start_web_scan(&url),
            });
            match started {
                Ok(_) => {
                    app.notice = None;
                    app.state = AppState::Scanning;
                }
                Err(e) => {
                    warn!(error = %e, "Scan request rejected.");
                    app.notice = Some(e.to_string());
                }
            }
        }
        _ => {}
    }
}

fn handle_finished_input(app: &mut App, key_code: KeyCode, orchestrator: &Orchestrator) {
    match key_code {
        KeyCode::Char('q') | KeyCode::Char('Q') => app.quit(),
        KeyCode::Char('n') | KeyCode::Char('N') => app.reset(),
        KeyCode::Char('e') | KeyCode::Char('E') => export_hosts(app, orchestrator),
        KeyCode::Up => app.scroll_up(),
        KeyCode::Down => app.scroll_down(),
        _ => {}
    }
}

fn export_hosts(app: &mut App, orchestrator: &Orchestrator) {
    let dir = orchestrator.config().export_dir();
    app.export_status = match export_to_csv(app.hosts(), &dir, None) {
        Ok(Some(path)) => ExportStatus::Success(path.display().to_string()),
        Ok(None) => ExportStatus::Error("No hosts to export".to_string()),
        Err(e) => ExportStatus::Error(e.to_string()),
    };
}
