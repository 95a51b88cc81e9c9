//! `TaskFlow` binary: terminal task manager synced against a remote HTTP API.
//!
//! Launches the TUI and syncs the task collection against a remote
//! server. Configuration via CLI flags, environment variables, or
//! config file (`~/.config/taskflow/config.toml`).
//!
//! ```bash
//! # Against the default local server
//! cargo run --bin taskflow
//!
//! # Against a deployed server
//! cargo run --bin taskflow -- --base-url https://tasks.example.com/api
//!
//! # Or via environment variables
//! TASKFLOW_API_URL=https://tasks.example.com/api cargo run
//! ```

use std::io;
use std::path::Path;
use std::sync::Arc;

use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tokio::sync::mpsc;
use tracing_appender::non_blocking::WorkerGuard;

use taskflow::app::App;
use taskflow::config::{CliArgs, ClientConfig};
use taskflow::gateway::HttpGateway;
use taskflow::session::SessionStore;
use taskflow::ui;
use taskflow::worker::{self, CoreCommand, CoreEvent};

#[tokio::main]
async fn main() -> io::Result<()> {
    let cli = CliArgs::parse();

    // Load and resolve configuration (CLI args > config file > defaults).
    let config = match ClientConfig::load(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Warning: failed to load config file: {e}");
            ClientConfig::default()
        }
    };

    // Initialize logging before terminal setup (logs go to file, not stdout).
    let _log_guard = init_logging(&cli.log_level, cli.log_file.as_deref());

    tracing::info!("taskflow starting");

    // Open the session store and spawn the core worker.
    let state_dir = match config.resolve_state_dir() {
        Ok(dir) => dir,
        Err(e) => {
            eprintln!("Error: {e}");
            return Ok(());
        }
    };
    let session = Arc::new(SessionStore::init(state_dir));
    let gateway = HttpGateway::new(config.base_url.clone(), session);
    let (cmd_tx, evt_rx) = worker::spawn_worker(gateway, config.channel_capacity);

    // Set up terminal.
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the app.
    let result = run_app(&mut terminal, &config, &cmd_tx, evt_rx).await;

    // Restore terminal.
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    tracing::info!("taskflow exiting");
    result
}

/// Initialize file-based logging.
///
/// Logs are written to a file (never stdout, since ratatui owns the
/// terminal). Returns a [`WorkerGuard`] that must be held until
/// shutdown to ensure all buffered log entries are flushed.
fn init_logging(level: &str, file_path: Option<&Path>) -> Option<WorkerGuard> {
    let default_path = std::env::temp_dir().join("taskflow.log");
    let log_path = file_path.unwrap_or(&default_path);

    let log_dir = log_path.parent()?;
    let file_name = log_path.file_name()?.to_str()?;

    let file_appender = tracing_appender::rolling::never(log_dir, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(env_filter)
        .with_ansi(false)
        .init();

    Some(guard)
}

/// Main application loop.
async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    config: &ClientConfig,
    cmd_tx: &mpsc::Sender<CoreCommand>,
    mut evt_rx: mpsc::Receiver<CoreEvent>,
) -> io::Result<()> {
    let mut app = App::new();
    app.date_format.clone_from(&config.date_format);

    loop {
        // Step 1: Draw the UI frame.
        terminal.draw(|frame| ui::draw(frame, &app))?;

        // Step 2: Drain all pending CoreEvents (non-blocking).
        while let Ok(event) = evt_rx.try_recv() {
            app.apply_event(event);
        }

        // Step 3: Poll for terminal input events.
        if event::poll(config.poll_timeout)?
            && let Event::Key(key) = event::read()?
        {
            if key.kind != KeyEventKind::Press {
                continue;
            }

            if let Some(cmd) = app.handle_key_event(key) {
                match cmd_tx.try_send(cmd) {
                    Ok(()) => {}
                    Err(mpsc::error::TrySendError::Full(_)) => {
                        app.error = Some("Busy, try again".to_string());
                    }
                    Err(mpsc::error::TrySendError::Closed(_)) => {
                        app.error = Some("Sync worker stopped".to_string());
                    }
                }
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}
