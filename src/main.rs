//! Top Stories - Browse a news provider's top stories by section
//!
//! A terminal UI application that shows the top stories of a selected section,
//! serving repeat visits from a ten minute local cache.

use std::fs::{self, OpenOptions};
use std::io;
use std::panic;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::info;
use tracing_subscriber::EnvFilter;

use topstories::app::App;
use topstories::cli::{Cli, StartupConfig};
use topstories::data::TopStoriesClient;
use topstories::feed::StoryFeedController;
use topstories::storage::FileStore;
use topstories::ui;

/// Sets up a panic hook that restores the terminal before printing the panic message.
/// This ensures the terminal is usable even if the application panics.
fn setup_panic_hook() {
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        // Attempt to restore the terminal
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        // Call the original panic hook
        original_hook(panic_info);
    }));
}

/// Sends tracing output to a log file so it never draws over the TUI
///
/// The level comes from `RUST_LOG`, defaulting to `info`.
fn init_logging(path: &Path) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = match StartupConfig::from_cli(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(2);
        }
    };

    let store = match config.cache_dir.clone() {
        Some(dir) => FileStore::with_dir(dir),
        None => match FileStore::new() {
            Some(store) => store,
            None => {
                eprintln!("error: could not determine a cache directory; pass --cache-dir");
                std::process::exit(2);
            }
        },
    };
    let log_file = config
        .log_file
        .clone()
        .unwrap_or_else(|| store.dir().join("topstories.log"));
    init_logging(&log_file)?;

    let provider = Arc::new(match &config.base_url {
        Some(url) => TopStoriesClient::with_base_url(config.api_key.clone(), url.clone()),
        None => TopStoriesClient::new(config.api_key.clone()),
    });
    let store = Arc::new(store);
    let controller = StoryFeedController::new(Arc::clone(&store), provider);
    let mut app = App::new(controller, store, config.initial_category.clone());
    info!(category = %config.initial_category, "Starting");

    // Set up panic hook to restore terminal on crash
    setup_panic_hook();

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Initial selection: cached stories or a background fetch
    app.start();

    // Main event loop
    loop {
        app.poll_fetches();

        terminal.draw(|f| ui::render(f, &app))?;

        // Poll for keyboard events with 100ms timeout
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key);
                }
            }
        }

        if app.should_quit {
            break;
        }
    }

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;

    Ok(())
}
