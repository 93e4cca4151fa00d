use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use chirp::app::App;
use chirp::bridge::Bridge;
use chirp::config::Config;
use chirp::fetch::HttpTweetFetcher;
use chirp::state::SyncedStore;

#[derive(Parser)]
#[command(name = "chirp", version, about = "Embed a tweet snapshot in your terminal")]
struct Cli {
    /// Config file (default: ~/.config/chirp/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Tweet API base URL
    #[arg(long)]
    base_url: Option<String>,

    /// Where the widget state snapshot is kept
    #[arg(long)]
    state_file: Option<PathBuf>,

    /// Fetch timeout in seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Log file (default: under the local data dir)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(base_url) = cli.base_url {
        config.base_url = base_url;
    }
    if let Some(state_file) = cli.state_file {
        config.state_file = Some(state_file);
    }
    if let Some(timeout_secs) = cli.timeout_secs {
        config.timeout_secs = timeout_secs;
    }
    if let Some(log_file) = cli.log_file {
        config.log_file = Some(log_file);
    }

    init_logging(&config)?;

    let store = match config.state_path() {
        Some(path) => SyncedStore::load_or_default(path)?,
        None => SyncedStore::in_memory(),
    };

    let (toast_tx, toast_rx) = mpsc::unbounded_channel();
    let fetcher = Arc::new(HttpTweetFetcher::new(&config.base_url, config.timeout()));
    // the bridge deadline sits a little past the HTTP timeout, so the
    // fetcher's own error is what normally wins
    let bridge = Bridge::new(fetcher, toast_tx, config.timeout() + Duration::from_secs(5));
    let app = App::new(store, bridge, toast_rx);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = app.run(&mut terminal).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn init_logging(config: &Config) -> Result<()> {
    let Some(path) = config.log_path() else {
        return Ok(());
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;

    let filter = EnvFilter::try_from_env("CHIRP_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::sync::Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}
