//! Birthday surprise TUI application.
//!
//! A keyboard-driven terminal version of the birthday surprise: a fake
//! loading screen, falling photos, the desert island questions, a story
//! built from the answers and a closing letter with a video.
//!
//! # Headless Mode
//!
//! Run with `--headless` to play the flow from command-line choices and
//! print the story:
//!
//! ```bash
//! cargo run -p surprise -- --headless --fast --items "Kitap,Hamak,Çakı" --person Ece
//! ```

mod app;
mod events;
mod headless;
mod ui;

use std::fs::OpenOptions;
use std::io::{self, stdout};
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::Context;
use crossterm::{
    event, execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use surprise_core::{SurpriseConfig, SurpriseSession};
use tracing_subscriber::EnvFilter;

use app::App;
use events::{handle_event, EventResult};
use ui::render::render;

/// Log file for TUI mode, so logs don't draw over the scenes.
const LOG_VAR: &str = "SURPRISE_LOG";
const DEFAULT_LOG_FILE: &str = "surprise.log";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Parse command line arguments
    let args: Vec<String> = std::env::args().collect();

    // Check for --help
    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_help();
        return Ok(());
    }

    let headless = args.iter().any(|a| a == "--headless");
    init_tracing(headless)?;

    let config_path = headless::arg_value(&args, "--config").map(Path::new);
    let config = SurpriseConfig::resolve(config_path)
        .await
        .context("failed to load configuration")?;

    if headless {
        return headless::run_headless(config, &args).await;
    }

    let session = SurpriseSession::new(config).context("failed to create session")?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(session);
    let result = run_app(&mut terminal, &mut app).await;
    app.shutdown();

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result.context("terminal error")
}

/// Logs go to stderr in headless mode and to a file otherwise.
fn init_tracing(headless: bool) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if headless {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(io::stderr)
            .init();
        return Ok(());
    }

    let path = std::env::var(LOG_VAR).unwrap_or_else(|_| DEFAULT_LOG_FILE.to_string());
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("failed to open log file {path}"))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    loop {
        // Apply fired cues, then render
        app.sync();
        terminal.draw(|f| render(f, &*app))?;

        // Poll for events with timeout for animations
        if event::poll(Duration::from_millis(100))? {
            let ev = event::read()?;

            match handle_event(app, ev) {
                EventResult::Quit => return Ok(()),
                EventResult::AwaitPreload => {
                    // Show the "preparing" label while the photos finish loading
                    terminal.draw(|f| render(f, &*app))?;
                    app.finish_go_back().await;
                }
                EventResult::PlayVideo => {
                    app.set_status("Video yükleniyor...");
                    terminal.draw(|f| render(f, &*app))?;
                    app.play_video().await;
                    if app.session.stage().video.error.is_none() {
                        app.clear_status();
                    }
                }
                EventResult::NeedsRedraw | EventResult::Continue => {
                    // Just continue the loop
                }
            }
        } else {
            // Tick animations
            app.tick();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn print_help() {
    println!("Birthday surprise - an interactive terminal birthday card");
    println!();
    println!("USAGE:");
    println!("  surprise [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("  -h, --help          Show this help message");
    println!("  --config <PATH>     JSON config file (default: $SURPRISE_CONFIG)");
    println!("  --headless          Run the whole flow without a TUI and print the story");
    println!();
    println!("HEADLESS OPTIONS (only with --headless):");
    println!("  --items <A,B,C>     Three items to take to the island");
    println!("  --person <NAME>     Who comes along");
    println!("  --escape <X,Y>      Run away, saving these two people (default: stay)");
    println!("  --plan <PLAN>       Plan label or number 1-5 (default: 1)");
    println!("  --fast              Run the scene timers 100x faster");
    println!("  --json              Print the full report as JSON");
    println!();
    println!("ENVIRONMENT:");
    println!("  SURPRISE_ASSET_DIR  Directory with 1.png .. 9.png and the video");
    println!("  SURPRISE_VIDEO      Video file, relative to the asset directory");
    println!("  SURPRISE_TIME_SCALE Multiplier for every scene timer");
    println!("  SURPRISE_PLAYER     Command the video is opened with, e.g. mpv");
    println!("  SURPRISE_LOG        Log file in TUI mode (default: surprise.log)");
    println!("  RUST_LOG            Log filter (default: info)");
    println!();
    println!("KEYS:");
    println!("  j/k, arrows         Move between entries, or scroll text");
    println!("  Enter, Space        Press / check the selected entry");
    println!("  1-9                 Press an entry by number");
    println!("  v                   Play the video on the letter");
    println!("  x, Esc              Close the video");
    println!("  q                   Quit");
}
