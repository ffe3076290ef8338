//! Mello Bingo - terminal bingo card for Melodifestivalen
//!
//! Draws a 5x5 card of random prompts, detects completed lines and exports
//! the card as a PNG (clipboard first, file as fallback).

mod catalog;
mod clipboard;
mod config;
mod core;
mod export;
mod frontend;
mod theme;

use crate::catalog::Catalog;
use crate::config::Config;
use crate::core::board::GRID_CELLS;
use crate::core::state::BoardState;
use crate::export::{BoardRenderer, BoardSnapshot, DownloadSink, FileDownload, PngRenderer};
use anyhow::{Context, Result};
use clap::{Parser as ClapParser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::{Path, PathBuf};

#[derive(ClapParser)]
#[command(name = "mello-bingo")]
#[command(about = "Melodifestivalen bingo in the terminal", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Custom data directory (default: ~/.mello-bingo)
    /// Can also be set via MELLO_BINGO_DIR environment variable
    #[arg(long, value_name = "DIR", global = true)]
    data_dir: Option<PathBuf>,

    /// Seed for drawing boards (same seed, same board)
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Play in the terminal (default)
    Play,

    /// Draw a board and write it as a PNG without opening the terminal UI
    Export {
        /// Cell to mark before exporting (0-24, row by row); repeatable
        #[arg(long = "mark", value_name = "ID")]
        marks: Vec<usize>,

        /// Output file (default: download directory from config)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Validate a prompt catalog
    ValidateCatalog {
        /// Catalog file to validate
        #[arg(value_name = "FILE")]
        catalog: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let profile_dir = match &cli.data_dir {
        Some(dir) => dir.clone(),
        None => Config::profile_dir()?,
    };
    std::fs::create_dir_all(&profile_dir)
        .with_context(|| format!("Failed to create profile directory: {:?}", profile_dir))?;

    // Initialize logging to file (use RUST_LOG env var to control level, e.g. RUST_LOG=debug)
    // TUI apps can't log to stdout, so we write to a file
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(profile_dir.join("mello-bingo.log"))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::sync::Mutex::new(log_file))
        .with_ansi(false) // No color codes in log file
        .init();

    if let Some(Commands::ValidateCatalog { catalog }) = &cli.command {
        return validate_catalog(catalog.as_deref(), &profile_dir);
    }

    let config = match &cli.config {
        Some(path) => Config::load_from_path(path)?,
        None => Config::load(&profile_dir)?,
    };

    // Loading validates, so a catalog that cannot fill a board stops here
    let catalog = Catalog::load(&profile_dir).context("Prompt catalog cannot fill a board")?;

    match cli.command {
        Some(Commands::Export { marks, output }) => {
            run_export(&config, &catalog, cli.seed, &marks, output)
        }
        _ => run_tui(config, catalog, cli.seed),
    }
}

/// Board RNG, seeded when a seed was given
fn board_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => {
            tracing::info!("Using board seed {}", seed);
            StdRng::seed_from_u64(seed)
        }
        None => StdRng::from_entropy(),
    }
}

fn validate_catalog(path: Option<&Path>, profile_dir: &Path) -> Result<()> {
    let result = match path {
        Some(path) => {
            println!("Validating catalog file: {:?}", path);
            Catalog::load_from_file(path)
        }
        None => {
            println!("Validating profile catalog");
            Catalog::load(profile_dir)
        }
    };

    let catalog = match result {
        Ok(catalog) => catalog,
        Err(e) => {
            eprintln!("✗ Failed to load catalog: {:#}", e);
            std::process::exit(1);
        }
    };

    println!("✓ Catalog loaded successfully");
    println!("  {} prompts defined", catalog.len());
    println!("✓ Catalog can fill a {}-cell board", GRID_CELLS);
    Ok(())
}

/// Headless export: draw, mark, render, write
fn run_export(
    config: &Config,
    catalog: &Catalog,
    seed: Option<u64>,
    marks: &[usize],
    output: Option<PathBuf>,
) -> Result<()> {
    let mut rng = board_rng(seed);
    let mut board = BoardState::new(catalog.prompts(), &mut rng)?;
    for &id in marks {
        let signal = board.toggle(id)?;
        if signal.is_new_bingo() {
            tracing::info!("Bingo after marking cell {}", id);
        }
    }

    let snapshot = BoardSnapshot::capture(board.grid(), &config.board);
    let image = PngRenderer::from_config(&config.export).render(&snapshot)?;

    let path = match output {
        Some(path) => {
            std::fs::write(&path, &image.png)
                .with_context(|| format!("Failed to write image: {:?}", path))?;
            path
        }
        None => FileDownload::new(config.export.resolved_download_dir())
            .save(&config.export.filename, &image.png)?,
    };

    println!(
        "✓ Wrote {}x{} board image to {}",
        image.width,
        image.height,
        path.display()
    );
    println!(
        "  {} of {} cells marked, {} line(s) complete",
        board.marked_count(),
        GRID_CELLS,
        board.completed_lines().len()
    );
    Ok(())
}

/// Run TUI frontend
fn run_tui(config: Config, catalog: Catalog, seed: Option<u64>) -> Result<()> {
    // Export tasks and status timers run on the tokio runtime
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async_run_tui(config, catalog, seed))
}

/// Async TUI main loop
async fn async_run_tui(config: Config, catalog: Catalog, seed: Option<u64>) -> Result<()> {
    use crate::core::input_router::route_key;
    use crate::core::{AppCore, BoardAction};
    use crate::export::{ExportDriver, ExportEvent, ExportPipeline};
    use crate::frontend::{Frontend, FrontendEvent, TuiFrontend};
    use crate::theme::BingoTheme;
    use tokio::sync::mpsc;

    let (export_tx, mut export_rx) = mpsc::unbounded_channel::<ExportEvent>();
    let pipeline = ExportPipeline::from_config(&config.export);
    let driver = ExportDriver::new(pipeline, config.export.status_reset_delay(), export_tx);

    let theme = BingoTheme::mello().with_background(&config.export.background);
    let poll_timeout = config.ui.poll_timeout();

    let mut app_core = AppCore::new(config, catalog, board_rng(seed), driver)?;

    let mut frontend = TuiFrontend::new(theme)?;
    frontend.set_poll_timeout(poll_timeout);
    let (width, height) = frontend.size();
    tracing::info!("Terminal frontend started at {}x{}", width, height);

    while app_core.running {
        // Results from background exports
        while let Ok(event) = export_rx.try_recv() {
            app_core.handle_export_event(event);
        }

        for event in frontend.poll_events()? {
            let overlay_open = app_core.overlay().is_some();
            let action = match event {
                FrontendEvent::Key { code, modifiers } => route_key(code, modifiers, overlay_open),
                FrontendEvent::Mouse { kind, x, y } => {
                    frontend.mouse_action(kind, x, y, overlay_open)
                }
                FrontendEvent::Resize { width, height } => {
                    tracing::debug!("Terminal resized to {}x{}", width, height);
                    app_core.needs_render = true;
                    BoardAction::None
                }
            };

            if let Err(e) = app_core.handle_action(action) {
                tracing::error!("Failed to apply {:?}: {:#}", action, e);
            }
        }

        if app_core.needs_render {
            frontend.render(&app_core)?;
            app_core.needs_render = false;
        }
    }

    frontend.cleanup()?;
    tracing::info!("Exiting");
    Ok(())
}
