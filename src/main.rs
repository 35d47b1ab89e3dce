//! Blockfall: classic falling-block puzzle game in the terminal.

mod app;
mod game;
mod grid;
mod input;
mod pieces;
mod theme;
mod ui;

use anyhow::{Context, Result};
use app::App;
use clap::{Parser, ValueEnum};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Options derived from CLI that affect game behaviour (board size, gravity, seed).
#[derive(Debug, Clone)]
pub struct GameConfig {
    pub rows: usize,
    pub cols: usize,
    pub drop_interval: Duration,
    pub seed: Option<u64>,
    pub no_menu: bool,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("board needs at least one row and one column (got {rows}x{cols})")]
    EmptyBoard { rows: u16, cols: u16 },
    #[error("drop interval must be at least 1 ms")]
    ZeroDropInterval,
}

impl GameConfig {
    pub fn from_args(args: &Args) -> Result<Self, ConfigError> {
        if args.rows == 0 || args.cols == 0 {
            return Err(ConfigError::EmptyBoard {
                rows: args.rows,
                cols: args.cols,
            });
        }
        if args.drop_interval_ms == 0 {
            return Err(ConfigError::ZeroDropInterval);
        }
        Ok(Self {
            rows: args.rows as usize,
            cols: args.cols as usize,
            drop_interval: Duration::from_millis(args.drop_interval_ms),
            seed: args.seed,
            no_menu: args.no_menu,
        })
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log_file.as_deref())?;
    let config = GameConfig::from_args(&args)?;
    let theme = match theme::Theme::load(args.theme.as_deref(), args.palette) {
        Ok(t) => t,
        Err(e) => {
            log::warn!("theme not loaded ({e}); using defaults");
            theme::Theme::default()
        }
    };
    log::info!(
        "starting {}x{} board, drop interval {:?}",
        config.rows,
        config.cols,
        config.drop_interval
    );
    let mut app = App::new(config, theme);
    app.run()?;
    Ok(())
}

/// The terminal belongs to the UI, so logs only go to a file when one is given.
fn init_logging(log_file: Option<&Path>) -> Result<()> {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    match log_file {
        Some(path) => {
            let file = std::fs::File::create(path)
                .with_context(|| format!("cannot create log file {}", path.display()))?;
            builder.target(env_logger::Target::Pipe(Box::new(file)));
        }
        None => {
            builder.filter_level(log::LevelFilter::Off);
        }
    }
    builder.init();
    Ok(())
}

/// Classic falling-block puzzle game in the terminal.
#[derive(Debug, Parser)]
#[command(
    name = "blockfall",
    version,
    about = "Classic falling-block puzzle in the terminal. Fill rows edge to edge to clear them.",
    long_about = "Blockfall is a terminal take on the classic falling-block puzzle.\n\n\
        Seven tetrominoes fall one row per drop interval. Full rows are cleared and scored \
        40 / 100 / 300 / 1200 for one to four rows at once.\n\n\
        CONTROLS:\n  Left/Right (h/l)  Move    Up (k)  Rotate    Down (j)  Soft drop\n  \
        Enter/s           Start   P       Pause     R         Restart   Q / Esc  Quit"
)]
pub struct Args {
    /// Board height in rows.
    #[arg(long, default_value = "20", value_name = "ROWS")]
    pub rows: u16,

    /// Board width in columns.
    #[arg(long, default_value = "10", value_name = "COLS")]
    pub cols: u16,

    /// Time between automatic one-row drops.
    #[arg(long, default_value = "1000", value_name = "MS")]
    pub drop_interval_ms: u64,

    /// Seed for the piece generator (reproducible games).
    #[arg(long, value_name = "N")]
    pub seed: Option<u64>,

    /// Path to theme file (btop-style theme[key]=\"value\"). Uses the classic palette if not set.
    #[arg(short, long, value_name = "FILE")]
    pub theme: Option<PathBuf>,

    /// Colour palette: normal (theme), high-contrast, or colorblind.
    #[arg(long, default_value = "normal")]
    pub palette: Palette,

    /// Start playing immediately instead of waiting for Enter.
    #[arg(long)]
    pub no_menu: bool,

    /// Write diagnostics to this file (filter with RUST_LOG).
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Palette {
    #[default]
    Normal,

    #[value(alias = "highcontrast", alias = "contrast")]
    HighContrast,

    #[value(alias = "colourblind")]
    Colorblind,
}
