mod input;
mod terminal;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use maze_core::{
    ObjectKind,
    config::{GameConfig, Progression},
    driver::{Driver, RunExit},
    map::MazeMap,
    session::GameSession,
};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::{input::KeyboardInput, terminal::TerminalRenderer};

const DEFAULT_MAPS: [&str; 2] = ["maps/level1.txt", "maps/level2.txt"];

#[derive(Parser, Debug)]
#[command(version, about = "Collect every object, then reach the guard", long_about = None)]
struct Args {
    /// Map file for one level. Repeat for a campaign, in play order.
    #[arg(short, long = "map", value_name = "MAP_FILE")]
    maps: Vec<PathBuf>,

    /// Seed for object placement
    #[arg(short, long, env = "MAZE_SEED")]
    seed: Option<u64>,

    /// Minimum milliseconds between two ticks
    #[arg(long, env = "MAZE_TICK_MS", default_value_t = 100)]
    tick_ms: u64,

    /// Milliseconds the win or game over message stays up
    #[arg(long, env = "MAZE_PAUSE_MS", default_value_t = 2000)]
    pause_ms: u64,

    /// Milliseconds the level banner stays up
    #[arg(long, env = "MAZE_INTRO_MS", default_value_t = 1000)]
    intro_ms: u64,

    /// Stop after the first level is won instead of playing the campaign
    #[arg(long)]
    single_level: bool,

    /// Directory for the log file
    #[arg(long, env = "MAZE_LOG_DIR", default_value = "logs")]
    log_dir: PathBuf,
}

impl Args {
    fn game_config(&self) -> GameConfig {
        GameConfig {
            tick_interval_ms: self.tick_ms,
            outcome_pause_ms: self.pause_ms,
            level_intro_ms: self.intro_ms,
            seed: self.seed,
            progression: if self.single_level {
                Progression::SingleLevel
            } else {
                Progression::Campaign
            },
            ..GameConfig::default()
        }
    }

    fn map_files(&self) -> Vec<PathBuf> {
        if self.maps.is_empty() {
            DEFAULT_MAPS.iter().map(PathBuf::from).collect()
        } else {
            self.maps.clone()
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    let _log_guard = setup_logging(&args.log_dir)?;

    let config = args.game_config();
    let levels = args
        .map_files()
        .iter()
        .map(|path| load_map(path))
        .collect::<Result<Vec<_>>>()?;

    let seed = config.resolve_seed();
    tracing::info!(seed, levels = levels.len(), "Starting game");
    let mut session = GameSession::seeded(levels, ObjectKind::ALL.to_vec(), config.progression, seed)
        .context("Failed to set up the game")?;

    let renderer = TerminalRenderer::setup()?;
    let input = KeyboardInput::new(renderer.reports_key_release());
    let mut driver = Driver::new(input, renderer, config);

    let result = driver.run(&mut session);

    let (_, renderer) = driver.into_parts();
    renderer.restore()?;

    match result.context("Failed to load the next level")? {
        RunExit::Quit => tracing::info!("Player quit"),
        RunExit::Completed => tracing::info!("Campaign finished"),
    }
    Ok(())
}

/// Reads and parses one level file.
fn load_map(path: &Path) -> Result<MazeMap> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read map file: {}", path.display()))?;
    MazeMap::parse(&text).with_context(|| format!("Malformed map file: {}", path.display()))
}

/// Logs to `<log_dir>/maze.log`. The terminal belongs to the game, so nothing
/// goes to stderr. Keep the guard alive until exit.
fn setup_logging(log_dir: &Path) -> Result<WorkerGuard> {
    std::fs::create_dir_all(log_dir)
        .with_context(|| format!("Failed to create log directory: {}", log_dir.display()))?;

    let file_appender = tracing_appender::rolling::never(log_dir, "maze.log");
    let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .init();

    tracing::info!("Log file: {}/maze.log", log_dir.display());
    Ok(guard)
}
