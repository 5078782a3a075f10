use anyhow::{Context, Result};
use clap::Parser;
use grid_snake::game::GameConfig;
use grid_snake::modes::HumanMode;
use grid_snake::persistence::{HighScoreStore, JsonFileStore, MemoryStore};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "grid_snake")]
#[command(version, about = "Snake on a wraparound grid")]
struct Cli {
    /// JSON file with a full game configuration; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Grid width
    #[arg(long)]
    width: Option<usize>,

    /// Grid height
    #[arg(long)]
    height: Option<usize>,

    /// Initial tick interval in milliseconds
    #[arg(long)]
    speed: Option<u64>,

    /// Seed for food placement
    #[arg(long)]
    seed: Option<u64>,

    /// Where the high score is kept
    #[arg(long, default_value = "snake_high_score.json")]
    high_score_file: PathBuf,

    /// Keep the high score in memory only
    #[arg(long)]
    no_persist: bool,

    /// Write logs to this file (the terminal is taken by the game)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

impl Cli {
    fn game_config(&self) -> Result<GameConfig> {
        let mut config = match &self.config {
            Some(path) => GameConfig::load(path)?,
            None => GameConfig::default(),
        };

        if let Some(width) = self.width {
            config.grid_width = width;
        }
        if let Some(height) = self.height {
            config.grid_height = height;
        }
        if let Some(speed) = self.speed {
            config.initial_speed_ms = speed;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }

        config.validate().context("Invalid game configuration")?;
        Ok(config)
    }

    fn high_score_store(&self) -> Box<dyn HighScoreStore> {
        if self.no_persist {
            Box::new(MemoryStore::new())
        } else {
            Box::new(JsonFileStore::new(&self.high_score_file))
        }
    }
}

fn init_logging(path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("Failed to create log file {:?}", path))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "grid_snake=info".into()),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(path) = &cli.log_file {
        init_logging(path)?;
    }

    let config = cli.game_config()?;
    info!(
        "Starting {}x{} game at {}ms per tick",
        config.grid_width, config.grid_height, config.initial_speed_ms
    );

    let (mut human_mode, mut ticker) = HumanMode::new(config, cli.high_score_store())?;
    human_mode.run(&mut ticker).await?;

    Ok(())
}
