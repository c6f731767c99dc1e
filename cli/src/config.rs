use std::path::{Path, PathBuf};

use anyhow::{ensure, Context, Result};
use puzzle_2048_core::MIN_SIZE;

use crate::args::Args;

/// Settings for one run of the terminal game.
///
/// Read from an optional TOML file; command-line flags take precedence over
/// the file, the file over the defaults.
#[derive(Clone, Debug, PartialEq, serde::Deserialize)]
pub struct Config {
    /// Board side. `None` means ask at startup.
    #[serde(default)]
    pub size: Option<usize>,

    /// Spawn seed. `None` picks a fresh one per run.
    #[serde(default)]
    pub seed: Option<u64>,

    #[serde(default = "defaults::save_file")]
    pub save_file: PathBuf,

    #[serde(default = "defaults::scores_db")]
    pub scores_db: PathBuf,

    /// Record finished games in the high-score list.
    #[serde(default = "defaults::record_scores")]
    pub record_scores: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            size: None,
            seed: None,
            save_file: defaults::save_file(),
            scores_db: defaults::scores_db(),
            record_scores: defaults::record_scores(),
        }
    }
}

impl Config {
    pub fn from_toml<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let cfg: Self = toml::from_str(&contents)
            .with_context(|| format!("parsing config {}", path.display()))?;
        Ok(cfg)
    }

    /// Build the effective configuration for `args`.
    pub fn resolve(args: &Args) -> Result<Self> {
        let mut cfg = match &args.config {
            Some(path) => Self::from_toml(path)?,
            None => Self::default(),
        };

        if args.size.is_some() {
            cfg.size = args.size;
        }
        if args.seed.is_some() {
            cfg.seed = args.seed;
        }
        if let Some(path) = &args.save_file {
            cfg.save_file = path.clone();
        }
        if let Some(path) = &args.scores_db {
            cfg.scores_db = path.clone();
        }
        if args.no_scores {
            cfg.record_scores = false;
        }

        if let Some(size) = cfg.size {
            ensure!(size >= MIN_SIZE, "board size must be at least {}, got {}", MIN_SIZE, size);
        }
        Ok(cfg)
    }
}

mod defaults {
    use std::path::PathBuf;

    pub fn save_file() -> PathBuf { PathBuf::from("game_save.json") }
    pub fn scores_db() -> PathBuf { PathBuf::from("highscores.db") }
    pub fn record_scores() -> bool { true }
}
