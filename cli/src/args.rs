use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug, Default)]
#[command(name = "puzzle-2048")]
#[command(author, version, about = "Play 2048 in the terminal")]
pub struct Args {
    /// Board side length (asked for interactively when omitted)
    #[arg(short = 'n', long)]
    pub size: Option<usize>,

    /// Random seed for deterministic runs
    #[arg(short, long)]
    pub seed: Option<u64>,

    /// Optional TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Where `save` and `load` keep the game
    #[arg(long, value_name = "FILE")]
    pub save_file: Option<PathBuf>,

    /// SQLite database holding the high-score list
    #[arg(long, value_name = "FILE")]
    pub scores_db: Option<PathBuf>,

    /// Do not record or show high scores
    #[arg(long)]
    pub no_scores: bool,
}
