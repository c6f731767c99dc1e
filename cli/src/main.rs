//! # 2048 CLI
//!
//! Play 2048 in the terminal, one command per line. Games can be saved to a
//! JSON file and finished games are recorded in a SQLite high-score list.

mod args;
mod commands;
mod config;
mod session;

use std::io::{self, Write};

use anyhow::{Context, Result};
use clap::Parser;
use env_logger::Env;
use log::{info, warn};
use puzzle_2048_core::{Game, JsonFileStore, SqliteArchive};

use args::Args;
use config::Config;
use session::{prompt_size, Session};

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();
    let args = Args::parse();
    let config = Config::resolve(&args)?;

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout().lock();

    let size = match config.size {
        Some(size) => size,
        None => match prompt_size(&mut input, &mut output)? {
            Some(size) => size,
            None => return Ok(()),
        },
    };
    let seed = config.seed.unwrap_or_else(rand::random);
    info!("starting a {0}x{0} game with seed {1}", size, seed);
    let game = Game::new(size, seed).context("creating game")?;

    let archive = if config.record_scores {
        match SqliteArchive::open(&config.scores_db) {
            Ok(archive) => Some(archive),
            Err(e) => {
                warn!("high-score list unavailable: {}", e);
                writeln!(output, "High scores disabled: {}", e)?;
                None
            }
        }
    } else {
        None
    };

    let mut session = Session::new(game, JsonFileStore::new(), config.save_file.clone(), archive);
    session.run(&mut input, &mut output)?;
    output.flush()?;
    info!("session ended with score {}", session.game().score());
    Ok(())
}
