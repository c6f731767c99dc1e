//! Line-oriented game loop.
//!
//! Reads one command per line from `input` and writes everything the player
//! sees to `output`, so the loop runs the same against a terminal or a test
//! buffer.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use log::warn;
use puzzle_2048_core::{
    Game, GameStatus, SaveStore, ScoreArchive, ScoreRecord, MIN_SIZE,
};

use crate::commands::{Command, HELP};

/// Ask for a board size until a usable one is entered. `None` on end of input.
pub fn prompt_size<I: BufRead, O: Write>(input: &mut I, output: &mut O) -> io::Result<Option<usize>> {
    loop {
        write!(output, "Board size (e.g. 4 for 4x4): ")?;
        output.flush()?;
        let Some(line) = read_line(input)? else {
            return Ok(None);
        };
        match line.parse::<usize>() {
            Ok(size) if size >= MIN_SIZE => return Ok(Some(size)),
            _ => writeln!(output, "Please enter a whole number of at least {}.", MIN_SIZE)?,
        }
    }
}

/// Next line without its line ending, or `None` at end of input.
fn read_line<I: BufRead>(input: &mut I) -> io::Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

/// One player's game, its save slot and the optional high-score list.
pub struct Session<S, A> {
    game: Game,
    store: S,
    save_path: PathBuf,
    archive: Option<A>,
}

impl<S: SaveStore, A: ScoreArchive> Session<S, A> {
    pub fn new(game: Game, store: S, save_path: PathBuf, archive: Option<A>) -> Self {
        Session {
            game,
            store,
            save_path,
            archive,
        }
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    #[cfg(test)]
    pub fn archive(&self) -> Option<&A> {
        self.archive.as_ref()
    }

    /// Play until the player quits, declines a new game, or input runs out.
    pub fn run<I: BufRead, O: Write>(&mut self, input: &mut I, output: &mut O) -> io::Result<()> {
        writeln!(output, "=== 2048 ===")?;
        writeln!(output, "{}\n", HELP)?;
        write!(output, "{}", self.game)?;

        loop {
            write!(output, "> ")?;
            output.flush()?;
            let Some(line) = read_line(input)? else {
                break;
            };
            if line.is_empty() {
                continue;
            }

            let command = match line.parse::<Command>() {
                Ok(command) => command,
                Err(e) => {
                    writeln!(output, "{}. Type 'help' for commands.", e)?;
                    continue;
                }
            };

            match command {
                Command::Quit => {
                    writeln!(output, "Goodbye!")?;
                    break;
                }
                Command::Help => writeln!(output, "{}", HELP)?,
                Command::Move(direction) => {
                    let result = self.game.step(direction);
                    if result.changed {
                        write!(output, "{}", self.game)?;
                        if result.reward > 0 {
                            writeln!(output, "  +{} points!", result.reward)?;
                        }
                    } else if !result.status.is_terminal() {
                        writeln!(output, "Nothing moves {}.", direction)?;
                    }

                    if result.status.is_terminal() && !self.finish(input, output)? {
                        break;
                    }
                }
                Command::Save => match self.game.save_to(&self.store, &self.save_path) {
                    Ok(()) => writeln!(output, "Game saved to {}.", self.save_path.display())?,
                    Err(e) => {
                        warn!("save failed: {}", e);
                        writeln!(output, "Could not save the game: {}", e)?;
                    }
                },
                Command::Load => match self.game.load_from(&self.store, &self.save_path) {
                    Ok(()) => {
                        writeln!(output, "Game loaded from {}.", self.save_path.display())?;
                        write!(output, "{}", self.game)?;
                    }
                    Err(e) => {
                        warn!("load failed: {}", e);
                        writeln!(output, "Could not load the game: {}", e)?;
                    }
                },
                Command::Restart => {
                    self.game.reset();
                    writeln!(output, "New game.")?;
                    write!(output, "{}", self.game)?;
                }
                Command::Scores => self.print_scores(output)?,
            }
        }

        Ok(())
    }

    /// Report the end of a game, record the score and offer another round.
    /// Returns whether play continues.
    fn finish<I: BufRead, O: Write>(&mut self, input: &mut I, output: &mut O) -> io::Result<bool> {
        match self.game.status() {
            GameStatus::Won => writeln!(output, "\n  *** You reached 2048! ***")?,
            _ => writeln!(output, "\n  *** GAME OVER ***")?,
        }
        writeln!(output, "  Final Score: {}", self.game.score())?;
        writeln!(output, "  Max Tile: {}", self.game.max_tile())?;

        if let Some(archive) = self.archive.as_mut() {
            write!(output, "Enter your name for the high-score list (blank to skip): ")?;
            output.flush()?;
            let Some(name) = read_line(input)? else {
                return Ok(false);
            };
            if !name.is_empty() {
                let stored = ScoreRecord::new(&name, self.game.score())
                    .and_then(|record| archive.append(&record));
                match stored {
                    Ok(()) => writeln!(output, "Score recorded.")?,
                    Err(e) => writeln!(output, "Could not record the score: {}", e)?,
                }
            }
        }

        write!(output, "New game? [y/n]: ")?;
        output.flush()?;
        let answer = read_line(input)?.unwrap_or_default().to_ascii_lowercase();
        if answer == "y" || answer == "yes" {
            self.game.reset();
            write!(output, "{}", self.game)?;
            Ok(true)
        } else {
            writeln!(output, "Goodbye!")?;
            Ok(false)
        }
    }

    fn print_scores<O: Write>(&self, output: &mut O) -> io::Result<()> {
        let Some(archive) = self.archive.as_ref() else {
            return writeln!(output, "High scores are disabled.");
        };
        match archive.ranked() {
            Ok(records) if records.is_empty() => writeln!(output, "No high scores yet."),
            Ok(records) => {
                for (i, record) in records.iter().enumerate() {
                    writeln!(output, "{:>3}. {}: {}", i + 1, record.name, record.score)?;
                }
                Ok(())
            }
            Err(e) => writeln!(output, "Could not read high scores: {}", e),
        }
    }
}
