use std::str::FromStr;

use puzzle_2048_core::{Direction, GameError};

/// One line of player input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Move(Direction),
    Save,
    Load,
    Restart,
    Scores,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "quit" | "q" | "exit" => Ok(Command::Quit),
            "save" => Ok(Command::Save),
            "load" => Ok(Command::Load),
            "restart" | "r" | "new" => Ok(Command::Restart),
            "scores" | "highscores" => Ok(Command::Scores),
            "help" | "h" | "?" => Ok(Command::Help),
            _ => s.parse().map(Command::Move),
        }
    }
}

pub const HELP: &str = "\
Commands:
  up, down, left, right   slide the tiles (w, s, a, d also work)
  save, load              store or restore the game
  restart                 start a new game
  scores                  show the high-score list
  quit                    leave";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_moves_and_keys() {
        assert_eq!("left".parse::<Command>().unwrap(), Command::Move(Direction::Left));
        assert_eq!("W".parse::<Command>().unwrap(), Command::Move(Direction::Up));
        assert_eq!("s".parse::<Command>().unwrap(), Command::Move(Direction::Down));
    }

    #[test]
    fn parses_control_words() {
        assert_eq!("quit".parse::<Command>().unwrap(), Command::Quit);
        assert_eq!(" Q ".parse::<Command>().unwrap(), Command::Quit);
        assert_eq!("save".parse::<Command>().unwrap(), Command::Save);
        assert_eq!("load".parse::<Command>().unwrap(), Command::Load);
        assert_eq!("restart".parse::<Command>().unwrap(), Command::Restart);
        assert_eq!("scores".parse::<Command>().unwrap(), Command::Scores);
    }

    #[test]
    fn unknown_word_is_invalid_direction() {
        assert!(matches!(
            "jump".parse::<Command>(),
            Err(GameError::InvalidDirection(_))
        ));
    }
}
