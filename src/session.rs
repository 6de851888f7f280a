use std::io::{BufRead, Write};

use anyhow::{bail, Result};

use crate::board::Coord;
use crate::game::{EnPassantPolicy, Game, GameStatus};

const HELP: &str = "\
commands:
  <move>          play a move in coordinate form, e.g. e2e4 (promotion is always to a queen)
  moves <square>  list legal moves of the piece on <square>
  board           print the board
  fen             print the position in board notation
  history         list the moves played so far
  status          report check, mate or stalemate
  reset           start a new game
  help            show this text
  quit            leave
";

/// A text front end over [`Game`]: one command in, one reply out.
pub struct Session {
    game: Game,
}

impl Session {
    pub fn new(policy: EnPassantPolicy) -> Self {
        Self {
            game: Game::new(policy),
        }
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn run<R: BufRead, W: Write>(&mut self, mut reader: R, mut writer: W) -> Result<()> {
        writeln!(writer, "{}", self.game.board())?;
        write!(writer, "{} to move> ", self.game.next_player())?;
        writer.flush()?;

        let mut line = String::new();
        while reader.read_line(&mut line)? > 0 {
            let command = line.trim();
            if command == "quit" || command == "exit" {
                break;
            }

            match self.handle_command(command) {
                Ok(response) => write!(writer, "{}", response)?,
                Err(e) => {
                    log::warn!("command `{}` failed: {}", command, e);
                    writeln!(writer, "error: {}", e)?;
                }
            }
            write!(writer, "{} to move> ", self.game.next_player())?;
            writer.flush()?;
            line.clear();
        }
        writeln!(writer)?;
        Ok(())
    }

    pub fn handle_command(&mut self, command: &str) -> Result<String> {
        let parts: Vec<&str> = command.split_whitespace().collect();
        if parts.is_empty() {
            return Ok(String::new());
        }

        match parts[0] {
            "help" => Ok(HELP.to_string()),
            "board" => Ok(format!("{}\n", self.game.board())),
            "fen" => Ok(format!("{}\n", self.game.fen())),
            "history" => Ok(self.handle_history()),
            "status" => Ok(format!("{}\n", self.game.status()?)),
            "reset" | "new" => {
                self.game.reset();
                Ok(format!("{}\n", self.game.board()))
            }
            "moves" => self.handle_moves(&parts[1..]),
            mv => self.handle_move(mv),
        }
    }

    fn handle_moves(&mut self, parts: &[&str]) -> Result<String> {
        let Some(square) = parts.first() else {
            bail!("usage: moves <square>");
        };
        let at: Coord = square.parse()?;
        let moves = self.game.select(at)?;
        let targets: Vec<String> = moves.iter().map(|mv| mv.to.to_string()).collect();
        if targets.is_empty() {
            Ok(format!("{}: no legal moves\n", at))
        } else {
            Ok(format!("{}: {}\n", at, targets.join(" ")))
        }
    }

    fn handle_move(&mut self, text: &str) -> Result<String> {
        let record = self.game.play_uci(text)?;
        let mut response = format!("{}\n", self.game.board());
        if let Some(captured) = record.mv.captured {
            response.push_str(&format!("{} takes {}\n", record, captured.name()));
        }
        match self.game.status()? {
            GameStatus::Ongoing => {}
            status => response.push_str(&format!("{}\n", status)),
        }
        Ok(response)
    }

    fn handle_history(&self) -> String {
        let mut result = String::new();
        for (i, pair) in self.game.history().chunks(2).enumerate() {
            let plies: Vec<String> = pair.iter().map(|r| r.to_string()).collect();
            result.push_str(&format!("{}. {}\n", i + 1, plies.join(" ")));
        }
        result
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(EnPassantPolicy::default())
    }
}
