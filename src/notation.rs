use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::board::{Coord, ROWS};
use crate::movegen::Move;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NotationError {
    #[error("invalid square `{0}`")]
    InvalidSquare(String),
    #[error("invalid move `{0}`, expected something like `e2e4`")]
    InvalidMove(String),
    #[error("pawns always promote to a queen, `{0}` is not supported")]
    UnsupportedPromotion(char),
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let file = (b'a' + self.col) as char;
        let rank = ROWS as u8 - self.row;
        write!(f, "{}{}", file, rank)
    }
}

impl FromStr for Coord {
    type Err = NotationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || NotationError::InvalidSquare(s.to_string());
        let mut chars = s.chars();
        let (Some(file), Some(rank), None) = (chars.next(), chars.next(), chars.next()) else {
            return Err(invalid());
        };

        let col = match file {
            'a'..='h' => file as u8 - b'a',
            _ => return Err(invalid()),
        };
        let row = match rank {
            '1'..='8' => b'8' - rank as u8,
            _ => return Err(invalid()),
        };
        Ok(Coord::new(row, col))
    }
}

/// Coordinate notation, `e2e4`.
impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)
    }
}

/// Splits coordinate move text into origin and destination.
///
/// A trailing `q` is accepted since promotion is always to a queen; any other
/// promotion letter is rejected.
pub fn parse_uci(text: &str) -> Result<(Coord, Coord), NotationError> {
    let text = text.trim();
    if !text.is_ascii() || (text.len() != 4 && text.len() != 5) {
        return Err(NotationError::InvalidMove(text.to_string()));
    }

    let from = text[0..2].parse::<Coord>()?;
    let to = text[2..4].parse::<Coord>()?;

    if let Some(promotion) = text[4..].chars().next() {
        match promotion.to_ascii_lowercase() {
            'q' => {}
            'r' | 'b' | 'n' => return Err(NotationError::UnsupportedPromotion(promotion)),
            _ => return Err(NotationError::InvalidMove(text.to_string())),
        }
    }
    Ok((from, to))
}
