use std::fmt;

use thiserror::Error;

use crate::board::{Board, BoardError, Color, Coord, PieceKind};
use crate::movegen::Move;
use crate::notation::{parse_uci, NotationError};

/// When a pawn becomes capturable en passant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnPassantPolicy {
    /// Standard rules: only right after a two-square advance, and only for one ply.
    #[default]
    DoubleStepOnly,
    /// Every pawn move flags the pawn that moved; the flag stays until another pawn moves.
    EveryPawnMove,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    Ongoing,
    /// The side to move is in check but has a way out.
    Check(Color),
    Checkmate { winner: Color },
    Stalemate,
}

impl GameStatus {
    pub fn is_over(&self) -> bool {
        matches!(self, GameStatus::Checkmate { .. } | GameStatus::Stalemate)
    }
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            GameStatus::Ongoing => write!(f, "ongoing"),
            GameStatus::Check(color) => write!(f, "{} is in check", color),
            GameStatus::Checkmate { winner } => write!(f, "checkmate, {} wins", winner),
            GameStatus::Stalemate => write!(f, "stalemate"),
        }
    }
}

/// One committed ply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveRecord {
    pub color: Color,
    pub piece: PieceKind,
    pub mv: Move,
    pub castling: bool,
    pub en_passant: bool,
    pub promotion: bool,
}

impl fmt::Display for MoveRecord {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.mv)?;
        if self.promotion {
            write!(f, "q")?;
        }
        Ok(())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error(transparent)]
    Board(#[from] BoardError),
    #[error(transparent)]
    Notation(#[from] NotationError),
    #[error("it is {expected}'s turn, the piece on {at} is {found}")]
    NotYourTurn {
        at: Coord,
        expected: Color,
        found: Color,
    },
    #[error("{0} is not a legal move")]
    IllegalMove(Move),
    #[error("the game is over: {0}")]
    GameOver(GameStatus),
}

/// A board plus the turn bookkeeping around it.
#[derive(Debug, Clone)]
pub struct Game {
    board: Board,
    next_player: Color,
    policy: EnPassantPolicy,
    history: Vec<MoveRecord>,
}

impl Game {
    pub fn new(policy: EnPassantPolicy) -> Self {
        Self {
            board: Board::new(),
            next_player: Color::White,
            policy,
            history: Vec::new(),
        }
    }

    /// Continues from an arbitrary position with `next_player` to move.
    pub fn from_board(board: Board, next_player: Color, policy: EnPassantPolicy) -> Self {
        Self {
            board,
            next_player,
            policy,
            history: Vec::new(),
        }
    }

    pub fn reset(&mut self) {
        log::info!("starting a new game");
        *self = Self::new(self.policy);
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn next_player(&self) -> Color {
        self.next_player
    }

    pub fn policy(&self) -> EnPassantPolicy {
        self.policy
    }

    pub fn history(&self) -> &[MoveRecord] {
        &self.history
    }

    pub fn fen(&self) -> String {
        self.board.to_fen(self.next_player)
    }

    /// Legal moves of the side to move's piece on `at`.
    pub fn select(&mut self, at: Coord) -> Result<&[Move], GameError> {
        let piece = self.board.piece_at(at).ok_or(BoardError::EmptySquare(at))?;
        if piece.color != self.next_player {
            return Err(GameError::NotYourTurn {
                at,
                expected: self.next_player,
                found: piece.color,
            });
        }
        self.board.calc_moves(at.row as usize, at.col as usize, true)?;
        Ok(self
            .board
            .piece_at(at)
            .map_or(&[][..], |p| p.moves.as_slice()))
    }

    /// Every legal move available to the side to move.
    pub fn legal_moves(&mut self) -> Result<Vec<Move>, GameError> {
        let own: Vec<Coord> = self
            .board
            .pieces()
            .filter(|(_, p)| p.color == self.next_player)
            .map(|(at, _)| at)
            .collect();

        let mut moves = Vec::new();
        for at in own {
            moves.extend_from_slice(self.select(at)?);
        }
        Ok(moves)
    }

    /// Validates and commits a move for the side to move, then passes the turn.
    pub fn play(&mut self, from: Coord, to: Coord) -> Result<MoveRecord, GameError> {
        let status = self.status()?;
        if status.is_over() {
            return Err(GameError::GameOver(status));
        }

        let requested = Move::new(from, to);
        self.select(from)?;
        if !self.board.is_legal_move(&requested) {
            return Err(GameError::IllegalMove(requested));
        }

        let piece = self.board.piece_at(from).ok_or(BoardError::EmptySquare(from))?;
        let kind = piece.kind;
        // the generated twin carries the captured-piece snapshot
        let mv = piece
            .moves
            .iter()
            .find(|m| **m == requested)
            .copied()
            .unwrap_or(requested);

        let record = MoveRecord {
            color: self.next_player,
            piece: kind,
            mv,
            castling: kind.is_king() && mv.is_castling(),
            en_passant: kind.is_pawn()
                && from.col != to.col
                && self.board.square(to).is_empty(),
            promotion: kind.is_pawn() && (to.row == 0 || to.row == 7),
        };

        self.board.apply_move(&mv, false)?;
        self.commit_en_passant(kind, &mv);

        log::debug!("{} plays {} ({})", record.color, record, kind.name());
        self.history.push(record);
        self.next_player = self.next_player.opposite();
        Ok(record)
    }

    pub fn play_uci(&mut self, text: &str) -> Result<MoveRecord, GameError> {
        let (from, to) = parse_uci(text)?;
        self.play(from, to)
    }

    fn commit_en_passant(&mut self, kind: PieceKind, mv: &Move) {
        match self.policy {
            EnPassantPolicy::DoubleStepOnly => {
                self.board.clear_en_passant();
                if kind.is_pawn() && mv.from.row.abs_diff(mv.to.row) == 2 {
                    self.board.set_true_en_passant(mv.to);
                }
            }
            EnPassantPolicy::EveryPawnMove => {
                if kind.is_pawn() {
                    self.board.clear_en_passant();
                    self.board.set_true_en_passant(mv.to);
                }
            }
        }
    }

    pub fn status(&mut self) -> Result<GameStatus, GameError> {
        let in_check = self.board.king_in_check(self.next_player);
        let can_move = !self.legal_moves()?.is_empty();
        Ok(match (in_check, can_move) {
            (true, true) => GameStatus::Check(self.next_player),
            (true, false) => GameStatus::Checkmate {
                winner: self.next_player.opposite(),
            },
            (false, true) => GameStatus::Ongoing,
            (false, false) => GameStatus::Stalemate,
        })
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new(EnPassantPolicy::default())
    }
}
