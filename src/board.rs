use std::fmt;

use thiserror::Error;

use crate::movegen::Move;

pub const ROWS: usize = 8;
pub const COLS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    White,
    Black,
}

impl Color {
    pub fn opposite(&self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    /// Row delta a pawn of this color advances by. White starts at the bottom (rows 6-7).
    pub fn pawn_direction(&self) -> i8 {
        match self {
            Color::White => -1,
            Color::Black => 1,
        }
    }

    pub fn back_row(&self) -> u8 {
        match self {
            Color::White => 7,
            Color::Black => 0,
        }
    }

    pub fn pawn_row(&self) -> u8 {
        match self {
            Color::White => 6,
            Color::Black => 1,
        }
    }

    /// The row a pawn must stand on to capture en passant (its fifth rank).
    pub fn en_passant_row(&self) -> u8 {
        match self {
            Color::White => 3,
            Color::Black => 4,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Color::White => write!(f, "white"),
            Color::Black => write!(f, "black"),
        }
    }
}

/// A board coordinate. Row 0 is rank 8, col 0 is file a.
///
/// Outside this crate a `Coord` only comes from [`Coord::try_new`],
/// [`Coord::offset`] or parsing, so it always names a square on the board.
///
/// ```compile_fail
/// let _ = salmon_rules::Coord::new(8, 0);
/// ```
///
/// ```compile_fail
/// let _ = salmon_rules::Coord { row: 8, col: 0 };
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Coord {
    pub(crate) row: u8,
    pub(crate) col: u8,
}

impl Coord {
    /// Callers must keep `row` and `col` below 8.
    pub(crate) const fn new(row: u8, col: u8) -> Self {
        Self { row, col }
    }

    pub fn row(self) -> u8 {
        self.row
    }

    pub fn col(self) -> u8 {
        self.col
    }

    pub fn try_new(row: usize, col: usize) -> Result<Self, BoardError> {
        if row < ROWS && col < COLS {
            Ok(Self::new(row as u8, col as u8))
        } else {
            Err(BoardError::OutOfRange { row, col })
        }
    }

    /// The coordinate `(dr, dc)` away, or `None` when that falls off the board.
    pub fn offset(self, dr: i8, dc: i8) -> Option<Coord> {
        let row = self.row as i8 + dr;
        let col = self.col as i8 + dc;
        if in_range(row) && in_range(col) {
            Some(Coord::new(row as u8, col as u8))
        } else {
            None
        }
    }
}

pub fn in_range(value: i8) -> bool {
    (0..ROWS as i8).contains(&value)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PieceKind {
    Pawn {
        en_passant: bool,
    },
    Knight,
    Bishop,
    Rook,
    Queen,
    /// Rook coordinates are only filled in once castling on that side has been validated.
    King {
        left_rook: Option<Coord>,
        right_rook: Option<Coord>,
    },
}

impl PieceKind {
    pub const PAWN: PieceKind = PieceKind::Pawn { en_passant: false };
    pub const KING: PieceKind = PieceKind::King {
        left_rook: None,
        right_rook: None,
    };

    pub fn name(&self) -> &'static str {
        match self {
            PieceKind::Pawn { .. } => "pawn",
            PieceKind::Knight => "knight",
            PieceKind::Bishop => "bishop",
            PieceKind::Rook => "rook",
            PieceKind::Queen => "queen",
            PieceKind::King { .. } => "king",
        }
    }

    /// Lowercase letter used by the board-position text notation.
    pub fn letter(&self) -> char {
        match self {
            PieceKind::Pawn { .. } => 'p',
            PieceKind::Knight => 'n',
            PieceKind::Bishop => 'b',
            PieceKind::Rook => 'r',
            PieceKind::Queen => 'q',
            PieceKind::King { .. } => 'k',
        }
    }

    pub fn is_pawn(&self) -> bool {
        matches!(self, PieceKind::Pawn { .. })
    }

    pub fn is_king(&self) -> bool {
        matches!(self, PieceKind::King { .. })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Piece {
    pub color: Color,
    pub kind: PieceKind,
    pub moved: bool,
    /// Legal moves as of the last `calc_moves` call. Cleared whenever the piece moves.
    pub moves: Vec<Move>,
}

impl Piece {
    pub fn new(color: Color, kind: PieceKind) -> Self {
        Self {
            color,
            kind,
            moved: false,
            moves: Vec::new(),
        }
    }

    pub fn pawn(color: Color) -> Self {
        Self::new(color, PieceKind::PAWN)
    }

    pub fn knight(color: Color) -> Self {
        Self::new(color, PieceKind::Knight)
    }

    pub fn bishop(color: Color) -> Self {
        Self::new(color, PieceKind::Bishop)
    }

    pub fn rook(color: Color) -> Self {
        Self::new(color, PieceKind::Rook)
    }

    pub fn queen(color: Color) -> Self {
        Self::new(color, PieceKind::Queen)
    }

    pub fn king(color: Color) -> Self {
        Self::new(color, PieceKind::KING)
    }

    pub fn direction(&self) -> i8 {
        self.color.pawn_direction()
    }

    pub fn en_passant(&self) -> bool {
        matches!(self.kind, PieceKind::Pawn { en_passant: true })
    }

    pub fn add_move(&mut self, mv: Move) {
        if !self.moves.contains(&mv) {
            self.moves.push(mv);
        }
    }

    pub fn clear_moves(&mut self) {
        self.moves.clear();
    }

    pub fn is_legal_move(&self, mv: &Move) -> bool {
        self.moves.contains(mv)
    }

    /// Notation letter: uppercase for white, lowercase for black.
    pub fn symbol(&self) -> char {
        match self.color {
            Color::White => self.kind.letter().to_ascii_uppercase(),
            Color::Black => self.kind.letter(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Square {
    pub(crate) row: u8,
    pub(crate) col: u8,
    pub piece: Option<Piece>,
}

impl Square {
    pub(crate) fn new(row: u8, col: u8) -> Self {
        Self {
            row,
            col,
            piece: None,
        }
    }

    pub fn coord(&self) -> Coord {
        Coord::new(self.row, self.col)
    }

    pub fn has_piece(&self) -> bool {
        self.piece.is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.piece.is_none()
    }

    pub fn has_team_piece(&self, color: Color) -> bool {
        self.piece.as_ref().is_some_and(|p| p.color == color)
    }

    pub fn has_enemy_piece(&self, color: Color) -> bool {
        self.piece.as_ref().is_some_and(|p| p.color != color)
    }

    pub fn is_empty_or_enemy(&self, color: Color) -> bool {
        self.is_empty() || self.has_enemy_piece(color)
    }

    pub fn kind(&self) -> Option<PieceKind> {
        self.piece.as_ref().map(|p| p.kind)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BoardError {
    #[error("no piece on {0}")]
    EmptySquare(Coord),
    #[error("({row}, {col}) is off the board")]
    OutOfRange { row: usize, col: usize },
    #[error("king on {0} has no rook registered for this castling move")]
    MissingCastlingRook(Coord),
}

/// What a simulated move displaced, so it can be put back exactly.
#[derive(Debug)]
pub(crate) struct Undo {
    mv: Move,
    piece: Piece,
    captured: Option<(Coord, Piece)>,
    last_move: Option<Move>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Board {
    pub squares: [[Square; COLS]; ROWS],
    pub last_move: Option<Move>,
}

impl Board {
    /// Standard starting layout.
    pub fn new() -> Self {
        let mut board = Self::empty();
        board.add_pieces(Color::White);
        board.add_pieces(Color::Black);
        board
    }

    pub fn empty() -> Self {
        Self {
            squares: std::array::from_fn(|row| {
                std::array::from_fn(|col| Square::new(row as u8, col as u8))
            }),
            last_move: None,
        }
    }

    fn add_pieces(&mut self, color: Color) {
        let pawn_row = color.pawn_row();
        let back_row = color.back_row();
        for col in 0..COLS as u8 {
            self.place(Coord::new(pawn_row, col), Piece::pawn(color));
        }
        let back_rank = [
            PieceKind::Rook,
            PieceKind::Knight,
            PieceKind::Bishop,
            PieceKind::Queen,
            PieceKind::KING,
            PieceKind::Bishop,
            PieceKind::Knight,
            PieceKind::Rook,
        ];
        for (col, kind) in back_rank.into_iter().enumerate() {
            self.place(Coord::new(back_row, col as u8), Piece::new(color, kind));
        }
    }

    pub fn square(&self, at: Coord) -> &Square {
        &self.squares[at.row as usize][at.col as usize]
    }

    pub fn square_mut(&mut self, at: Coord) -> &mut Square {
        &mut self.squares[at.row as usize][at.col as usize]
    }

    pub fn piece_at(&self, at: Coord) -> Option<&Piece> {
        self.square(at).piece.as_ref()
    }

    pub fn piece_at_mut(&mut self, at: Coord) -> Option<&mut Piece> {
        self.square_mut(at).piece.as_mut()
    }

    /// Puts `piece` on `at`, returning whatever stood there.
    pub fn place(&mut self, at: Coord, piece: Piece) -> Option<Piece> {
        self.square_mut(at).piece.replace(piece)
    }

    pub fn remove(&mut self, at: Coord) -> Option<Piece> {
        self.square_mut(at).piece.take()
    }

    /// Every occupied square, rank 8 first.
    pub fn pieces(&self) -> impl Iterator<Item = (Coord, &Piece)> + '_ {
        self.squares
            .iter()
            .flatten()
            .filter_map(|sq| sq.piece.as_ref().map(|p| (sq.coord(), p)))
    }

    pub fn find_king(&self, color: Color) -> Option<Coord> {
        self.pieces()
            .find(|(_, p)| p.color == color && p.kind.is_king())
            .map(|(at, _)| at)
    }

    /// Moves the piece on `mv.from` to `mv.to`. Legality is the caller's business.
    ///
    /// A diagonal pawn move onto an empty square removes the pawn beside the
    /// origin (en passant); a pawn reaching the last row becomes a queen. A king
    /// moving two columns also moves the rook recorded for that side, unless
    /// `simulated` is set.
    pub fn apply_move(&mut self, mv: &Move, simulated: bool) -> Result<(), BoardError> {
        let piece = self
            .piece_at(mv.from)
            .ok_or(BoardError::EmptySquare(mv.from))?;

        let castling_rook = match piece.kind {
            PieceKind::King {
                left_rook,
                right_rook,
            } if mv.is_castling() && !simulated => {
                let rook = if mv.to.col < mv.from.col {
                    left_rook
                } else {
                    right_rook
                };
                Some(rook.ok_or(BoardError::MissingCastlingRook(mv.from))?)
            }
            _ => None,
        };

        let Some(mut piece) = self.remove(mv.from) else {
            return Err(BoardError::EmptySquare(mv.from));
        };
        let target_was_empty = self.square(mv.to).is_empty();

        if piece.kind.is_pawn() {
            if mv.to.col != mv.from.col && target_was_empty {
                self.remove(Coord::new(mv.from.row, mv.to.col));
            } else if mv.to.row == 0 || mv.to.row == 7 {
                piece.kind = PieceKind::Queen;
            }
        }

        piece.moved = true;
        piece.clear_moves();
        self.place(mv.to, piece);

        if let Some(rook_from) = castling_rook {
            let rook_col = if rook_from.col < mv.from.col { 3 } else { 5 };
            let rook_move = Move::new(rook_from, Coord::new(rook_from.row, rook_col));
            self.apply_move(&rook_move, false)?;
        }

        self.last_move = Some(*mv);
        Ok(())
    }

    /// Applies `mv` without the castling cascade and remembers how to revert it.
    pub(crate) fn simulate(&mut self, mv: &Move) -> Result<Undo, BoardError> {
        let piece = self
            .piece_at(mv.from)
            .cloned()
            .ok_or(BoardError::EmptySquare(mv.from))?;

        let en_passant = piece.kind.is_pawn()
            && mv.to.col != mv.from.col
            && self.square(mv.to).is_empty();
        let captured_at = if en_passant {
            Coord::new(mv.from.row, mv.to.col)
        } else {
            mv.to
        };
        let captured = self
            .piece_at(captured_at)
            .cloned()
            .map(|p| (captured_at, p));
        let last_move = self.last_move;

        self.apply_move(mv, true)?;
        Ok(Undo {
            mv: *mv,
            piece,
            captured,
            last_move,
        })
    }

    pub(crate) fn undo(&mut self, undo: Undo) {
        self.remove(undo.mv.to);
        self.place(undo.mv.from, undo.piece);
        if let Some((at, piece)) = undo.captured {
            self.place(at, piece);
        }
        self.last_move = undo.last_move;
    }

    /// Whether `mv` is among the moves last computed for the piece on `mv.from`.
    pub fn is_legal_move(&self, mv: &Move) -> bool {
        self.piece_at(mv.from).is_some_and(|p| p.is_legal_move(mv))
    }

    /// Makes the pawn on `at` the only one flagged as capturable en passant.
    /// Does nothing when `at` holds anything but a pawn.
    pub fn set_true_en_passant(&mut self, at: Coord) {
        if !self.piece_at(at).is_some_and(|p| p.kind.is_pawn()) {
            return;
        }
        self.clear_en_passant();
        if let Some(Piece {
            kind: PieceKind::Pawn { en_passant },
            ..
        }) = self.piece_at_mut(at)
        {
            *en_passant = true;
        }
    }

    pub fn clear_en_passant(&mut self) {
        for square in self.squares.iter_mut().flatten() {
            if let Some(Piece {
                kind: PieceKind::Pawn { en_passant },
                ..
            }) = square.piece.as_mut()
            {
                *en_passant = false;
            }
        }
    }

    /// Pawns currently flagged as capturable en passant.
    pub fn en_passant_pawns(&self) -> Vec<Coord> {
        self.pieces()
            .filter(|(_, p)| p.en_passant())
            .map(|(at, _)| at)
            .collect()
    }

    /// Piece placement field of the board-position notation, rank 8 first.
    pub fn placement(&self) -> String {
        let mut ranks = Vec::with_capacity(ROWS);
        for row in &self.squares {
            let mut rank = String::new();
            let mut empty = 0;
            for square in row {
                match &square.piece {
                    None => empty += 1,
                    Some(piece) => {
                        if empty > 0 {
                            rank.push_str(&empty.to_string());
                            empty = 0;
                        }
                        rank.push(piece.symbol());
                    }
                }
            }
            if empty > 0 {
                rank.push_str(&empty.to_string());
            }
            ranks.push(rank);
        }
        ranks.join("/")
    }

    // Castling rights, en passant target and clocks are not tracked; they are
    // written as the fixed `- - 0 1` tail external analysers accept.
    pub fn to_fen(&self, side_to_move: Color) -> String {
        let side = match side_to_move {
            Color::White => 'w',
            Color::Black => 'b',
        };
        format!("{} {} - - 0 1", self.placement(), side)
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut result = String::new();
        for (row, squares) in self.squares.iter().enumerate() {
            result.push_str(&format!("{} ", ROWS - row));
            for (col, square) in squares.iter().enumerate() {
                result.push(square.piece.as_ref().map_or('.', Piece::symbol));
                if col < COLS - 1 {
                    result.push(' ');
                }
            }
            result.push('\n');
        }
        result.push_str("  a b c d e f g h");
        write!(f, "{}", result)
    }
}
