use std::hash::{Hash, Hasher};

use crate::board::{Board, BoardError, Color, Coord, Piece, PieceKind};

/// A transition between two squares.
///
/// `captured` is a snapshot of the piece taken by the move (for en passant,
/// the pawn beside the origin). Equality and hashing only look at the
/// coordinates, so a bare `Move::new(from, to)` finds its generated twin.
#[derive(Debug, Clone, Copy, Eq)]
pub struct Move {
    pub from: Coord,
    pub to: Coord,
    pub captured: Option<PieceKind>,
}

impl Move {
    pub fn new(from: Coord, to: Coord) -> Self {
        Self {
            from,
            to,
            captured: None,
        }
    }

    pub fn new_capture(from: Coord, to: Coord, captured: Option<PieceKind>) -> Self {
        Self { from, to, captured }
    }

    pub fn is_capture(&self) -> bool {
        self.captured.is_some()
    }

    /// Two-column shift along a row. Only meaningful for king moves.
    pub fn is_castling(&self) -> bool {
        self.from.row == self.to.row && self.from.col.abs_diff(self.to.col) == 2
    }
}

impl PartialEq for Move {
    fn eq(&self, other: &Self) -> bool {
        self.from == other.from && self.to == other.to
    }
}

impl Hash for Move {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.from.hash(state);
        self.to.hash(state);
    }
}

const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (-2, 1),
    (-1, 2),
    (1, 2),
    (2, 1),
    (2, -1),
    (1, -2),
    (-1, -2),
    (-2, -1),
];

const KING_OFFSETS: [(i8, i8); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

const DIAGONALS: [(i8, i8); 4] = [(-1, 1), (-1, -1), (1, 1), (1, -1)];
const ORTHOGONALS: [(i8, i8); 4] = [(-1, 0), (0, 1), (1, 0), (0, -1)];
const ALL_DIRECTIONS: [(i8, i8); 8] = [
    (-1, 1),
    (-1, -1),
    (1, 1),
    (1, -1),
    (-1, 0),
    (0, 1),
    (1, 0),
    (0, -1),
];

/// The square a castling king starts from.
const KING_HOME_COL: u8 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CastleSide {
    Queen,
    King,
}

impl CastleSide {
    fn rook_col(self) -> u8 {
        match self {
            CastleSide::Queen => 0,
            CastleSide::King => 7,
        }
    }

    /// Columns between king and rook that must be empty.
    fn path(self) -> &'static [u8] {
        match self {
            CastleSide::Queen => &[1, 2, 3],
            CastleSide::King => &[5, 6],
        }
    }

    fn king_to(self) -> u8 {
        match self {
            CastleSide::Queen => 2,
            CastleSide::King => 6,
        }
    }

    /// Where the rook lands, which is also the square the king crosses.
    fn rook_to(self) -> u8 {
        match self {
            CastleSide::Queen => 3,
            CastleSide::King => 5,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Castle {
    side: CastleSide,
    king_move: Move,
    rook_move: Move,
}

impl Board {
    /// Recomputes the move list of the piece on `(row, col)`.
    ///
    /// With `filter_by_check` only moves that keep the mover's king safe are
    /// kept; without it the raw piece geometry is stored. Castling additionally
    /// registers the rook's move on the rook and links the rook to the king.
    pub fn calc_moves(
        &mut self,
        row: usize,
        col: usize,
        filter_by_check: bool,
    ) -> Result<(), BoardError> {
        let from = Coord::try_new(row, col)?;
        let piece = self
            .piece_at_mut(from)
            .ok_or(BoardError::EmptySquare(from))?;
        piece.clear_moves();
        if let PieceKind::King {
            left_rook,
            right_rook,
        } = &mut piece.kind
        {
            *left_rook = None;
            *right_rook = None;
        }

        let (candidates, castles) = match self.piece_at(from) {
            Some(piece) => (
                self.piece_moves(from, piece),
                self.castling_moves(from, piece),
            ),
            None => return Err(BoardError::EmptySquare(from)),
        };

        let mut moves = Vec::with_capacity(candidates.len());
        for mv in candidates {
            if !filter_by_check || !self.in_check(&mv)? {
                moves.push(mv);
            }
        }

        let mut accepted = Vec::with_capacity(castles.len());
        for castle in castles {
            if filter_by_check && !self.castle_is_safe(&castle)? {
                log::trace!(
                    "castling {:?} from {} rejected: king would pass through check",
                    castle.side,
                    from
                );
                continue;
            }
            moves.push(castle.king_move);
            accepted.push(castle);
        }

        for castle in &accepted {
            if let Some(rook) = self.piece_at_mut(castle.rook_move.from) {
                rook.add_move(castle.rook_move);
            }
        }

        let piece = self
            .piece_at_mut(from)
            .ok_or(BoardError::EmptySquare(from))?;
        if let PieceKind::King {
            left_rook,
            right_rook,
        } = &mut piece.kind
        {
            for castle in &accepted {
                match castle.side {
                    CastleSide::Queen => *left_rook = Some(castle.rook_move.from),
                    CastleSide::King => *right_rook = Some(castle.rook_move.from),
                }
            }
        }
        piece.moves = moves;
        Ok(())
    }

    /// Computes the legal moves of the piece on `(row, col)` and returns a copy of them.
    pub fn legal_moves(&mut self, row: usize, col: usize) -> Result<Vec<Move>, BoardError> {
        self.calc_moves(row, col, true)?;
        Ok(self
            .piece_at(Coord::new(row as u8, col as u8))
            .map(|p| p.moves.clone())
            .unwrap_or_default())
    }

    /// Moves following the piece's geometry only, castling excluded. Does not
    /// touch the piece's stored move list.
    pub fn pseudo_legal_moves(&self, row: usize, col: usize) -> Result<Vec<Move>, BoardError> {
        let from = Coord::try_new(row, col)?;
        let piece = self.piece_at(from).ok_or(BoardError::EmptySquare(from))?;
        Ok(self.piece_moves(from, piece))
    }

    /// Whether playing `mv` would leave the mover's king capturable.
    ///
    /// The move is applied in simulated mode, every enemy piece's raw moves are
    /// scanned for one landing on a king, and the board is then restored.
    pub fn in_check(&mut self, mv: &Move) -> Result<bool, BoardError> {
        let color = self
            .piece_at(mv.from)
            .map(|p| p.color)
            .ok_or(BoardError::EmptySquare(mv.from))?;
        let undo = self.simulate(mv)?;
        let attacked = self.king_in_check(color);
        self.undo(undo);
        Ok(attacked)
    }

    /// Whether any piece of the other color can currently reach `color`'s king.
    pub fn king_in_check(&self, color: Color) -> bool {
        self.pieces()
            .filter(|(_, piece)| piece.color != color)
            .any(|(at, piece)| {
                self.piece_moves(at, piece)
                    .iter()
                    .any(|mv| matches!(mv.captured, Some(PieceKind::King { .. })))
            })
    }

    fn piece_moves(&self, from: Coord, piece: &Piece) -> Vec<Move> {
        let mut moves = Vec::new();
        match piece.kind {
            PieceKind::Pawn { .. } => self.pawn_moves(from, piece, &mut moves),
            PieceKind::Knight => self.step_moves(from, piece.color, &KNIGHT_OFFSETS, &mut moves),
            PieceKind::Bishop => self.sliding_moves(from, piece.color, &DIAGONALS, &mut moves),
            PieceKind::Rook => self.sliding_moves(from, piece.color, &ORTHOGONALS, &mut moves),
            PieceKind::Queen => self.sliding_moves(from, piece.color, &ALL_DIRECTIONS, &mut moves),
            PieceKind::King { .. } => self.step_moves(from, piece.color, &KING_OFFSETS, &mut moves),
        }
        moves
    }

    fn pawn_moves(&self, from: Coord, pawn: &Piece, moves: &mut Vec<Move>) {
        let dir = pawn.direction();
        let steps = if pawn.moved { 1 } else { 2 };

        // Forward steps stop at the first blocked square
        let mut at = from;
        for _ in 0..steps {
            match at.offset(dir, 0) {
                Some(next) if self.square(next).is_empty() => {
                    moves.push(Move::new(from, next));
                    at = next;
                }
                _ => break,
            }
        }

        for dc in [-1, 1] {
            if let Some(to) = from.offset(dir, dc) {
                let target = self.square(to);
                if target.has_enemy_piece(pawn.color) {
                    moves.push(Move::new_capture(from, to, target.kind()));
                }
            }
        }

        if from.row != pawn.color.en_passant_row() {
            return;
        }
        for dc in [-1, 1] {
            let (Some(beside), Some(to)) = (from.offset(0, dc), from.offset(dir, dc)) else {
                continue;
            };
            let Some(victim) = self.piece_at(beside) else {
                continue;
            };
            if victim.color != pawn.color && victim.en_passant() && self.square(to).is_empty() {
                moves.push(Move::new_capture(from, to, Some(victim.kind)));
            }
        }
    }

    fn step_moves(&self, from: Coord, color: Color, offsets: &[(i8, i8)], moves: &mut Vec<Move>) {
        for &(dr, dc) in offsets {
            if let Some(to) = from.offset(dr, dc) {
                let target = self.square(to);
                if target.is_empty_or_enemy(color) {
                    moves.push(Move::new_capture(from, to, target.kind()));
                }
            }
        }
    }

    fn sliding_moves(
        &self,
        from: Coord,
        color: Color,
        directions: &[(i8, i8)],
        moves: &mut Vec<Move>,
    ) {
        for &(dr, dc) in directions {
            let mut at = from;
            while let Some(to) = at.offset(dr, dc) {
                let target = self.square(to);
                if target.is_empty() {
                    moves.push(Move::new(from, to));
                } else {
                    if target.has_enemy_piece(color) {
                        moves.push(Move::new_capture(from, to, target.kind()));
                    }
                    break;
                }
                at = to;
            }
        }
    }

    /// Castling moves allowed by piece placement alone: unmoved king on its
    /// home column, unmoved friendly rook in the corner, empty squares between.
    fn castling_moves(&self, from: Coord, king: &Piece) -> Vec<Castle> {
        let mut castles = Vec::new();
        if !king.kind.is_king() || king.moved || from.col != KING_HOME_COL {
            return castles;
        }

        for side in [CastleSide::Queen, CastleSide::King] {
            let rook_from = Coord::new(from.row, side.rook_col());
            let rook_ready = self.piece_at(rook_from).is_some_and(|rook| {
                rook.kind == PieceKind::Rook && rook.color == king.color && !rook.moved
            });
            if !rook_ready {
                continue;
            }
            let path_clear = side
                .path()
                .iter()
                .all(|&col| self.square(Coord::new(from.row, col)).is_empty());
            if !path_clear {
                continue;
            }
            castles.push(Castle {
                side,
                king_move: Move::new(from, Coord::new(from.row, side.king_to())),
                rook_move: Move::new(rook_from, Coord::new(from.row, side.rook_to())),
            });
        }
        castles
    }

    // The rook move is simulated with the king still home, so it doubles as
    // the "not castling out of check" test.
    fn castle_is_safe(&mut self, castle: &Castle) -> Result<bool, BoardError> {
        let king_from = castle.king_move.from;
        let transit = Move::new(king_from, Coord::new(king_from.row, castle.side.rook_to()));
        Ok(!self.in_check(&castle.rook_move)?
            && !self.in_check(&transit)?
            && !self.in_check(&castle.king_move)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn targets(board: &mut Board, row: usize, col: usize) -> Vec<(u8, u8)> {
        let mut moves: Vec<(u8, u8)> = board
            .legal_moves(row, col)
            .unwrap()
            .iter()
            .map(|mv| (mv.to.row, mv.to.col))
            .collect();
        moves.sort();
        moves
    }

    fn castling_board() -> Board {
        let mut board = Board::empty();
        board.place(Coord::new(7, 4), Piece::king(Color::White));
        board.place(Coord::new(7, 0), Piece::rook(Color::White));
        board.place(Coord::new(7, 7), Piece::rook(Color::White));
        board.place(Coord::new(0, 4), Piece::king(Color::Black));
        board
    }

    #[test]
    fn test_move_equality_ignores_capture() {
        let from = Coord::new(6, 4);
        let to = Coord::new(5, 5);
        let plain = Move::new(from, to);
        let capture = Move::new_capture(from, to, Some(PieceKind::Knight));
        assert_eq!(plain, capture);
        assert!(capture.is_capture());
        assert!(!plain.is_capture());
        assert_ne!(plain, Move::new(from, Coord::new(5, 4)));
    }

    #[test]
    fn test_initial_knight_and_pawn() {
        let mut board = Board::new();
        assert_eq!(targets(&mut board, 7, 1), vec![(5, 0), (5, 2)]);
        assert_eq!(targets(&mut board, 6, 0), vec![(4, 0), (5, 0)]);
        // back-rank pieces other than knights are boxed in
        for col in [0, 2, 3, 4, 5, 7] {
            assert!(targets(&mut board, 7, col).is_empty());
        }
    }

    #[test]
    fn test_moves_query_errors() {
        let mut board = Board::new();
        assert_eq!(
            board.calc_moves(4, 4, true),
            Err(BoardError::EmptySquare(Coord::new(4, 4)))
        );
        assert_eq!(
            board.calc_moves(8, 1, true),
            Err(BoardError::OutOfRange { row: 8, col: 1 })
        );
    }

    #[test]
    fn test_calc_moves_replaces_previous_list() {
        let mut board = Board::new();
        board.calc_moves(7, 1, true).unwrap();
        board.calc_moves(7, 1, true).unwrap();
        assert_eq!(board.piece_at(Coord::new(7, 1)).unwrap().moves.len(), 2);
    }

    #[test]
    fn test_pawn_blocked_and_captures() {
        let mut board = Board::empty();
        board.place(Coord::new(7, 4), Piece::king(Color::White));
        board.place(Coord::new(0, 4), Piece::king(Color::Black));
        board.place(Coord::new(6, 3), Piece::pawn(Color::White));
        board.place(Coord::new(4, 3), Piece::knight(Color::Black));
        board.place(Coord::new(5, 2), Piece::bishop(Color::White));
        board.place(Coord::new(5, 4), Piece::bishop(Color::Black));

        // double step blocked by the knight, own bishop not capturable
        assert_eq!(targets(&mut board, 6, 3), vec![(5, 3), (5, 4)]);

        board.place(Coord::new(5, 3), Piece::rook(Color::Black));
        assert_eq!(targets(&mut board, 6, 3), vec![(5, 4)]);
    }

    #[test]
    fn test_black_pawn_moves_down() {
        let mut board = Board::new();
        assert_eq!(targets(&mut board, 1, 4), vec![(2, 4), (3, 4)]);
    }

    #[test]
    fn test_sliding_stops_at_first_piece() {
        let mut board = Board::empty();
        board.place(Coord::new(7, 7), Piece::king(Color::White));
        board.place(Coord::new(0, 7), Piece::king(Color::Black));
        board.place(Coord::new(4, 0), Piece::rook(Color::White));
        board.place(Coord::new(4, 3), Piece::pawn(Color::Black));
        board.place(Coord::new(2, 0), Piece::knight(Color::White));

        let moves = targets(&mut board, 4, 0);
        assert_eq!(
            moves,
            vec![(3, 0), (4, 1), (4, 2), (4, 3), (5, 0), (6, 0), (7, 0)]
        );
        assert!(!moves.contains(&(4, 4)));
        assert!(!moves.contains(&(2, 0)));
    }

    #[test]
    fn test_queen_in_open_board() {
        let mut board = Board::empty();
        board.place(Coord::new(7, 0), Piece::king(Color::White));
        board.place(Coord::new(0, 1), Piece::king(Color::Black));
        board.place(Coord::new(3, 3), Piece::queen(Color::White));
        assert_eq!(board.legal_moves(3, 3).unwrap().len(), 27);

        board.place(Coord::new(4, 4), Piece::bishop(Color::Black));
        let bishop_moves = board.pseudo_legal_moves(4, 4).unwrap();
        assert!(bishop_moves.contains(&Move::new(Coord::new(4, 4), Coord::new(3, 3))));
        assert!(!bishop_moves.contains(&Move::new(Coord::new(4, 4), Coord::new(2, 2))));
    }

    #[test]
    fn test_pinned_piece_cannot_expose_king() {
        let mut board = Board::empty();
        board.place(Coord::new(7, 4), Piece::king(Color::White));
        board.place(Coord::new(6, 4), Piece::knight(Color::White));
        board.place(Coord::new(0, 4), Piece::rook(Color::Black));
        board.place(Coord::new(0, 0), Piece::king(Color::Black));

        assert!(!board.pseudo_legal_moves(6, 4).unwrap().is_empty());
        assert!(targets(&mut board, 6, 4).is_empty());

        // a pinned rook may still slide along the pin line
        board.place(Coord::new(6, 4), Piece::rook(Color::White));
        let moves = targets(&mut board, 6, 4);
        assert!(moves.iter().all(|&(_, col)| col == 4));
        assert!(moves.contains(&(0, 4)));
    }

    #[test]
    fn test_king_cannot_step_into_attack() {
        let mut board = Board::empty();
        board.place(Coord::new(7, 4), Piece::king(Color::White));
        board.place(Coord::new(0, 3), Piece::rook(Color::Black));
        board.place(Coord::new(0, 7), Piece::king(Color::Black));

        let moves = targets(&mut board, 7, 4);
        assert!(moves.iter().all(|&(_, col)| col != 3));
        assert!(moves.contains(&(6, 5)));
    }

    #[test]
    fn test_check_query_leaves_board_untouched() {
        let mut board = Board::new();
        board.calc_moves(6, 4, true).unwrap();
        let before = board.clone();
        let mv = Move::new(Coord::new(6, 4), Coord::new(4, 4));
        assert!(!board.in_check(&mv).unwrap());
        assert_eq!(board, before);
        assert_eq!(board.piece_at(Coord::new(6, 4)).unwrap().moves.len(), 2);
    }

    #[test]
    fn test_king_in_check_detection() {
        let mut board = Board::empty();
        board.place(Coord::new(7, 4), Piece::king(Color::White));
        board.place(Coord::new(0, 0), Piece::king(Color::Black));
        board.place(Coord::new(5, 2), Piece::knight(Color::Black));
        assert!(!board.king_in_check(Color::White));

        board.place(Coord::new(5, 5), Piece::knight(Color::Black));
        assert!(board.king_in_check(Color::White));
        assert!(!board.king_in_check(Color::Black));
    }

    #[test]
    fn test_castling_both_sides() {
        let mut board = castling_board();
        let moves = targets(&mut board, 7, 4);
        assert!(moves.contains(&(7, 2)));
        assert!(moves.contains(&(7, 6)));

        let PieceKind::King {
            left_rook,
            right_rook,
        } = board.piece_at(Coord::new(7, 4)).unwrap().kind
        else {
            panic!("expected a king");
        };
        assert_eq!(left_rook, Some(Coord::new(7, 0)));
        assert_eq!(right_rook, Some(Coord::new(7, 7)));
        assert!(board.is_legal_move(&Move::new(Coord::new(7, 7), Coord::new(7, 5))));
        assert!(board.is_legal_move(&Move::new(Coord::new(7, 0), Coord::new(7, 3))));
    }

    #[test]
    fn test_castling_requires_unmoved_pieces_and_clear_path() {
        let mut board = castling_board();
        board.piece_at_mut(Coord::new(7, 7)).unwrap().moved = true;
        board.place(Coord::new(7, 1), Piece::knight(Color::White));
        let moves = targets(&mut board, 7, 4);
        assert!(!moves.contains(&(7, 6)));
        assert!(!moves.contains(&(7, 2)));

        let mut board = castling_board();
        board.piece_at_mut(Coord::new(7, 4)).unwrap().moved = true;
        let moves = targets(&mut board, 7, 4);
        assert!(!moves.contains(&(7, 6)));
        assert!(!moves.contains(&(7, 2)));
    }

    #[test]
    fn test_castling_blocked_by_attacks() {
        // king in check: no castling at all
        let mut board = castling_board();
        board.place(Coord::new(2, 4), Piece::rook(Color::Black));
        let moves = targets(&mut board, 7, 4);
        assert!(!moves.contains(&(7, 6)));
        assert!(!moves.contains(&(7, 2)));

        // transit square f1 attacked: kingside only is lost
        let mut board = castling_board();
        board.place(Coord::new(2, 5), Piece::rook(Color::Black));
        let moves = targets(&mut board, 7, 4);
        assert!(!moves.contains(&(7, 6)));
        assert!(moves.contains(&(7, 2)));

        // destination c1 attacked: queenside only is lost
        let mut board = castling_board();
        board.place(Coord::new(2, 2), Piece::rook(Color::Black));
        let moves = targets(&mut board, 7, 4);
        assert!(moves.contains(&(7, 6)));
        assert!(!moves.contains(&(7, 2)));

        // b1 attacked does not matter, the king never crosses it
        let mut board = castling_board();
        board.place(Coord::new(2, 1), Piece::rook(Color::Black));
        assert!(targets(&mut board, 7, 4).contains(&(7, 2)));
    }

    #[test]
    fn test_castling_unfiltered_ignores_attacks() {
        let mut board = castling_board();
        board.place(Coord::new(2, 4), Piece::rook(Color::Black));
        board.calc_moves(7, 4, false).unwrap();
        let king = board.piece_at(Coord::new(7, 4)).unwrap();
        assert!(king.is_legal_move(&Move::new(Coord::new(7, 4), Coord::new(7, 6))));
    }

    #[test]
    fn test_castling_cascade_moves_rook() {
        let mut board = castling_board();
        board.calc_moves(7, 4, true).unwrap();
        let castle = Move::new(Coord::new(7, 4), Coord::new(7, 6));
        board.apply_move(&castle, false).unwrap();

        assert!(board.piece_at(Coord::new(7, 6)).unwrap().kind.is_king());
        let rook = board.piece_at(Coord::new(7, 5)).unwrap();
        assert_eq!(rook.kind, PieceKind::Rook);
        assert!(rook.moved);
        assert!(board.square(Coord::new(7, 7)).is_empty());
        assert_eq!(board.last_move, Some(castle));
    }

    #[test]
    fn test_black_castling() {
        let mut board = Board::empty();
        board.place(Coord::new(0, 4), Piece::king(Color::Black));
        board.place(Coord::new(0, 0), Piece::rook(Color::Black));
        board.place(Coord::new(0, 7), Piece::rook(Color::Black));
        board.place(Coord::new(7, 4), Piece::king(Color::White));

        assert_eq!(
            targets(&mut board, 0, 4),
            vec![(0, 2), (0, 3), (0, 5), (0, 6), (1, 3), (1, 4), (1, 5)]
        );
        let PieceKind::King {
            left_rook,
            right_rook,
        } = board.piece_at(Coord::new(0, 4)).unwrap().kind
        else {
            panic!("expected a king");
        };
        assert_eq!(left_rook, Some(Coord::new(0, 0)));
        assert_eq!(right_rook, Some(Coord::new(0, 7)));

        let castle = Move::new(Coord::new(0, 4), Coord::new(0, 2));
        board.apply_move(&castle, false).unwrap();
        assert!(board.piece_at(Coord::new(0, 2)).unwrap().kind.is_king());
        let rook = board.piece_at(Coord::new(0, 3)).unwrap();
        assert_eq!((rook.kind, rook.color), (PieceKind::Rook, Color::Black));
        assert!(board.square(Coord::new(0, 0)).is_empty());
        assert!(board.piece_at(Coord::new(0, 7)).is_some());
    }

    #[test]
    fn test_black_castling_through_attacked_square() {
        let mut board = Board::empty();
        board.place(Coord::new(0, 4), Piece::king(Color::Black));
        board.place(Coord::new(0, 0), Piece::rook(Color::Black));
        board.place(Coord::new(0, 7), Piece::rook(Color::Black));
        board.place(Coord::new(7, 4), Piece::king(Color::White));
        // covers d8
        board.place(Coord::new(7, 3), Piece::rook(Color::White));

        let moves = targets(&mut board, 0, 4);
        assert!(!moves.contains(&(0, 2)));
        assert!(!moves.contains(&(0, 3)));
        assert!(moves.contains(&(0, 6)));
    }

    #[test]
    fn test_black_en_passant() {
        let mut board = Board::empty();
        board.place(Coord::new(7, 4), Piece::king(Color::White));
        board.place(Coord::new(0, 4), Piece::king(Color::Black));
        board.place(Coord::new(4, 3), Piece::pawn(Color::Black));
        board.place(Coord::new(4, 4), Piece::pawn(Color::White));
        board.piece_at_mut(Coord::new(4, 3)).unwrap().moved = true;

        assert_eq!(targets(&mut board, 4, 3), vec![(5, 3)]);

        board.set_true_en_passant(Coord::new(4, 4));
        assert_eq!(targets(&mut board, 4, 3), vec![(5, 3), (5, 4)]);

        board
            .apply_move(&Move::new(Coord::new(4, 3), Coord::new(5, 4)), false)
            .unwrap();
        assert!(board.square(Coord::new(4, 4)).is_empty());
        assert_eq!(board.piece_at(Coord::new(5, 4)).unwrap().color, Color::Black);
    }

    #[test]
    fn test_en_passant_generation() {
        let mut board = Board::empty();
        board.place(Coord::new(7, 4), Piece::king(Color::White));
        board.place(Coord::new(0, 4), Piece::king(Color::Black));
        board.place(Coord::new(3, 4), Piece::pawn(Color::White));
        board.place(Coord::new(3, 3), Piece::pawn(Color::Black));
        board.place(Coord::new(3, 5), Piece::pawn(Color::Black));
        board.piece_at_mut(Coord::new(3, 4)).unwrap().moved = true;

        assert_eq!(targets(&mut board, 3, 4), vec![(2, 4)]);

        board.set_true_en_passant(Coord::new(3, 5));
        let moves = board.legal_moves(3, 4).unwrap();
        let capture = moves
            .iter()
            .find(|mv| mv.to == Coord::new(2, 5))
            .expect("en passant capture");
        assert_eq!(capture.captured, Some(PieceKind::Pawn { en_passant: true }));
        assert!(!moves.iter().any(|mv| mv.to == Coord::new(2, 3)));
    }

    #[test]
    fn test_en_passant_requires_fifth_rank() {
        let mut board = Board::empty();
        board.place(Coord::new(7, 4), Piece::king(Color::White));
        board.place(Coord::new(0, 4), Piece::king(Color::Black));
        board.place(Coord::new(4, 4), Piece::pawn(Color::White));
        board.place(Coord::new(4, 5), Piece::pawn(Color::Black));
        board.set_true_en_passant(Coord::new(4, 5));
        assert!(!targets(&mut board, 4, 4).contains(&(3, 5)));
    }

    #[test]
    fn test_en_passant_that_exposes_king_is_illegal() {
        // both pawns leave the fourth rank, opening it to the rook
        let mut board = Board::empty();
        board.place(Coord::new(3, 0), Piece::king(Color::White));
        board.place(Coord::new(3, 4), Piece::pawn(Color::White));
        board.place(Coord::new(3, 5), Piece::pawn(Color::Black));
        board.place(Coord::new(3, 7), Piece::rook(Color::Black));
        board.place(Coord::new(0, 7), Piece::king(Color::Black));
        board.piece_at_mut(Coord::new(3, 4)).unwrap().moved = true;
        board.set_true_en_passant(Coord::new(3, 5));

        assert!(!targets(&mut board, 3, 4).contains(&(2, 5)));
    }
}
