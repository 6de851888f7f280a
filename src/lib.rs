pub mod board;
pub mod game;
pub mod movegen;
pub mod notation;
pub mod session;

pub use board::{Board, BoardError, Color, Coord, Piece, PieceKind, Square};
pub use game::{EnPassantPolicy, Game, GameError, GameStatus, MoveRecord};
pub use movegen::Move;
pub use notation::{parse_uci, NotationError};
pub use session::Session;

/// A board in the standard starting position.
pub fn new_game() -> Board {
    Board::new()
}

/// Fills the move list of the piece on `(row, col)` with its legal moves.
pub fn generate_moves(board: &mut Board, row: usize, col: usize) -> Result<(), BoardError> {
    board.calc_moves(row, col, true)
}

pub fn is_legal_move(board: &Board, mv: &Move) -> bool {
    board.is_legal_move(mv)
}

/// Plays a move already checked with [`is_legal_move`]. Call
/// [`commit_en_passant_flag`] right after for pawn moves.
pub fn apply_move(board: &mut Board, mv: &Move) -> Result<(), BoardError> {
    board.apply_move(mv, false)
}

pub fn commit_en_passant_flag(board: &mut Board, at: Coord) {
    board.set_true_en_passant(at);
}
