//! Move representation and the event record emitted to external
//! collaborators (UI/network layers) on a successful apply.

use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};

use crate::piece::PieceType;
use crate::square::Square;

/// A move is an ordered list of squares: `[source, sink]` for an
/// ordinary move, `[king_source, rook_source, king_sink]` for
/// castling. Bounded at 3 entries, the maximum arity any move needs.
pub type Move = ArrayVec<Square, 3>;

#[inline]
pub fn simple_move(source: Square, sink: Square) -> Move {
    let mut m = Move::new();
    m.push(source);
    m.push(sink);
    m
}

#[inline]
pub fn castling_move(king_source: Square, rook_source: Square, king_sink: Square) -> Move {
    let mut m = Move::new();
    m.push(king_source);
    m.push(rook_source);
    m.push(king_sink);
    m
}

#[inline]
pub fn is_castling(mv: &Move) -> bool {
    mv.len() == 3
}

/// Emitted by the board on a successful `perform_move`, for delivery
/// to external UI/network collaborators. The core only produces this
/// value; it does not push it anywhere itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveEvent {
    pub piece_type: PieceType,
    pub mv: Move,
    pub captured: bool,
    pub game_over: bool,
    pub rating: i32,
}
