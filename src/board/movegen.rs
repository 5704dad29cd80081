//! Legal move generation for the side to move.

use crate::moves::types::{castling_move, is_castling, simple_move, Move};
use crate::piece::{Color, PieceType};
use crate::square::{MoveTag, Square};

use super::{Board, BLACK_LEFT, BLACK_RIGHT, WHITE_LEFT, WHITE_RIGHT};

impl Board {
    /// All legal moves of the side to move.
    pub fn active_moves(&self) -> Vec<Move> {
        let side = self.side_to_move();

        if self.reversible_clock > 100 {
            let has_non_pawn_piece = (0..self.square_count() as Square).any(|sq| {
                self.piece_at_unchecked(sq)
                    .is_some_and(|p| p.color == side && p.piece_type != PieceType::Pawn)
            });
            if has_non_pawn_piece {
                return Vec::new();
            }
        }

        let opposing_king_sq = if side == Color::White {
            self.black_king_sq
        } else {
            self.white_king_sq
        };

        let mut moves = Vec::new();
        let mut must_capture_king = false;

        for sq in 0..self.square_count() as Square {
            let Some(piece) = self.piece_at_unchecked(sq) else {
                continue;
            };
            if piece.color != side {
                continue;
            }

            for ray in &piece.sink_positions {
                for &m in ray {
                    if m.tag() == MoveTag::Castling {
                        if !must_capture_king {
                            self.try_add_castling(&mut moves, sq, m.square(), side);
                        }
                        continue;
                    }

                    let target_sq = m.square();
                    match self.piece_at_unchecked(target_sq) {
                        Some(target) => {
                            if target_sq == opposing_king_sq {
                                if m.can_capture() {
                                    if !must_capture_king {
                                        must_capture_king = true;
                                        moves.clear();
                                    }
                                    moves.push(simple_move(sq, target_sq));
                                }
                            } else if m.can_capture() && target.color != side && !must_capture_king {
                                moves.push(simple_move(sq, target_sq));
                            }
                            break;
                        }
                        None => {
                            if !must_capture_king {
                                if m.can_occupy() {
                                    moves.push(simple_move(sq, target_sq));
                                } else if piece.piece_type == PieceType::Pawn
                                    && target_sq == self.en_passant_target
                                {
                                    moves.push(simple_move(sq, target_sq));
                                }
                            }
                        }
                    }
                }
            }
        }

        moves
    }

    /// `active_moves()` filtered to those that do not leave the mover's
    /// own king immediately capturable by the opponent's reply. The
    /// board's own move generator is pseudo-legal (it only special-cases
    /// the opposing king being en prise); this is the "does my own king
    /// survive" half of legality, shared by the analyzer's own-king
    /// discard and by game-over classification.
    pub fn legal_moves(&self) -> Vec<Move> {
        let active = self.side_to_move();
        self.active_moves()
            .into_iter()
            .filter(|mv| {
                let mut clone = self.clone();
                if clone.apply_move(mv).is_err() {
                    return false;
                }
                let king_sq = match active {
                    Color::White => clone.white_king_sq,
                    Color::Black => clone.black_king_sq,
                };
                king_sq < 0 || !clone.is_position_threatened(king_sq, active.opposite())
            })
            .collect()
    }

    fn try_add_castling(&self, moves: &mut Vec<Move>, king_sq: Square, target_sq: Square, side: Color) {
        let dir: i16 = if target_sq > king_sq { 1 } else { -1 };
        let (left_bit, right_bit) = if side == Color::White {
            (WHITE_LEFT, WHITE_RIGHT)
        } else {
            (BLACK_LEFT, BLACK_RIGHT)
        };
        let required_bit = if dir < 0 { left_bit } else { right_bit };
        if self.castling_mask & required_bit == 0 {
            return;
        }

        let rook_source = if dir < 0 {
            target_sq - ((self.files + 1) & 1) - 1
        } else {
            target_sq + 1
        };

        match self.piece_at_unchecked(rook_source) {
            Some(p) if p.piece_type == PieceType::Rook && p.color == side => {}
            _ => return,
        }

        let (lo, hi) = (king_sq.min(rook_source), king_sq.max(rook_source));
        for between in (lo + 1)..hi {
            if self.piece_at_unchecked(between).is_some() {
                return;
            }
        }

        // Only the squares the king actually crosses — one step past its
        // source up to and including the target — need to be untouched
        // by the opponent; the king's own current square is exempt, so
        // castling out of check is otherwise permitted here.
        let opposing = side.opposite();
        let mut cursor = king_sq + dir;
        loop {
            if self.is_position_threatened(cursor, opposing) {
                return;
            }
            if cursor == target_sq {
                break;
            }
            cursor += dir;
        }

        moves.push(castling_move(king_sq, rook_source, target_sq));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn start_position_has_twenty_moves() {
        let b = Board::from_str("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1").unwrap();
        assert_eq!(b.active_moves().len(), 20);
    }

    #[test]
    fn fifty_move_rule_empties_move_list() {
        let mut b = Board::from_str("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1").unwrap();
        b.reversible_clock = 101;
        assert!(b.active_moves().is_empty());
    }

    #[test]
    fn en_passant_capture_is_offered() {
        let b = Board::from_str("rnbqkbnr/ppp1pppp/8/3pP3/8/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 3").unwrap();
        let d6 = crate::square::square_of(5, 3, 8);
        assert!(b.active_moves().iter().any(|m| m[0] == crate::square::square_of(4, 4, 8) && m[1] == d6));
    }

    #[test]
    fn legal_moves_excludes_moves_that_leave_own_king_capturable() {
        // Black to move, just mated by Qxf7#: pseudo-legal generation
        // still offers e.g. Nb8-a6, but no move saves the king.
        let b = Board::from_str(
            "r1bqkb1r/pppp1Qpp/2n2n2/4p3/2B1P3/8/PPPP1PPP/RNB1K1NR b KQkq - 0 4",
        )
        .unwrap();
        assert!(!b.active_moves().is_empty());
        assert!(b.legal_moves().is_empty());
    }

    #[test]
    fn castling_blocked_when_transit_attacked() {
        let b = Board::from_str(
            "r3k2r/pppq1ppp/2np1n2/2b3B1/2B1P3/2NP1N2/PPPQ1PPP/R3K2R w KQkq - 0 1",
        )
        .unwrap();
        let before = b
            .active_moves()
            .iter()
            .filter(|m| is_castling(m))
            .count();
        assert_eq!(before, 2);
    }
}
