//! Reverse-motion threat detection: rather than asking every attacking
//! piece "can you reach `sq`?", look up the geometry an attacker of
//! each ray family would have if it stood *at* `sq`, and walk those
//! rays outward until a piece is found.

use crate::piece::{Color, PieceType};
use crate::square::Square;

use super::Board;

impl Board {
    /// Whether a piece of `by_color` could capture on `sq` on its next move.
    pub fn is_position_threatened(&self, sq: Square, by_color: Color) -> bool {
        if sq == self.en_passant_target && self.side_to_move() == by_color {
            return true;
        }

        let knight = self.grid().piece(by_color, PieceType::Knight, sq);
        for ray in &knight.sink_positions {
            for m in ray {
                if let Some(p) = self.piece_at_unchecked(m.square()) {
                    if p.color == by_color && p.piece_type.moves_like_knight() {
                        return true;
                    }
                }
            }
        }

        let bishop = self.grid().piece(by_color, PieceType::Bishop, sq);
        for ray in &bishop.sink_positions {
            for (i, m) in ray.iter().enumerate() {
                let Some(p) = self.piece_at_unchecked(m.square()) else {
                    continue;
                };
                if p.color == by_color {
                    if p.piece_type.moves_like_bishop() {
                        return true;
                    }
                    if i == 0 && p.piece_type == PieceType::King {
                        return true;
                    }
                    if i == 0 && p.piece_type == PieceType::Pawn {
                        let attacker_sq = m.square();
                        let forward = match by_color {
                            Color::White => attacker_sq < sq,
                            Color::Black => attacker_sq > sq,
                        };
                        if forward {
                            return true;
                        }
                    }
                }
                break;
            }
        }

        let rook = self.grid().piece(by_color, PieceType::Rook, sq);
        for ray in &rook.sink_positions {
            for (i, m) in ray.iter().enumerate() {
                let Some(p) = self.piece_at_unchecked(m.square()) else {
                    continue;
                };
                if p.color == by_color {
                    if p.piece_type.moves_like_rook() {
                        return true;
                    }
                    if i == 0 && p.piece_type == PieceType::King {
                        return true;
                    }
                }
                break;
            }
        }

        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn rook_threatens_along_open_file() {
        let b = Board::from_str("4k3/8/8/8/8/8/8/R3K3 w Q - 0 1").unwrap();
        assert!(b.is_position_threatened(crate::square::square_of(7, 4, 8), Color::White));
    }

    #[test]
    fn pawn_threatens_only_forward_diagonal() {
        let b = Board::from_str("4k3/8/8/3p4/4P3/8/8/4K3 w - - 0 1").unwrap();
        // white pawn on e4 threatens d5 and f5, not e5
        assert!(b.is_position_threatened(crate::square::square_of(4, 3, 8), Color::White));
        assert!(!b.is_position_threatened(crate::square::square_of(4, 4, 8), Color::White));
    }

    #[test]
    fn blocked_ray_does_not_threaten() {
        let b = Board::from_str("4k3/8/8/8/8/4r3/4P3/4K3 w - - 0 1").unwrap();
        // black rook on e3 is blocked by the white pawn on e2 from reaching e1
        assert!(!b.is_position_threatened(crate::square::square_of(0, 4, 8), Color::Black));
    }
}
