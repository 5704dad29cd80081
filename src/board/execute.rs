//! Move application. `apply_move`/`perform_move` validate only move
//! structure — legality (would this leave the mover's own king in
//! check?) is the caller's responsibility, so the analyzer can apply
//! pseudo-legal moves and filter king-capturing replies itself.

use crate::error::{Error, Result};
use crate::moves::types::{MoveEvent, castling_move, simple_move};
use crate::piece::{Color, PieceType};
use crate::square::{Square, file_of, rank_of, square_of};

use super::{BLACK_LEFT, BLACK_RIGHT, Board, WHITE_LEFT, WHITE_RIGHT};

impl Board {
    /// Applies `mv` — a 2-square ordinary move or a 3-square castling
    /// move — updating clocks, castling rights, the en-passant target,
    /// and cached king squares, and returns the event describing what
    /// happened, with `game_over` set for the resulting position.
    pub fn perform_move(&mut self, mv: &crate::moves::types::Move) -> Result<MoveEvent> {
        let mut event = self.apply_move(mv)?;
        event.game_over = self.legal_moves().is_empty();
        Ok(event)
    }

    /// Same state mutation as `perform_move`, but leaves `game_over`
    /// unset (always `false`). `legal_moves()` uses this internally to
    /// probe candidate moves without itself computing game-over status
    /// — computing that status calls `legal_moves()`, so routing the
    /// probe through the public `perform_move` would recurse without a
    /// depth bound.
    pub(crate) fn apply_move(&mut self, mv: &crate::moves::types::Move) -> Result<MoveEvent> {
        match mv.len() {
            3 => self.perform_castling(mv[0], mv[1], mv[2]),
            2 => self.perform_ordinary(mv[0], mv[1]),
            other => Err(Error::invalid_argument(format!(
                "move must have 2 (ordinary) or 3 (castling) squares, got {other}"
            ))),
        }
    }

    fn perform_castling(
        &mut self,
        king_source: Square,
        rook_source: Square,
        king_sink: Square,
    ) -> Result<MoveEvent> {
        let active = self.side_to_move();
        let king_here = self
            .piece_at_unchecked(king_source)
            .is_some_and(|p| p.piece_type == PieceType::King && p.color == active);
        if !king_here {
            return Err(Error::invalid_argument(
                "castling source does not hold the active king",
            ));
        }
        let rook_here = self
            .piece_at_unchecked(rook_source)
            .is_some_and(|p| p.piece_type == PieceType::Rook && p.color == active);
        if !rook_here {
            return Err(Error::invalid_argument(
                "castling source does not hold the active rook",
            ));
        }

        let dir: i16 = if rook_source > king_source { 1 } else { -1 };
        let rook_sink = king_sink - dir;

        self.clear_square(king_source);
        self.clear_square(rook_source);
        self.place(king_sink, active, PieceType::King);
        self.place(rook_sink, active, PieceType::Rook);

        self.clear_castling_rights(active);
        self.reversible_clock = 0;
        self.en_passant_target = -1;
        self.move_clock += 1;

        let rating = self.rating();
        Ok(MoveEvent {
            piece_type: PieceType::King,
            mv: castling_move(king_source, rook_source, king_sink),
            captured: false,
            game_over: false,
            rating,
        })
    }

    fn perform_ordinary(&mut self, source: Square, sink: Square) -> Result<MoveEvent> {
        let active = self.side_to_move();
        let moving = self
            .piece_at_unchecked(source)
            .cloned()
            .ok_or_else(|| Error::invalid_argument("move source is empty"))?;
        if moving.color != active {
            return Err(Error::invalid_argument(
                "move source does not belong to the side to move",
            ));
        }
        let piece_type = moving.piece_type;
        let mut resolved_type = piece_type;
        let mut captured = false;
        let mut reset_reversible = false;

        if let Some(target) = self.piece_at_unchecked(sink).cloned() {
            if target.color == active {
                return Err(Error::invalid_argument(
                    "move destination is occupied by the mover's own piece",
                ));
            }
            captured = true;
            reset_reversible = true;
            if target.piece_type == PieceType::King {
                self.clear_king_sq(target.color);
                self.clear_castling_rights(target.color);
            } else if target.piece_type == PieceType::Rook {
                self.maybe_clear_rook_castling_on_corner(target.color, sink);
            }
        }

        let mut new_en_passant_target: Square = -1;

        match piece_type {
            PieceType::Pawn => {
                reset_reversible = true;
                if !captured && sink == self.en_passant_target {
                    let passive = active.opposite();
                    let dir: i16 = if passive == Color::White { 1 } else { -1 };
                    let passing_sq = self.en_passant_target + dir * self.files;
                    self.clear_square(passing_sq);
                    captured = true;
                } else if (sink - source).abs() == 2 * self.files {
                    let mid = (source + sink) / 2;
                    let passive = active.opposite();
                    let rank = rank_of(sink, self.files);
                    let file = file_of(sink, self.files);
                    let adjacent_threatens = [-1i16, 1i16].into_iter().any(|df| {
                        let f = file + df;
                        if !(0..self.files).contains(&f) {
                            return false;
                        }
                        let adj_sq = square_of(rank, f, self.files);
                        self.piece_at_unchecked(adj_sq).is_some_and(|p| {
                            p.color == passive
                                && p.piece_type == PieceType::Pawn
                                && p.sink_bitboard.contains(mid)
                        })
                    });
                    if adjacent_threatens {
                        new_en_passant_target = mid;
                    }
                }
                let far_rank = if active == Color::White {
                    self.ranks - 1
                } else {
                    0
                };
                if rank_of(sink, self.files) == far_rank {
                    resolved_type = PieceType::Queen;
                }
            }
            PieceType::Rook => {
                self.maybe_clear_rook_castling_on_corner(active, source);
            }
            PieceType::King => {
                self.clear_castling_rights(active);
            }
            _ => {}
        }

        self.clear_square(source);
        self.place(sink, active, resolved_type);

        self.reversible_clock = if reset_reversible {
            0
        } else {
            self.reversible_clock + 1
        };
        self.move_clock += 1;
        self.en_passant_target = new_en_passant_target;

        let rating = self.rating();
        Ok(MoveEvent {
            piece_type: resolved_type,
            mv: simple_move(source, sink),
            captured,
            game_over: false,
            rating,
        })
    }

    fn clear_king_sq(&mut self, color: Color) {
        match color {
            Color::White => self.white_king_sq = -1,
            Color::Black => self.black_king_sq = -1,
        }
    }

    fn clear_castling_rights(&mut self, color: Color) {
        match color {
            Color::White => self.castling_mask &= !(WHITE_LEFT | WHITE_RIGHT),
            Color::Black => self.castling_mask &= !(BLACK_LEFT | BLACK_RIGHT),
        }
    }

    fn maybe_clear_rook_castling_on_corner(&mut self, color: Color, sq: Square) {
        let home_rank = if color == Color::White {
            0
        } else {
            self.ranks - 1
        };
        if rank_of(sq, self.files) != home_rank {
            return;
        }
        let file = file_of(sq, self.files);
        if file == 0 {
            self.castling_mask &= !(if color == Color::White { WHITE_LEFT } else { BLACK_LEFT });
        } else if file == self.files - 1 {
            self.castling_mask &= !(if color == Color::White { WHITE_RIGHT } else { BLACK_RIGHT });
        }
    }
}
