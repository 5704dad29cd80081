//! End-to-end scenarios, one per spec.md §8 walkthrough.

use std::str::FromStr;

use variant_chess_core::board::{Board, DRAW, WIN};
use variant_chess_core::moves::types::simple_move;
use variant_chess_core::piece::{Color, PieceType};
use variant_chess_core::search::predict_moves;
use variant_chess_core::square::square_of;

#[test]
fn start_position_depth_one_has_twenty_moves() {
    let board =
        Board::from_str("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1").unwrap();
    assert_eq!(board.active_moves().len(), 20);
}

#[test]
fn scholars_mate_setup_reports_black_mated() {
    let board =
        Board::from_str("r1bqkb1r/pppp1Qpp/2n2n2/4p3/2B1P3/8/PPPP1PPP/RNB1K1NR b KQkq - 0 4")
            .unwrap();
    let prediction = predict_moves(&board, 1).unwrap();
    // Rating stays white-perspective throughout (matching Board::rating
    // and the comparator): black getting mated is good for white.
    assert_eq!(prediction.rating, WIN);
    assert_eq!(prediction.moves.len(), 1);
    assert!(prediction.moves[0].is_none());
}

#[test]
fn en_passant_capture_removes_the_passed_pawn() {
    let mut board =
        Board::from_str("rnbqkbnr/ppp1pppp/8/3pP3/8/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 3").unwrap();
    let e5 = square_of(4, 4, 8);
    let d6 = square_of(5, 3, 8);
    let d5 = square_of(4, 3, 8);
    assert!(board.active_moves().iter().any(|m| m[0] == e5 && m[1] == d6));
    board.perform_move(&simple_move(e5, d6)).unwrap();
    assert!(board.piece_at(d5).unwrap().is_none());
}

#[test]
fn castling_is_blocked_when_a_transit_square_is_attacked() {
    let open = Board::from_str("4k3/8/8/8/8/8/8/4K2R w K - 0 1").unwrap();
    assert_eq!(
        open.active_moves()
            .iter()
            .filter(|m| variant_chess_core::moves::types::is_castling(m))
            .count(),
        1
    );

    // A black rook on the f-file sees straight down to f1, the square
    // the king must transit through on the way to g1.
    let blocked = Board::from_str("4kr2/8/8/8/8/8/8/4K2R w K - 0 1").unwrap();
    assert_eq!(
        blocked
            .active_moves()
            .iter()
            .filter(|m| variant_chess_core::moves::types::is_castling(m))
            .count(),
        0
    );
}

#[test]
fn pawn_promotes_to_queen_on_arrival() {
    let mut board = Board::from_str("8/P7/8/8/8/8/8/4k2K w - - 0 1").unwrap();
    let a7 = square_of(6, 0, 8);
    let a8 = square_of(7, 0, 8);
    board.perform_move(&simple_move(a7, a8)).unwrap();
    let piece = board.piece_at(a8).unwrap().unwrap();
    assert_eq!(piece.piece_type, PieceType::Queen);
    assert_eq!(piece.color, Color::White);
}

#[test]
fn fifty_move_cutoff_empties_active_moves() {
    let mut board =
        Board::from_str("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1").unwrap();
    board.reversible_clock = 101;
    assert!(board.active_moves().is_empty());
}

#[test]
fn predict_moves_rejects_zero_depth() {
    let board =
        Board::from_str("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1").unwrap();
    assert!(predict_moves(&board, 0).is_err());
}

#[test]
fn draw_rating_is_the_draw_sentinel() {
    assert_eq!(DRAW, i32::MIN);
    assert_eq!(WIN, i32::MAX);
}
