//! Invariants and laws from spec.md §8, exercised across a few
//! representative boards rather than exhaustively quantified.

use std::str::FromStr;

use variant_chess_core::board::{Board, WIN};
use variant_chess_core::geometry;
use variant_chess_core::moves::types::simple_move;
use variant_chess_core::piece::{Color, PieceType};
use variant_chess_core::search::compare;
use variant_chess_core::search::MovePrediction;

const START: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

#[test]
fn x_fen_round_trip_is_idempotent() {
    let board = Board::from_str(START).unwrap();
    let once = board.to_string();
    let twice = Board::from_str(&once).unwrap().to_string();
    assert_eq!(once, twice);
}

#[test]
fn clone_is_independently_mutable() {
    let board = Board::from_str(START).unwrap();
    let mut clone = board.clone();
    clone
        .perform_move(&simple_move(
            variant_chess_core::square::square_of(1, 4, 8),
            variant_chess_core::square::square_of(3, 4, 8),
        ))
        .unwrap();
    assert!(board.piece_at(variant_chess_core::square::square_of(1, 4, 8))
        .unwrap()
        .is_some());
    assert!(clone
        .piece_at(variant_chess_core::square::square_of(1, 4, 8))
        .unwrap()
        .is_none());
}

#[test]
fn flyweight_cache_returns_the_same_identity() {
    let a = geometry::geometry(8, 8).unwrap();
    let a_piece = a.piece(Color::White, PieceType::Knight, 27);
    let b = geometry::geometry(8, 8).unwrap();
    let b_piece = b.piece(Color::White, PieceType::Knight, 27);
    assert!(std::sync::Arc::ptr_eq(&a_piece, &b_piece));
}

#[test]
fn flyweight_cache_identity_holds_across_threads() {
    let handles: Vec<_> = (0..8)
        .map(|_| {
            std::thread::spawn(|| {
                let grid = geometry::geometry(8, 8).unwrap();
                grid.piece(Color::Black, PieceType::Bishop, 12)
            })
        })
        .collect();
    let pieces: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    for window in pieces.windows(2) {
        assert!(std::sync::Arc::ptr_eq(&window[0], &window[1]));
    }
}

#[test]
fn active_moves_preserve_validity() {
    let board = Board::from_str(START).unwrap();
    for mv in board.active_moves() {
        let mut clone = board.clone();
        assert!(clone.perform_move(&mv).is_ok());
    }
}

#[test]
fn positions_any_true_is_a_subset_of_positions_any_false() {
    let board = Board::from_str(START).unwrap();
    let first = board.positions(true, Some(Color::White), Some(PieceType::Pawn));
    assert!(first.len() <= 1);
    if let Some(&sq) = first.first() {
        let all = board.positions(false, Some(Color::White), Some(PieceType::Pawn));
        assert!(all.contains(&sq));
    }
}

#[test]
fn threat_detection_agrees_with_a_brute_force_scan() {
    let board = Board::from_str(
        "rnbqkbnr/ppp1pppp/8/3pP3/8/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 3",
    )
    .unwrap();
    let black_king_sq = board.black_king_sq;
    let threatened = board.is_position_threatened(black_king_sq, Color::White);

    let mut swapped = board.clone();
    swapped.move_clock += 1; // side_to_move flips without changing piece placement
    let brute_force = swapped
        .active_moves()
        .iter()
        .any(|m| m.len() == 2 && m[1] == black_king_sq);

    assert_eq!(threatened, brute_force);
}

#[test]
fn rating_law_holds_when_a_king_is_absent() {
    let mut board = Board::from_str(START).unwrap();
    board.white_king_sq = -1;
    assert_eq!(board.rating(), -WIN);

    let mut board = Board::from_str(START).unwrap();
    board.black_king_sq = -1;
    assert_eq!(board.rating(), WIN);
}

#[test]
fn rating_is_within_range_in_a_normal_position() {
    let board = Board::from_str(START).unwrap();
    assert!(board.rating() > -WIN && board.rating() < WIN);
}

#[test]
fn compare_prefers_any_candidate_over_none() {
    let p = MovePrediction {
        rating: 10,
        moves: vec![Some(simple_move(0, 1))],
    };
    assert!(compare(true, Some(&p), None).is_gt());
}

#[test]
fn compare_is_antisymmetric_for_mate_distance_ties() {
    let near = MovePrediction {
        rating: WIN,
        moves: vec![Some(simple_move(0, 1))],
    };
    let far = MovePrediction {
        rating: WIN,
        moves: vec![Some(simple_move(0, 1)), Some(simple_move(2, 3))],
    };
    let a = compare(true, Some(&near), Some(&far));
    let b = compare(true, Some(&far), Some(&near));
    assert_eq!(a, b.reverse());
}
