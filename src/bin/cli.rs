use std::io::{self, BufRead};
use std::str::FromStr;

use variant_chess_core::board::Board;
use variant_chess_core::search::predict_moves;
use variant_chess_core::status::position_status;

const DEFAULT_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";
const DEFAULT_DEPTH: i32 = 2;
const LOG_PATH: &str = "logs/variant-chess-core.log";

fn main() {
    variant_chess_core::logger::init_logging(LOG_PATH, "variant_chess_core=info");

    let mut args = std::env::args().skip(1);
    let fen = args.next().unwrap_or_else(|| DEFAULT_FEN.to_string());
    let depth = args
        .next()
        .and_then(|s| s.parse::<i32>().ok())
        .unwrap_or(DEFAULT_DEPTH);

    match Board::from_str(&fen) {
        Ok(board) => run(board, depth),
        Err(e) => {
            eprintln!("could not decode position: {e}");
            std::process::exit(1);
        }
    }

    // A small REPL: each line is either a new X-FEN string or "quit".
    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let Ok(line) = line else { break };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "quit" || line == "exit" {
            break;
        }
        match Board::from_str(line) {
            Ok(board) => run(board, depth),
            Err(e) => eprintln!("could not decode position: {e}"),
        }
    }
}

fn run(board: Board, depth: i32) {
    tracing::info!(depth, fen = %board, "analyzing position");

    println!("{board}");
    println!("{}", render(&board));

    match position_status(&board) {
        variant_chess_core::status::GameStatus::Checkmate => {
            println!("checkmate");
            return;
        }
        variant_chess_core::status::GameStatus::Stalemate => {
            println!("stalemate");
            return;
        }
        variant_chess_core::status::GameStatus::InPlay => {}
    }

    match predict_moves(&board, depth) {
        Ok(prediction) => {
            println!("rating: {}", prediction.rating);
            print!("line:");
            for mv in &prediction.moves {
                match mv {
                    Some(mv) => print!(" {mv:?}"),
                    None => print!(" (none)"),
                }
            }
            println!();
        }
        Err(e) => eprintln!("analysis failed: {e}"),
    }
}

/// A plain rank-descending ASCII board, for terminal display only.
fn render(board: &Board) -> String {
    let mut out = String::new();
    for rank in (0..board.ranks).rev() {
        for file in 0..board.files {
            let sq = variant_chess_core::square::square_of(rank, file, board.files);
            let ch = match board.piece_at(sq) {
                Ok(Some(p)) => {
                    let c = p.piece_type.alias();
                    if p.color == variant_chess_core::piece::Color::White {
                        c
                    } else {
                        c.to_ascii_lowercase()
                    }
                }
                _ => '.',
            };
            out.push(ch);
            out.push(' ');
        }
        out.push('\n');
    }
    out
}
