//! The positional-piece flyweight cache.
//!
//! For a given `(ranks, files)` this module builds, once, a 3-D grid
//! keyed by `(color, piece_type, square)` of pre-expanded move
//! geometry: the ordered rays a piece standing on that square can
//! travel, a sink bitboard summarizing reachable squares, and a
//! position-adjusted rating. The grid is process-global and
//! populated lazily on first request, the same `OnceCell`-guarded
//! global-singleton shape this crate already uses for its other
//! precomputed table, generalized here to a table keyed by board size
//! since boards are no longer fixed at 64 squares.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use once_cell::sync::OnceCell;

use crate::error::{Error, Result};
use crate::piece::{Color, PieceType};
use crate::square::{MaskedSquare, MoveTag, Square, file_of, in_bounds, rank_of, square_of};

/// An arbitrary-length, one-bit-per-square bitset. Boards run up to
/// 127x127 = 16,129 squares, too many for a single `u64` word.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SquareSet {
    words: Vec<u64>,
}

impl SquareSet {
    pub fn empty(square_count: usize) -> Self {
        SquareSet {
            words: vec![0u64; square_count.div_ceil(64)],
        }
    }

    #[inline]
    pub fn set(&mut self, sq: Square) {
        let idx = sq as usize;
        self.words[idx / 64] |= 1u64 << (idx % 64);
    }

    #[inline]
    pub fn contains(&self, sq: Square) -> bool {
        if sq < 0 {
            return false;
        }
        let idx = sq as usize;
        let word = idx / 64;
        word < self.words.len() && (self.words[word] >> (idx % 64)) & 1 != 0
    }

    pub fn popcount(&self) -> u32 {
        self.words.iter().map(|w| w.count_ones()).sum()
    }
}

/// One ray: an ordered list of masked squares a piece may travel along
/// in a single direction before being blocked.
pub type Ray = Vec<MaskedSquare>;

/// A flyweight, immutable value uniquely identified by
/// `(ranks, files, color, piece_type, square)`.
#[derive(Debug)]
pub struct PositionalPiece {
    pub ranks: i16,
    pub files: i16,
    pub color: Color,
    pub piece_type: PieceType,
    pub square: Square,
    pub sink_positions: Vec<Ray>,
    pub sink_bitboard: SquareSet,
    pub rating: i32,
    pub ordinal: u32,
}

impl PartialEq for PositionalPiece {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self, other)
    }
}
impl Eq for PositionalPiece {}

impl PartialOrd for PositionalPiece {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for PositionalPiece {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.ordinal.cmp(&other.ordinal)
    }
}

fn edge_distance(coord: i16, delta: i8, extent: i16) -> i16 {
    match delta.signum() {
        -1 => coord,
        1 => extent - 1 - coord,
        _ => i16::MAX,
    }
}

fn build_rays(
    piece_type: PieceType,
    color: Color,
    square: Square,
    ranks: i16,
    files: i16,
) -> Vec<Ray> {
    let rank = rank_of(square, files);
    let file = file_of(square, files);
    let mut rays = Vec::new();

    if piece_type == PieceType::Pawn {
        let white = color.is_white();
        for &(dr, df) in &PieceType::Pawn.single_vectors() {
            let dr = if white { dr } else { -dr };
            let r2 = rank + dr as i16;
            let f2 = file + df as i16;
            if !in_bounds(r2, f2, ranks, files) {
                continue;
            }
            let sink = square_of(r2, f2, files);
            if df == 0 {
                rays.push(vec![MaskedSquare::new(sink, MoveTag::CaptureForbidden)]);
                let mirror_rank = if white { rank } else { ranks - 1 - rank };
                if ranks >= 4 && mirror_rank <= 1 {
                    let double_sink = 2 * sink - square;
                    rays.push(vec![
                        MaskedSquare::new(sink, MoveTag::CaptureForbidden),
                        MaskedSquare::new(double_sink, MoveTag::CaptureForbidden),
                    ]);
                }
            } else {
                rays.push(vec![MaskedSquare::new(sink, MoveTag::CaptureRequired)]);
            }
        }
        return rays;
    }

    if piece_type == PieceType::King {
        let home_rank = if color.is_white() { 0 } else { ranks - 1 };
        if rank == home_rank && file == files / 2 {
            let offset = (files - 1) / 2 - 1;
            for sign in [1i16, -1i16] {
                let target_file = file + sign * offset;
                if target_file >= 0 && target_file < files {
                    let sink = square_of(rank, target_file, files);
                    rays.push(vec![MaskedSquare::new(sink, MoveTag::Castling)]);
                }
            }
        }
    }

    for &(dr, df) in &piece_type.single_vectors() {
        let r2 = rank + dr as i16;
        let f2 = file + df as i16;
        if in_bounds(r2, f2, ranks, files) {
            let sink = square_of(r2, f2, files);
            rays.push(vec![MaskedSquare::new(sink, MoveTag::Normal)]);
        }
    }

    for &(dr, df) in &piece_type.continuous_vectors() {
        let rank_dist = edge_distance(rank, dr, ranks);
        let file_dist = edge_distance(file, df, files);
        let len = rank_dist.min(file_dist);
        if len < 1 {
            continue;
        }
        let step = (dr as i16) * files + (df as i16);
        let mut ray = Vec::with_capacity(len as usize);
        let mut cur = square;
        for _ in 0..len {
            cur += step;
            ray.push(MaskedSquare::new(cur, MoveTag::Normal));
        }
        rays.push(ray);
    }

    rays
}

fn rating_of(
    piece_type: PieceType,
    color: Color,
    square: Square,
    ranks: i16,
    files: i16,
    sink_bitboard: &SquareSet,
) -> i32 {
    let r = ranks as i32;
    let f = files as i32;
    let base = match piece_type {
        PieceType::Knight | PieceType::Bishop => 300,
        PieceType::Archbishop | PieceType::Chancellor => 700,
        other => other.base_rating(),
    };

    let mut rating = base;
    let rank = rank_of(square, files) as i32;
    let file = file_of(square, files) as i32;

    match piece_type {
        PieceType::Pawn => {
            let denom = r + f / 2 - 4;
            if denom != 0 {
                let mirror_rank = if color.is_white() { rank } else { r - 1 - rank };
                let advancement = mirror_rank - 1;
                let centralization = file.min(f - 1 - file);
                rating = rating * (denom + advancement + centralization) / denom;
            }
        }
        PieceType::Knight | PieceType::Bishop | PieceType::Archbishop | PieceType::Chancellor => {
            let denom = r + f - 2;
            if denom != 0 {
                rating += 50 * sink_bitboard.popcount() as i32 / denom;
            }
        }
        PieceType::King => {
            let home_rank = if color.is_white() { 0 } else { r - 1 };
            if rank == home_rank {
                rating += 50;
            }
        }
        PieceType::Rook | PieceType::Queen | PieceType::Empress => {}
    }

    rating * color.sign()
}

fn build_piece(
    piece_type: PieceType,
    color: Color,
    square: Square,
    ranks: i16,
    files: i16,
) -> PositionalPiece {
    let sink_positions = build_rays(piece_type, color, square, ranks, files);
    let mut sink_bitboard = SquareSet::empty((ranks as usize) * (files as usize));
    for ray in &sink_positions {
        for masked in ray {
            sink_bitboard.set(masked.square());
        }
    }
    let rating = rating_of(piece_type, color, square, ranks, files, &sink_bitboard);
    let ordinal = ((!color.is_white() as u32) << 18) | (piece_type.ordinal() << 14) | (square as u32);

    PositionalPiece {
        ranks,
        files,
        color,
        piece_type,
        square,
        sink_positions,
        sink_bitboard,
        rating,
        ordinal,
    }
}

/// The fully populated grid for one `(ranks, files)` pair: every
/// `(color, piece_type, square)` combination is present.
pub struct Grid {
    pub ranks: i16,
    pub files: i16,
    // indexed [piece_type.ordinal()][color][square]
    pieces: Vec<[Vec<Arc<PositionalPiece>>; 2]>,
}

impl Grid {
    fn build(ranks: i16, files: i16) -> Self {
        let square_count = ranks as usize * files as usize;
        let mut pieces = Vec::with_capacity(PieceType::ALL.len());
        for piece_type in PieceType::ALL {
            let mut white = Vec::with_capacity(square_count);
            let mut black = Vec::with_capacity(square_count);
            for sq in 0..square_count as Square {
                white.push(Arc::new(build_piece(piece_type, Color::White, sq, ranks, files)));
                black.push(Arc::new(build_piece(piece_type, Color::Black, sq, ranks, files)));
            }
            pieces.push([white, black]);
        }
        Grid { ranks, files, pieces }
    }

    pub fn piece(&self, color: Color, piece_type: PieceType, square: Square) -> Arc<PositionalPiece> {
        let color_idx = if color.is_white() { 0 } else { 1 };
        Arc::clone(&self.pieces[piece_type.ordinal() as usize][color_idx][square as usize])
    }
}

fn pack_key(ranks: i16, files: i16) -> u32 {
    ((ranks as u32) << 7) | (files as u32)
}

static CACHE: OnceCell<RwLock<HashMap<u32, Arc<Grid>>>> = OnceCell::new();

/// Returns the flyweight grid for `(ranks, files)`, building it on the
/// first call for that key and sharing it with every subsequent caller
/// (including from other threads).
pub fn geometry(ranks: i16, files: i16) -> Result<Arc<Grid>> {
    if !(3..=127).contains(&ranks) || !(3..=127).contains(&files) {
        return Err(Error::invalid_argument(format!(
            "board dimensions out of range: {ranks}x{files}"
        )));
    }
    let key = pack_key(ranks, files);
    let table = CACHE.get_or_init(|| RwLock::new(HashMap::new()));

    if let Some(grid) = table
        .read()
        .map_err(|_| Error::internal("geometry cache lock poisoned"))?
        .get(&key)
    {
        return Ok(Arc::clone(grid));
    }

    let mut guard = table
        .write()
        .map_err(|_| Error::internal("geometry cache lock poisoned"))?;
    if let Some(grid) = guard.get(&key) {
        return Ok(Arc::clone(grid));
    }
    let grid = Arc::new(Grid::build(ranks, files));
    guard.insert(key, Arc::clone(&grid));
    Ok(grid)
}
