//! The closed catalogue of piece kinds: base rating and relative motion
//! vectors. Vectors are handed out as defensive copies since callers
//! (the geometry builder) mutate/filter them freely.

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Which side a piece or a threat belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Color {
    White,
    Black,
}

impl Color {
    #[inline(always)]
    pub fn opposite(self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    #[inline(always)]
    pub fn is_white(self) -> bool {
        matches!(self, Color::White)
    }

    /// Sign applied to ratings: positive for white, negative for black.
    #[inline(always)]
    pub fn sign(self) -> i32 {
        match self {
            Color::White => 1,
            Color::Black => -1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PieceType {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
    Archbishop,
    Chancellor,
    Empress,
}

impl PieceType {
    pub const ALL: [PieceType; 9] = [
        PieceType::Pawn,
        PieceType::Knight,
        PieceType::Bishop,
        PieceType::Rook,
        PieceType::Queen,
        PieceType::King,
        PieceType::Archbishop,
        PieceType::Chancellor,
        PieceType::Empress,
    ];

    pub fn alias(self) -> char {
        match self {
            PieceType::Pawn => 'P',
            PieceType::Knight => 'N',
            PieceType::Bishop => 'B',
            PieceType::Rook => 'R',
            PieceType::Queen => 'Q',
            PieceType::King => 'K',
            PieceType::Archbishop => 'A',
            PieceType::Chancellor => 'C',
            PieceType::Empress => 'E',
        }
    }

    pub fn value_of(alias: char) -> Result<PieceType, Error> {
        match alias.to_ascii_uppercase() {
            'P' => Ok(PieceType::Pawn),
            'N' => Ok(PieceType::Knight),
            'B' => Ok(PieceType::Bishop),
            'R' => Ok(PieceType::Rook),
            'Q' => Ok(PieceType::Queen),
            'K' => Ok(PieceType::King),
            'A' => Ok(PieceType::Archbishop),
            'C' => Ok(PieceType::Chancellor),
            'E' => Ok(PieceType::Empress),
            other => Err(Error::invalid_argument(format!(
                "unknown piece alias '{other}'"
            ))),
        }
    }

    /// Base rating in cents, as used before any positional adjustment.
    pub fn base_rating(self) -> i32 {
        match self {
            PieceType::Pawn => 100,
            PieceType::King => 10000,
            PieceType::Knight => 320,
            PieceType::Bishop => 330,
            PieceType::Rook => 510,
            PieceType::Queen => 880,
            PieceType::Archbishop => 750,
            PieceType::Chancellor => 800,
            PieceType::Empress => 1000,
        }
    }

    /// `ordinal` used to build the flyweight `ordinal` field; stable
    /// and arbitrary, only required to be a total order.
    pub fn ordinal(self) -> u32 {
        PieceType::ALL.iter().position(|&p| p == self).unwrap() as u32
    }

    const KNIGHT_SINGLES: [(i8, i8); 8] = [
        (2, 1),
        (2, -1),
        (-2, 1),
        (-2, -1),
        (1, 2),
        (1, -2),
        (-1, 2),
        (-1, -2),
    ];
    const KING_SINGLES: [(i8, i8); 8] = [
        (1, 0),
        (1, 1),
        (1, -1),
        (0, 1),
        (0, -1),
        (-1, 0),
        (-1, 1),
        (-1, -1),
    ];
    const BISHOP_RAYS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];
    const ROOK_RAYS: [(i8, i8); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

    /// Pawn single-step vectors, white orientation (forward = +rank).
    const PAWN_SINGLES: [(i8, i8); 3] = [(1, -1), (1, 0), (1, 1)];

    /// Single-step (non-ray) motion vectors, as `(drank, dfile)`.
    pub fn single_vectors(self) -> Vec<(i8, i8)> {
        match self {
            PieceType::Pawn => Self::PAWN_SINGLES.to_vec(),
            PieceType::King => Self::KING_SINGLES.to_vec(),
            PieceType::Knight => Self::KNIGHT_SINGLES.to_vec(),
            PieceType::Archbishop | PieceType::Chancellor | PieceType::Empress => {
                Self::KNIGHT_SINGLES.to_vec()
            }
            PieceType::Bishop | PieceType::Rook | PieceType::Queen => Vec::new(),
        }
    }

    /// Continuous (ray) motion vectors, as `(drank, dfile)`.
    pub fn continuous_vectors(self) -> Vec<(i8, i8)> {
        match self {
            PieceType::Pawn | PieceType::King | PieceType::Knight => Vec::new(),
            PieceType::Bishop => Self::BISHOP_RAYS.to_vec(),
            PieceType::Rook => Self::ROOK_RAYS.to_vec(),
            PieceType::Queen => Self::BISHOP_RAYS.iter().chain(&Self::ROOK_RAYS).copied().collect(),
            PieceType::Archbishop => Self::BISHOP_RAYS.to_vec(),
            PieceType::Chancellor => Self::ROOK_RAYS.to_vec(),
            PieceType::Empress => Self::BISHOP_RAYS.iter().chain(&Self::ROOK_RAYS).copied().collect(),
        }
    }

    /// Whether this type moves along knight-style single-step rays,
    /// used by reverse threat detection.
    pub fn moves_like_knight(self) -> bool {
        matches!(
            self,
            PieceType::Knight | PieceType::Archbishop | PieceType::Chancellor | PieceType::Empress
        )
    }

    /// Whether this type moves along bishop-style diagonal rays (any range).
    pub fn moves_like_bishop(self) -> bool {
        matches!(
            self,
            PieceType::Bishop | PieceType::Archbishop | PieceType::Queen | PieceType::Empress
        )
    }

    /// Whether this type moves along rook-style orthogonal rays (any range).
    pub fn moves_like_rook(self) -> bool {
        matches!(
            self,
            PieceType::Rook | PieceType::Chancellor | PieceType::Queen | PieceType::Empress
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alias_round_trips() {
        for p in PieceType::ALL {
            assert_eq!(PieceType::value_of(p.alias()).unwrap(), p);
            assert_eq!(PieceType::value_of(p.alias().to_ascii_lowercase()).unwrap(), p);
        }
    }

    #[test]
    fn unknown_alias_is_invalid_argument() {
        assert!(matches!(
            PieceType::value_of('Z'),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn archbishop_is_knight_union_bishop() {
        let a = PieceType::Archbishop;
        assert_eq!(a.single_vectors().len(), 8);
        assert_eq!(a.continuous_vectors().len(), 4);
    }
}
