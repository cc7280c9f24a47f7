use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::GameError;

/// A board coordinate. Rank 0 is Black's back rank (shown as "8"), rank 7 is
/// White's back rank (shown as "1"); file 0 is the a-file.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Debug)]
pub struct Square {
    pub rank: usize,
    pub file: usize,
}

impl Square {
    pub const fn new(rank: usize, file: usize) -> Self {
        Square { rank, file }
    }

    pub fn in_bounds(rank: i32, file: i32) -> bool {
        (0..8).contains(&rank) && (0..8).contains(&file)
    }

    pub fn is_on_board(self) -> bool {
        self.rank < 8 && self.file < 8
    }

    /// The square `dr` ranks and `df` files away, if it is on the board.
    pub fn offset(self, dr: i32, df: i32) -> Option<Square> {
        let r = self.rank as i32 + dr;
        let f = self.file as i32 + df;
        if Self::in_bounds(r, f) {
            Some(Square::new(r as usize, f as usize))
        } else {
            None
        }
    }

    /// All 64 squares, top-left first.
    pub fn all() -> impl Iterator<Item = Square> {
        (0..8).flat_map(|rank| (0..8).map(move |file| Square::new(rank, file)))
    }

    pub fn file_char(self) -> char {
        (b'a' + self.file as u8) as char
    }

    pub fn rank_char(self) -> char {
        (b'8' - self.rank as u8) as char
    }

    /// Parse algebraic notation such as `e4`.
    pub fn parse(s: &str) -> Option<Square> {
        let bytes = s.as_bytes();
        if bytes.len() != 2 {
            return None;
        }
        let (f, r) = (bytes[0], bytes[1]);
        if !(b'a'..=b'h').contains(&f) || !(b'1'..=b'8').contains(&r) {
            return None;
        }
        Some(Square::new((b'8' - r) as usize, (f - b'a') as usize))
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.file_char(), self.rank_char())
    }
}

impl FromStr for Square {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Square::parse(s).ok_or_else(|| GameError::InvalidSquare(s.to_string()))
    }
}
