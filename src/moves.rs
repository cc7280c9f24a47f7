use serde::{Deserialize, Serialize};

use crate::piece::{Piece, PieceType};
use crate::square::Square;

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct Move {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<PieceType>,
}

impl Move {
    pub fn new(from: Square, to: Square) -> Self {
        Move { from, to, promotion: None }
    }

    pub fn with_promotion(mut self, kind: PieceType) -> Self {
        self.promotion = Some(kind);
        self
    }

    /// Coordinate notation, e.g. "e2e4", "a7a8q".
    pub fn to_uci(&self) -> String {
        let promo = self
            .promotion
            .map(|pt| pt.letter().to_ascii_lowercase().to_string())
            .unwrap_or_default();
        format!("{}{}{promo}", self.from, self.to)
    }

    /// Parse coordinate notation. Any promotion letter is kept, valid or
    /// not; the rules decide whether it is acceptable.
    pub fn from_uci(s: &str) -> Option<Move> {
        if !s.is_ascii() || !(4..=5).contains(&s.len()) {
            return None;
        }
        let from = Square::parse(&s[0..2])?;
        let to = Square::parse(&s[2..4])?;
        let promotion = match s[4..].chars().next() {
            Some(c) => Some(PieceType::from_letter(c)?),
            None => None,
        };
        Some(Move { from, to, promotion })
    }
}

/// Move log entry: piece letter (case-as-color), origin, `x` if the
/// destination was occupied before the move or `-` otherwise, destination.
/// For example `Pe2-e4`, `Nf3xe5`, `pe7-e5`.
pub fn notation(piece: Piece, mv: &Move, destination_occupied: bool) -> String {
    let sep = if destination_occupied { 'x' } else { '-' };
    format!("{}{}{sep}{}", piece.to_char(), mv.from, mv.to)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::piece::Color;

    fn mv(s: &str) -> Move {
        Move::from_uci(s).unwrap()
    }

    #[test]
    fn uci_uses_display_ranks() {
        let m = mv("e2e4");
        assert_eq!(m.from, Square::new(6, 4));
        assert_eq!(m.to, Square::new(4, 4));
        assert_eq!(m.to_uci(), "e2e4");
        assert_eq!(mv("a7a8q").promotion, Some(PieceType::Queen));
        assert_eq!(mv("a7a8q").to_uci(), "a7a8q");
        assert!(Move::from_uci("e2").is_none());
        assert!(Move::from_uci("e2e9").is_none());
        assert!(Move::from_uci("a7a8z").is_none());
    }

    #[test]
    fn notation_marks_captures_with_x() {
        let pawn = Piece::new(PieceType::Pawn, Color::White);
        let knight = Piece::new(PieceType::Knight, Color::White);
        let black_pawn = Piece::new(PieceType::Pawn, Color::Black);
        assert_eq!(notation(pawn, &mv("e2e4"), false), "Pe2-e4");
        assert_eq!(notation(knight, &mv("f3e5"), true), "Nf3xe5");
        assert_eq!(notation(black_pawn, &mv("e7e5"), false), "pe7-e5");
    }
}
