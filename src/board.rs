use serde::{Deserialize, Serialize};

use crate::piece::{Color, Piece, PieceType};
use crate::square::Square;

const KNIGHT_OFFSETS: [(i32, i32); 8] = [
    (-2, -1), (-2, 1), (-1, -2), (-1, 2),
    (1, -2), (1, 2), (2, -1), (2, 1),
];

const KING_OFFSETS: [(i32, i32); 8] = [
    (-1, -1), (-1, 0), (-1, 1),
    (0, -1), (0, 1),
    (1, -1), (1, 0), (1, 1),
];

const STRAIGHT_DIRS: [(i32, i32); 4] = [(0, 1), (0, -1), (1, 0), (-1, 0)];
const DIAG_DIRS: [(i32, i32); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];

const BACK_RANK: [PieceType; 8] = [
    PieceType::Rook,
    PieceType::Knight,
    PieceType::Bishop,
    PieceType::Queen,
    PieceType::King,
    PieceType::Bishop,
    PieceType::Knight,
    PieceType::Rook,
];

/// The 8×8 grid. Serialized as eight rank strings, top rank first, using
/// case-as-color letters and `.` for empty squares (e.g. `"rnbqkbnr"`).
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Debug)]
#[serde(into = "Vec<String>", try_from = "Vec<String>")]
pub struct Board {
    pub squares: [[Option<Piece>; 8]; 8],
}

/// What happened on the grid when a piece was moved.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Placement {
    pub piece: Piece,
    /// Piece removed by the move, either on the destination or, for en
    /// passant, behind it.
    pub captured: Option<Piece>,
    pub en_passant: bool,
    pub castling: bool,
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// A board with no pieces. Useful for setting up test positions.
    pub fn empty() -> Self {
        Board {
            squares: [[None; 8]; 8],
        }
    }

    /// The standard starting position.
    pub fn new() -> Self {
        let mut board = Board::empty();
        for (file, &kind) in BACK_RANK.iter().enumerate() {
            board.squares[0][file] = Some(Piece::new(kind, Color::Black));
            board.squares[1][file] = Some(Piece::new(PieceType::Pawn, Color::Black));
            board.squares[6][file] = Some(Piece::new(PieceType::Pawn, Color::White));
            board.squares[7][file] = Some(Piece::new(kind, Color::White));
        }
        board
    }

    pub fn get(&self, sq: Square) -> Option<Piece> {
        self.squares[sq.rank][sq.file]
    }

    pub fn set(&mut self, sq: Square, piece: Option<Piece>) {
        self.squares[sq.rank][sq.file] = piece;
    }

    pub fn is_empty(&self, sq: Square) -> bool {
        self.get(sq).is_none()
    }

    /// Occupied squares with their pieces, top-left first.
    pub fn pieces(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        Square::all().filter_map(move |sq| self.get(sq).map(|p| (sq, p)))
    }

    pub fn find_king(&self, color: Color) -> Option<Square> {
        self.pieces()
            .find(|(_, p)| p.piece_type == PieceType::King && p.color == color)
            .map(|(sq, _)| sq)
    }

    pub fn count(&self, piece: Piece) -> usize {
        self.pieces().filter(|&(_, p)| p == piece).count()
    }

    fn has(&self, sq: Option<Square>, attacker: Color, kinds: &[PieceType]) -> bool {
        sq.and_then(|s| self.get(s))
            .map(|p| p.color == attacker && kinds.contains(&p.piece_type))
            .unwrap_or(false)
    }

    fn ray_hits(&self, from: Square, dirs: &[(i32, i32)], attacker: Color, kinds: &[PieceType]) -> bool {
        for &(dr, df) in dirs {
            let mut next = from.offset(dr, df);
            while let Some(sq) = next {
                if let Some(p) = self.get(sq) {
                    if p.color == attacker && kinds.contains(&p.piece_type) {
                        return true;
                    }
                    break;
                }
                next = sq.offset(dr, df);
            }
        }
        false
    }

    /// Does any piece of `attacker` attack `sq`?
    pub fn is_square_attacked_by(&self, sq: Square, attacker: Color) -> bool {
        // A pawn attacks diagonally forward, so it sits one step behind the target.
        let behind = -attacker.forward();
        if [-1, 1]
            .iter()
            .any(|&df| self.has(sq.offset(behind, df), attacker, &[PieceType::Pawn]))
        {
            return true;
        }

        if KNIGHT_OFFSETS
            .iter()
            .any(|&(dr, df)| self.has(sq.offset(dr, df), attacker, &[PieceType::Knight]))
        {
            return true;
        }

        if self.ray_hits(sq, &STRAIGHT_DIRS, attacker, &[PieceType::Rook, PieceType::Queen]) {
            return true;
        }
        if self.ray_hits(sq, &DIAG_DIRS, attacker, &[PieceType::Bishop, PieceType::Queen]) {
            return true;
        }

        KING_OFFSETS
            .iter()
            .any(|&(dr, df)| self.has(sq.offset(dr, df), attacker, &[PieceType::King]))
    }

    pub fn is_in_check(&self, color: Color) -> bool {
        match self.find_king(color) {
            Some(king) => self.is_square_attacked_by(king, color.opposite()),
            None => false,
        }
    }

    /// Move the piece on `from` to `to` with the grid side effects of
    /// castling and en passant. `en_passant_target` is the target in force
    /// before the move. Returns `None` if `from` is empty.
    pub fn place(&mut self, from: Square, to: Square, en_passant_target: Option<Square>) -> Option<Placement> {
        let piece = self.get(from)?;
        let mut captured = self.get(to);
        let mut en_passant = false;
        let mut castling = false;

        match piece.piece_type {
            PieceType::King if from.rank == to.rank && from.file.abs_diff(to.file) == 2 => {
                let (rook_from, rook_to) = if to.file > from.file { (7, 5) } else { (0, 3) };
                let rook = self.get(Square::new(from.rank, rook_from));
                self.set(Square::new(from.rank, rook_to), rook);
                self.set(Square::new(from.rank, rook_from), None);
                castling = true;
            }
            PieceType::Pawn
                if from.file != to.file
                    && captured.is_none()
                    && Some(to) == en_passant_target
                    && self.get(Square::new(from.rank, to.file))
                        == Some(Piece::new(PieceType::Pawn, piece.color.opposite())) =>
            {
                // The captured pawn stands beside the mover, one rank behind the target.
                let victim = Square::new(from.rank, to.file);
                captured = self.get(victim);
                self.set(victim, None);
                en_passant = true;
            }
            _ => {}
        }

        self.set(to, Some(piece));
        self.set(from, None);

        Some(Placement {
            piece,
            captured,
            en_passant,
            castling,
        })
    }

    /// Canonical text of the grid: rank strings joined by `/`.
    pub fn encode(&self) -> String {
        self.rank_strings().join("/")
    }

    fn rank_strings(&self) -> Vec<String> {
        self.squares
            .iter()
            .map(|rank| {
                rank.iter()
                    .map(|sq| sq.map(Piece::to_char).unwrap_or('.'))
                    .collect()
            })
            .collect()
    }
}

impl From<Board> for Vec<String> {
    fn from(board: Board) -> Self {
        board.rank_strings()
    }
}

impl TryFrom<Vec<String>> for Board {
    type Error = String;

    fn try_from(ranks: Vec<String>) -> Result<Self, Self::Error> {
        if ranks.len() != 8 {
            return Err(format!("expected 8 ranks, found {}", ranks.len()));
        }
        let mut board = Board::empty();
        for (r, line) in ranks.iter().enumerate() {
            let chars: Vec<char> = line.chars().collect();
            if chars.len() != 8 {
                return Err(format!("rank {r} has {} squares", chars.len()));
            }
            for (f, &c) in chars.iter().enumerate() {
                board.squares[r][f] = match c {
                    '.' => None,
                    _ => Some(Piece::from_char(c).ok_or_else(|| format!("unknown piece '{c}'"))?),
                };
            }
        }
        Ok(board)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(s: &str) -> Square {
        Square::parse(s).unwrap()
    }

    fn put(board: &mut Board, at: &str, c: char) {
        board.set(sq(at), Piece::from_char(c));
    }

    #[test]
    fn starting_position_layout() {
        let board = Board::new();
        assert_eq!(board.encode(), "rnbqkbnr/pppppppp/......../......../......../......../PPPPPPPP/RNBQKBNR");
        assert_eq!(board.find_king(Color::White), Some(sq("e1")));
        assert_eq!(board.find_king(Color::Black), Some(sq("e8")));
        assert!(!board.is_in_check(Color::White));
    }

    #[test]
    fn pawns_attack_diagonally_forward_only() {
        let mut board = Board::empty();
        put(&mut board, "e4", 'P');
        put(&mut board, "d5", 'p');
        assert!(board.is_square_attacked_by(sq("d5"), Color::White));
        assert!(board.is_square_attacked_by(sq("f5"), Color::White));
        assert!(!board.is_square_attacked_by(sq("e5"), Color::White));
        assert!(!board.is_square_attacked_by(sq("d3"), Color::White));
        assert!(board.is_square_attacked_by(sq("e4"), Color::Black));
        assert!(board.is_square_attacked_by(sq("c4"), Color::Black));
    }

    #[test]
    fn sliders_stop_at_first_piece() {
        let mut board = Board::empty();
        put(&mut board, "a1", 'R');
        put(&mut board, "a4", 'p');
        put(&mut board, "h8", 'b');
        put(&mut board, "e5", 'N');
        assert!(board.is_square_attacked_by(sq("a4"), Color::White));
        assert!(!board.is_square_attacked_by(sq("a5"), Color::White));
        assert!(board.is_square_attacked_by(sq("h1"), Color::White));
        assert!(board.is_square_attacked_by(sq("f6"), Color::Black));
        assert!(!board.is_square_attacked_by(sq("d4"), Color::Black));
    }

    #[test]
    fn knights_and_kings_attack_their_neighbourhood() {
        let mut board = Board::empty();
        put(&mut board, "g1", 'N');
        put(&mut board, "e8", 'k');
        assert!(board.is_square_attacked_by(sq("f3"), Color::White));
        assert!(board.is_square_attacked_by(sq("e2"), Color::White));
        assert!(!board.is_square_attacked_by(sq("g3"), Color::White));
        assert!(board.is_square_attacked_by(sq("d7"), Color::Black));
        assert!(!board.is_square_attacked_by(sq("e6"), Color::Black));
    }

    #[test]
    fn place_relocates_rook_when_castling() {
        let mut board = Board::empty();
        put(&mut board, "e1", 'K');
        put(&mut board, "h1", 'R');
        let placement = board.place(sq("e1"), sq("g1"), None).unwrap();
        assert!(placement.castling);
        assert_eq!(board.get(sq("f1")), Piece::from_char('R'));
        assert!(board.is_empty(sq("h1")));
    }

    #[test]
    fn place_removes_pawn_behind_en_passant_target() {
        let mut board = Board::empty();
        put(&mut board, "e5", 'P');
        put(&mut board, "d5", 'p');
        let placement = board.place(sq("e5"), sq("d6"), Some(sq("d6"))).unwrap();
        assert!(placement.en_passant);
        assert_eq!(placement.captured, Piece::from_char('p'));
        assert!(board.is_empty(sq("d5")));
    }

    #[test]
    fn place_leaves_own_pawn_beside_the_target() {
        let mut board = Board::empty();
        put(&mut board, "c7", 'p');
        put(&mut board, "d7", 'p');
        let placement = board.place(sq("c7"), sq("d6"), Some(sq("d6"))).unwrap();
        assert!(!placement.en_passant);
        assert_eq!(placement.captured, None);
        assert_eq!(board.get(sq("d7")), Piece::from_char('p'));
    }

    #[test]
    fn serializes_as_rank_strings() {
        let board = Board::new();
        let json = serde_json::to_string(&board).unwrap();
        assert!(json.starts_with("[\"rnbqkbnr\""));
        let back: Board = serde_json::from_str(&json).unwrap();
        assert_eq!(back, board);
        assert!(serde_json::from_str::<Board>("[\"rnbqkbnr\"]").is_err());
    }
}
