//! Mailbox board representation.
//!
//! `Board` is piece placement only: 64 cells of `Option<Piece>` plus a cached
//! king square per colour. Equality compares placement, which is what
//! repetition detection needs. Castling rights, en passant and turn live on
//! `Position`.

use serde::{Deserialize, Serialize};

use crate::engine::types::{Color, Piece, PieceKind, Square};

/// Raw 8×8 grid, indexed `[rank][file]`.
pub type Grid = [[Option<Piece>; 8]; 8];

const BACK_RANK: [PieceKind; 8] = [
    PieceKind::Rook,
    PieceKind::Knight,
    PieceKind::Bishop,
    PieceKind::Queen,
    PieceKind::King,
    PieceKind::Bishop,
    PieceKind::Knight,
    PieceKind::Rook,
];

// ---------------------------------------------------------------------------
// Board
// ---------------------------------------------------------------------------

/// Piece placement with a king-square cache.
///
/// Every write goes through [`Board::put`] / [`Board::take`], which keep
/// `kings` in step with the cells.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Grid", into = "Grid")]
pub struct Board {
    cells: Grid,
    kings: [Option<Square>; 2],
}

impl Board {
    /// A board with no pieces.
    pub fn empty() -> Self {
        Board {
            cells: [[None; 8]; 8],
            kings: [None; 2],
        }
    }

    /// Standard starting placement.
    pub fn starting() -> Self {
        let mut board = Board::empty();
        for color in Color::BOTH {
            for (file, kind) in BACK_RANK.iter().enumerate() {
                let file = file as u8;
                board.put(
                    Square::new(file, color.back_rank()),
                    Piece::new(*kind, color),
                );
                board.put(
                    Square::new(file, color.pawn_rank()),
                    Piece::new(PieceKind::Pawn, color),
                );
            }
        }
        board
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    #[inline]
    pub fn piece_at(&self, sq: Square) -> Option<Piece> {
        self.cells[sq.rank() as usize][sq.file() as usize]
    }

    #[inline]
    pub fn is_empty(&self, sq: Square) -> bool {
        self.piece_at(sq).is_none()
    }

    /// Colour of the piece on `sq`, if any.
    #[inline]
    pub fn color_at(&self, sq: Square) -> Option<Color> {
        self.piece_at(sq).map(|p| p.color)
    }

    /// Cached king location.
    #[inline]
    pub fn king_square(&self, color: Color) -> Option<Square> {
        self.kings[color.index()]
    }

    /// All occupied squares with their pieces, rank 1 first.
    pub fn pieces(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        Square::all().filter_map(|sq| self.piece_at(sq).map(|p| (sq, p)))
    }

    /// Occupied squares belonging to `color`.
    pub fn pieces_of(&self, color: Color) -> impl Iterator<Item = (Square, Piece)> + '_ {
        self.pieces().filter(move |(_, p)| p.color == color)
    }

    /// How many copies of `piece` are on the board.
    pub fn count(&self, piece: Piece) -> u8 {
        self.pieces().filter(|(_, p)| *p == piece).count() as u8
    }

    // -----------------------------------------------------------------------
    // Mutation
    // -----------------------------------------------------------------------

    /// Place `piece` on `sq`, returning whatever was there.
    pub fn put(&mut self, sq: Square, piece: Piece) -> Option<Piece> {
        let replaced = self.take(sq);
        self.cells[sq.rank() as usize][sq.file() as usize] = Some(piece);
        if piece.kind == PieceKind::King {
            self.kings[piece.color.index()] = Some(sq);
        }
        replaced
    }

    /// Empty `sq`, returning its piece.
    pub fn take(&mut self, sq: Square) -> Option<Piece> {
        let taken = self.cells[sq.rank() as usize][sq.file() as usize].take();
        if let Some(p) = taken
            && p.kind == PieceKind::King
            && self.kings[p.color.index()] == Some(sq)
        {
            self.kings[p.color.index()] = None;
        }
        taken
    }

    /// Move the piece on `from` to `to`, returning any piece displaced from
    /// `to`. Does nothing if `from` is empty.
    pub fn relocate(&mut self, from: Square, to: Square) -> Option<Piece> {
        match self.take(from) {
            Some(piece) => self.put(to, piece),
            None => None,
        }
    }

    // -----------------------------------------------------------------------
    // Consistency check
    // -----------------------------------------------------------------------

    /// Locate a king by scanning every cell.
    pub fn scan_king(&self, color: Color) -> Option<Square> {
        self.pieces()
            .find(|(_, p)| *p == Piece::new(PieceKind::King, color))
            .map(|(sq, _)| sq)
    }

    /// Verify the king cache agrees with a full-board scan.
    #[cfg(any(debug_assertions, test))]
    pub fn assert_consistent(&self) {
        for color in Color::BOTH {
            assert_eq!(
                self.kings[color.index()],
                self.scan_king(color),
                "king cache mismatch for {color}",
            );
        }
    }

    // -----------------------------------------------------------------------
    // Display (8×8 text grid)
    // -----------------------------------------------------------------------

    /// Render the board as an 8-line string (rank 8 at top).
    pub fn board_string(&self) -> String {
        let mut s = String::with_capacity(200);
        for rank in (0..8u8).rev() {
            s.push((b'1' + rank) as char);
            s.push(' ');
            for file in 0..8u8 {
                let ch = match self.piece_at(Square::new(file, rank)) {
                    Some(p) => p.to_char(),
                    None => '.',
                };
                s.push(ch);
                if file < 7 {
                    s.push(' ');
                }
            }
            s.push('\n');
        }
        s.push_str("  a b c d e f g h");
        s
    }
}

impl Default for Board {
    fn default() -> Self {
        Board::starting()
    }
}

impl From<Grid> for Board {
    fn from(grid: Grid) -> Self {
        let mut board = Board::empty();
        for sq in Square::all() {
            if let Some(piece) = grid[sq.rank() as usize][sq.file() as usize] {
                board.put(sq, piece);
            }
        }
        board
    }
}

impl From<Board> for Grid {
    fn from(board: Board) -> Self {
        board.cells
    }
}

impl std::fmt::Display for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.board_string())
    }
}

impl std::fmt::Debug for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Board(")?;
        writeln!(f, "{}", self.board_string())?;
        write!(f, ")")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
