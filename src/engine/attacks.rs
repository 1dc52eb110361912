//! Square-safety test.
//!
//! Attack detection works backwards from the target square using the piece
//! catalog: a square is attacked when an enemy piece sits where one of its
//! geometric steps (or an unblocked ray) would land on the target. Attackers
//! are never filtered for their own king's safety, so this module never calls
//! back into move generation.

use crate::engine::board::Board;
use crate::engine::catalog;
use crate::engine::types::{Color, Offset, Piece, PieceKind, Square};

// =========================================================================
// Public API
// =========================================================================

/// Is `sq` safe for `color`, i.e. not attacked by any piece of `!color`?
///
/// Whatever stands on `sq` itself is ignored: the square is the object under
/// threat, not a blocker.
#[inline]
pub fn is_square_safe(board: &Board, sq: Square, color: Color) -> bool {
    !is_attacked(board, sq, !color)
}

/// Is `color`'s king attacked? `false` if that king is absent.
#[inline]
pub fn is_in_check(board: &Board, color: Color) -> bool {
    board
        .king_square(color)
        .is_some_and(|king| is_attacked(board, king, !color))
}

/// Is `sq` attacked by any piece of colour `by`?
pub fn is_attacked(board: &Board, sq: Square, by: Color) -> bool {
    // Pawns: only the two diagonal capture offsets attack. Reverse them to
    // find where an attacking pawn would stand.
    for off in catalog::pawn_captures(by) {
        if holds(board, sq.offset(-*off), Piece::new(PieceKind::Pawn, by)) {
            return true;
        }
    }

    // Knight jumps and king steps are symmetric.
    if catalog::KNIGHT_JUMPS
        .iter()
        .any(|off| holds(board, sq.offset(*off), Piece::new(PieceKind::Knight, by)))
    {
        return true;
    }
    if catalog::king_steps()
        .iter()
        .any(|off| holds(board, sq.offset(*off), Piece::new(PieceKind::King, by)))
    {
        return true;
    }

    // Sliders: walk each queen ray out from the target to the first piece.
    catalog::rays_of(PieceKind::Queen).any(|ray| slider_on_ray(board, sq, ray, by))
}

// =========================================================================
// Helpers
// =========================================================================

#[inline]
fn holds(board: &Board, sq: Option<Square>, piece: Piece) -> bool {
    sq.is_some_and(|s| board.piece_at(s) == Some(piece))
}

/// Does the first piece met along `ray` belong to `by` and slide that way?
fn slider_on_ray(board: &Board, from: Square, ray: &[Offset], by: Color) -> bool {
    let orthogonal = catalog::is_orthogonal(ray[0]);
    for off in ray {
        let Some(s) = from.offset(*off) else {
            return false;
        };
        if let Some(p) = board.piece_at(s) {
            return p.color == by
                && match p.kind {
                    PieceKind::Queen => true,
                    PieceKind::Rook => orthogonal,
                    PieceKind::Bishop => !orthogonal,
                    _ => false,
                };
        }
    }
    false
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(name: &str) -> Square {
        Square::from_algebraic(name).unwrap()
    }

    fn board(pieces: &[(&str, PieceKind, Color)]) -> Board {
        let mut b = Board::empty();
        for &(name, kind, color) in pieces {
            b.put(sq(name), Piece::new(kind, color));
        }
        b
    }

    #[test]
    fn starting_position_third_rank_is_covered() {
        let b = Board::starting();
        for file in 0..8 {
            assert!(is_attacked(&b, Square::new(file, 2), Color::White));
            assert!(is_attacked(&b, Square::new(file, 5), Color::Black));
            assert!(!is_attacked(&b, Square::new(file, 3), Color::White));
        }
    }

    #[test]
    fn pawn_attacks_diagonally_only() {
        let b = board(&[("e4", PieceKind::Pawn, Color::White)]);
        assert!(is_attacked(&b, sq("d5"), Color::White));
        assert!(is_attacked(&b, sq("f5"), Color::White));
        assert!(!is_attacked(&b, sq("e5"), Color::White));
        assert!(!is_attacked(&b, sq("d3"), Color::White));
    }

    #[test]
    fn black_pawn_attacks_downward() {
        let b = board(&[("e5", PieceKind::Pawn, Color::Black)]);
        assert!(is_attacked(&b, sq("d4"), Color::Black));
        assert!(is_attacked(&b, sq("f4"), Color::Black));
        assert!(!is_attacked(&b, sq("d6"), Color::Black));
    }

    #[test]
    fn knight_jumps_over_pieces() {
        let b = board(&[
            ("g1", PieceKind::Knight, Color::White),
            ("f2", PieceKind::Pawn, Color::White),
            ("g2", PieceKind::Pawn, Color::White),
        ]);
        assert!(is_attacked(&b, sq("f3"), Color::White));
        assert!(is_attacked(&b, sq("h3"), Color::White));
        assert!(is_attacked(&b, sq("e2"), Color::White));
        // g3 is covered by the f2 pawn, g4 by nothing.
        assert!(is_attacked(&b, sq("g3"), Color::White));
        assert!(!is_attacked(&b, sq("g4"), Color::White));
    }

    #[test]
    fn rook_ray_blocked_by_first_piece() {
        let b = board(&[
            ("a1", PieceKind::Rook, Color::Black),
            ("a4", PieceKind::Knight, Color::White),
        ]);
        assert!(is_attacked(&b, sq("a3"), Color::Black));
        assert!(is_attacked(&b, sq("a4"), Color::Black));
        assert!(!is_attacked(&b, sq("a5"), Color::Black));
        assert!(is_attacked(&b, sq("h1"), Color::Black));
        assert!(!is_attacked(&b, sq("b2"), Color::Black));
    }

    #[test]
    fn bishop_and_rook_directions_differ() {
        let b = board(&[
            ("d4", PieceKind::Bishop, Color::White),
            ("h8", PieceKind::Rook, Color::White),
        ]);
        assert!(is_attacked(&b, sq("a7"), Color::White));
        assert!(!is_attacked(&b, sq("d5"), Color::White));
        assert!(is_attacked(&b, sq("h1"), Color::White));
        assert!(!is_attacked(&b, sq("g6"), Color::White));
    }

    #[test]
    fn queen_covers_both() {
        let b = board(&[("d1", PieceKind::Queen, Color::Black)]);
        assert!(is_attacked(&b, sq("d8"), Color::Black));
        assert!(is_attacked(&b, sq("h5"), Color::Black));
        assert!(is_attacked(&b, sq("a1"), Color::Black));
        assert!(!is_attacked(&b, sq("e3"), Color::Black));
    }

    #[test]
    fn occupied_target_still_counts() {
        let b = board(&[
            ("e8", PieceKind::Rook, Color::Black),
            ("e1", PieceKind::King, Color::White),
        ]);
        assert!(!is_square_safe(&b, sq("e1"), Color::White));
        assert!(is_in_check(&b, Color::White));
    }

    #[test]
    fn own_pieces_do_not_threaten() {
        let b = board(&[
            ("e8", PieceKind::Rook, Color::White),
            ("e1", PieceKind::King, Color::White),
        ]);
        assert!(is_square_safe(&b, sq("e1"), Color::White));
        assert!(!is_in_check(&b, Color::White));
    }

    #[test]
    fn king_adjacency() {
        let b = board(&[("e5", PieceKind::King, Color::Black)]);
        assert!(is_attacked(&b, sq("d4"), Color::Black));
        assert!(is_attacked(&b, sq("f6"), Color::Black));
        assert!(!is_attacked(&b, sq("e3"), Color::Black));
    }

    #[test]
    fn missing_king_is_not_in_check() {
        let b = Board::empty();
        assert!(!is_in_check(&b, Color::White));
    }
}
